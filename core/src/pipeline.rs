#![deny(missing_docs)]

//! # Transformation Pipeline
//!
//! Scan → registry → parse → imports → fields → tags → emit, for one file.

use crate::directives::{scan, ScanOutcome};
use crate::error::AppResult;
use crate::model::{emit, GoFile};
use crate::patcher::{inject_fields, inject_imports, merge_tags};
use crate::report::Report;

/// The result of transforming one file.
#[derive(Debug, Clone)]
pub struct Transformation {
    /// The emitted source.
    pub output: String,
    /// What was applied and skipped.
    pub report: Report,
    changed: bool,
}

impl Transformation {
    /// Whether the output differs from the input.
    pub fn changed(&self) -> bool {
        self.changed
    }
}

/// Transforms raw source bytes.
///
/// Fails only when the input cannot be parsed or the output cannot be
/// emitted; directive problems are reported, never raised.
///
/// # Examples
/// ```
/// let source = b"package a\n\ntype User struct {\n\t// @gofield: LastName string\n\tId string\n}\n";
/// let result = inject_core::transform(source).unwrap();
/// assert!(result.output.contains("\tLastName string\n"));
/// ```
pub fn transform(source: &[u8]) -> AppResult<Transformation> {
    let text = std::str::from_utf8(source)?;
    transform_str(text)
}

/// Transforms source text.
pub fn transform_str(source: &str) -> AppResult<Transformation> {
    let ScanOutcome { registry, skipped } = scan(source);
    let mut report = Report {
        skipped,
        ..Report::default()
    };

    let mut file = GoFile::parse(source)?;
    if !registry.is_empty() {
        inject_imports(&mut file, &registry, &mut report);
        inject_fields(&mut file, &registry, &mut report);
        merge_tags(&mut file, &registry, &mut report);
    }

    let output = emit(&file)?;
    let changed = output != source;
    tracing::info!(
        imports = report.imports_added.len(),
        fields = report.fields_added.len(),
        tags = report.tags_merged.len(),
        skipped = report.skipped.len(),
        changed,
        "transformation finished"
    );

    Ok(Transformation {
        output,
        report,
        changed,
    })
}
