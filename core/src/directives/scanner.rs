//! # Directive Scanner
//!
//! Walks raw source line by line, independent of whether the text parses, and
//! fills a [`DirectiveRegistry`]. The current struct declaration is carried as
//! a plain value through the loop.

use crate::directives::matchers::{
    brace_delta, declaration_header, group_member_header, parse_directives, tag_target,
    type_group_open, DirectiveKind,
};
use crate::directives::registry::{normalize_field_name, DirectiveRegistry};
use crate::report::{SkipKind, Skipped};

/// Result of scanning one file.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// The completed registry.
    pub registry: DirectiveRegistry,
    /// Directives dropped while scanning.
    pub skipped: Vec<Skipped>,
}

/// Where the scan stands after a line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanContext {
    /// The struct declaration directives bind to.
    declaration: Option<String>,
    /// Brace depth inside a `type ( ... )` group, while in one.
    group_depth: Option<usize>,
}

impl ScanContext {
    /// The current struct declaration, if any.
    pub fn declaration(&self) -> Option<&str> {
        self.declaration.as_deref()
    }

    /// Whether the scan is inside a grouped type declaration.
    pub fn in_type_group(&self) -> bool {
        self.group_depth.is_some()
    }

    fn advance(mut self, line: &str) -> Self {
        let header = match declaration_header(line) {
            Some(name) => Some(name),
            None if self.group_depth == Some(0) => group_member_header(line),
            None => None,
        };
        if let Some(name) = header {
            self.declaration = Some(name.to_string());
        }

        self.group_depth = if type_group_open(line) {
            Some(0)
        } else {
            self.group_depth.and_then(|depth| {
                let depth = (depth as isize + brace_delta(line)).max(0) as usize;
                let closed = depth == 0 && line.trim_start().starts_with(')');
                (!closed).then_some(depth)
            })
        };
        self
    }
}

/// Scans the full text of one file.
pub fn scan(source: &str) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    let mut context = ScanContext::default();

    for (idx, line) in source.lines().enumerate() {
        context = scan_line(
            line,
            idx + 1,
            context,
            &mut outcome.registry,
            &mut outcome.skipped,
        );
    }

    outcome
}

/// Scans a single line and returns the context for the next one.
pub fn scan_line(
    line: &str,
    line_no: usize,
    context: ScanContext,
    registry: &mut DirectiveRegistry,
    skipped: &mut Vec<Skipped>,
) -> ScanContext {
    let context = context.advance(line);

    for directive in parse_directives(line) {
        match directive.kind {
            DirectiveKind::Import => registry.add_import(&directive.content, line_no),
            DirectiveKind::FieldAdd => match context.declaration() {
                Some(decl) => registry.add_field_addition(decl, &directive.content, line_no),
                None => drop_directive(skipped, line_no, "@gofield", &directive.content),
            },
            DirectiveKind::TagSet => {
                let Some(decl) = context.declaration() else {
                    drop_directive(skipped, line_no, "@gotags", &directive.content);
                    continue;
                };
                match tag_target(line) {
                    Some(marker) => registry.add_tag_update(
                        decl,
                        &normalize_field_name(marker),
                        &directive.content,
                        line_no,
                    ),
                    None => Skipped::record(
                        skipped,
                        SkipKind::UnresolvedTagTarget,
                        line_no,
                        format!("no name= marker for `{}`", directive.content),
                    ),
                }
            }
        }
    }

    context
}

fn drop_directive(skipped: &mut Vec<Skipped>, line_no: usize, marker: &str, content: &str) {
    Skipped::record(
        skipped,
        SkipKind::DroppedDirective,
        line_no,
        format!("{marker} `{content}` before any struct declaration"),
    );
}
