#![deny(missing_docs)]

//! # Transformation Report
//!
//! Collects what a transformation applied and every directive it had to skip.
//! None of the skip kinds abort a run; callers decide whether to surface them.

use serde::Serialize;
use std::fmt::Display;

/// Why a directive was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    /// The directive content could not be decomposed into a field or tag set.
    MalformedDirective,
    /// A `@gotags` line without a usable `name=` marker, or one naming no field.
    UnresolvedTagTarget,
    /// A field or tag directive with no struct declaration to bind to.
    DroppedDirective,
    /// A field addition whose identity already exists in the struct.
    DuplicateField,
}

impl Display for SkipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SkipKind::MalformedDirective => "malformed directive",
            SkipKind::UnresolvedTagTarget => "unresolved tag target",
            SkipKind::DroppedDirective => "dropped directive",
            SkipKind::DuplicateField => "duplicate field",
        };
        f.write_str(label)
    }
}

/// A single skipped directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// The skip category.
    pub kind: SkipKind,
    /// 1-based source line of the directive.
    pub line: usize,
    /// Human readable context.
    pub detail: String,
}

impl Display for Skipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.kind, self.detail)
    }
}

impl Skipped {
    /// Appends a skip to `list` and logs it at debug level.
    pub fn record(list: &mut Vec<Skipped>, kind: SkipKind, line: usize, detail: impl Into<String>) {
        let skipped = Skipped {
            kind,
            line,
            detail: detail.into(),
        };
        tracing::debug!(%skipped, "directive skipped");
        list.push(skipped);
    }
}

/// Summary of one file's transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Import paths appended to the import section.
    pub imports_added: Vec<String>,
    /// Fields appended, as `Struct.Identity`.
    pub fields_added: Vec<String>,
    /// Fields whose tag literal changed, as `Struct.Field`.
    pub tags_merged: Vec<String>,
    /// Directives that were not applied.
    pub skipped: Vec<Skipped>,
}

impl Report {
    /// Records a skipped directive and logs it at debug level.
    pub fn skip(&mut self, kind: SkipKind, line: usize, detail: impl Into<String>) {
        Skipped::record(&mut self.skipped, kind, line, detail);
    }

    /// Number of skipped directives of the given kind.
    pub fn skipped_count(&self, kind: SkipKind) -> usize {
        self.skipped.iter().filter(|s| s.kind == kind).count()
    }

    /// Whether any change was applied.
    pub fn has_changes(&self) -> bool {
        !self.imports_added.is_empty()
            || !self.fields_added.is_empty()
            || !self.tags_merged.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_counts_by_kind() {
        let mut report = Report::default();
        report.skip(SkipKind::DroppedDirective, 3, "@gofield outside struct");
        report.skip(SkipKind::DuplicateField, 9, "User.Id");
        report.skip(SkipKind::DroppedDirective, 4, "@gotags outside struct");

        assert_eq!(report.skipped_count(SkipKind::DroppedDirective), 2);
        assert_eq!(report.skipped_count(SkipKind::MalformedDirective), 0);
        assert!(!report.has_changes());
    }

    #[test]
    fn test_record_appends_to_plain_list() {
        let mut list = Vec::new();
        Skipped::record(&mut list, SkipKind::UnresolvedTagTarget, 7, "no name= marker");
        assert_eq!(
            list,
            vec![Skipped {
                kind: SkipKind::UnresolvedTagTarget,
                line: 7,
                detail: "no name= marker".into(),
            }]
        );
    }

    #[test]
    fn test_skip_display() {
        let skipped = Skipped {
            kind: SkipKind::UnresolvedTagTarget,
            line: 12,
            detail: "no name= marker".into(),
        };
        assert_eq!(
            skipped.to_string(),
            "line 12: unresolved tag target (no name= marker)"
        );
    }

    #[test]
    fn test_serializes_snake_case_kinds() {
        let mut report = Report::default();
        report.skip(SkipKind::MalformedDirective, 1, "empty @gofield");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"kind\":\"malformed_directive\""));
    }
}
