#![deny(missing_docs)]

//! # Directives
//!
//! Line-oriented extraction of `@goimport`, `@gofield` and `@gotags` directives
//! from raw Go source, and the registry they are accumulated into.
//!
//! - **matchers**: One small function per recognised pattern.
//! - **scanner**: The scan loop that tracks the current struct declaration.
//! - **registry**: The per-declaration accumulator handed to the patchers.

/// Individual line pattern matchers.
pub mod matchers;

/// Per-file directive accumulator.
pub mod registry;

/// The line scanner.
pub mod scanner;

pub use matchers::{parse_directives, Directive, DirectiveKind};
pub use registry::{normalize_field_name, DeclarationEntry, DirectiveRegistry, TagUpdate};
pub use scanner::{scan, scan_line, ScanContext, ScanOutcome};
