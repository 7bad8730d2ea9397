#![deny(missing_docs)]

//! # Inject Core
//!
//! Reapplies hand-written customizations to generated Go sources. Authors put
//! directives in comments that survive regeneration:
//!
//! ```text
//! // @goimport: "gorm.io/gorm"
//! // @gofield: gorm.Model
//! // @gofield: LastName string
//! // @gotags: gorm:"column:id;primaryKey"
//! ```
//!
//! and [`transform`] injects the imports, fields and merged tags into the
//! matching struct declarations, deterministically and idempotently.

/// Shared error types.
pub mod error;

/// Directive scanning and the registry.
pub mod directives;

/// The structural model of a Go file.
pub mod model;

/// Injection passes.
pub mod patcher;

/// The single-file pipeline.
pub mod pipeline;

/// Applied and skipped directive bookkeeping.
pub mod report;

pub use directives::{scan, DirectiveRegistry, ScanOutcome};
pub use error::{AppError, AppResult};
pub use model::{emit, Field, GoFile, StructDecl};
pub use patcher::{inject_fields, inject_imports, merge_tags, FieldSpec, TagSet};
pub use pipeline::{transform, transform_str, Transformation};
pub use report::{Report, SkipKind, Skipped};
