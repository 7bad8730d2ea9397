#![deny(missing_docs)]

//! # Code Patching
//!
//! The three injection passes that apply a [`DirectiveRegistry`] to a
//! [`GoFile`](crate::model::GoFile). Each pass reads the registry only and
//! records what it did in a [`Report`](crate::report::Report).
//!
//! - **imports**: Appends requested import paths.
//! - **fields**: Appends requested struct fields.
//! - **tags**: Merges requested tag keys into existing field tags.
//!
//! [`DirectiveRegistry`]: crate::directives::DirectiveRegistry

/// Import injection.
pub mod imports;

/// Field injection.
pub mod fields;

/// Struct tag merging.
pub mod tags;

pub use fields::{inject_fields, FieldSpec};
pub use imports::inject_imports;
pub use tags::{merge_tags, TagSet};
