#![deny(missing_docs)]

//! # Structural Model
//!
//! An owned view of the parts of a Go file the patchers touch: the import
//! section and every top-level struct declaration. Each element remembers the
//! byte span it came from so that the emitter can rewrite only what changed.
//!
//! - **parse**: Builds the model with the `tree-sitter-go` grammar.
//! - **emit**: Turns the mutated model back into source text.
//! - **layout**: gofmt-style column alignment for re-rendered field lines.

use std::ops::Range;

/// Rendering of the mutated model.
pub mod emit;

/// Column alignment of field lines.
pub mod layout;

/// Construction of the model from source.
pub mod parse;

pub use emit::emit;
pub use parse::{is_field_declaration, parse_go, syntax_check};

/// A parsed Go source file.
#[derive(Debug, Clone)]
pub struct GoFile {
    pub(crate) source: String,
    /// The file's imports.
    pub imports: ImportSection,
    /// Top-level struct declarations, in source order.
    pub structs: Vec<StructDecl>,
}

impl GoFile {
    /// Parses Go source into a model.
    pub fn parse(source: &str) -> crate::error::AppResult<Self> {
        parse_go(source)
    }

    /// The text the model was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Finds a struct declaration by name.
    pub fn find_struct(&self, name: &str) -> Option<&StructDecl> {
        self.structs.iter().find(|s| s.name == name)
    }
}

/// Every import path in the file plus the place new imports go.
#[derive(Debug, Clone)]
pub struct ImportSection {
    /// Paths of all existing import specs, across every import declaration.
    pub existing: Vec<String>,
    /// Paths appended during this run.
    pub added: Vec<String>,
    pub(crate) anchor: ImportAnchor,
}

impl ImportSection {
    /// Whether `path` is imported already or was added in this run.
    pub fn contains(&self, path: &str) -> bool {
        self.existing.iter().chain(&self.added).any(|p| p == path)
    }
}

/// Where new import specs are written.
#[derive(Debug, Clone)]
pub(crate) enum ImportAnchor {
    /// First import declaration is parenthesized.
    Group {
        /// Byte offset right after `(`.
        open: usize,
        /// Byte offset of `)`.
        close: usize,
        /// Indentation of the spec lines.
        indent: String,
        /// Lines inside the parentheses.
        lines: Vec<ImportLine>,
    },
    /// First import declaration is a single `import "x"`.
    Single {
        /// Span of the whole declaration.
        decl: Range<usize>,
        /// Source text of the spec.
        spec: String,
        /// Its path.
        path: String,
    },
    /// No import declaration; insert after the package clause.
    Absent {
        /// End of the package clause's line, before the newline.
        insert_at: usize,
    },
}

/// One source row inside a parenthesized import declaration.
#[derive(Debug, Clone)]
pub(crate) struct ImportLine {
    pub(crate) start_row: usize,
    pub(crate) end_row: usize,
    /// From the first node on the row to the end of the last one.
    pub(crate) span: Range<usize>,
    /// Set when the row is a single import spec (optionally with a trailing comment).
    pub(crate) path: Option<String>,
}

/// A struct declaration and its field list.
#[derive(Debug, Clone)]
pub struct StructDecl {
    /// Declared type name.
    pub name: String,
    /// Fields in declaration order, injected ones last.
    pub fields: Vec<Field>,
    pub(crate) body: StructBody,
    pub(crate) dirty: bool,
}

impl StructDecl {
    /// Appends a field and gives it its own line at the end of the body.
    pub fn push_field(&mut self, field: Field) {
        self.body.lines.push(BodyLine::Field {
            field: self.fields.len(),
            comment: None,
        });
        self.fields.push(field);
        self.dirty = true;
    }

    /// Replaces the tag literal of a field. Returns whether it changed.
    pub fn set_tag(&mut self, index: usize, tag: String) -> bool {
        let Some(field) = self.fields.get_mut(index) else {
            return false;
        };
        if field.tag.as_deref() == Some(tag.as_str()) {
            return false;
        }
        field.tag = Some(tag);
        self.dirty = true;
        true
    }

    /// Whether the declaration was changed and needs to be re-rendered.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// A single field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Declared names; empty for an embedded field.
    pub names: Vec<String>,
    /// Type text. For embedded fields this includes a leading `*`.
    pub ty: String,
    /// Raw tag literal including its quotes or backticks.
    pub tag: Option<String>,
    pub(crate) span: Option<FieldSpan>,
}

impl Field {
    /// A new named field without a tag.
    pub fn named(name: &str, ty: &str) -> Self {
        Self {
            names: vec![name.to_string()],
            ty: ty.to_string(),
            tag: None,
            span: None,
        }
    }

    /// A new embedded field without a tag.
    pub fn embedded(ty: &str) -> Self {
        Self {
            names: Vec::new(),
            ty: ty.to_string(),
            tag: None,
            span: None,
        }
    }

    /// Whether this is an embedded (anonymous) field.
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }

    /// Identities used for duplicate detection: the names, or the embedded type.
    pub fn identities(&self) -> Vec<String> {
        if self.is_embedded() {
            vec![self.ty.clone()]
        } else {
            self.names.clone()
        }
    }

    /// Names a tag directive can address: the declared names, or for an
    /// embedded field its implicit name (the unqualified type name).
    pub fn addressable_names(&self) -> Vec<&str> {
        if self.is_embedded() {
            let bare = self.ty.trim_start_matches('*');
            let bare = bare.split('[').next().unwrap_or(bare);
            vec![bare.rsplit('.').next().unwrap_or(bare)]
        } else {
            self.names.iter().map(String::as_str).collect()
        }
    }
}

/// Where an existing field's tag sits in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldSpan {
    /// Span of the tag literal, if the field had one.
    pub(crate) tag: Option<Range<usize>>,
    /// End of the type; a new tag is inserted here.
    pub(crate) type_end: usize,
    /// The tag literal as parsed.
    pub(crate) original_tag: Option<String>,
}

/// Layout of a struct's `{ ... }` body.
#[derive(Debug, Clone)]
pub(crate) struct StructBody {
    /// Byte offset right after the `struct` keyword.
    pub(crate) keyword_end: usize,
    /// Byte offset right after `{`.
    pub(crate) open: usize,
    /// Byte offset of `}`.
    pub(crate) close: usize,
    /// Indentation of field lines.
    pub(crate) indent: String,
    /// Indentation of the closing brace.
    pub(crate) close_indent: String,
    pub(crate) lines: Vec<BodyLine>,
}

/// One logical line of a struct body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BodyLine {
    /// An empty separator line.
    Blank,
    /// A field on its own line, optionally followed by a comment.
    Field {
        field: usize,
        comment: Option<String>,
    },
    /// Anything else, copied from the source; may hold fields.
    Verbatim {
        span: Range<usize>,
        fields: Vec<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_identities() {
        assert_eq!(Field::named("Id", "string").identities(), vec!["Id"]);
        assert_eq!(Field::embedded("gorm.Model").identities(), vec!["gorm.Model"]);
    }

    #[test]
    fn test_addressable_names() {
        assert_eq!(Field::embedded("*gorm.Model").addressable_names(), vec!["Model"]);
        assert_eq!(Field::embedded("Base[int]").addressable_names(), vec!["Base"]);
        let mut pair = Field::named("A", "int");
        pair.names.push("B".into());
        assert_eq!(pair.addressable_names(), vec!["A", "B"]);
    }
}
