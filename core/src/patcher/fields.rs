//! # Field Injection
//!
//! Turns `@gofield` directive text into fields appended to a struct, skipping
//! any whose identity the struct already has.

use crate::directives::DirectiveRegistry;
use crate::model::{is_field_declaration, Field, GoFile};
use crate::report::{Report, SkipKind};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// A parsed `@gofield` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// One token: an embedded type such as `gorm.Model`.
    Embedded {
        /// The embedded type.
        ty: String,
    },
    /// Two or more tokens: a name and a type. Further tokens are ignored.
    Named {
        /// The field name.
        name: String,
        /// The field type.
        ty: String,
    },
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").expect("Invalid regex"))
}

fn embedded_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\*?(?:[\p{L}_][\p{L}\p{Nd}_]*\.)?[\p{L}_][\p{L}\p{Nd}_]*(?:\[.+\])?$")
            .expect("Invalid regex")
    })
}

impl FieldSpec {
    /// Parses directive text by token count. Returns `None` when the text is
    /// empty, the tokens are not a valid name / embedded type, or the
    /// resulting field would not be valid Go.
    pub fn parse(text: &str) -> Option<Self> {
        Self::from_tokens(text).filter(|spec| is_field_declaration(&spec.to_string()))
    }

    fn from_tokens(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let first = tokens.next()?;
        match tokens.next() {
            None if embedded_re().is_match(first) => Some(FieldSpec::Embedded {
                ty: first.to_string(),
            }),
            None => None,
            Some(ty) if identifier_re().is_match(first) => Some(FieldSpec::Named {
                name: first.to_string(),
                ty: ty.to_string(),
            }),
            Some(_) => None,
        }
    }

    /// The identity used for duplicate detection.
    pub fn identity(&self) -> &str {
        match self {
            FieldSpec::Embedded { ty } => ty,
            FieldSpec::Named { name, .. } => name,
        }
    }

    /// Builds the model field, without a tag.
    pub fn to_field(&self) -> Field {
        match self {
            FieldSpec::Embedded { ty } => Field::embedded(ty),
            FieldSpec::Named { name, ty } => Field::named(name, ty),
        }
    }
}

impl std::fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldSpec::Embedded { ty } => f.write_str(ty),
            FieldSpec::Named { name, ty } => write!(f, "{} {}", name, ty),
        }
    }
}

/// Appends every registered field addition to its struct.
///
/// Additions keep their registration order and land after the existing
/// fields. An addition whose identity is already present is skipped.
pub fn inject_fields(file: &mut GoFile, registry: &DirectiveRegistry, report: &mut Report) {
    for decl in file.structs.iter_mut() {
        let Some(entry) = registry.declaration(&decl.name) else {
            continue;
        };

        let mut known: HashSet<String> = decl.fields.iter().flat_map(Field::identities).collect();

        for (text, line) in entry.field_additions() {
            let Some(spec) = FieldSpec::parse(text) else {
                report.skip(
                    SkipKind::MalformedDirective,
                    line,
                    format!("@gofield `{}` is not `Type` or `name Type`", text),
                );
                continue;
            };

            let identity = spec.identity();
            if !identity.is_empty() && known.contains(identity) {
                report.skip(
                    SkipKind::DuplicateField,
                    line,
                    format!("{}.{} already exists", decl.name, identity),
                );
                continue;
            }

            known.insert(identity.to_string());
            decl.push_field(spec.to_field());
            report.fields_added.push(format!("{}.{}", decl.name, identity));
        }
    }

    for (name, entry) in registry.declarations() {
        if file.find_struct(name).is_some() {
            continue;
        }
        for (text, line) in entry.field_additions() {
            report.skip(
                SkipKind::DroppedDirective,
                line,
                format!("@gofield `{}`: no struct `{}` in file", text, name),
            );
        }
    }
}
