//! # Directive Registry
//!
//! Accumulates the directives of one file, keyed by struct declaration.
//! Insertion order is preserved everywhere output order depends on it.

use indexmap::IndexMap;

/// A pending tag update for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUpdate {
    /// The raw tag text from the directive.
    pub text: String,
    /// 1-based line the directive was registered from.
    pub line: usize,
}

/// Pending changes for a single struct declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationEntry {
    /// Field spec text -> first line it was seen on.
    field_additions: IndexMap<String, usize>,
    /// Normalized field name -> tag update.
    tag_updates: IndexMap<String, TagUpdate>,
}

impl DeclarationEntry {
    /// Field additions in registration order, with their source line.
    pub fn field_additions(&self) -> impl Iterator<Item = (&str, usize)> {
        self.field_additions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Tag updates keyed by normalized field name.
    pub fn tag_updates(&self) -> impl Iterator<Item = (&str, &TagUpdate)> {
        self.tag_updates.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up the tag update registered for a normalized field name.
    pub fn tag_update(&self, normalized: &str) -> Option<&TagUpdate> {
        self.tag_updates.get(normalized)
    }
}

/// All directives of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveRegistry {
    imports: IndexMap<String, usize>,
    declarations: IndexMap<String, DeclarationEntry>,
}

impl DirectiveRegistry {
    /// Registers a file-scoped import path. Repeats are ignored.
    pub fn add_import(&mut self, path: &str, line: usize) {
        self.imports.entry(path.to_string()).or_insert(line);
    }

    /// Registers a field addition; identical text for the same struct collapses to one.
    pub fn add_field_addition(&mut self, decl: &str, spec: &str, line: usize) {
        self.entry(decl)
            .field_additions
            .entry(spec.to_string())
            .or_insert(line);
    }

    /// Registers a tag update. The last update for a field wins.
    pub fn add_tag_update(&mut self, decl: &str, normalized: &str, text: &str, line: usize) {
        self.entry(decl).tag_updates.insert(
            normalized.to_string(),
            TagUpdate {
                text: text.to_string(),
                line,
            },
        );
    }

    fn entry(&mut self, decl: &str) -> &mut DeclarationEntry {
        self.declarations.entry(decl.to_string()).or_default()
    }

    /// Import paths in registration order, with their source line.
    pub fn imports(&self) -> impl Iterator<Item = (&str, usize)> {
        self.imports.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Pending changes for a struct, if any were registered.
    pub fn declaration(&self, name: &str) -> Option<&DeclarationEntry> {
        self.declarations.get(name)
    }

    /// All declarations with pending changes, in first-seen order.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &DeclarationEntry)> {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether nothing was registered at all.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.declarations.is_empty()
    }
}

/// Lower-cases an identifier and drops `_` separators.
///
/// `user_id`, `UserId` and `USER_ID` all normalize to `userid`.
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_field_name() {
        assert_eq!(normalize_field_name("user_id"), "userid");
        assert_eq!(normalize_field_name("UserId"), "userid");
        assert_eq!(normalize_field_name("USER_ID"), "userid");
        assert_eq!(normalize_field_name("Id"), "id");
    }

    #[test]
    fn test_imports_dedup_keeps_first_line() {
        let mut registry = DirectiveRegistry::default();
        registry.add_import("gorm.io/gorm", 3);
        registry.add_import("time", 4);
        registry.add_import("gorm.io/gorm", 20);

        let imports: Vec<_> = registry.imports().collect();
        assert_eq!(imports, vec![("gorm.io/gorm", 3), ("time", 4)]);
    }

    #[test]
    fn test_field_additions_dedup_by_literal_text() {
        let mut registry = DirectiveRegistry::default();
        registry.add_field_addition("User", "gorm.Model", 5);
        registry.add_field_addition("User", "LastName string", 6);
        registry.add_field_addition("User", "gorm.Model", 7);
        registry.add_field_addition("User", "LastName  string", 8);

        let entry = registry.declaration("User").unwrap();
        let fields: Vec<_> = entry.field_additions().map(|(s, _)| s).collect();
        assert_eq!(fields, vec!["gorm.Model", "LastName string", "LastName  string"]);
    }

    #[test]
    fn test_tag_update_last_wins() {
        let mut registry = DirectiveRegistry::default();
        registry.add_tag_update("User", "id", r#"gorm:"column:id""#, 10);
        registry.add_tag_update("User", "id", r#"gorm:"primaryKey""#, 11);

        let entry = registry.declaration("User").unwrap();
        let update = entry.tag_update("id").unwrap();
        assert_eq!(update.text, r#"gorm:"primaryKey""#);
        assert_eq!(update.line, 11);
        assert_eq!(entry.tag_updates().count(), 1);
    }

    #[test]
    fn test_declarations_are_separate() {
        let mut registry = DirectiveRegistry::default();
        registry.add_field_addition("User", "gorm.Model", 1);
        registry.add_field_addition("Post", "gorm.Model", 2);

        assert!(registry.declaration("Missing").is_none());
        let names: Vec<_> = registry.declarations().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["User", "Post"]);
        assert!(!registry.is_empty());
    }
}
