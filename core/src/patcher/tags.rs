//! # Tag Merging
//!
//! Parses Go struct tags into key/value sets, merges directive tags over the
//! existing ones, and writes them back with keys in alphabetical order.

use crate::directives::{normalize_field_name, DirectiveRegistry};
use crate::model::GoFile;
use crate::report::{Report, SkipKind};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Key/value pairs of a struct tag, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeMap<String, String>);

fn pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s:"`]+):"((?:[^"\\]|\\.)*)""#).expect("Invalid regex")
    })
}

impl TagSet {
    /// Parses the contents of a tag, e.g. `json:"id" gorm:"primaryKey"`.
    ///
    /// Surrounding backticks are ignored. Text that holds no `key:"value"`
    /// pair yields an empty set.
    pub fn parse(text: &str) -> Self {
        let text = text.trim().trim_matches('`');
        Self(
            pair_re()
                .captures_iter(text)
                .map(|caps| (caps[1].to_string(), caps[2].to_string()))
                .collect(),
        )
    }

    /// Parses a Go tag literal, either a raw `` `...` `` or an interpreted `"..."` string.
    pub fn from_literal(literal: &str) -> Self {
        match literal
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
        {
            Some(inner) => Self::parse(&unescape(inner)),
            None => Self::parse(literal),
        }
    }

    /// Whether the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Union of both sets; keys in `newer` override keys in `self`.
    pub fn merge(mut self, newer: TagSet) -> Self {
        self.0.extend(newer.0);
        self
    }

    /// Renders the set as a Go tag literal.
    ///
    /// Backticks are used unless a value contains one, in which case an
    /// interpreted string literal is produced instead.
    pub fn to_literal(&self) -> String {
        let body = self
            .0
            .iter()
            .map(|(key, value)| format!("{}:\"{}\"", key, value))
            .collect::<Vec<_>>()
            .join(" ");
        if body.contains('`') {
            format!("\"{}\"", escape(&body))
        } else {
            format!("`{}`", body)
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Merges every registered tag update into the matching struct field.
///
/// Fields are matched on their normalized name, so `name=user_id` addresses
/// a field declared as `UserId`.
pub fn merge_tags(file: &mut GoFile, registry: &DirectiveRegistry, report: &mut Report) {
    for decl in file.structs.iter_mut() {
        let Some(entry) = registry.declaration(&decl.name) else {
            continue;
        };
        let mut resolved: HashSet<String> = HashSet::new();

        for index in 0..decl.fields.len() {
            let target = decl.fields[index]
                .addressable_names()
                .into_iter()
                .map(normalize_field_name)
                .find_map(|key| entry.tag_update(&key).map(|update| (key, update)));
            let Some((key, update)) = target else {
                continue;
            };
            resolved.insert(key);

            let incoming = TagSet::parse(&update.text);
            if incoming.is_empty() {
                report.skip(
                    SkipKind::MalformedDirective,
                    update.line,
                    format!("@gotags `{}` holds no key:\"value\" pair", update.text),
                );
                continue;
            }

            let current = decl.fields[index]
                .tag
                .as_deref()
                .map(TagSet::from_literal)
                .unwrap_or_default();
            let merged = current.merge(incoming).to_literal();

            if decl.set_tag(index, merged) {
                let label = decl.fields[index]
                    .addressable_names()
                    .first()
                    .map(|n| n.to_string())
                    .unwrap_or_default();
                report.tags_merged.push(format!("{}.{}", decl.name, label));
            }
        }

        for (key, update) in entry.tag_updates() {
            if !resolved.contains(key) {
                report.skip(
                    SkipKind::UnresolvedTagTarget,
                    update.line,
                    format!("no field `{}` in struct `{}`", key, decl.name),
                );
            }
        }
    }

    for (name, entry) in registry.declarations() {
        if file.find_struct(name).is_some() {
            continue;
        }
        for (key, update) in entry.tag_updates() {
            report.skip(
                SkipKind::UnresolvedTagTarget,
                update.line,
                format!("no struct `{}` for field `{}`", name, key),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_pairs() {
        let tags = TagSet::parse(r#"`protobuf:"bytes,1,opt,name=id,proto3" json:"id,omitempty"`"#);
        assert_eq!(tags.get("protobuf"), Some("bytes,1,opt,name=id,proto3"));
        assert_eq!(tags.get("json"), Some("id,omitempty"));
        assert!(TagSet::parse("not a tag").is_empty());
        assert!(TagSet::parse("").is_empty());
    }

    #[test]
    fn test_override_law() {
        let old: TagSet = [("a", "1"), ("b", "2")].into_iter().collect();
        let new: TagSet = [("b", "3"), ("c", "4")].into_iter().collect();
        let expected: TagSet = [("a", "1"), ("b", "3"), ("c", "4")].into_iter().collect();
        assert_eq!(old.merge(new), expected);
    }

    #[test]
    fn test_literal_is_sorted() {
        let tags = TagSet::parse(r#"json:"id" gorm:"column:id" bson:"_id""#);
        assert_eq!(tags.to_literal(), r#"`bson:"_id" gorm:"column:id" json:"id"`"#);
    }

    #[test]
    fn test_interpreted_literal_round_trip() {
        let tags = TagSet::from_literal(r#""json:\"id\" xml:\"id\"""#);
        assert_eq!(tags.get("json"), Some("id"));
        assert_eq!(tags.get("xml"), Some("id"));

        let odd: TagSet = [("doc", "use `x`")].into_iter().collect();
        assert_eq!(odd.to_literal(), r#""doc:\"use `x`\"""#);
    }

    #[test]
    fn test_merge_tags_on_normalized_name() {
        let source = "package a\n\ntype User struct {\n\tUserId string `json:\"user_id\"`\n\tName   string\n}\n";
        let mut file = GoFile::parse(source).unwrap();
        let mut registry = DirectiveRegistry::default();
        registry.add_tag_update("User", "userid", r#"gorm:"index""#, 4);
        registry.add_tag_update("User", "name", r#"gorm:"size:64""#, 5);
        registry.add_tag_update("User", "ghost", r#"gorm:"-""#, 6);

        let mut report = Report::default();
        merge_tags(&mut file, &registry, &mut report);

        let user = file.find_struct("User").unwrap();
        assert_eq!(
            user.fields[0].tag.as_deref(),
            Some(r#"`gorm:"index" json:"user_id"`"#)
        );
        assert_eq!(user.fields[1].tag.as_deref(), Some(r#"`gorm:"size:64"`"#));
        assert_eq!(report.tags_merged, vec!["User.UserId", "User.Name"]);
        assert_eq!(report.skipped_count(SkipKind::UnresolvedTagTarget), 1);
    }

    #[test]
    fn test_merge_is_stable_when_already_applied() {
        let source = "package a\n\ntype User struct {\n\tId string `gorm:\"primaryKey\" json:\"id\"`\n}\n";
        let mut file = GoFile::parse(source).unwrap();
        let mut registry = DirectiveRegistry::default();
        registry.add_tag_update("User", "id", r#"gorm:"primaryKey""#, 4);

        let mut report = Report::default();
        merge_tags(&mut file, &registry, &mut report);

        assert!(!file.find_struct("User").unwrap().is_dirty());
        assert!(report.tags_merged.is_empty());
    }

    #[test]
    fn test_empty_directive_tags_are_malformed() {
        let source = "package a\n\ntype User struct {\n\tId string\n}\n";
        let mut file = GoFile::parse(source).unwrap();
        let mut registry = DirectiveRegistry::default();
        registry.add_tag_update("User", "id", "primaryKey", 4);

        let mut report = Report::default();
        merge_tags(&mut file, &registry, &mut report);

        assert_eq!(report.skipped_count(SkipKind::MalformedDirective), 1);
        assert!(file.find_struct("User").unwrap().fields[0].tag.is_none());
    }
}
