//! # Line Matchers
//!
//! Each recognised pattern has its own matcher returning an optional capture,
//! so every rule can be exercised on a single line in isolation.

use regex::Regex;
use std::sync::OnceLock;

/// Marker that introduces a tag directive.
const TAGS_MARKER: &str = "@gotags:";

/// The three kinds of directive an author can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `@goimport: "<path>"`
    Import,
    /// `@gofield: <Type>` or `@gofield: <name> <Type>`
    FieldAdd,
    /// `@gotags: <key>:"<value>" ...`
    TagSet,
}

/// A directive found on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Which directive was matched.
    pub kind: DirectiveKind,
    /// The captured content (import path, field spec, or tag text).
    pub content: String,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\btype\s+(\w+)\s*(?:\[[^\]]*\])?\s+struct\b").expect("Invalid regex")
    })
}

fn group_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*type\s*\(").expect("Invalid regex"))
}

fn group_member_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\w+)\s*(?:\[[^\]]*\])?\s+struct\b").expect("Invalid regex")
    })
}

fn import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"@goimport:\s*"([^"]+)""#).expect("Invalid regex"))
}

fn field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@gofield:\s*(.+)").expect("Invalid regex"))
}

fn tags_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@gotags:\s*(.+)").expect("Invalid regex"))
}

fn name_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bname=(\w+)").expect("Invalid regex"))
}

fn proto_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"protobuf:"[^"]*\bname=(\w+)"#).expect("Invalid regex"))
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Returns the struct name if the line holds a `type <Name> struct` header.
pub fn declaration_header(line: &str) -> Option<&str> {
    capture(header_re(), line)
}

/// Whether the line opens a grouped `type ( ... )` declaration.
pub fn type_group_open(line: &str) -> bool {
    group_open_re().is_match(line)
}

/// Returns the struct name of a `<Name> struct` spec written inside a
/// `type ( ... )` group. Only meaningful at the group's top level, where the
/// same text cannot be a field with an anonymous struct type.
pub fn group_member_header(line: &str) -> Option<&str> {
    capture(group_member_re(), line)
}

/// Net change in brace depth over the code part of a line.
///
/// Braces inside string, raw string and rune literals and after `//` are not
/// counted.
pub fn brace_delta(line: &str) -> isize {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('`'), '`') => quote = None,
            (Some('`'), _) => {}
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '`' | '\'') => quote = Some(c),
            (None, '/') if chars.peek() == Some(&'/') => break,
            (None, '{') => delta += 1,
            (None, '}') => delta -= 1,
            (None, _) => {}
        }
    }
    delta
}

/// Returns the quoted path of an `@goimport` directive.
pub fn import_path(line: &str) -> Option<&str> {
    capture(import_re(), line)
}

/// Returns the content of an `@gofield` directive, without trailing whitespace.
pub fn field_content(line: &str) -> Option<&str> {
    capture(field_re(), line).map(str::trim_end)
}

/// Returns the tag text of an `@gotags` directive, trimmed.
pub fn tag_content(line: &str) -> Option<&str> {
    capture(tags_re(), line).map(str::trim)
}

/// Returns the identifier of the first `name=<ident>` marker in `text`.
pub fn name_marker(text: &str) -> Option<&str> {
    capture(name_marker_re(), text)
}

/// Locates the field a tag directive on `line` targets.
///
/// Generated fields carry their wire metadata before the trailing comment, so
/// the part of the line preceding `@gotags:` is searched first, preferring the
/// `protobuf:"..."` tag over markers inside other, possibly merged, tags.
pub fn tag_target(line: &str) -> Option<&str> {
    let prefix = line.find(TAGS_MARKER).map_or(line, |pos| &line[..pos]);
    capture(proto_name_re(), prefix)
        .or_else(|| name_marker(prefix))
        .or_else(|| name_marker(line))
}

/// Extracts every directive present on a line.
///
/// Declaration headers are not directives; see [`declaration_header`].
pub fn parse_directives(line: &str) -> Vec<Directive> {
    let mut directives = Vec::new();

    if let Some(path) = import_path(line) {
        directives.push(Directive {
            kind: DirectiveKind::Import,
            content: path.to_string(),
        });
    }
    if let Some(content) = field_content(line) {
        directives.push(Directive {
            kind: DirectiveKind::FieldAdd,
            content: content.to_string(),
        });
    }
    if let Some(content) = tag_content(line) {
        directives.push(Directive {
            kind: DirectiveKind::TagSet,
            content: content.to_string(),
        });
    }

    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_header() {
        assert_eq!(declaration_header("type User struct {"), Some("User"));
        assert_eq!(declaration_header("type  Pair[K comparable, V any] struct {"), Some("Pair"));
        assert_eq!(declaration_header("type UserId string"), None);
        assert_eq!(declaration_header("\tInner struct {"), None);
    }

    #[test]
    fn test_group_headers() {
        assert!(type_group_open("type ("));
        assert!(type_group_open("type(\t// models"));
        assert!(!type_group_open("type A struct {"));
        assert_eq!(group_member_header("\tB struct {"), Some("B"));
        assert_eq!(group_member_header("\tPair[K comparable] struct{}"), Some("Pair"));
        assert_eq!(group_member_header("\tAlias = User"), None);
    }

    #[test]
    fn test_brace_delta() {
        assert_eq!(brace_delta("\tB struct {"), 1);
        assert_eq!(brace_delta("\tB struct{}"), 0);
        assert_eq!(brace_delta("}"), -1);
        assert_eq!(brace_delta("\tX string `json:\"{\"` // {"), 0);
        assert_eq!(brace_delta("\tR rune = '{' + \"}\\\"\""), 0);
    }

    #[test]
    fn test_import_path() {
        assert_eq!(import_path(r#"// @goimport: "gorm.io/gorm""#), Some("gorm.io/gorm"));
        assert_eq!(import_path(r#"// @goimport:"time""#), Some("time"));
        assert_eq!(import_path("// @goimport: gorm.io/gorm"), None);
    }

    #[test]
    fn test_field_content() {
        assert_eq!(field_content("\t// @gofield: gorm.Model"), Some("gorm.Model"));
        assert_eq!(
            field_content("// @gofield: LastName string  \r"),
            Some("LastName string")
        );
        assert_eq!(field_content("// gofield: LastName string"), None);
    }

    #[test]
    fn test_tag_target_prefers_generated_metadata() {
        let line = r#"	Id string `protobuf:"bytes,1,opt,name=user_id,json=userId,proto3"` // @gotags: gorm:"index:name=idx_user""#;
        assert_eq!(tag_target(line), Some("user_id"));
        assert_eq!(tag_content(line), Some(r#"gorm:"index:name=idx_user""#));
    }

    #[test]
    fn test_tag_target_prefers_protobuf_tag() {
        let line = r#"	Id string `gorm:"index:name=idx_id" protobuf:"bytes,1,opt,name=id,proto3"` // @gotags: gorm:"index:name=idx_id""#;
        assert_eq!(tag_target(line), Some("id"));
    }

    #[test]
    fn test_name_marker_ignores_json_name() {
        assert_eq!(name_marker("json_name=userId"), None);
        assert_eq!(name_marker("opt,name=email,proto3"), Some("email"));
    }

    #[test]
    fn test_parse_directives_multiple_on_one_line() {
        let line = r#"// @goimport: "time" @gofield: CreatedAt time.Time"#;
        let found = parse_directives(line);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, DirectiveKind::Import);
        assert_eq!(found[0].content, "time");
        assert_eq!(found[1].kind, DirectiveKind::FieldAdd);
        assert_eq!(found[1].content, "CreatedAt time.Time");
    }

    #[test]
    fn test_parse_directives_plain_line() {
        assert!(parse_directives("\tName string").is_empty());
    }
}
