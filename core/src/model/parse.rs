//! Builds a [`GoFile`] from source text using the `tree-sitter-go` grammar.

use crate::error::{AppError, AppResult};
use crate::model::{
    BodyLine, Field, FieldSpan, GoFile, ImportAnchor, ImportLine, ImportSection, StructBody,
    StructDecl,
};
use std::ops::Range;
use tree_sitter::{Node, Parser, Tree};

/// Parses Go source into a structural model.
///
/// Any syntax error fails the whole file; nothing is modelled from a partial tree.
pub fn parse_go(source: &str) -> AppResult<GoFile> {
    let tree = parse_tree(source)?;
    let root = tree.root_node();

    if let Some((row, column)) = first_error(root) {
        return Err(AppError::SourceParse(format!(
            "syntax error at line {}, column {}",
            row + 1,
            column + 1
        )));
    }

    let imports = read_imports(root, source);
    let structs = read_structs(root, source);

    Ok(GoFile {
        source: source.to_string(),
        imports,
        structs,
    })
}

/// Checks that `source` parses without syntax errors.
pub fn syntax_check(source: &str) -> AppResult<()> {
    let tree = parse_tree(source)?;
    match first_error(tree.root_node()) {
        Some((row, column)) => Err(AppError::SourceParse(format!(
            "syntax error at line {}, column {}",
            row + 1,
            column + 1
        ))),
        None => Ok(()),
    }
}

/// Whether `decl` parses as exactly one struct field declaration.
pub fn is_field_declaration(decl: &str) -> bool {
    let wrapped = format!("package p\n\ntype T struct {{\n\t{}\n}}\n", decl);
    let Ok(tree) = parse_tree(&wrapped) else {
        return false;
    };
    let root = tree.root_node();
    first_error(root).is_none()
        && read_structs(root, &wrapped)
            .first()
            .is_some_and(|s| s.fields.len() == 1)
}

fn parse_tree(source: &str) -> AppResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| AppError::SourceParse(format!("Go grammar unavailable: {}", e)))?;
    parser
        .parse(source, None)
        .ok_or_else(|| AppError::SourceParse("parser produced no syntax tree".into()))
}

/// Position of the first error or missing node, depth first.
fn first_error(node: Node) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return Some((pos.row, pos.column));
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Strips the quotes or backticks of a string literal.
fn unquote(literal: &str) -> String {
    let inner = literal
        .strip_prefix(['"', '`'])
        .and_then(|s| s.strip_suffix(['"', '`']))
        .unwrap_or(literal);
    inner.to_string()
}

/// Start of the line containing `offset`.
fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |pos| pos + 1)
}

/// End of the line containing `offset`, before its newline.
fn line_end(source: &str, offset: usize) -> usize {
    source[offset..].find('\n').map_or(source.len(), |pos| offset + pos)
}

/// Leading whitespace of the line containing `offset`.
fn line_indent(source: &str, offset: usize) -> String {
    let start = line_start(source, offset);
    source[start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

/// Groups sibling nodes by source row: a node joins the current group when it
/// starts on the row the group ends on.
fn group_by_row(nodes: Vec<Node>) -> Vec<Vec<Node>> {
    let mut groups: Vec<Vec<Node>> = Vec::new();
    for node in nodes {
        match groups.last_mut() {
            Some(group)
                if group
                    .last()
                    .is_some_and(|last| last.end_position().row == node.start_position().row) =>
            {
                group.push(node)
            }
            _ => groups.push(vec![node]),
        }
    }
    groups
}

fn group_rows(group: &[Node]) -> (usize, usize) {
    let start = group.first().map_or(0, |n| n.start_position().row);
    let end = group.last().map_or(start, |n| n.end_position().row);
    (start, end)
}

fn group_span(group: &[Node]) -> Range<usize> {
    let start = group.first().map_or(0, |n| n.start_byte());
    let end = group.last().map_or(start, |n| n.end_byte());
    start..end
}

fn spec_path(spec: Node, source: &str) -> Option<String> {
    spec.child_by_field_name("path")
        .map(|path| unquote(text(path, source)))
}

fn read_imports(root: Node, source: &str) -> ImportSection {
    let mut existing = Vec::new();
    let mut anchor = None;

    for decl in named_children(root)
        .into_iter()
        .filter(|n| n.kind() == "import_declaration")
    {
        for child in named_children(decl) {
            match child.kind() {
                "import_spec" => {
                    let path = spec_path(child, source);
                    if anchor.is_none() {
                        anchor = Some(ImportAnchor::Single {
                            decl: decl.byte_range(),
                            spec: text(child, source).to_string(),
                            path: path.clone().unwrap_or_default(),
                        });
                    }
                    existing.extend(path);
                }
                "import_spec_list" => {
                    let items = named_children(child);
                    existing.extend(
                        items
                            .iter()
                            .filter(|n| n.kind() == "import_spec")
                            .filter_map(|n| spec_path(*n, source)),
                    );
                    if anchor.is_none() {
                        anchor = Some(import_group(child, items, source));
                    }
                }
                _ => {}
            }
        }
    }

    let anchor = anchor.unwrap_or_else(|| ImportAnchor::Absent {
        insert_at: named_children(root)
            .into_iter()
            .find(|n| n.kind() == "package_clause")
            .map_or(0, |n| line_end(source, n.end_byte())),
    });

    ImportSection {
        existing,
        added: Vec::new(),
        anchor,
    }
}

fn import_group(list: Node, items: Vec<Node>, source: &str) -> ImportAnchor {
    let indent = items
        .first()
        .map_or_else(|| "\t".to_string(), |n| line_indent(source, n.start_byte()));

    let lines = group_by_row(items)
        .into_iter()
        .map(|group| {
            let (start_row, end_row) = group_rows(&group);
            let single_spec = start_row == end_row
                && group[0].kind() == "import_spec"
                && group[1..].iter().all(|n| n.kind() == "comment");
            ImportLine {
                start_row,
                end_row,
                span: group_span(&group),
                path: if single_spec {
                    spec_path(group[0], source)
                } else {
                    None
                },
            }
        })
        .collect();

    ImportAnchor::Group {
        open: list.start_byte() + 1,
        close: list.end_byte() - 1,
        indent,
        lines,
    }
}

fn read_structs(root: Node, source: &str) -> Vec<StructDecl> {
    named_children(root)
        .into_iter()
        .filter(|n| n.kind() == "type_declaration")
        .flat_map(named_children)
        .filter(|n| n.kind() == "type_spec")
        .filter_map(|spec| read_struct(spec, source))
        .collect()
}

fn read_struct(spec: Node, source: &str) -> Option<StructDecl> {
    let name = text(spec.child_by_field_name("name")?, source).to_string();
    let ty = spec.child_by_field_name("type")?;
    if ty.kind() != "struct_type" {
        return None;
    }
    let list = named_children(ty)
        .into_iter()
        .find(|n| n.kind() == "field_declaration_list")?;

    let header_indent = line_indent(source, spec.start_byte());
    let items: Vec<Node> = named_children(list)
        .into_iter()
        .filter(|n| matches!(n.kind(), "field_declaration" | "comment"))
        .collect();

    let mut fields = Vec::new();
    let mut lines = Vec::new();
    let mut indent = None;
    let mut prev_end_row = None;

    for group in group_by_row(items) {
        let (start_row, end_row) = group_rows(&group);
        if prev_end_row.is_some_and(|prev: usize| start_row > prev + 1) {
            lines.push(BodyLine::Blank);
        }
        prev_end_row = Some(end_row);

        let is_field_line = start_row == end_row
            && group[0].kind() == "field_declaration"
            && match group.len() {
                1 => true,
                2 => group[1].kind() == "comment",
                _ => false,
            };

        if is_field_line {
            if let Some(field) = read_field(group[0], source) {
                indent.get_or_insert_with(|| line_indent(source, group[0].start_byte()));
                lines.push(BodyLine::Field {
                    field: fields.len(),
                    comment: group.get(1).map(|c| text(*c, source).to_string()),
                });
                fields.push(field);
                continue;
            }
        }

        let mut held = Vec::new();
        for node in group.iter().filter(|n| n.kind() == "field_declaration") {
            if let Some(field) = read_field(*node, source) {
                held.push(fields.len());
                fields.push(field);
            }
        }
        let span = group_span(&group);
        lines.push(BodyLine::Verbatim {
            span: line_start(source, span.start)..span.end,
            fields: held,
        });
    }

    Some(StructDecl {
        name,
        fields,
        body: StructBody {
            keyword_end: ty.start_byte() + "struct".len(),
            open: list.start_byte() + 1,
            close: list.end_byte() - 1,
            indent: indent.unwrap_or_else(|| format!("{}\t", header_indent)),
            close_indent: header_indent,
            lines,
        },
        dirty: false,
    })
}

fn read_field(node: Node, source: &str) -> Option<Field> {
    let ty = node.child_by_field_name("type")?;
    let names: Vec<String> = {
        let mut cursor = node.walk();
        node.children_by_field_name("name", &mut cursor)
            .map(|n| text(n, source).to_string())
            .collect()
    };
    let ty_text = if names.is_empty() {
        source[node.start_byte()..ty.end_byte()]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    } else {
        text(ty, source).to_string()
    };
    let tag = node.child_by_field_name("tag");
    let tag_text = tag.map(|t| text(t, source).to_string());

    Some(Field {
        names,
        ty: ty_text,
        tag: tag_text.clone(),
        span: Some(FieldSpan {
            tag: tag.map(|t| t.byte_range()),
            type_end: ty.end_byte(),
            original_tag: tag_text,
        }),
    })
}
