//! Renders a mutated [`GoFile`] back to source text.
//!
//! Only regions that changed are rewritten: the import declaration new paths
//! went into, and the bodies of structs marked dirty. Everything else is
//! copied byte for byte.

use crate::error::{AppError, AppResult};
use crate::model::layout::align;
use crate::model::parse::syntax_check;
use crate::model::{BodyLine, Field, GoFile, ImportAnchor, ImportLine, ImportSection, StructDecl};
use std::ops::Range;

/// A replacement of a byte range of the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    range: Range<usize>,
    text: String,
}

/// Emits the model as source text.
///
/// The result is re-parsed; text that no longer parses is an
/// [`AppError::OutputSerialize`].
pub fn emit(file: &GoFile) -> AppResult<String> {
    let mut edits = Vec::new();
    edits.extend(import_edit(&file.imports, &file.source));
    edits.extend(
        file.structs
            .iter()
            .filter(|decl| decl.dirty)
            .map(|decl| body_edit(decl, &file.source)),
    );

    if edits.is_empty() {
        return Ok(file.source.clone());
    }

    let output = apply_edits(&file.source, edits)?;
    syntax_check(&output).map_err(|e| AppError::OutputSerialize(e.to_string()))?;
    Ok(output)
}

fn apply_edits(source: &str, mut edits: Vec<Edit>) -> AppResult<String> {
    edits.sort_by_key(|e| (e.range.start, e.range.end));
    for pair in edits.windows(2) {
        if pair[0].range.end > pair[1].range.start {
            return Err(AppError::OutputSerialize(format!(
                "overlapping edits at bytes {:?} and {:?}",
                pair[0].range, pair[1].range
            )));
        }
    }

    let mut output = source.to_string();
    for edit in edits.into_iter().rev() {
        output.replace_range(edit.range, &edit.text);
    }
    Ok(output)
}

fn quoted(path: &str) -> String {
    format!("\"{}\"", path)
}

/// Sorts `(path, spec text)` entries by path and renders one per line.
fn sorted_specs(mut entries: Vec<(String, String)>, indent: &str) -> String {
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .map(|(_, text)| format!("{}{}", indent, text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn import_edit(section: &ImportSection, source: &str) -> Option<Edit> {
    if section.added.is_empty() {
        return None;
    }
    let added: Vec<(String, String)> = section
        .added
        .iter()
        .map(|p| (p.clone(), quoted(p)))
        .collect();

    let edit = match &section.anchor {
        ImportAnchor::Group {
            open,
            close,
            indent,
            lines,
        } => group_edit(*open, *close, indent, lines, added, source),
        ImportAnchor::Single { decl, spec, path } => {
            let mut entries = vec![(path.clone(), spec.clone())];
            entries.extend(added);
            Edit {
                range: decl.clone(),
                text: format!("import (\n{}\n)", sorted_specs(entries, "\t")),
            }
        }
        ImportAnchor::Absent { insert_at } => {
            let block = format!("import (\n{}\n)", sorted_specs(added, "\t"));
            let text = if *insert_at == 0 {
                format!("{}\n\n", block)
            } else {
                format!("\n\n{}", block)
            };
            Edit {
                range: *insert_at..*insert_at,
                text,
            }
        }
    };
    Some(edit)
}

/// Adds specs to the last blank-line separated run of a parenthesized import.
fn group_edit(
    open: usize,
    close: usize,
    indent: &str,
    lines: &[ImportLine],
    added: Vec<(String, String)>,
    source: &str,
) -> Edit {
    let run_start = lines
        .windows(2)
        .rposition(|pair| pair[1].start_row > pair[0].end_row + 1)
        .map_or(0, |i| i + 1);
    let run = &lines[run_start..];

    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return Edit {
            range: open..close,
            text: format!("\n{}\n", sorted_specs(added, indent)),
        };
    };

    if run.iter().all(|line| line.path.is_some()) {
        let mut entries: Vec<(String, String)> = run
            .iter()
            .map(|line| {
                (
                    line.path.clone().unwrap_or_default(),
                    source[line.span.clone()].to_string(),
                )
            })
            .collect();
        entries.extend(added);
        let text = sorted_specs(entries, indent);
        Edit {
            range: first.span.start..last.span.end,
            text: text.strip_prefix(indent).unwrap_or(&text).to_string(),
        }
    } else {
        let end = last.span.end;
        Edit {
            range: end..end,
            text: added
                .iter()
                .map(|(_, text)| format!("\n{}{}", indent, text))
                .collect(),
        }
    }
}

/// Cells of a field line, laid out like go/printer does.
fn field_cells(field: &Field, comment: Option<&str>) -> Vec<String> {
    let mut cells = Vec::new();
    if !field.is_embedded() {
        cells.push(field.names.join(", "));
    }
    cells.push(field.ty.clone());

    match (&field.tag, comment) {
        (Some(tag), Some(comment)) => {
            cells.push(tag.clone());
            cells.push(comment.to_string());
        }
        (Some(tag), None) => cells.push(tag.clone()),
        (None, Some(comment)) => {
            let fill = if field.is_embedded() { 2 } else { 1 };
            cells.extend(std::iter::repeat(String::new()).take(fill));
            cells.push(comment.to_string());
        }
        (None, None) => {}
    }
    cells
}

fn flush_section(section: &mut Vec<Vec<String>>, out: &mut Vec<String>, indent: &str, single: bool) {
    if section.is_empty() {
        return;
    }
    let rendered: Vec<String> = if single {
        section
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .filter(|c| !c.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    } else {
        align(section)
    };
    out.extend(rendered.into_iter().map(|line| format!("{}{}", indent, line)));
    section.clear();
}

/// Copies a verbatim region, patching the tags of fields it holds.
fn render_verbatim(decl: &StructDecl, span: &Range<usize>, held: &[usize], source: &str) -> String {
    let mut patches: Vec<(Range<usize>, String)> = held
        .iter()
        .filter_map(|idx| decl.fields.get(*idx))
        .filter_map(|field| {
            let origin = field.span.as_ref()?;
            let tag = field.tag.as_ref()?;
            if origin.original_tag.as_ref() == Some(tag) {
                return None;
            }
            Some(match &origin.tag {
                Some(range) => (range.clone(), tag.clone()),
                None => (origin.type_end..origin.type_end, format!(" {}", tag)),
            })
        })
        .collect();
    patches.sort_by_key(|(range, _)| range.start);

    let mut text = source[span.clone()].to_string();
    for (range, replacement) in patches.into_iter().rev() {
        text.replace_range(range.start - span.start..range.end - span.start, &replacement);
    }
    text
}

fn body_edit(decl: &StructDecl, source: &str) -> Edit {
    let body = &decl.body;
    let single = decl.fields.len() == 1;
    let mut out: Vec<String> = Vec::new();
    let mut section: Vec<Vec<String>> = Vec::new();

    for line in &body.lines {
        if let BodyLine::Field { field, comment } = line {
            if let Some(field) = decl.fields.get(*field) {
                section.push(field_cells(field, comment.as_deref()));
            }
            continue;
        }
        flush_section(&mut section, &mut out, &body.indent, single);
        match line {
            BodyLine::Verbatim { span, fields } => {
                out.push(render_verbatim(decl, span, fields, source))
            }
            _ => out.push(String::new()),
        }
    }
    flush_section(&mut section, &mut out, &body.indent, single);

    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    // gofmt writes exactly one space between `struct` and a non-empty body.
    let gap = &source[body.keyword_end..body.open - 1];
    let (start, lead) = if gap != " " && gap.chars().all(char::is_whitespace) {
        (body.keyword_end, " {")
    } else {
        (body.open, "")
    };

    Edit {
        range: start..body.close,
        text: format!("{}\n{}\n{}", lead, out.join("\n"), body.close_indent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_untouched_file_is_identical() {
        let source = "package a\n\nimport \"fmt\"\n\ntype A struct {\n\tX   int\n}\n";
        let file = GoFile::parse(source).unwrap();
        assert_eq!(emit(&file).unwrap(), source);
    }

    #[test]
    fn test_single_import_becomes_group() {
        let source = "package a\n\nimport \"fmt\"\n";
        let mut file = GoFile::parse(source).unwrap();
        file.imports.added.push("gorm.io/gorm".into());
        assert_eq!(
            emit(&file).unwrap(),
            "package a\n\nimport (\n\t\"fmt\"\n\t\"gorm.io/gorm\"\n)\n"
        );
    }

    #[test]
    fn test_missing_import_block_is_created() {
        let source = "package a\n\ntype A struct{}\n";
        let mut file = GoFile::parse(source).unwrap();
        file.imports.added.push("time".into());
        assert_eq!(
            emit(&file).unwrap(),
            "package a\n\nimport (\n\t\"time\"\n)\n\ntype A struct{}\n"
        );
    }

    #[test]
    fn test_import_block_follows_package_comment() {
        let source = "package a // pkg\n\ntype A struct{}\n";
        let mut file = GoFile::parse(source).unwrap();
        file.imports.added.push("time".into());
        assert_eq!(
            emit(&file).unwrap(),
            "package a // pkg\n\nimport (\n\t\"time\"\n)\n\ntype A struct{}\n"
        );
    }

    #[test]
    fn test_group_last_run_is_sorted() {
        let source = "package a\n\nimport (\n\t\"fmt\"\n\n\tsync \"sync\"\n\t\"time\"\n)\n";
        let mut file = GoFile::parse(source).unwrap();
        file.imports.added.push("strings".into());
        assert_eq!(
            emit(&file).unwrap(),
            "package a\n\nimport (\n\t\"fmt\"\n\n\t\"strings\"\n\tsync \"sync\"\n\t\"time\"\n)\n"
        );
    }

    #[test]
    fn test_empty_struct_gets_field() {
        let source = "package a\n\ntype A struct{}\n";
        let mut file = GoFile::parse(source).unwrap();
        file.structs[0].push_field(Field::embedded("gorm.Model"));
        assert_eq!(
            emit(&file).unwrap(),
            "package a\n\ntype A struct {\n\tgorm.Model\n}\n"
        );
    }

    #[test]
    fn test_grouped_empty_struct_gets_field() {
        let source = "package a\n\ntype (\n\tA struct{} // models\n)\n";
        let mut file = GoFile::parse(source).unwrap();
        file.structs[0].push_field(Field::named("Id", "string"));
        assert_eq!(
            emit(&file).unwrap(),
            "package a\n\ntype (\n\tA struct {\n\t\tId string\n\t} // models\n)\n"
        );
    }

    #[test]
    fn test_appended_fields_are_aligned() {
        let source = "package a\n\ntype A struct {\n\tId string\n}\n";
        let mut file = GoFile::parse(source).unwrap();
        file.structs[0].push_field(Field::named("LastName", "string"));
        assert_eq!(
            emit(&file).unwrap(),
            "package a\n\ntype A struct {\n\tId       string\n\tLastName string\n}\n"
        );
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let edits = vec![
            Edit {
                range: 0..4,
                text: "x".into(),
            },
            Edit {
                range: 2..6,
                text: "y".into(),
            },
        ];
        let err = apply_edits("abcdefgh", edits).unwrap_err();
        assert!(matches!(err, AppError::OutputSerialize(_)));
    }
}
