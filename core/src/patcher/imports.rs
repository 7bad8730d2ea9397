use crate::directives::DirectiveRegistry;
use crate::model::GoFile;
use crate::report::Report;

/// Adds every registered import path the file does not already import.
pub fn inject_imports(file: &mut GoFile, registry: &DirectiveRegistry, report: &mut Report) {
    for (path, line) in registry.imports() {
        if file.imports.contains(path) {
            tracing::trace!(path, line, "import already present");
            continue;
        }
        file.imports.added.push(path.to_string());
        report.imports_added.push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_existing_and_repeated_paths() {
        let source = "package a\n\nimport (\n\t\"fmt\"\n)\n";
        let mut file = GoFile::parse(source).unwrap();
        let mut registry = DirectiveRegistry::default();
        registry.add_import("fmt", 1);
        registry.add_import("gorm.io/gorm", 2);
        registry.add_import("gorm.io/gorm", 3);

        let mut report = Report::default();
        inject_imports(&mut file, &registry, &mut report);

        assert_eq!(file.imports.added, vec!["gorm.io/gorm"]);
        assert_eq!(report.imports_added, vec!["gorm.io/gorm"]);
    }

    #[test]
    fn test_file_without_imports() {
        let mut file = GoFile::parse("package a\n").unwrap();
        let mut registry = DirectiveRegistry::default();
        registry.add_import("time", 1);

        let mut report = Report::default();
        inject_imports(&mut file, &registry, &mut report);
        assert!(file.imports.contains("time"));
    }
}
