#![deny(missing_docs)]

//! # protoc-go-inject
//!
//! Command Line Interface that reapplies `@goimport`, `@gofield` and `@gotags`
//! directives to generated Go sources, rewriting each file in place.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::apply::{process_file, FileSummary, Status};
use crate::error::{CliError, CliResult};
use crate::inputs::collect_inputs;

mod apply;
mod error;
mod inputs;

const ANNOTATIONS: &str = r#"Annotations (written in comments of the generated source):
  // @goimport: "gorm.io/gorm"           add an import to the file
  // @gofield: gorm.Model                 embed a type in the enclosing struct
  // @gofield: LastName string            add a named field to the enclosing struct
  Id string `protobuf:"...,name=id,..."` // @gotags: gorm:"column:id;primaryKey"
                                          merge tags into the field named by `name=`"#;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Inject imports, fields and struct tags into generated Go code",
    after_help = ANNOTATIONS
)]
struct Cli {
    /// Files to process, or directories to walk recursively.
    #[clap(required = true)]
    paths: Vec<PathBuf>,

    /// File name suffix selected when walking directories.
    #[clap(long, env = "PROTOC_GO_INJECT_SUFFIX", default_value = ".pb.go")]
    suffix: String,

    /// Do not write; fail if any file would change.
    #[clap(long)]
    check: bool,

    /// Print a JSON summary instead of progress lines.
    #[clap(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_progress(summary: &FileSummary) {
    let path = summary.path.display();
    match (&summary.status, &summary.report) {
        (Status::Failed, _) => {
            eprintln!(
                "error: {}: {}",
                path,
                summary.error.as_deref().unwrap_or_default()
            );
        }
        (status, Some(report)) => {
            let verb = match status {
                Status::Rewritten => "rewrote",
                Status::WouldChange => "would rewrite",
                _ => "unchanged",
            };
            println!(
                "{} {} (+{} imports, +{} fields, {} tags, {} skipped)",
                verb,
                path,
                report.imports_added.len(),
                report.fields_added.len(),
                report.tags_merged.len(),
                report.skipped.len()
            );
            for skipped in &report.skipped {
                println!("  skipped {}", skipped);
            }
        }
        (_, None) => {}
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let files = collect_inputs(&cli.paths, &cli.suffix)?;
    tracing::info!(count = files.len(), check = cli.check, "processing files");

    let summaries: Vec<FileSummary> = files
        .iter()
        .map(|path| {
            process_file(path, cli.check).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "file failed");
                FileSummary::failed(path, &err)
            })
        })
        .collect();

    if cli.json {
        let json = serde_json::to_string_pretty(&summaries)
            .map_err(|e| CliError::General(format!("Failed to serialize summary: {}", e)))?;
        println!("{}", json);
    } else {
        summaries.iter().for_each(print_progress);
    }

    let failed = summaries
        .iter()
        .filter(|s| s.status == Status::Failed)
        .count();
    let pending = summaries
        .iter()
        .filter(|s| s.status == Status::WouldChange)
        .count();

    if failed > 0 {
        return Err(CliError::General(format!(
            "{} of {} files failed",
            failed,
            summaries.len()
        )));
    }
    if pending > 0 {
        return Err(CliError::General(format!(
            "{} of {} files would change",
            pending,
            summaries.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_and_flags() {
        let cli = Cli::try_parse_from(["protoc-go-inject", "--check", "-vv", "api"]).unwrap();
        assert_eq!(cli.paths, vec![PathBuf::from("api")]);
        assert!(cli.check);
        assert!(!cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_paths_are_required() {
        assert!(Cli::try_parse_from(["protoc-go-inject"]).is_err());
    }
}
