//! Apply component metadata rules to resolved module metadata.
//!
//! Rules live in a TOML file (`rules.toml` by default). `check` registers
//! them and reports problems; `apply` runs them against metadata documents.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use metarules::apply::{ModuleOutcome, apply_to_files, load_rules};
use metarules::exit_codes;
use metarules::io::config::DEFAULT_RULES_PATH;
use metarules::io::metadata_store::{MetadataReader, render_metadata, write_metadata};
use metarules::logging;

#[derive(Parser)]
#[command(
    name = "metarules",
    version,
    about = "Rewrite resolved module metadata with declarative rules"
)]
struct Cli {
    /// Rules file to load.
    #[arg(long, global = true, default_value = DEFAULT_RULES_PATH)]
    rules: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the rules file and report how many rules it registers.
    Check,
    /// Run the rules against metadata documents and print the results.
    Apply {
        /// Module metadata documents (JSON).
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write processed metadata back instead of printing it.
        #[arg(long)]
        write: bool,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check => cmd_check(&cli.rules),
        Command::Apply { files, write } => cmd_apply(&cli.rules, &files, write),
    }
}

fn cmd_check(rules: &Path) -> Result<i32> {
    let loaded = load_rules(rules)?;
    println!("{} rule(s) registered", loaded.handler.len());
    Ok(exit_codes::OK)
}

fn cmd_apply(rules: &Path, files: &[PathBuf], write: bool) -> Result<i32> {
    let loaded = load_rules(rules)?;
    let reader = MetadataReader::new(loaded.config.default_status_scheme.clone())?;
    let outcomes = apply_to_files(&loaded.handler, &reader, files)?;
    report(outcomes, write)
}

/// Emit processed metadata and collect rejections.
///
/// Every module is reported, including those after a failed write. A failed
/// write exits [`exit_codes::INVALID`]; otherwise any rejection exits
/// [`exit_codes::REJECTED`].
fn report(outcomes: Vec<ModuleOutcome>, write: bool) -> Result<i32> {
    let mut rejected = 0usize;
    let mut failed_writes = 0usize;
    for outcome in outcomes {
        match outcome.result {
            Ok(metadata) if write => {
                if let Err(err) = write_metadata(&outcome.path, &metadata) {
                    failed_writes += 1;
                    eprintln!("{:#}", err);
                }
            }
            Ok(metadata) => print!("{}", render_metadata(&metadata)?),
            Err(err) => {
                rejected += 1;
                warn!(path = %outcome.path.display(), module = %err.module_id(), "module rejected");
                eprintln!("{}: {:#}", outcome.path.display(), anyhow::Error::from(err));
            }
        }
    }
    if rejected > 0 {
        eprintln!("{rejected} module(s) rejected");
    }
    if failed_writes > 0 {
        eprintln!("{failed_writes} module(s) could not be written");
        return Ok(exit_codes::INVALID);
    }
    if rejected > 0 {
        return Ok(exit_codes::REJECTED);
    }
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metarules::test_support::{TestWorkspace, maven_module};

    #[test]
    fn parse_check_uses_default_rules_path() {
        let cli = Cli::parse_from(["metarules", "check"]);
        assert!(matches!(cli.command, Command::Check));
        assert_eq!(cli.rules, PathBuf::from(DEFAULT_RULES_PATH));
    }

    #[test]
    fn parse_apply_with_write_and_rules() {
        let cli = Cli::parse_from([
            "metarules",
            "apply",
            "--rules",
            "custom.toml",
            "a.json",
            "b.json",
            "--write",
        ]);
        assert_eq!(cli.rules, PathBuf::from("custom.toml"));
        match cli.command {
            Command::Apply { files, write } => {
                assert_eq!(files, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
                assert!(write);
            }
            Command::Check => panic!("expected apply"),
        }
    }

    #[test]
    fn failed_write_does_not_stop_later_modules() {
        let ws = TestWorkspace::new().expect("workspace");
        let unwritable = ws.path().join("missing-dir").join("a.json");
        let writable = ws.path().join("b.json");
        let outcomes = vec![
            ModuleOutcome {
                path: unwritable.clone(),
                result: Ok(maven_module("org", "a", "1.0", "release")),
            },
            ModuleOutcome {
                path: writable.clone(),
                result: Ok(maven_module("org", "b", "1.0", "milestone")),
            },
        ];

        let code = report(outcomes, true).expect("report");

        assert_eq!(code, exit_codes::INVALID);
        assert!(!unwritable.exists());
        let written = std::fs::read_to_string(&writable).expect("read b.json");
        assert!(written.contains("\"milestone\""), "{written}");
    }

    #[test]
    fn parse_apply_requires_files() {
        assert!(Cli::try_parse_from(["metarules", "apply"]).is_err());
    }
}
