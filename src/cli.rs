//! Command-line interface for tidy.
//!
//! Parses arguments with clap, builds an [`Engine`] on the real filesystem
//! and reports the outcome through [`OutputFormatter`].

use crate::classifier::ExtensionClassifier;
use crate::config::{CONFIG_FILE_NAME, TidyConfig};
use crate::engine::Engine;
use crate::error::{Result, TidyError};
use crate::fs::OsFs;
use crate::output::OutputFormatter;
use crate::record::TracingSink;
use crate::undo::UndoReport;
use crate::watch::watch;
use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

#[derive(Debug, Parser)]
#[command(name = "tidy", version, about = "Sort a directory into category folders, and back")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file to use instead of the usual lookup.
    #[arg(long, global = true, env = "TIDY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Extra environment files to load before anything else.
    #[arg(long = "env-file", global = true)]
    pub env_files: Vec<PathBuf>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move the entries of a directory into category folders.
    Sort {
        /// Directory to sort. Defaults to the current directory.
        path: Option<PathBuf>,

        /// How to pick a category for each file.
        #[arg(short = 't', long = "type", value_enum, default_value_t = SortType::Extension)]
        sort_type: SortType,

        /// Show what would be moved without moving anything.
        #[arg(long)]
        dry_run: bool,

        /// Print the dry-run plan as JSON.
        #[arg(long, requires = "dry_run")]
        json: bool,

        /// Keep running and sort again whenever something is created.
        #[arg(long, conflicts_with = "dry_run")]
        watch: bool,
    },
    /// Move everything out of the category folders and delete them.
    Undo {
        path: Option<PathBuf>,
    },
    /// Create the category folders without moving anything.
    Scaffold {
        path: Option<PathBuf>,
    },
    /// List the configured categories.
    Categories,
}

/// Classification strategies available from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortType {
    /// By file name extension.
    Extension,
}

/// Runs a parsed command line.
///
/// # Errors
///
/// Any configuration, filesystem or relocation failure.
pub fn run_cli(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), command_path(&cli.command))?;
    let categories = config.category_set()?;

    if let Command::Categories = cli.command {
        OutputFormatter::header("CATEGORIES");
        OutputFormatter::category_list(&categories);
        return Ok(());
    }

    let classifier = ExtensionClassifier::new(categories);
    let mut engine = Engine::new(Box::new(classifier), OsFs, TracingSink)?
        .with_filter(config.entry_filter()?);
    if let Some(path) = command_path(&cli.command) {
        engine.change_root(path)?;
    }

    match cli.command {
        Command::Sort {
            sort_type: SortType::Extension,
            dry_run: true,
            json,
            ..
        } => dry_run(&engine, json),
        Command::Sort { watch: true, .. } => {
            let report = engine.sort()?;
            OutputFormatter::success(&format!(
                "Sorted {} entries in {}",
                report.relocated,
                engine.root().display()
            ));
            OutputFormatter::info("Watching for new files, press Ctrl+C to stop");
            let stop = AtomicBool::new(false);
            watch(&mut engine, &stop)
        }
        Command::Sort { .. } => {
            let report = engine.sort()?;
            OutputFormatter::success(&format!(
                "Sorted {} entries in {}",
                report.relocated,
                engine.root().display()
            ));
            if report.skipped > 0 {
                OutputFormatter::info(&format!("{} entries left in place by filters", report.skipped));
            }
            Ok(())
        }
        Command::Undo { .. } => {
            match engine.undo()? {
                UndoReport::NothingToUndo => OutputFormatter::warning(&format!(
                    "{} does not look sorted, nothing to undo",
                    engine.root().display()
                )),
                UndoReport::Restored {
                    restored,
                    removed_categories,
                } => OutputFormatter::success(&format!(
                    "Restored {} entries and removed {} category folders",
                    restored,
                    removed_categories.len()
                )),
            }
            Ok(())
        }
        Command::Scaffold { .. } => {
            engine.create_scaffolding()?;
            OutputFormatter::success(&format!(
                "Category folders ready in {}",
                engine.root().display()
            ));
            Ok(())
        }
        Command::Categories => Ok(()),
    }
}

/// Loads the given env files in order, or `.env` when none are given.
///
/// A missing `.env` is fine; a malformed one, or any problem with an
/// explicitly named file, is an error.
pub fn load_env_files(env_files: &[PathBuf]) -> std::result::Result<(), dotenvy::Error> {
    if env_files.is_empty() {
        return ignore_missing(dotenvy::dotenv().map(|_| ()));
    }
    for path in env_files {
        dotenvy::from_path(path)?;
    }
    Ok(())
}

fn ignore_missing(
    result: std::result::Result<(), dotenvy::Error>,
) -> std::result::Result<(), dotenvy::Error> {
    match result {
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn dry_run(engine: &Engine<OsFs, TracingSink>, json: bool) -> Result<()> {
    let planned = engine.plan()?;
    if json {
        let rendered = serde_json::to_string_pretty(&planned)
            .map_err(|e| TidyError::io(engine.root(), e.into()))?;
        println!("{}", rendered);
        return Ok(());
    }

    OutputFormatter::dry_run_notice(&format!(
        "Would sort contents of: {}",
        engine.root().display()
    ));
    if planned.is_empty() {
        OutputFormatter::info("Nothing to sort");
        return Ok(());
    }
    OutputFormatter::planned_moves(&planned);
    OutputFormatter::summary_table(&planned);
    Ok(())
}

fn command_path(command: &Command) -> Option<&Path> {
    match command {
        Command::Sort { path, .. } | Command::Undo { path } | Command::Scaffold { path } => {
            path.as_deref()
        }
        Command::Categories => None,
    }
}

/// Loads configuration, preferring a config file inside the target directory
/// over the usual lookup when no explicit file was given.
fn load_config(explicit: Option<&Path>, target: Option<&Path>) -> Result<TidyConfig> {
    if explicit.is_none()
        && let Some(target) = target
    {
        let local = target.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Ok(TidyConfig::load_from_file(&local)?);
        }
    }
    Ok(TidyConfig::load(explicit)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sort_defaults() {
        let cli = Cli::try_parse_from(["tidy", "sort"]).unwrap();
        match cli.command {
            Command::Sort {
                path,
                sort_type,
                dry_run,
                json,
                watch,
            } => {
                assert!(path.is_none());
                assert_eq!(sort_type, SortType::Extension);
                assert!(!dry_run);
                assert!(!json);
                assert!(!watch);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_sort_with_options() {
        let cli = Cli::try_parse_from([
            "tidy", "-v", "sort", "/tmp/x", "-t", "extension", "--dry-run", "--json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(command_path(&cli.command), Some(Path::new("/tmp/x")));
        assert!(matches!(
            cli.command,
            Command::Sort {
                dry_run: true,
                json: true,
                ..
            }
        ));
    }

    #[test]
    fn test_json_requires_dry_run() {
        assert!(Cli::try_parse_from(["tidy", "sort", "--json"]).is_err());
    }

    #[test]
    fn test_watch_conflicts_with_dry_run() {
        assert!(Cli::try_parse_from(["tidy", "sort", "--watch", "--dry-run"]).is_err());
    }

    #[test]
    fn test_unknown_sort_type_rejected() {
        assert!(Cli::try_parse_from(["tidy", "sort", "-t", "size"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tidy",
            "undo",
            "dir",
            "--config",
            "c.toml",
            "--env-file",
            "a.env",
            "--env-file",
            "b.env",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert_eq!(cli.env_files.len(), 2);
        assert!(matches!(cli.command, Command::Undo { .. }));
    }

    #[test]
    fn test_missing_default_env_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let result = dotenvy::from_path(dir.path().join(".env"));
        assert!(ignore_missing(result).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "this line is not an assignment\n").unwrap();
        let result = dotenvy::from_path(&path);
        assert!(matches!(ignore_missing(result), Err(dotenvy::Error::LineParse(..))));
    }

    #[test]
    fn test_missing_explicit_env_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_env_files(&[dir.path().join("absent.env")]).is_err());
    }

    #[test]
    fn test_config_in_target_directory_is_used() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "unknown_category = \"Misc\"\n",
        )
        .unwrap();
        let config = load_config(None, Some(dir.path())).unwrap();
        assert_eq!(config.unknown_category.as_deref(), Some("Misc"));
    }

    #[test]
    fn test_explicit_config_wins_over_target() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "unknown_category = \"Misc\"\n",
        )
        .unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "unknown_category = \"Leftovers\"\n").unwrap();
        let config = load_config(Some(&explicit), Some(dir.path())).unwrap();
        assert_eq!(config.unknown_category.as_deref(), Some("Leftovers"));
    }
}
