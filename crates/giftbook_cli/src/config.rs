//! Command-line and environment configuration.
//!
//! # Responsibility
//! - Declare flags, environment fallbacks and subcommands for `clap`.
//! - Resolve them into a `CliConfig` with storage and logging defaults.
//!
//! # Invariants
//! - Flags override environment variables; environment overrides defaults.
//! - Blank environment values count as unset.
//! - Resolution never touches the filesystem.

use clap::{Parser, Subcommand};
use giftbook_core::{default_log_level, parse_export_format, ExportFormat, RecordIndex};
use std::path::PathBuf;

const DEFAULT_DB_FILE: &str = "giftbook.db";

/// giftbook - electronic gift-money ledger
#[derive(Parser, Debug)]
#[command(name = "giftbook")]
#[command(version, long_about = None)]
pub struct Cli {
    /// SQLite database file (defaults to the temp directory)
    #[arg(long, env = "GIFTBOOK_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, env = "GIFTBOOK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GIFTBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// One CLI command.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every page with totals (default)
    Show,

    /// Set one column of one record
    Edit {
        /// Record index, 0-based across pages
        index: RecordIndex,

        /// Column: name, amount, gift or address
        field: String,

        /// New value; omitted clears the column
        #[arg(default_value = "", allow_hyphen_values = true)]
        value: String,
    },

    /// Append a blank page
    AddPage,

    /// Delete a page (asks which when omitted)
    DeletePage {
        /// 1-based page number
        page: Option<u32>,
    },

    /// Set the event title
    Title {
        #[arg(default_value = "")]
        text: String,
    },

    /// Set the event location
    Location {
        #[arg(default_value = "")]
        text: String,
    },

    /// Re-stamp metadata and save
    Save,

    /// Write a document into a directory
    Export {
        /// word or json
        #[arg(default_value = "word", value_parser = export_format)]
        format: ExportFormat,

        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Save and print the ledger
    Print,

    /// Erase all stored data
    Clear,

    /// Keep a single blank page
    Reset,

    /// Interactive menu
    Menu,
}

fn export_format(value: &str) -> Result<ExportFormat, String> {
    parse_export_format(value).ok_or_else(|| format!("unknown export format `{value}`"))
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    /// Skip confirmation prompts.
    pub assume_yes: bool,
    pub command: Command,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            db_path: cli
                .db
                .filter(|path| !path.as_os_str().is_empty())
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE)),
            log_dir: cli.log_dir.filter(|path| !path.as_os_str().is_empty()),
            log_level: cli
                .log_level
                .filter(|level| !level.trim().is_empty())
                .unwrap_or_else(|| default_log_level().to_string()),
            assume_yes: cli.yes,
            command: cli.command.unwrap_or(Command::Show),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, CliConfig, Command};
    use clap::{CommandFactory, Parser};
    use giftbook_core::ExportFormat;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Result<CliConfig, clap::Error> {
        Cli::try_parse_from(std::iter::once("giftbook").chain(args.iter().copied()))
            .map(CliConfig::from)
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn settings_fall_back_to_environment_names() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|name| name.to_string_lossy().into_owned())
        };
        assert_eq!(env_of("db").as_deref(), Some("GIFTBOOK_DB_PATH"));
        assert_eq!(env_of("log_dir").as_deref(), Some("GIFTBOOK_LOG_DIR"));
        assert_eq!(env_of("log_level").as_deref(), Some("GIFTBOOK_LOG_LEVEL"));
    }

    #[test]
    fn blank_settings_resolve_to_defaults() {
        let config = CliConfig::from(Cli {
            db: Some(PathBuf::new()),
            log_dir: Some(PathBuf::new()),
            log_level: Some("  ".to_string()),
            yes: false,
            command: None,
        });
        assert_eq!(config.command, Command::Show);
        assert_eq!(config.db_path, std::env::temp_dir().join("giftbook.db"));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_level, giftbook_core::default_log_level());
        assert!(!config.assume_yes);
    }

    #[test]
    fn flags_are_applied() {
        let config = parse(&[
            "--db",
            "/flag/book.db",
            "--log-level",
            "warn",
            "-y",
            "save",
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/flag/book.db"));
        assert_eq!(config.log_level, "warn");
        assert!(config.assume_yes);
        assert_eq!(config.command, Command::Save);
    }

    #[test]
    fn parses_edit_and_export() {
        let config = parse(&["edit", "3", "amount", "50.5"]).unwrap();
        assert_eq!(
            config.command,
            Command::Edit {
                index: 3,
                field: "amount".to_string(),
                value: "50.5".to_string()
            }
        );

        let config = parse(&["edit", "3", "amount", "-5"]).unwrap();
        assert!(matches!(config.command, Command::Edit { ref value, .. } if value == "-5"));

        let config = parse(&["export", "JSON", "/tmp/out"]).unwrap();
        assert_eq!(
            config.command,
            Command::Export {
                format: ExportFormat::Json,
                dir: PathBuf::from("/tmp/out")
            }
        );

        let config = parse(&["export"]).unwrap();
        assert_eq!(
            config.command,
            Command::Export {
                format: ExportFormat::Word,
                dir: PathBuf::from(".")
            }
        );
    }

    #[test]
    fn optional_arguments_default() {
        assert_eq!(
            parse(&["delete-page"]).unwrap().command,
            Command::DeletePage { page: None }
        );
        assert_eq!(
            parse(&["delete-page", "2"]).unwrap().command,
            Command::DeletePage { page: Some(2) }
        );
        assert_eq!(
            parse(&["edit", "0", "gift"]).unwrap().command,
            Command::Edit {
                index: 0,
                field: "gift".to_string(),
                value: String::new()
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--db"]).is_err());
        assert!(parse(&["delete-page", "two"]).is_err());
        assert!(parse(&["dance"]).is_err());
        assert!(parse(&["save", "now"]).is_err());
        assert!(parse(&["export", "pdf"]).is_err());
    }
}
