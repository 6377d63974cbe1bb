//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use intake_model::{ActorId, EntityKind};

use crate::config::DB_PATH_ENV_VAR;

#[derive(Parser)]
#[command(
    name = "intake",
    version,
    about = "Import CSV exports of complaint cases and blocked cards",
    long_about = "Import CSV exports of complaint cases and blocked cards into the \
                  application database.\n\n\
                  Comma, semicolon and tab separated files are detected automatically. \
                  Every import runs in a single transaction: either all valid rows are \
                  stored or none are."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values (names, phone numbers, card numbers) in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Settings file (default: ./intake.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides the settings file).
    #[arg(long = "database", value_name = "PATH", env = DB_PATH_ENV_VAR, global = true)]
    pub database: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database and its tables if they do not exist.
    InitDb,

    /// Import one CSV file.
    Import(ImportArgs),
}

#[derive(Args)]
#[command(group = clap::ArgGroup::new("acting_user").required(true).args(["actor_id", "actor"]))]
pub struct ImportArgs {
    /// What the file contains.
    #[arg(value_enum, value_name = "KIND")]
    pub entity: EntityArg,

    /// CSV file to import.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Id of the existing user the records are attributed to.
    #[arg(long = "actor-id", value_name = "ID")]
    pub actor_id: Option<ActorId>,

    /// User name the records are attributed to; created when missing.
    #[arg(long = "actor", value_name = "NAME")]
    pub actor: Option<String>,

    /// Declared content type of the file, as an upload client would send it.
    #[arg(long = "content-type", value_name = "TYPE", default_value = "text/csv")]
    pub content_type: String,

    /// Parse and validate without writing to the database.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// How to print the result.
    #[arg(long = "output", value_enum, default_value = "json")]
    pub output: OutputArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
    /// Complaint cases (`appeals` table).
    #[value(alias = "appeals")]
    Cases,
    /// Blocked cards (`drop_cards` table).
    #[value(alias = "drop-cards")]
    Cards,
}

impl From<EntityArg> for EntityKind {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Cases => Self::Case,
            EntityArg::Cards => Self::Card,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    Json,
    Table,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_requires_an_actor() {
        assert!(Cli::try_parse_from(["intake", "import", "cases", "a.csv"]).is_err());
        assert!(
            Cli::try_parse_from([
                "intake", "import", "cases", "a.csv", "--actor-id", "1", "--actor", "op"
            ])
            .is_err()
        );
    }

    #[test]
    fn import_arguments() {
        let cli = Cli::try_parse_from([
            "intake",
            "import",
            "drop-cards",
            "cards.csv",
            "--actor-id",
            "3",
            "--dry-run",
            "--output",
            "table",
        ])
        .unwrap();

        let Command::Import(args) = cli.command else {
            panic!("expected import command");
        };
        assert_eq!(EntityKind::from(args.entity), EntityKind::Card);
        assert_eq!(args.actor_id, Some(ActorId::new(3)));
        assert_eq!(args.content_type, "text/csv");
        assert!(args.dry_run);
        assert_eq!(args.output, OutputArg::Table);
    }

    #[test]
    fn actor_id_must_be_positive() {
        assert!(
            Cli::try_parse_from(["intake", "import", "cases", "a.csv", "--actor-id", "0"])
                .is_err()
        );
    }
}
