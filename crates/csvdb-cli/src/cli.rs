//! CLI argument definitions for csvdb.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use csvdb_model::DefaultMappingAction;

#[derive(Parser)]
#[command(
    name = "csvdb",
    version,
    about = "Import CSV files into SQLite tables",
    long_about = "Import a CSV file into a SQLite table.\n\n\
                  An optional JSON mapping document selects, names, types and transforms\n\
                  columns. Columns declared as foreign keys are normalized into satellite\n\
                  tables holding each distinct value once."
)]
pub struct Cli {
    #[command(flatten)]
    pub import: ImportArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Allow raw cell values in log output.
    #[arg(long = "log-data")]
    pub log_data: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// CSV file to import.
    #[arg(short = 'i', long = "input", value_name = "CSV")]
    pub input: PathBuf,

    /// SQLite database file to write.
    #[arg(short = 'o', long = "output", value_name = "DB", default_value = "db.sqlite")]
    pub output: PathBuf,

    /// JSON mapping document.
    #[arg(short = 'm', long = "mapping", value_name = "JSON")]
    pub mapping: Option<PathBuf>,

    /// Treat the first record as column titles.
    #[arg(
        short = 't',
        long = "has-header-row",
        visible_alias = "csv-has-title-columns"
    )]
    pub has_header_row: bool,

    /// What to do with input columns no mapping references.
    #[arg(
        short = 'd',
        long = "default-mapping-action",
        value_enum,
        default_value = "ignore"
    )]
    pub default_mapping_action: DefaultActionArg,

    /// Field delimiter: a single ASCII character, or `tab`.
    #[arg(long = "delimiter", value_name = "CHAR", default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Resolve and print the mappings without touching the database.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DefaultActionArg {
    Import,
    Ignore,
}

impl From<DefaultActionArg> for DefaultMappingAction {
    fn from(arg: DefaultActionArg) -> Self {
        match arg {
            DefaultActionArg::Import => DefaultMappingAction::Import,
            DefaultActionArg::Ignore => DefaultMappingAction::Ignore,
        }
    }
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

/// Parse a delimiter argument into its byte.
pub fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) if ch.is_ascii() => Ok(ch as u8),
                _ => Err(format!(
                    "delimiter must be a single ASCII character, got '{raw}'"
                )),
            }
        }
    }
}
