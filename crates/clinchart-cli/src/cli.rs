//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "clinchart",
    version,
    about = "Clinical event log: tabular record entry with a synchronized time plot",
    long_about = "Keep a timestamped clinical event/measurement log in a flat file.\n\n\
                  Records are validated against the configured capability table,\n\
                  kept sorted by timestamp, and projected into one plot series per type."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Capability-table configuration file (JSON); built-in table when omitted.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh log file holding only the header row.
    Init(FileArg),

    /// Print the record table and the plotted series summary.
    Show(FileArg),

    /// Check every row against the capability table and report issues.
    Check(FileArg),

    /// Submit one clinical-event form: validate, expand, insert, save.
    Add(AddArgs),

    /// Delete rows by their current table positions.
    Remove(RemoveArgs),

    /// Edit one table cell in place.
    Edit(EditArgs),

    /// Rewrite a log (canonical or legacy schema) as a canonical file.
    Convert(ConvertArgs),
}

#[derive(Parser)]
pub struct FileArg {
    /// Path to the log file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct AddArgs {
    /// Path to the log file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Base timestamp, e.g. "01/01/2021 08:00".
    #[arg(long = "date", value_name = "DATE")]
    pub date: String,

    /// Measurement input as KIND=VALUE (repeatable), e.g. --field Vtop=45,5.
    #[arg(long = "field", value_name = "KIND=VALUE")]
    pub fields: Vec<String>,

    /// Repeat multiplier for one field as KIND=N (repeatable).
    #[arg(long = "repeat", value_name = "KIND=N")]
    pub repeats: Vec<String>,

    /// Event enumeration value.
    #[arg(long = "event", value_name = "KIND", default_value = "")]
    pub event: String,

    /// Comment / event description shared by the produced records.
    #[arg(long = "comment", value_name = "TEXT", default_value = "")]
    pub comment: String,
}

#[derive(Parser)]
pub struct RemoveArgs {
    /// Path to the log file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Row positions to delete, resolved against the current ordering.
    #[arg(value_name = "ROW", required = true)]
    pub rows: Vec<usize>,
}

#[derive(Parser)]
pub struct EditArgs {
    /// Path to the log file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Row position of the record to edit.
    #[arg(long = "row", value_name = "ROW")]
    pub row: usize,

    /// Column to write: DATE, TYPE, VALUE, or COMMENT.
    #[arg(long = "column", value_name = "COLUMN")]
    pub column: String,

    /// Raw text to write into the cell.
    #[arg(long = "value", value_name = "TEXT")]
    pub value: String,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Input log file (canonical or legacy schema).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output file to write in the canonical schema.
    #[arg(long = "output", value_name = "PATH")]
    pub output: PathBuf,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
