//! CLI argument definitions for the diagnostic-imaging pipeline.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "di-etl",
    version,
    about = "Diagnostic imaging ETL - clean provider workbooks into one table",
    long_about = "Clean the monthly provider-level diagnostic imaging workbook into a single\n\
                  period-tagged table, optionally joined to a region lookup, and serve a\n\
                  rolling-average dashboard over the result."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean a workbook and write the unified table.
    Process(ProcessArgs),

    /// Serve the dashboard over a unified table.
    Serve(ServeArgs),

    /// Print the cross-region ranking for one metric.
    Rank(RankArgs),

    /// Print the default configuration as TOML.
    Config,
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// Source workbook (.xlsx).
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    /// Org code to region lookup (.xlsx or .csv); rows without a match are dropped.
    #[arg(long = "lookup", value_name = "PATH")]
    pub lookup: Option<PathBuf>,

    /// Unified table path (default: <WORKBOOK>_unified next to the workbook).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Unified table format.
    #[arg(long = "format", value_enum, default_value = "xlsx")]
    pub format: OutputFormatArg,

    /// Also write the cleaned intermediate workbook here.
    #[arg(long = "cleaned-output", value_name = "PATH")]
    pub cleaned_output: Option<PathBuf>,

    /// Pipeline configuration file (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Clean and aggregate without writing any files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ServeArgs {
    /// Unified table written by `process` (.xlsx or .csv).
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,

    /// Pipeline configuration file (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long = "host", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long = "port", default_value_t = 8050)]
    pub port: u16,
}

#[derive(Parser)]
pub struct RankArgs {
    /// Unified table written by `process` (.xlsx or .csv).
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,

    /// Region to highlight (default from configuration).
    #[arg(long = "region")]
    pub region: Option<String>,

    /// Rolling window in months; anything but a positive integer means 1.
    #[arg(long = "window")]
    pub window: Option<String>,

    #[arg(long = "modality", value_enum, default_value = "ct")]
    pub modality: ModalityArg,

    #[arg(long = "metric", value_enum, default_value = "activity")]
    pub metric: MetricArg,

    /// Pipeline configuration file (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Xlsx,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModalityArg {
    Ct,
    Mri,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Activity,
    WaitingList,
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
