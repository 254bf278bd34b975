//! CLI argument parsing for ruleprof

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the statistics report
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "ruleprof")]
#[command(version)]
#[command(about = "Rule-profiler trace analyzer: per-occurrence timing statistics", long_about = None)]
pub struct Cli {
    /// Log file to analyze ("-" for stdin; stdin is the default)
    pub file: Option<PathBuf>,

    /// Run CMD and analyze its stdout instead of reading a file
    /// (e.g. a grep over /var/log/ltm)
    #[arg(short = 'x', long = "extract-cmd", value_name = "CMD")]
    pub extract_cmd: Option<String>,

    /// Filter categories to report (e.g. -e occ=event,cmd_vm or -e occ=commands)
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    pub filter: Option<String>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to PATH instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Pop each entry on match so it pairs with at most one exit
    /// (default keeps the classic scan, which can reuse an entry)
    #[arg(long = "consume-entries")]
    pub consume_entries: bool,

    /// Analyze every input line instead of pre-filtering to profiler lines
    #[arg(long = "no-prefilter")]
    pub no_prefilter: bool,

    /// Enable verbose diagnostics on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
