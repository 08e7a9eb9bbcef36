// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cmdrunner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdrunner",
    version,
    about = "Run a command, stream its output line by line, and exit with its status.",
    long_about = None
)]
pub struct CliArgs {
    /// Runner settings file (TOML).
    ///
    /// If omitted, `cmdrunner.toml` in the current directory is used when it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Cancel the command after this long (e.g. `500ms`, `10s`, `2m`).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Signal sent to the command on cancellation (name or number).
    #[arg(long, value_name = "SIGNAL")]
    pub signal: Option<String>,

    /// Prefix every line with the stream it came from.
    #[arg(long)]
    pub tag_streams: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDRUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Program to run.
    #[arg(value_name = "PROGRAM", required = true)]
    pub program: String,

    /// Arguments passed to the program.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
