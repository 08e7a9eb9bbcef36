// src/errors.rs

//! Crate-wide error type.
//!
//! Only failures that happen before the child is running are surfaced as
//! errors. Everything after a successful start is folded into the exit status.

use thiserror::Error;

use crate::types::StreamKind;

#[derive(Error, Debug)]
pub enum CmdRunnerError {
    #[error("Failed to open {0} pipe of child process")]
    PipeOpen(StreamKind),

    #[error("Failed to start process: {0}")]
    ProcessStart(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown signal: {0}")]
    InvalidSignal(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CmdRunnerError>;
