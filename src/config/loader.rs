// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawRunnerSettings, RunnerSettings};
use crate::errors::Result;

/// Load runner settings from a TOML file without validating them.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawRunnerSettings> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawRunnerSettings = toml::from_str(&contents)?;
    Ok(raw)
}

/// Load runner settings from a TOML file and validate them.
///
/// Missing keys fall back to `RunnerSettings::default()`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RunnerSettings> {
    let raw = load_from_path(path)?;
    RunnerSettings::try_from(raw)
}

/// Settings file looked up by the CLI when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("cmdrunner.toml")
}
