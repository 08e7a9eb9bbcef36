// src/config/validate.rs

use std::str::FromStr;
use std::time::Duration;

use nix::sys::signal::Signal;

use crate::config::model::{RawRunnerSettings, RunnerSettings};
use crate::errors::{CmdRunnerError, Result};

impl TryFrom<RawRunnerSettings> for RunnerSettings {
    type Error = CmdRunnerError;

    fn try_from(raw: RawRunnerSettings) -> std::result::Result<Self, Self::Error> {
        let defaults = RunnerSettings::default();

        let cancel_signal = match raw.cancel_signal.as_deref() {
            Some(s) => parse_signal(s)?,
            None => defaults.cancel_signal,
        };

        let queue_capacity = raw.queue_capacity.unwrap_or(defaults.queue_capacity);
        if queue_capacity == 0 {
            return Err(CmdRunnerError::ConfigError(
                "queue_capacity must be >= 1 (got 0)".to_string(),
            ));
        }

        let timeout = raw.timeout.as_deref().map(parse_duration).transpose()?;

        Ok(RunnerSettings {
            cancel_signal,
            queue_capacity,
            timeout,
            indeterminate_exit_code: raw
                .indeterminate_exit_code
                .unwrap_or(defaults.indeterminate_exit_code),
        })
    }
}

/// Parse a signal given by name (`"SIGTERM"`, `"term"`, `"Int"`) or by
/// number (`"9"`).
pub fn parse_signal(s: &str) -> Result<Signal> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CmdRunnerError::InvalidSignal("empty signal name".to_string()));
    }

    if let Ok(num) = s.parse::<i32>() {
        return Signal::try_from(num).map_err(|_| CmdRunnerError::InvalidSignal(s.to_string()));
    }

    let upper = s.to_ascii_uppercase();
    let name = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    };

    Signal::from_str(&name).map_err(|_| CmdRunnerError::InvalidSignal(s.to_string()))
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CmdRunnerError::InvalidDuration(
            "empty duration string".to_string(),
        ));
    }

    // Boundary between digits and suffix.
    let idx = s.chars().position(|c| !c.is_ascii_digit()).ok_or_else(|| {
        CmdRunnerError::InvalidDuration(format!("'{s}' is missing a unit suffix"))
    })?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part.parse().map_err(|e| {
        CmdRunnerError::InvalidDuration(format!("invalid duration number '{num_part}': {e}"))
    })?;

    let secs_per_unit = match unit_part.trim().to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        unit => {
            return Err(CmdRunnerError::InvalidDuration(format!(
                "unsupported duration unit '{unit}'; expected ms, s, m, or h"
            )));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| CmdRunnerError::InvalidDuration(format!("'{s}' is too large")))
}
