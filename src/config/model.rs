// src/config/model.rs

use std::time::Duration;

use nix::sys::signal::Signal;
use serde::Deserialize;

/// Runner settings as read from a TOML file.
///
/// ```toml
/// cancel_signal = "SIGINT"
/// queue_capacity = 100
/// timeout = "30s"
/// indeterminate_exit_code = 0
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawRunnerSettings {
    /// Signal name (`"SIGTERM"`, `"term"`) or number (`"15"`).
    #[serde(default)]
    pub cancel_signal: Option<String>,

    /// Capacity of the shared output queue.
    #[serde(default)]
    pub queue_capacity: Option<usize>,

    /// Cancel the run after this long, e.g. `"250ms"`, `"3s"`, `"1m"`.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Status reported when the child's termination state can't be read.
    #[serde(default)]
    pub indeterminate_exit_code: Option<i32>,
}

/// Validated runner settings.
///
/// Build via `RunnerSettings::try_from(raw)` (see `config::validate`) or
/// start from `RunnerSettings::default()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    pub cancel_signal: Signal,
    pub queue_capacity: usize,
    pub timeout: Option<Duration>,
    pub indeterminate_exit_code: i32,
}

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_CANCEL_SIGNAL: Signal = Signal::SIGTERM;

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            cancel_signal: DEFAULT_CANCEL_SIGNAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout: None,
            indeterminate_exit_code: 0,
        }
    }
}
