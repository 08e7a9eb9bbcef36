// src/config/mod.rs

//! Runner configuration.
//!
//! - [`model`] holds the TOML-facing settings and their validated form.
//! - [`validate`] turns raw settings into [`RunnerSettings`].
//! - [`loader`] reads settings files.
//!
//! [`RunnerConfig`] is what a `CmdRunner` actually captures at start: the
//! validated settings plus the runtime-only pieces (cancellation token,
//! trace sink) that can't come from a file.

pub mod loader;
pub mod model;
pub mod validate;

use std::fmt;
use std::sync::Arc;

use nix::sys::signal::Signal;
use tokio_util::sync::CancellationToken;

use crate::trace::{SharedTrace, TraceSink, TracingTrace};

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{RawRunnerSettings, RunnerSettings, DEFAULT_CANCEL_SIGNAL, DEFAULT_QUEUE_CAPACITY};
pub use validate::{parse_duration, parse_signal};

/// Configuration captured by a runner before it starts.
#[derive(Clone)]
pub struct RunnerConfig {
    /// Parent token. The run derives a child token from it; cancelling the
    /// parent cancels the run.
    pub cancellation: Option<CancellationToken>,
    /// Signal sent to the child when the run is cancelled.
    pub cancel_signal: Signal,
    /// Receiver for diagnostic events. `None` forwards them to `tracing`.
    pub trace: Option<SharedTrace>,
    /// Capacity of the shared output queue. Must be at least 1.
    pub queue_capacity: usize,
    /// Status reported for an indeterminate termination state.
    pub indeterminate_exit_code: i32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from_settings(&RunnerSettings::default())
    }
}

impl fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("cancellation", &self.cancellation)
            .field("cancel_signal", &self.cancel_signal)
            .field("trace", &self.trace.is_some())
            .field("queue_capacity", &self.queue_capacity)
            .field("indeterminate_exit_code", &self.indeterminate_exit_code)
            .finish()
    }
}

impl RunnerConfig {
    /// Runtime config from validated settings. The settings' `timeout` is not
    /// applied here; deadlines are layered onto the cancellation token by the
    /// caller.
    pub fn from_settings(settings: &RunnerSettings) -> Self {
        Self {
            cancellation: None,
            cancel_signal: settings.cancel_signal,
            trace: None,
            queue_capacity: settings.queue_capacity,
            indeterminate_exit_code: settings.indeterminate_exit_code,
        }
    }

    pub fn with_trace(mut self, trace: impl TraceSink + 'static) -> Self {
        self.trace = Some(Arc::new(trace));
        self
    }

    pub(crate) fn trace_sink(&self) -> SharedTrace {
        match &self.trace {
            Some(trace) => Arc::clone(trace),
            None => Arc::new(TracingTrace),
        }
    }
}
