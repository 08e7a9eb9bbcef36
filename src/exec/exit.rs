// src/exec/exit.rs

//! Mapping of the raw wait result to a single exit status.

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Exit status used when the wait call itself failed, or when a signal
/// number could not be turned into a status.
pub const FALLBACK_EXIT_CODE: i32 = 1;

/// Offset added to a terminating signal number, following the shell
/// convention (`SIGTERM` -> 143).
pub const SIGNAL_EXIT_OFFSET: i32 = 128;

/// How the child process concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited on its own with this code.
    NormalExit(i32),
    /// Terminated by this signal.
    Signaled(i32),
    /// Waiting for the process failed.
    WaitError,
    /// The wait succeeded but reported neither a code nor a signal.
    Indeterminate,
}

impl ExitOutcome {
    /// Classify the result of `Child::wait`.
    pub fn from_wait(result: &io::Result<ExitStatus>) -> Self {
        match result {
            Ok(status) => Self::from_status(*status),
            Err(_) => ExitOutcome::WaitError,
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            ExitOutcome::NormalExit(code)
        } else if let Some(signal) = status.signal() {
            ExitOutcome::Signaled(signal)
        } else {
            ExitOutcome::Indeterminate
        }
    }

    /// The integer status for this outcome.
    ///
    /// `indeterminate` is returned for [`ExitOutcome::Indeterminate`]; callers
    /// that need to tell it apart from a real exit should match on the
    /// outcome instead.
    pub fn exit_status(self, indeterminate: i32) -> i32 {
        match self {
            ExitOutcome::NormalExit(code) => code,
            ExitOutcome::Signaled(signal) if signal > 0 => SIGNAL_EXIT_OFFSET + signal,
            ExitOutcome::Signaled(_) => FALLBACK_EXIT_CODE,
            ExitOutcome::WaitError => FALLBACK_EXIT_CODE,
            ExitOutcome::Indeterminate => indeterminate,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitOutcome::NormalExit(0)
    }

    pub fn is_indeterminate(self) -> bool {
        self == ExitOutcome::Indeterminate
    }
}
