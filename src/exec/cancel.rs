// src/exec/cancel.rs

//! Cancellation coordination: turns a fired token into a termination signal.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::Child;

use crate::trace::{SharedTrace, TraceEvent};

/// Sends the configured signal to the child when the run is cancelled.
///
/// The coordinator only requests termination; it never waits for the child.
/// It moves from active to cancelled exactly once, and the signal is sent at
/// most once per run.
pub struct CancelCoordinator {
    signal: Signal,
    cancelled: bool,
    signals_sent: usize,
    trace: SharedTrace,
}

impl std::fmt::Debug for CancelCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelCoordinator")
            .field("signal", &self.signal)
            .field("cancelled", &self.cancelled)
            .field("signals_sent", &self.signals_sent)
            .finish_non_exhaustive()
    }
}

impl CancelCoordinator {
    pub fn new(signal: Signal, trace: SharedTrace) -> Self {
        Self {
            signal,
            cancelled: false,
            signals_sent: 0,
            trace,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn signals_sent(&self) -> usize {
        self.signals_sent
    }

    /// Handle the cancellation edge.
    ///
    /// Only the first call does anything. `child` must not have been reaped
    /// yet; `Child::id` returns `None` once it has, in which case there is
    /// nothing left to signal.
    pub fn on_cancel(&mut self, child: &Child) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.trace.event(TraceEvent::CancellationObserved);

        let Some(pid) = child.id() else {
            self.trace.event(TraceEvent::SignalFailed {
                signal: self.signal,
                error: "process already reaped".to_string(),
            });
            return;
        };

        match signal::kill(Pid::from_raw(pid as i32), self.signal) {
            Ok(()) => {
                self.signals_sent += 1;
                self.trace.event(TraceEvent::SignalSent {
                    signal: self.signal,
                    pid,
                });
            }
            Err(errno) => {
                self.trace.event(TraceEvent::SignalFailed {
                    signal: self.signal,
                    error: errno.desc().to_string(),
                });
            }
        }
    }
}
