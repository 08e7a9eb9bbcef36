// src/trace.rs

//! Diagnostic events emitted by a run.
//!
//! The runner never logs through a global logger on its own behalf; every
//! lifecycle step is reported to the [`TraceSink`] configured on the runner.
//! When none is configured, [`TracingTrace`] forwards the events into
//! `tracing` at debug level, which is a no-op unless a subscriber is
//! installed.

use std::sync::Arc;

use nix::sys::signal::Signal;
use tracing::debug;

use crate::exec::ExitOutcome;
use crate::types::StreamKind;

/// A single lifecycle event of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// The child process was spawned and both pipes were taken.
    ProcessStarted { pid: Option<u32> },
    /// A stream reached end-of-file on its own.
    StreamEnded { stream: StreamKind, lines: usize },
    /// Reading a stream failed; the stream is treated as ended.
    StreamReadError { stream: StreamKind, error: String },
    /// A stream was closed because the run was cancelled.
    StreamClosed { stream: StreamKind, lines: usize },
    /// The dispatcher stopped delivering output.
    DispatcherStopped { delivered: usize, cancelled: bool },
    /// The run observed its cancellation token firing.
    CancellationObserved,
    /// The termination signal was delivered to the child.
    SignalSent { signal: Signal, pid: u32 },
    /// The termination signal could not be delivered (usually because the
    /// child already exited).
    SignalFailed { signal: Signal, error: String },
    /// The exit status was resolved.
    ExitResolved { outcome: ExitOutcome, status: i32 },
}

/// Receiver for [`TraceEvent`]s.
///
/// Implementations may be called from any task, concurrently.
pub trait TraceSink: Send + Sync {
    fn event(&self, event: TraceEvent);
}

impl<F> TraceSink for F
where
    F: Fn(TraceEvent) + Send + Sync,
{
    fn event(&self, event: TraceEvent) {
        self(event)
    }
}

/// Shared handle to a trace sink, cloned into every task of a run.
pub type SharedTrace = Arc<dyn TraceSink>;

/// Forwards trace events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTrace;

impl TraceSink for TracingTrace {
    fn event(&self, event: TraceEvent) {
        match event {
            TraceEvent::ProcessStarted { pid } => {
                debug!(?pid, "cmdrunner: process started");
            }
            TraceEvent::StreamEnded { stream, lines } => {
                debug!(%stream, lines, "cmdrunner: stream reached end-of-file");
            }
            TraceEvent::StreamReadError { stream, error } => {
                debug!(%stream, %error, "cmdrunner: stream read failed; treating as ended");
            }
            TraceEvent::StreamClosed { stream, lines } => {
                debug!(%stream, lines, "cmdrunner: stream closed on cancellation");
            }
            TraceEvent::DispatcherStopped {
                delivered,
                cancelled,
            } => {
                debug!(delivered, cancelled, "cmdrunner: dispatcher stopped");
            }
            TraceEvent::CancellationObserved => {
                debug!("cmdrunner: cancellation observed");
            }
            TraceEvent::SignalSent { signal, pid } => {
                debug!(signal = signal.as_str(), pid, "cmdrunner: sent termination signal");
            }
            TraceEvent::SignalFailed { signal, error } => {
                debug!(signal = signal.as_str(), %error, "cmdrunner: failed to signal process");
            }
            TraceEvent::ExitResolved { outcome, status } => {
                debug!(?outcome, status, "cmdrunner: exit status resolved");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrace;

impl TraceSink for NoopTrace {
    fn event(&self, _event: TraceEvent) {}
}
