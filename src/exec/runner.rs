// src/exec/runner.rs

//! Public entry point: bind a command, start it, wait for its exit status.

use std::fmt;
use std::process::Stdio;

use nix::sys::signal::Signal;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::warn;

use crate::config::RunnerConfig;
use crate::errors::{CmdRunnerError, Result};
use crate::exec::cancel::CancelCoordinator;
use crate::exec::dispatcher::spawn_dispatcher;
use crate::exec::exit::ExitOutcome;
use crate::exec::forwarder::spawn_forwarder;
use crate::exec::tracker::DrainTracker;
use crate::sink::OutputSink;
use crate::trace::{SharedTrace, TraceEvent, TraceSink};
use crate::types::StreamKind;

/// Runs exactly one child process and streams its output line by line.
///
/// The command (program, arguments, working directory, environment, stdin)
/// is built by the caller. The runner only takes over stdout and stderr,
/// which it always pipes.
///
/// ```no_run
/// # async fn demo() -> cmdrunner::errors::Result<()> {
/// use cmdrunner::{CmdRunner, OutputItem};
/// use tokio::process::Command;
///
/// let cmd = Command::new("env");
/// let mut run = CmdRunner::new(cmd).start(|item: OutputItem| println!("{item}"))?;
/// let status = run.wait_exit().await;
/// # let _ = status;
/// # Ok(())
/// # }
/// ```
pub struct CmdRunner {
    command: Command,
    config: RunnerConfig,
}

impl fmt::Debug for CmdRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmdRunner")
            .field("command", &self.command)
            .field("config", &self.config)
            .finish()
    }
}

impl From<std::process::Command> for CmdRunner {
    fn from(command: std::process::Command) -> Self {
        Self::new(Command::from(command))
    }
}

impl CmdRunner {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            config: RunnerConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Cancel the run when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.config.cancellation = Some(token);
        self
    }

    /// Signal sent to the child on cancellation. Defaults to `SIGTERM`.
    pub fn with_cancel_signal(mut self, signal: Signal) -> Self {
        self.config.cancel_signal = signal;
        self
    }

    pub fn with_trace(mut self, trace: impl TraceSink + 'static) -> Self {
        self.config = self.config.with_trace(trace);
        self
    }

    /// Capacity of the queue between the stream readers and the sink.
    /// Must be at least 1; `start` rejects 0.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn with_indeterminate_exit_code(mut self, code: i32) -> Self {
        self.config.indeterminate_exit_code = code;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Spawn the child and start delivering its output to `sink`.
    ///
    /// Must be called from within a Tokio runtime. Fails if the process can't
    /// be launched or one of its output pipes can't be obtained; in the
    /// latter case the half-started child is killed. A queue capacity of 0
    /// is rejected before anything is spawned.
    pub fn start<S: OutputSink>(mut self, sink: S) -> Result<RunHandle> {
        if self.config.queue_capacity == 0 {
            return Err(CmdRunnerError::ConfigError(
                "queue_capacity must be >= 1 (got 0)".to_string(),
            ));
        }

        let trace = self.config.trace_sink();
        let cancel = match &self.config.cancellation {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };

        self.command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = self.command.spawn().map_err(CmdRunnerError::ProcessStart)?;

        let Some(stdout) = child.stdout.take() else {
            abandon(&mut child);
            return Err(CmdRunnerError::PipeOpen(StreamKind::Stdout));
        };
        let Some(stderr) = child.stderr.take() else {
            abandon(&mut child);
            return Err(CmdRunnerError::PipeOpen(StreamKind::Stderr));
        };

        let pid = child.id();
        trace.event(TraceEvent::ProcessStarted { pid });

        let (queue_tx, queue_rx) = mpsc::channel(self.config.queue_capacity);

        let dispatcher = spawn_dispatcher(queue_rx, sink, cancel.clone(), trace.clone());

        let mut tracker = DrainTracker::new();
        tracker.track(
            StreamKind::Stdout,
            spawn_forwarder(
                StreamKind::Stdout,
                stdout,
                queue_tx.clone(),
                cancel.clone(),
                trace.clone(),
            ),
        );
        // Last sender moves into the stderr forwarder; once both forwarders
        // are gone the dispatcher sees a closed queue.
        tracker.track(
            StreamKind::Stderr,
            spawn_forwarder(StreamKind::Stderr, stderr, queue_tx, cancel.clone(), trace.clone()),
        );

        Ok(RunHandle {
            child,
            pid,
            tracker: Some(tracker),
            dispatcher: Some(dispatcher),
            coordinator: CancelCoordinator::new(self.config.cancel_signal, trace.clone()),
            _cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            trace,
            indeterminate_exit_code: self.config.indeterminate_exit_code,
            outcome: None,
            delivered: 0,
        })
    }
}

fn abandon(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!(error = %e, "failed to kill child after pipe setup failure");
    }
}

/// A started run.
///
/// Dropping the handle cancels the run and kills the child if it is still
/// alive.
pub struct RunHandle {
    child: Child,
    pid: Option<u32>,
    tracker: Option<DrainTracker>,
    dispatcher: Option<JoinHandle<usize>>,
    coordinator: CancelCoordinator,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
    trace: SharedTrace,
    indeterminate_exit_code: i32,
    outcome: Option<ExitOutcome>,
    delivered: usize,
}

impl fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHandle")
            .field("pid", &self.pid)
            .field("coordinator", &self.coordinator)
            .field("outcome", &self.outcome)
            .field("delivered", &self.delivered)
            .finish_non_exhaustive()
    }
}

impl RunHandle {
    /// Pid of the child as it was at start.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// The run's own cancellation token. Cancelling it cancels this run only.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Resolved outcome, once [`RunHandle::wait_exit`] has completed.
    pub fn outcome(&self) -> Option<ExitOutcome> {
        self.outcome
    }

    /// Number of lines handed to the sink. Final once `wait_exit` returned.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Number of termination signals sent to the child (0 or 1).
    pub fn signals_sent(&self) -> usize {
        self.coordinator.signals_sent()
    }

    /// Wait for both streams to drain, the sink to finish, and the child to
    /// exit, then return its exit status.
    ///
    /// Cancellation observed at any point sends the configured signal to the
    /// child (once). The child is reaped only after both streams are done, so
    /// a child blocked on a full pipe can never deadlock the wait.
    ///
    /// The outcome is cached: later calls return the same status without
    /// waiting on the process again.
    pub async fn wait_exit(&mut self) -> i32 {
        let outcome = match self.outcome {
            Some(outcome) => outcome,
            None => {
                let outcome = self.resolve().await;
                self.outcome = Some(outcome);
                let status = outcome.exit_status(self.indeterminate_exit_code);
                self.trace.event(TraceEvent::ExitResolved { outcome, status });
                outcome
            }
        };
        outcome.exit_status(self.indeterminate_exit_code)
    }

    async fn resolve(&mut self) -> ExitOutcome {
        let cancel = self.cancel.clone();

        if let Some(tracker) = self.tracker.take() {
            let drained = tracker.wait_drained();
            tokio::pin!(drained);
            loop {
                tokio::select! {
                    _ = &mut drained => break,
                    _ = cancel.cancelled(), if !self.coordinator.is_cancelled() => {
                        self.coordinator.on_cancel(&self.child);
                    }
                }
            }
        }

        if let Some(dispatcher) = self.dispatcher.take() {
            match dispatcher.await {
                Ok(delivered) => self.delivered = delivered,
                Err(e) => warn!(error = %e, "output dispatcher task failed"),
            }
        }

        let result = loop {
            if self.coordinator.is_cancelled() {
                break self.child.wait().await;
            }
            tokio::select! {
                res = self.child.wait() => break res,
                _ = cancel.cancelled() => {}
            }
            self.coordinator.on_cancel(&self.child);
        };

        if let Err(e) = &result {
            warn!(pid = ?self.pid, error = %e, "waiting for child process failed");
        }
        ExitOutcome::from_wait(&result)
    }
}
