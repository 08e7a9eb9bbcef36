// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod sink;
pub mod trace;
pub mod types;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{RunnerConfig, RunnerSettings, default_config_path, load_and_validate};

pub use crate::errors::CmdRunnerError;
pub use crate::exec::{CmdRunner, ExitOutcome, RunHandle};
pub use crate::sink::OutputSink;
pub use crate::trace::{NoopTrace, TraceEvent, TraceSink, TracingTrace};
pub use crate::types::{OutputItem, StreamKind};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings (file + CLI overrides)
/// - the command to run
/// - cancellation on Ctrl-C and on `--timeout`
/// - printing of delivered lines
///
/// Returns the resolved exit status of the command.
pub async fn run(args: CliArgs) -> Result<i32> {
    let settings = resolve_settings(&args)?;
    debug!(?settings, "resolved runner settings");

    let cancel = CancellationToken::new();
    // Stops the Ctrl-C listener and the deadline on every return path.
    let _stop_helpers = cancel.clone().drop_guard();

    spawn_interrupt_listener(cancel.clone());
    if let Some(timeout) = settings.timeout {
        spawn_deadline(cancel.clone(), timeout);
    }

    let mut command = Command::new(&args.program);
    command.args(&args.args);

    let config = RunnerConfig {
        cancellation: Some(cancel),
        ..RunnerConfig::from_settings(&settings)
    };

    let tag_streams = args.tag_streams;
    let mut handle = CmdRunner::new(command)
        .with_config(config)
        .start(move |item: OutputItem| print_item(&item, tag_streams))
        .with_context(|| format!("starting '{}'", args.program))?;

    let status = handle.wait_exit().await;
    info!(
        program = %args.program,
        status,
        outcome = ?handle.outcome(),
        lines = handle.delivered(),
        "command finished"
    );
    Ok(status)
}

/// Cancel `cancel` on Ctrl-C. The task ends once `cancel` fires for any
/// reason.
pub fn spawn_interrupt_listener(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => {
                    info!("Ctrl+C received; cancelling command");
                    cancel.cancel();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl+C"),
            },
            _ = cancel.cancelled() => {}
        }
    })
}

/// Cancel `cancel` once `after` has elapsed. The task ends early if `cancel`
/// fires first.
pub fn spawn_deadline(cancel: CancellationToken, after: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(after) => {
                info!(?after, "timeout elapsed; cancelling command");
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    })
}

fn resolve_settings(args: &CliArgs) -> Result<RunnerSettings> {
    let mut settings = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_and_validate(&path)
                    .with_context(|| format!("loading settings from {}", path.display()))?
            } else {
                RunnerSettings::default()
            }
        }
    };

    if let Some(signal) = &args.signal {
        settings.cancel_signal = config::parse_signal(signal)?;
    }
    if let Some(timeout) = &args.timeout {
        settings.timeout = Some(config::parse_duration(timeout)?);
    }

    Ok(settings)
}

fn print_item(item: &OutputItem, tag_streams: bool) {
    // A closed stdout/stderr on our side must not take the run down.
    let _ = match (item.stream, tag_streams) {
        (StreamKind::Stdout, false) => writeln!(std::io::stdout(), "{}", item.text),
        (StreamKind::Stderr, false) => writeln!(std::io::stderr(), "{}", item.text),
        (StreamKind::Stdout, true) => writeln!(std::io::stdout(), "{item}"),
        (StreamKind::Stderr, true) => writeln!(std::io::stderr(), "{item}"),
    };
}
