// tests/runner_scenarios.rs

use std::error::Error;
use std::time::Duration;

use nix::sys::signal::Signal;
use tokio_util::sync::CancellationToken;

use cmdrunner::{CmdRunner, CmdRunnerError, ExitOutcome, OutputItem, StreamKind, TraceEvent};
use cmdrunner_test_utils::builders::sh;
use cmdrunner_test_utils::recorders::{CollectingSink, RecordingTrace};
use cmdrunner_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn stdout_lines_are_delivered_in_order_then_exit_zero() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();

    let mut run = CmdRunner::new(sh("echo a; echo b")).start(collector.sink())?;
    let status = with_timeout(run.wait_exit()).await;

    assert_eq!(status, 0);
    assert_eq!(
        collector.items(),
        vec![OutputItem::stdout("a"), OutputItem::stdout("b")]
    );
    assert_eq!(run.outcome(), Some(ExitOutcome::NormalExit(0)));
    assert_eq!(run.delivered(), 2);
    Ok(())
}

#[tokio::test]
async fn stderr_line_and_exit_code_42() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();

    let mut run = CmdRunner::new(sh("echo oops >&2; exit 42")).start(collector.sink())?;
    let status = with_timeout(run.wait_exit()).await;

    assert_eq!(status, 42);
    assert_eq!(collector.items(), vec![OutputItem::stderr("oops")]);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_codes_are_reported_verbatim() -> TestResult {
    init_tracing();
    for code in [1, 2, 127, 255] {
        let collector = CollectingSink::new();
        let mut run = CmdRunner::new(sh(&format!("exit {code}"))).start(collector.sink())?;
        assert_eq!(with_timeout(run.wait_exit()).await, code);
        assert!(collector.is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn all_lines_from_both_streams_are_delivered_before_wait_returns() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();

    let script = "for i in 1 2 3 4 5; do echo out$i; echo err$i >&2; done; echo; echo '' >&2";
    let mut run = CmdRunner::new(sh(script)).start(collector.sink())?;
    let status = with_timeout(run.wait_exit()).await;

    assert_eq!(status, 0);
    assert_eq!(collector.len(), 12);
    assert_eq!(
        collector.texts(StreamKind::Stdout),
        vec!["out1", "out2", "out3", "out4", "out5", ""]
    );
    assert_eq!(
        collector.texts(StreamKind::Stderr),
        vec!["err1", "err2", "err3", "err4", "err5", ""]
    );
    Ok(())
}

#[tokio::test]
async fn unterminated_last_line_is_delivered() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();

    let mut run = CmdRunner::new(sh("printf 'one\\ntwo'")).start(collector.sink())?;
    assert_eq!(with_timeout(run.wait_exit()).await, 0);
    assert_eq!(collector.texts(StreamKind::Stdout), vec!["one", "two"]);
    Ok(())
}

#[tokio::test]
async fn large_output_on_both_streams_with_tiny_queue_does_not_deadlock() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();

    // The child fills the stderr pipe only after stdout is done; both must be
    // drained concurrently for it to exit.
    let mut run = CmdRunner::new(sh("seq 1 5000; seq 1 5000 >&2"))
        .with_queue_capacity(1)
        .start(collector.sink())?;
    let status = with_timeout(run.wait_exit()).await;

    assert_eq!(status, 0);
    assert_eq!(collector.len(), 10_000);
    let expected: Vec<String> = (1..=5000).map(|i| i.to_string()).collect();
    assert_eq!(collector.texts(StreamKind::Stdout), expected);
    assert_eq!(collector.texts(StreamKind::Stderr), expected);
    Ok(())
}

#[tokio::test]
async fn cancellation_signals_once_and_reports_signaled_exit() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();
    let recorder = RecordingTrace::new();
    let cancel = CancellationToken::new();

    let mut run = CmdRunner::new(sh("echo partial; exec sleep 5"))
        .with_cancellation(cancel.clone())
        .with_trace(recorder.sink())
        .start(collector.sink())?;

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            cancel.cancel();
        })
    };

    let status = with_timeout(run.wait_exit()).await;
    canceller.await?;

    assert_eq!(run.outcome(), Some(ExitOutcome::Signaled(Signal::SIGTERM as i32)));
    assert_eq!(status, 128 + Signal::SIGTERM as i32);
    assert_ne!(status, 0);
    assert_eq!(collector.texts(StreamKind::Stdout), vec!["partial"]);

    assert_eq!(run.signals_sent(), 1);
    assert_eq!(
        recorder.count(|e| matches!(e, TraceEvent::SignalSent { .. })),
        1
    );
    assert_eq!(
        recorder.count(|e| matches!(e, TraceEvent::CancellationObserved)),
        1
    );
    Ok(())
}

#[tokio::test]
async fn cancelling_a_busy_writer_signals_once_and_returns() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();

    let mut run = CmdRunner::new(sh("exec yes line"))
        .with_queue_capacity(4)
        .start(collector.sink())?;

    let token = run.cancellation();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });

    let status = with_timeout(run.wait_exit()).await;

    assert_eq!(run.signals_sent(), 1);
    // The child may die from SIGPIPE once its pipe is dropped, before the
    // cancel signal lands.
    assert!(
        matches!(
            run.outcome(),
            Some(ExitOutcome::Signaled(_) | ExitOutcome::NormalExit(_))
        ),
        "unexpected outcome {:?} (status {status})",
        run.outcome()
    );
    assert_ne!(status, 0);
    assert!(!collector.is_empty());
    assert!(collector.texts(StreamKind::Stdout).iter().all(|t| t == "line"));
    assert_eq!(run.delivered(), collector.len());
    Ok(())
}

#[tokio::test]
async fn custom_cancel_signal_is_used() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();

    let mut run = CmdRunner::new(sh("exec sleep 5"))
        .with_cancel_signal(Signal::SIGKILL)
        .start(collector.sink())?;

    let token = run.cancellation();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let status = with_timeout(run.wait_exit()).await;
    assert_eq!(run.outcome(), Some(ExitOutcome::Signaled(Signal::SIGKILL as i32)));
    assert_eq!(status, 137);
    Ok(())
}

#[tokio::test]
async fn already_cancelled_token_still_terminates_the_run() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut run = CmdRunner::new(sh("exec sleep 5"))
        .with_cancellation(cancel)
        .start(collector.sink())?;

    let status = with_timeout(run.wait_exit()).await;
    assert_ne!(status, 0);
    assert_eq!(run.signals_sent(), 1);
    Ok(())
}

#[tokio::test]
async fn cancelling_a_run_leaves_the_parent_token_alone() -> TestResult {
    init_tracing();
    let parent = CancellationToken::new();
    let collector = CollectingSink::new();

    let mut run = CmdRunner::new(sh("exec sleep 5"))
        .with_cancellation(parent.clone())
        .start(collector.sink())?;
    run.cancel();

    with_timeout(run.wait_exit()).await;
    assert!(!parent.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn cancellation_after_exit_sends_no_signal() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();
    let cancel = CancellationToken::new();

    let mut run = CmdRunner::new(sh("echo done"))
        .with_cancellation(cancel.clone())
        .start(collector.sink())?;
    assert_eq!(with_timeout(run.wait_exit()).await, 0);

    cancel.cancel();
    assert_eq!(run.wait_exit().await, 0);
    assert_eq!(run.signals_sent(), 0);
    Ok(())
}

#[tokio::test]
async fn second_wait_returns_the_cached_status() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();
    let recorder = RecordingTrace::new();

    let mut run = CmdRunner::new(sh("exit 7"))
        .with_trace(recorder.sink())
        .start(collector.sink())?;

    assert_eq!(with_timeout(run.wait_exit()).await, 7);
    assert_eq!(with_timeout(run.wait_exit()).await, 7);

    // Resolution happened exactly once.
    assert_eq!(
        recorder.count(|e| matches!(e, TraceEvent::ExitResolved { .. })),
        1
    );
    Ok(())
}

#[tokio::test]
async fn missing_program_fails_to_start() {
    init_tracing();
    let collector = CollectingSink::new();

    let result = CmdRunner::new(tokio::process::Command::new(
        "/nonexistent/cmdrunner-test-binary",
    ))
    .start(collector.sink());

    match result {
        Err(CmdRunnerError::ProcessStart(_)) => {}
        other => panic!("expected ProcessStart, got {other:?}"),
    }
    assert!(collector.is_empty());
}

#[tokio::test]
async fn zero_queue_capacity_is_rejected_before_spawning() {
    init_tracing();
    let collector = CollectingSink::new();
    let recorder = RecordingTrace::new();

    let result = CmdRunner::new(sh("echo never"))
        .with_queue_capacity(0)
        .with_trace(recorder.sink())
        .start(collector.sink());

    match result {
        Err(CmdRunnerError::ConfigError(_)) => {}
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert_eq!(
        recorder.count(|e| matches!(e, TraceEvent::ProcessStarted { .. })),
        0
    );
}

#[tokio::test]
async fn std_command_can_be_used_directly() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();

    let mut cmd = std::process::Command::new("echo");
    cmd.arg("from std");
    let mut run = CmdRunner::from(cmd).start(collector.sink())?;

    assert_eq!(with_timeout(run.wait_exit()).await, 0);
    assert_eq!(collector.items(), vec![OutputItem::stdout("from std")]);
    Ok(())
}

#[tokio::test]
async fn trace_reports_the_run_lifecycle() -> TestResult {
    init_tracing();
    let collector = CollectingSink::new();
    let recorder = RecordingTrace::new();

    let mut run = CmdRunner::new(sh("echo hi"))
        .with_trace(recorder.sink())
        .start(collector.sink())?;
    assert!(run.id().is_some());
    with_timeout(run.wait_exit()).await;

    let events = recorder.events();
    assert!(matches!(events.first(), Some(TraceEvent::ProcessStarted { pid: Some(_) })));
    assert!(events.contains(&TraceEvent::StreamEnded {
        stream: StreamKind::Stdout,
        lines: 1
    }));
    assert!(events.contains(&TraceEvent::StreamEnded {
        stream: StreamKind::Stderr,
        lines: 0
    }));
    assert!(events.contains(&TraceEvent::DispatcherStopped {
        delivered: 1,
        cancelled: false
    }));
    assert_eq!(
        events.last(),
        Some(&TraceEvent::ExitResolved {
            outcome: ExitOutcome::NormalExit(0),
            status: 0
        })
    );
    Ok(())
}
