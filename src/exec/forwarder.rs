// src/exec/forwarder.rs

//! Per-stream forwarding task.

use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::exec::line_source::LineSource;
use crate::trace::{SharedTrace, TraceEvent};
use crate::types::{OutputItem, StreamKind};

/// Why a forwarder stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardEnd {
    /// The stream reached end-of-file (or failed to read).
    Drained,
    /// The run was cancelled; the stream was closed early.
    Cancelled,
    /// The dispatcher went away; nothing could be delivered anymore.
    QueueClosed,
}

/// Spawn a task that reads lines from `reader` and sends them, tagged with
/// `stream`, into `queue`.
///
/// Both the read and the enqueue race against `cancel`, so neither a silent
/// child nor a stalled consumer can keep the task alive after cancellation.
/// The reader is dropped (closing the pipe) exactly once, when the task
/// returns.
pub fn spawn_forwarder<R>(
    stream: StreamKind,
    reader: R,
    queue: mpsc::Sender<OutputItem>,
    cancel: CancellationToken,
    trace: SharedTrace,
) -> JoinHandle<ForwardEnd>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut source = LineSource::new(reader);
        let end = forward_lines(stream, &mut source, &queue, &cancel, &trace).await;
        drop(source);
        end
    })
}

async fn forward_lines<R: AsyncRead + Unpin>(
    stream: StreamKind,
    source: &mut LineSource<R>,
    queue: &mpsc::Sender<OutputItem>,
    cancel: &CancellationToken,
    trace: &SharedTrace,
) -> ForwardEnd {
    let mut lines = 0usize;

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                trace.event(TraceEvent::StreamClosed { stream, lines });
                return ForwardEnd::Cancelled;
            }
            next = source.next_line() => next,
        };

        let text = match next {
            Ok(Some(text)) => text,
            Ok(None) => {
                trace.event(TraceEvent::StreamEnded { stream, lines });
                return ForwardEnd::Drained;
            }
            Err(e) => {
                trace.event(TraceEvent::StreamReadError {
                    stream,
                    error: e.to_string(),
                });
                return ForwardEnd::Drained;
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                trace.event(TraceEvent::StreamClosed { stream, lines });
                return ForwardEnd::Cancelled;
            }
            sent = queue.send(OutputItem::new(stream, text)) => {
                if sent.is_err() {
                    return ForwardEnd::QueueClosed;
                }
                lines += 1;
            }
        }
    }
}
