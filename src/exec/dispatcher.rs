// src/exec/dispatcher.rs

//! Single consumer of the shared output queue.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sink::OutputSink;
use crate::trace::{SharedTrace, TraceEvent};
use crate::types::OutputItem;

/// Spawn the dispatcher task. It resolves to the number of delivered items.
///
/// The dispatcher runs until either:
/// - every producer has dropped its sender and the queue is empty, or
/// - `cancel` fires. The queue is then closed to new items, whatever was
///   already buffered is still delivered, and the task stops.
///
/// The sink is owned by the task, so it is never invoked concurrently.
pub fn spawn_dispatcher<S: OutputSink>(
    mut queue: mpsc::Receiver<OutputItem>,
    mut sink: S,
    cancel: CancellationToken,
    trace: SharedTrace,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut delivered = 0usize;

        let cancelled = loop {
            tokio::select! {
                item = queue.recv() => match item {
                    Some(item) => {
                        sink.handle(item);
                        delivered += 1;
                    }
                    None => break false,
                },
                _ = cancel.cancelled() => break true,
            }
        };

        if cancelled {
            queue.close();
            while let Ok(item) = queue.try_recv() {
                sink.handle(item);
                delivered += 1;
            }
        }

        trace.event(TraceEvent::DispatcherStopped {
            delivered,
            cancelled,
        });
        delivered
    })
}
