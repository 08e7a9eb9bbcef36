// src/exec/tracker.rs

//! Completion tracking for the stream forwarders.
//!
//! Instead of a shared counter, the tracker owns the forwarders' join
//! handles. Waiting consumes the tracker, so the "all drained" edge can only
//! be observed once.

use tokio::task::JoinHandle;
use tracing::warn;

use crate::exec::forwarder::ForwardEnd;
use crate::types::StreamKind;

#[derive(Debug, Default)]
pub struct DrainTracker {
    forwarders: Vec<(StreamKind, JoinHandle<ForwardEnd>)>,
}

impl DrainTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, stream: StreamKind, handle: JoinHandle<ForwardEnd>) {
        self.forwarders.push((stream, handle));
    }

    /// Number of forwarders that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.forwarders
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .count()
    }

    /// Wait until every tracked forwarder has terminated.
    ///
    /// A forwarder that panicked counts as terminated; its end reason is
    /// reported as `None`.
    pub async fn wait_drained(self) -> Vec<(StreamKind, Option<ForwardEnd>)> {
        let mut ends = Vec::with_capacity(self.forwarders.len());
        for (stream, handle) in self.forwarders {
            match handle.await {
                Ok(end) => ends.push((stream, Some(end))),
                Err(e) => {
                    warn!(%stream, error = %e, "stream forwarder task failed");
                    ends.push((stream, None));
                }
            }
        }
        ends
    }
}
