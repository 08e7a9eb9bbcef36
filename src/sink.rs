// src/sink.rs

use crate::types::OutputItem;

/// Consumer of delivered output lines.
///
/// `handle` is called once per line, from the dispatcher task, and never
/// concurrently with itself. Implementations must not assume which thread
/// runs them.
pub trait OutputSink: Send + 'static {
    fn handle(&mut self, item: OutputItem);
}

impl<F> OutputSink for F
where
    F: FnMut(OutputItem) + Send + 'static,
{
    fn handle(&mut self, item: OutputItem) {
        self(item)
    }
}
