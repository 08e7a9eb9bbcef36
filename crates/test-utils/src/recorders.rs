use std::sync::{Arc, Mutex};

use cmdrunner::{OutputItem, StreamKind, TraceEvent};

/// Collects every delivered line, in delivery order.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    items: Arc<Mutex<Vec<OutputItem>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink closure feeding this collector, for `CmdRunner::start`.
    pub fn sink(&self) -> impl FnMut(OutputItem) + Send + 'static {
        let items = Arc::clone(&self.items);
        move |item: OutputItem| items.lock().unwrap().push(item)
    }

    pub fn items(&self) -> Vec<OutputItem> {
        self.items.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Texts delivered for one stream, in order.
    pub fn texts(&self, stream: StreamKind) -> Vec<String> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.stream == stream)
            .map(|item| item.text.clone())
            .collect()
    }
}

/// Records trace events for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingTrace {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl RecordingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace closure feeding this recorder, for `CmdRunner::with_trace`.
    pub fn sink(&self) -> impl Fn(TraceEvent) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |event: TraceEvent| events.lock().unwrap().push(event)
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&TraceEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}
