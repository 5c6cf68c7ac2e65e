use crate::observers::api::{Capability, DispatchHooks, Event, Observer, ObserverError, ResultSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Replies with `payload + offset` and records the payloads it saw
pub(super) struct Adder {
    pub(super) offset: u64,
    pub(super) seen: Mutex<Vec<u64>>,
}

impl Adder {
    pub(super) fn new(offset: u64) -> Self {
        Self {
            offset,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn seen(&self) -> Vec<u64> {
        self.seen.lock().unwrap().clone()
    }
}

impl Observer<u64, u64> for Adder {
    fn can_handle_event(&self, _event: &Event<u64>) -> Capability {
        Capability::HandleWithReturn
    }

    fn on_event(&self, event: &Event<u64>, sink: &mut ResultSink<u64>) -> Result<(), ObserverError> {
        self.seen.lock().unwrap().push(*event.payload());
        sink.put(event.payload() + self.offset);
        Ok(())
    }
}

/// Always fails
pub(super) struct Broken;

impl Observer<u64, u64> for Broken {
    fn can_handle_event(&self, _event: &Event<u64>) -> Capability {
        Capability::HandleWithReturn
    }

    fn on_event(&self, _event: &Event<u64>, _sink: &mut ResultSink<u64>) -> Result<(), ObserverError> {
        Err("broken observer".into())
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[derive(Default)]
pub(super) struct CountingHooks {
    pub(super) before: AtomicUsize,
    pub(super) after: AtomicUsize,
}

impl CountingHooks {
    pub(super) fn counts(&self) -> (usize, usize) {
        (
            self.before.load(Ordering::SeqCst),
            self.after.load(Ordering::SeqCst),
        )
    }
}

impl DispatchHooks for CountingHooks {
    fn before_dispatch(&self) {
        self.before.fetch_add(1, Ordering::SeqCst);
    }

    fn after_dispatch(&self) {
        self.after.fetch_add(1, Ordering::SeqCst);
    }
}
