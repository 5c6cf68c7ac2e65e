//! Observers and hooks shared by the registry tests

use crate::observers::api::{Capability, DispatchHooks, Event, Observer, ObserverError, ResultSink};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replies with its own label for every event
pub(super) struct Labelled(pub(super) &'static str);

impl Observer<u32, String> for Labelled {
    fn can_handle_event(&self, _event: &Event<u32>) -> Capability {
        Capability::HandleWithReturn
    }

    fn on_event(&self, _event: &Event<u32>, sink: &mut ResultSink<String>) -> Result<(), ObserverError> {
        sink.put(self.0.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        self.0
    }
}

#[derive(Default)]
pub(super) struct CountingHooks {
    pub(super) before: AtomicUsize,
    pub(super) after: AtomicUsize,
}

impl DispatchHooks for CountingHooks {
    fn before_dispatch(&self) {
        self.before.fetch_add(1, Ordering::SeqCst);
    }

    fn after_dispatch(&self) {
        self.after.fetch_add(1, Ordering::SeqCst);
    }
}
