//! Shared helpers for the integration tests

#![allow(dead_code)]

use concord::observers::api::{Capability, Event, Observer, ObserverError, ResultSink};
use std::sync::Mutex;

/// Records every payload; replies with the payload length
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Observer<String, usize> for Recorder {
    fn can_handle_event(&self, _event: &Event<String>) -> Capability {
        Capability::HandleWithReturn
    }

    fn on_event(&self, event: &Event<String>, sink: &mut ResultSink<usize>) -> Result<(), ObserverError> {
        self.seen.lock().unwrap().push(event.payload().clone());
        sink.put(event.payload().len());
        Ok(())
    }
}

pub const SAMPLE_CONFIG: &str = r#"
[pool]
capacity = 2

[collector]
capacity = 8
max_batch = 3

[dispatcher]
thread_name = "integration-dispatch"

[monitor]
interval_ms = 25
"#;
