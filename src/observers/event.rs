//! Events and event types

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_EVENT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// Tag used by observers to decide whether an event concerns them
///
/// Equality is identity: every `EventType::new` call yields a type distinct
/// from all others, even under the same name. Clones compare equal.
#[derive(Clone)]
pub struct EventType {
    id: u64,
    name: Arc<str>,
}

impl EventType {
    pub fn new(name: &str) -> Self {
        Self {
            id: NEXT_EVENT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name; not used for matching
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventType({}#{})", self.name, self.id)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An immutable payload tagged with its [`EventType`]
#[derive(Debug, Clone)]
pub struct Event<P> {
    event_type: EventType,
    payload: P,
}

impl<P> Event<P> {
    pub fn new(event_type: &EventType, payload: P) -> Self {
        Self {
            event_type: event_type.clone(),
            payload,
        }
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn is_a(&self, event_type: &EventType) -> bool {
        self.event_type == *event_type
    }
}
