//! Thread introspection sources for the deadlock monitor

use crate::core::sync::read_ignoring_poison;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::thread::{Thread, ThreadId};

/// Identifier reported by the introspection source for a blocked thread
pub type SystemThreadId = ThreadId;

/// Everything known about one thread at detection time
#[derive(Debug, Clone)]
pub struct ThreadDump {
    pub name: Option<String>,
    /// Live handle, when the introspector can resolve one
    pub thread: Option<Thread>,
    pub stack_trace: String,
}

impl ThreadDump {
    pub fn new(stack_trace: impl Into<String>) -> Self {
        Self {
            name: None,
            thread: None,
            stack_trace: stack_trace.into(),
        }
    }

    pub fn with_thread(mut self, thread: Thread) -> Self {
        self.name = thread.name().map(str::to_string);
        self.thread = Some(thread);
        self
    }
}

/// Result of one introspection pass
///
/// Each cycle lists the ids of the threads waiting on each other; `dumps`
/// must hold an entry for every id that appears in a cycle.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub cycles: Vec<Vec<SystemThreadId>>,
    pub dumps: HashMap<SystemThreadId, ThreadDump>,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.cycles.iter().all(Vec::is_empty)
    }
}

pub trait ThreadIntrospector: Send + Sync {
    /// Cycles across every synchronizer the source understands
    ///
    /// `None` when this kind of detection is unsupported, in which case the
    /// monitor falls back to [`monitor_cycles`](Self::monitor_cycles).
    fn synchronizer_cycles(&self) -> Option<Detection>;

    /// Cycles across plain monitor locks only
    fn monitor_cycles(&self) -> Detection;
}

/// Live handles of threads that registered themselves by id
///
/// Introspection sources only see thread ids. Threads that want their name
/// and handle in deadlock reports register here; cheap to clone, clones share
/// one table.
#[derive(Debug, Clone, Default)]
pub struct ThreadDirectory {
    threads: Arc<RwLock<HashMap<ThreadId, Thread>>>,
}

impl ThreadDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, thread: Thread) {
        self.threads
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(thread.id(), thread);
    }

    pub fn register_current(&self) {
        self.register(std::thread::current());
    }

    /// `false` if `id` was not registered
    pub fn forget(&self, id: ThreadId) -> bool {
        self.threads
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id)
            .is_some()
    }

    pub fn lookup(&self, id: ThreadId) -> Option<Thread> {
        read_ignoring_poison(self.threads.read()).get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        read_ignoring_poison(self.threads.read()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Introspector backed by `parking_lot`'s deadlock detector
///
/// Sees threads blocked on `parking_lot` locks only. The detector reports a
/// given cycle once; later calls return only deadlocks formed since.
/// Without a [`ThreadDirectory`], or for threads missing from it, dumps carry
/// the id and backtrace but no name or live handle.
#[derive(Debug, Default, Clone)]
pub struct ParkingLotIntrospector {
    directory: Option<ThreadDirectory>,
}

impl ParkingLotIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve names and handles of deadlocked threads through `directory`
    pub fn with_directory(directory: ThreadDirectory) -> Self {
        Self {
            directory: Some(directory),
        }
    }

    fn dump(&self, id: ThreadId, stack_trace: String) -> ThreadDump {
        let dump = ThreadDump::new(stack_trace);
        match self.directory.as_ref().and_then(|directory| directory.lookup(id)) {
            Some(thread) => dump.with_thread(thread),
            None => dump,
        }
    }
}

impl ThreadIntrospector for ParkingLotIntrospector {
    fn synchronizer_cycles(&self) -> Option<Detection> {
        let mut detection = Detection::default();
        for cycle in parking_lot::deadlock::check_deadlock() {
            let mut ids = Vec::with_capacity(cycle.len());
            for thread in &cycle {
                let id = thread.thread_id();
                let dump = self.dump(id, format!("{:?}", thread.backtrace()));
                detection.dumps.insert(id, dump);
                ids.push(id);
            }
            detection.cycles.push(ids);
        }
        Some(detection)
    }

    fn monitor_cycles(&self) -> Detection {
        Detection::default()
    }
}
