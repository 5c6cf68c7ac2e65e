//! Snapshots handed to deadlock listeners

use crate::deadlock::introspect::{SystemThreadId, ThreadDump};
use std::fmt;
use std::thread::Thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadDescriptor {
    pub id: SystemThreadId,
    pub name: Option<String>,
}

impl fmt::Display for ThreadDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "'{}' ({:?})", name, self.id),
            None => write!(f, "{:?}", self.id),
        }
    }
}

/// One thread taking part in a detected cycle, captured at detection time
#[derive(Debug, Clone)]
pub struct DeadlockSnapshot {
    descriptor: ThreadDescriptor,
    thread: Option<Thread>,
    stack_trace: String,
}

impl DeadlockSnapshot {
    pub(crate) fn from_dump(id: SystemThreadId, dump: &ThreadDump) -> Self {
        Self {
            descriptor: ThreadDescriptor {
                id,
                name: dump.name.clone(),
            },
            thread: dump.thread.clone(),
            stack_trace: dump.stack_trace.clone(),
        }
    }

    pub fn descriptor(&self) -> &ThreadDescriptor {
        &self.descriptor
    }

    /// Live handle of the thread, if the introspector could resolve one
    ///
    /// Always `None` from [`ParkingLotIntrospector`](crate::deadlock::api::ParkingLotIntrospector)
    /// unless the thread was registered in its
    /// [`ThreadDirectory`](crate::deadlock::api::ThreadDirectory).
    pub fn thread(&self) -> Option<&Thread> {
        self.thread.as_ref()
    }

    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }
}
