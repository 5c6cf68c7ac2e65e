//! Manager lifecycle tracking

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// No observer registered
    Created,
    /// At least one observer registered
    Wired,
    /// One or more `trigger()` calls in progress; re-entrant
    Triggering,
    /// Stopped; any dispatcher thread has been joined, or detached when
    /// stopped from that thread itself
    Stopped,
}

#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    stopped: AtomicBool,
    active: AtomicUsize,
}

impl Lifecycle {
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Returns `false` if already stopped
    pub(crate) fn mark_stopped(&self) -> bool {
        !self.stopped.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn enter(&self) -> TriggerGuard<'_> {
        self.active.fetch_add(1, Ordering::SeqCst);
        TriggerGuard { lifecycle: self }
    }

    pub(crate) fn state(&self, wired: bool) -> ManagerState {
        if self.is_stopped() {
            ManagerState::Stopped
        } else if self.active.load(Ordering::SeqCst) > 0 {
            ManagerState::Triggering
        } else if wired {
            ManagerState::Wired
        } else {
            ManagerState::Created
        }
    }
}

pub(crate) struct TriggerGuard<'a> {
    lifecycle: &'a Lifecycle,
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.lifecycle.active.fetch_sub(1, Ordering::SeqCst);
    }
}
