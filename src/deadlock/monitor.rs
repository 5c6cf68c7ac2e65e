//! DeadlockMonitor - polls for lock cycles and notifies listeners
//!
//! The monitor does not schedule itself: callers invoke [`DeadlockMonitor::run`]
//! from their own timer, or use [`DeadlockMonitor::spawn_periodic`] for a
//! dedicated polling thread with an explicit shutdown handle.

use crate::core::config::MonitorConfig;
use crate::core::error_handling::panic_message;
use crate::deadlock::error::{MonitorError, MonitorResult};
use crate::deadlock::introspect::{
    Detection, ParkingLotIntrospector, ThreadDirectory, ThreadIntrospector,
};
use crate::deadlock::snapshot::DeadlockSnapshot;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

/// Notified once per detected cycle, on the thread that called `run()`
///
/// The slice is never empty.
pub trait DeadlockListener: Send + Sync {
    fn on_deadlock(&self, snapshots: &[DeadlockSnapshot]);
}

impl<F> DeadlockListener for F
where
    F: Fn(&[DeadlockSnapshot]) + Send + Sync,
{
    fn on_deadlock(&self, snapshots: &[DeadlockSnapshot]) {
        self(snapshots)
    }
}

pub struct DeadlockMonitor {
    introspector: Box<dyn ThreadIntrospector>,
    listeners: RwLock<Vec<Arc<dyn DeadlockListener>>>,
}

impl DeadlockMonitor {
    pub fn new() -> Self {
        Self::with_introspector(Box::new(ParkingLotIntrospector::new()))
    }

    /// parking_lot detection, naming threads registered in `directory`
    pub fn with_directory(directory: ThreadDirectory) -> Self {
        Self::with_introspector(Box::new(ParkingLotIntrospector::with_directory(directory)))
    }

    pub fn with_introspector(introspector: Box<dyn ThreadIntrospector>) -> Self {
        Self {
            introspector,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register `listener`; `false` if it is already registered
    pub fn add_listener<L>(&self, listener: &Arc<L>) -> bool
    where
        L: DeadlockListener + 'static,
    {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if listeners.iter().any(|known| same_listener(known, listener)) {
            return false;
        }
        listeners.push(listener.clone());
        true
    }

    /// Unregister `listener`; `false` if it was not registered
    pub fn remove_listener<L>(&self, listener: &Arc<L>) -> bool
    where
        L: DeadlockListener + 'static,
    {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = listeners.len();
        listeners.retain(|known| !same_listener(known, listener));
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Poll once; returns the number of cycles detected
    ///
    /// Every listener is called once per cycle. With no listener registered,
    /// each cycle is logged at error level instead.
    ///
    /// # Panics
    ///
    /// Panics if the introspector reports a thread id in a cycle without a
    /// matching thread dump.
    pub fn run(&self) -> usize {
        let detection = self.detect();
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        let mut found = 0;
        for cycle in detection.cycles.iter().filter(|cycle| !cycle.is_empty()) {
            let snapshots: Vec<DeadlockSnapshot> = cycle
                .iter()
                .map(|id| match detection.dumps.get(id) {
                    Some(dump) => DeadlockSnapshot::from_dump(*id, dump),
                    None => panic!("deadlocked thread {id:?} has no matching thread dump"),
                })
                .collect();
            found += 1;

            let participants = snapshots
                .iter()
                .map(|snapshot| snapshot.descriptor().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if listeners.is_empty() {
                log::error!(
                    "Deadlock detected between {} with no listener registered",
                    participants
                );
                for snapshot in &snapshots {
                    log::debug!(
                        "Thread {} stack:\n{}",
                        snapshot.descriptor(),
                        snapshot.stack_trace()
                    );
                }
                continue;
            }

            log::warn!("Deadlock detected between {}", participants);
            for listener in &listeners {
                let notified = catch_unwind(AssertUnwindSafe(|| listener.on_deadlock(&snapshots)));
                if let Err(payload) = notified {
                    log::error!(
                        "Deadlock listener panicked: {}",
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        found
    }

    fn detect(&self) -> Detection {
        match self.introspector.synchronizer_cycles() {
            Some(detection) => detection,
            None => {
                log::debug!("Synchronizer detection unsupported, using monitor-only detection");
                self.introspector.monitor_cycles()
            }
        }
    }

    /// Call `run()` every `interval` on a named background thread
    pub fn spawn_periodic(self: &Arc<Self>, interval: Duration) -> MonitorResult<MonitorHandle> {
        let (stop, stopped) = bounded::<()>(1);
        let monitor = Arc::clone(self);
        let name = "concord-deadlock-monitor".to_string();
        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        monitor.run();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|source| MonitorError::Spawn {
                name: name.clone(),
                source,
            })?;
        log::debug!("Deadlock monitor polling every {:?}", interval);
        Ok(MonitorHandle { name, stop, thread })
    }

    pub fn spawn_with_config(self: &Arc<Self>, config: &MonitorConfig) -> MonitorResult<MonitorHandle> {
        self.spawn_periodic(config.interval())
    }
}

impl Default for DeadlockMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn same_listener<L: DeadlockListener>(known: &Arc<dyn DeadlockListener>, candidate: &Arc<L>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(known), Arc::as_ptr(candidate))
}

/// Owned handle to a polling thread started by `spawn_periodic`
#[derive(Debug)]
pub struct MonitorHandle {
    name: String,
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop polling and join the thread; a poll in progress completes first
    pub fn shutdown(self) -> MonitorResult<()> {
        let MonitorHandle { name, stop, thread } = self;
        drop(stop);
        thread
            .join()
            .map_err(|_| MonitorError::MonitorPanicked { name: name.clone() })?;
        log::debug!("Deadlock monitor thread '{}' joined", name);
        Ok(())
    }
}
