//! Shared buffer, stop protocol and consumer plumbing for both collector flavors
//!
//! The stopped flag and the enqueue happen under one write lock so that a
//! producer racing `request_stop` either lands before the `Stop` entry or is
//! rejected, never both. The consumer side never takes the lock.

use crate::collector::error::{CollectorError, CollectorResult};
use crate::collector::item::QueueItem;
use crate::core::cancel::CancellationToken;
use crate::core::error_handling::panic_message;
use crate::core::sync::{handle_rwlock_write, read_ignoring_poison};
use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::thread::JoinHandle;

pub(crate) struct CollectorCore<T> {
    stopped: RwLock<bool>,
    sender: Sender<QueueItem<T>>,
    receiver: Receiver<QueueItem<T>>,
    capacity: usize,
    delivered: AtomicUsize,
    failures: AtomicUsize,
}

impl<T> CollectorCore<T> {
    pub(crate) fn new(capacity: usize) -> CollectorResult<Self> {
        if capacity == 0 {
            return Err(CollectorError::InvalidCapacity { capacity });
        }
        let (sender, receiver) = bounded(capacity);
        Ok(Self {
            stopped: RwLock::new(false),
            sender,
            receiver,
            capacity,
            delivered: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        })
    }

    fn write_stopped(&self) -> CollectorResult<std::sync::RwLockWriteGuard<'_, bool>> {
        handle_rwlock_write(self.stopped.write(), |message| CollectorError::Poisoned {
            message,
        })
    }

    /// Blocking enqueue; waits while the buffer is full
    pub(crate) fn submit(&self, item: T) -> CollectorResult<()> {
        let stopped = self.write_stopped()?;
        if *stopped {
            return Err(CollectorError::Stopped);
        }
        self.sender
            .send(QueueItem::Payload(item))
            .map_err(|_| CollectorError::Disconnected)
    }

    pub(crate) fn submit_cancellable(
        &self,
        item: T,
        cancel: &CancellationToken,
    ) -> CollectorResult<()> {
        let stopped = self.write_stopped()?;
        if *stopped {
            return Err(CollectorError::Stopped);
        }
        if cancel.is_cancelled() {
            log::warn!("Collector submit cancelled before enqueue");
            return Err(CollectorError::Cancelled);
        }

        select! {
            send(self.sender, QueueItem::Payload(item)) -> sent => {
                sent.map_err(|_| CollectorError::Disconnected)
            }
            recv(cancel.signal()) -> _ => {
                log::warn!("Collector submit cancelled while waiting for capacity");
                Err(CollectorError::Cancelled)
            }
        }
    }

    pub(crate) fn try_submit(&self, item: T) -> CollectorResult<()> {
        let stopped = self.write_stopped()?;
        if *stopped {
            return Err(CollectorError::Stopped);
        }
        self.sender
            .try_send(QueueItem::Payload(item))
            .map_err(|e| match e {
                TrySendError::Full(_) => CollectorError::Full {
                    capacity: self.capacity,
                },
                TrySendError::Disconnected(_) => CollectorError::Disconnected,
            })
    }

    /// Flip the stopped flag and enqueue `Stop` atomically; repeat calls are no-ops
    ///
    /// Blocks while the buffer is full, like any other enqueue.
    pub(crate) fn request_stop(&self) -> CollectorResult<()> {
        let mut stopped = self.write_stopped()?;
        if *stopped {
            return Ok(());
        }
        *stopped = true;
        self.sender
            .send(QueueItem::Stop)
            .map_err(|_| CollectorError::Disconnected)?;
        log::debug!("Collector stop requested");
        Ok(())
    }

    pub(crate) fn receiver(&self) -> &Receiver<QueueItem<T>> {
        &self.receiver
    }

    pub(crate) fn len(&self) -> usize {
        let _stopped = read_ignoring_poison(self.stopped.read());
        self.receiver.len()
    }

    pub(crate) fn is_stopped(&self) -> bool {
        *read_ignoring_poison(self.stopped.read())
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub(crate) fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Invoke a performer call, isolating both `Err` and panics
    pub(crate) fn deliver<F>(&self, count: usize, call: F)
    where
        F: FnOnce() -> Result<(), crate::collector::performer::PerformError>,
    {
        self.delivered.fetch_add(count, Ordering::Relaxed);
        let failure = match catch_unwind(AssertUnwindSafe(call)) {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("performer panicked: {}", panic_message(payload.as_ref())),
        };
        self.failures.fetch_add(1, Ordering::Relaxed);
        log::error!("Collector performer failed on {} item(s): {}", count, failure);
    }
}

enum SlotState<P> {
    Unset,
    Ready(P),
    Running,
    Finished,
}

/// Holds the performer between `set_performer` and `run`
pub(crate) struct PerformerSlot<P> {
    state: Mutex<SlotState<P>>,
}

impl<P> PerformerSlot<P> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Unset),
        }
    }

    /// # Panics
    ///
    /// Panics if a performer was already set; a collector is wired exactly once.
    pub(crate) fn set(&self, performer: P) {
        let mut state = self.lock();
        if !matches!(*state, SlotState::Unset) {
            panic!("collector performer may only be set once");
        }
        *state = SlotState::Ready(performer);
    }

    /// Take the performer for the consumer loop
    ///
    /// Returns `None` if the loop already ran to completion.
    ///
    /// # Panics
    ///
    /// Panics if no performer was set, or if another thread is already running
    /// the consumer loop.
    pub(crate) fn take_for_run(&self) -> Option<P> {
        let mut state = self.lock();
        match &*state {
            SlotState::Unset => panic!("collector run() called before a performer was set"),
            SlotState::Running => panic!("collector run() is already active on another thread"),
            SlotState::Finished => return None,
            SlotState::Ready(_) => {}
        }
        match std::mem::replace(&mut *state, SlotState::Running) {
            SlotState::Ready(performer) => Some(performer),
            _ => None,
        }
    }

    pub(crate) fn finish(&self) {
        *self.lock() = SlotState::Finished;
    }

    // The state is a plain enum, always consistent, so poisoning is ignored
    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState<P>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owned handle to a consumer thread started by `start()`
///
/// Pass it back to the collector's `shutdown()` to stop, drain and join.
#[derive(Debug)]
pub struct CollectorHandle {
    name: String,
    thread: JoinHandle<()>,
}

impl CollectorHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

pub(crate) fn spawn_consumer<F>(name: &str, body: F) -> CollectorResult<CollectorHandle>
where
    F: FnOnce() + Send + 'static,
{
    let thread = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|source| CollectorError::Spawn {
            name: name.to_string(),
            source,
        })?;
    log::debug!("Collector consumer thread '{}' started", name);
    Ok(CollectorHandle {
        name: name.to_string(),
        thread,
    })
}

pub(crate) fn join_consumer(handle: CollectorHandle) -> CollectorResult<()> {
    let CollectorHandle { name, thread } = handle;
    thread
        .join()
        .map_err(|_| CollectorError::ConsumerPanicked { name: name.clone() })?;
    log::debug!("Collector consumer thread '{}' joined", name);
    Ok(())
}
