//! SingleCollector - one item per performer call, strict submission order

use crate::collector::core::{join_consumer, spawn_consumer, CollectorCore, CollectorHandle, PerformerSlot};
use crate::collector::error::CollectorResult;
use crate::collector::item::QueueItem;
use crate::collector::performer::Performer;
use crate::core::cancel::CancellationToken;
use crate::core::config::CollectorConfig;
use std::sync::Arc;

/// Bounded producer/consumer queue delivering items one at a time
///
/// Any number of producers call [`submit`](Self::submit); exactly one consumer
/// drains the buffer through [`run`](Self::run) (or a thread spawned by
/// [`start`](Self::start)) and hands each item to the performer in the order
/// it was accepted.
///
/// # Example
///
/// ```
/// use concord::collector::api::{PerformError, SingleCollector};
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let collector = Arc::new(SingleCollector::new(8).unwrap());
/// collector.set_performer(move |item: &'static str| -> Result<(), PerformError> {
///     sink.lock().unwrap().push(item);
///     Ok(())
/// });
///
/// let handle = collector.start("letters").unwrap();
/// for item in ["a", "b", "c"] {
///     collector.submit(item).unwrap();
/// }
/// collector.shutdown(handle).unwrap();
///
/// assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
/// ```
pub struct SingleCollector<T> {
    core: CollectorCore<T>,
    performer: PerformerSlot<Box<dyn Performer<T>>>,
}

impl<T: Send + 'static> SingleCollector<T> {
    pub fn new(capacity: usize) -> CollectorResult<Self> {
        Ok(Self {
            core: CollectorCore::new(capacity)?,
            performer: PerformerSlot::new(),
        })
    }

    pub fn with_config(config: &CollectorConfig) -> CollectorResult<Self> {
        Self::new(config.capacity)
    }

    /// Install the performer; must happen exactly once, before `run`
    ///
    /// # Panics
    ///
    /// Panics if a performer has already been set.
    pub fn set_performer<P>(&self, performer: P)
    where
        P: Performer<T> + 'static,
    {
        self.performer.set(Box::new(performer));
    }

    /// Enqueue an item, blocking while the buffer is full
    ///
    /// Fails with `CollectorError::Stopped` once `request_stop` has been called.
    pub fn submit(&self, item: T) -> CollectorResult<()> {
        self.core.submit(item)
    }

    /// Enqueue an item, giving up with `CollectorError::Cancelled` if `cancel`
    /// fires while waiting for space
    pub fn submit_cancellable(&self, item: T, cancel: &CancellationToken) -> CollectorResult<()> {
        self.core.submit_cancellable(item, cancel)
    }

    /// Enqueue without blocking; `CollectorError::Full` when there is no space
    pub fn try_submit(&self, item: T) -> CollectorResult<()> {
        self.core.try_submit(item)
    }

    pub fn request_stop(&self) -> CollectorResult<()> {
        self.core.request_stop()
    }

    /// Drain the buffer on the calling thread until the `Stop` entry
    ///
    /// Performer failures are logged and counted; they never end the loop.
    /// Calling `run` again after the loop has finished returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if no performer was set.
    pub fn run(&self) {
        let Some(mut performer) = self.performer.take_for_run() else {
            log::warn!("Collector run() called after the consumer loop finished");
            return;
        };

        while let Ok(item) = self.core.receiver().recv() {
            match item {
                QueueItem::Payload(item) => self.core.deliver(1, || performer.perform(item)),
                QueueItem::Stop => break,
            }
        }

        self.performer.finish();
        log::debug!(
            "Collector consumer loop finished after {} item(s)",
            self.core.delivered()
        );
    }

    /// Run the consumer loop on a new named thread
    pub fn start(self: &Arc<Self>, name: &str) -> CollectorResult<CollectorHandle> {
        let collector = Arc::clone(self);
        spawn_consumer(name, move || collector.run())
    }

    /// Request stop, then wait for the consumer to drain the buffer and exit
    pub fn shutdown(&self, handle: CollectorHandle) -> CollectorResult<()> {
        self.request_stop()?;
        join_consumer(handle)
    }

    /// Items waiting in the buffer (advisory)
    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_stopped(&self) -> bool {
        self.core.is_stopped()
    }

    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Items handed to the performer so far
    pub fn delivered(&self) -> usize {
        self.core.delivered()
    }

    /// Performer calls that returned an error or panicked
    pub fn failures(&self) -> usize {
        self.core.failures()
    }
}
