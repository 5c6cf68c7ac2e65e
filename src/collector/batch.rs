//! BatchCollector - opportunistic batching consumer
//!
//! The consumer blocks for the first item, then drains whatever else is
//! already buffered, up to `max_batch`, and hands the lot to the performer in
//! one call. Under light load batches are single items; under heavy load they
//! grow to the cap, trading latency for throughput.

use crate::collector::core::{join_consumer, spawn_consumer, CollectorCore, CollectorHandle, PerformerSlot};
use crate::collector::error::{CollectorError, CollectorResult};
use crate::collector::item::QueueItem;
use crate::collector::performer::BatchPerformer;
use crate::core::cancel::CancellationToken;
use crate::core::config::CollectorConfig;
use std::sync::Arc;

pub struct BatchCollector<T> {
    core: CollectorCore<T>,
    performer: PerformerSlot<Box<dyn BatchPerformer<T>>>,
    max_batch: usize,
}

impl<T: Send + 'static> BatchCollector<T> {
    pub fn new(capacity: usize, max_batch: usize) -> CollectorResult<Self> {
        if max_batch == 0 {
            return Err(CollectorError::InvalidBatchSize);
        }
        Ok(Self {
            core: CollectorCore::new(capacity)?,
            performer: PerformerSlot::new(),
            max_batch,
        })
    }

    pub fn with_config(config: &CollectorConfig) -> CollectorResult<Self> {
        Self::new(config.capacity, config.max_batch)
    }

    /// # Panics
    ///
    /// Panics if a performer has already been set.
    pub fn set_performer<P>(&self, performer: P)
    where
        P: BatchPerformer<T> + 'static,
    {
        self.performer.set(Box::new(performer));
    }

    pub fn submit(&self, item: T) -> CollectorResult<()> {
        self.core.submit(item)
    }

    pub fn submit_cancellable(&self, item: T, cancel: &CancellationToken) -> CollectorResult<()> {
        self.core.submit_cancellable(item, cancel)
    }

    pub fn try_submit(&self, item: T) -> CollectorResult<()> {
        self.core.try_submit(item)
    }

    pub fn request_stop(&self) -> CollectorResult<()> {
        self.core.request_stop()
    }

    /// Drain the buffer in batches on the calling thread until `Stop`
    ///
    /// Items that precede `Stop` in the buffer are still delivered, in the
    /// final batch if need be.
    ///
    /// # Panics
    ///
    /// Panics if no performer was set.
    pub fn run(&self) {
        let Some(mut performer) = self.performer.take_for_run() else {
            log::warn!("Batch collector run() called after the consumer loop finished");
            return;
        };
        let receiver = self.core.receiver();
        let mut batches = 0usize;

        'consume: while let Ok(first) = receiver.recv() {
            let mut batch = match first {
                QueueItem::Payload(item) => vec![item],
                QueueItem::Stop => break,
            };

            let mut stop_seen = false;
            while batch.len() < self.max_batch {
                match receiver.try_recv() {
                    Ok(QueueItem::Payload(item)) => batch.push(item),
                    Ok(QueueItem::Stop) => {
                        stop_seen = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            batches += 1;
            let count = batch.len();
            self.core.deliver(count, || performer.perform_batch(batch));

            if stop_seen {
                break 'consume;
            }
        }

        self.performer.finish();
        log::debug!(
            "Batch collector finished: {} item(s) in {} batch(es)",
            self.core.delivered(),
            batches
        );
    }

    pub fn start(self: &Arc<Self>, name: &str) -> CollectorResult<CollectorHandle> {
        let collector = Arc::clone(self);
        spawn_consumer(name, move || collector.run())
    }

    pub fn shutdown(&self, handle: CollectorHandle) -> CollectorResult<()> {
        self.request_stop()?;
        join_consumer(handle)
    }

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

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    pub fn delivered(&self) -> usize {
        self.core.delivered()
    }

    pub fn failures(&self) -> usize {
        self.core.failures()
    }
}
