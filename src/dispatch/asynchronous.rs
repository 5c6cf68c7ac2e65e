//! AsyncDispatcher - one background thread fed by an unbounded queue
//!
//! `dispatch` never blocks and never drops: each (event, observer, reply)
//! job goes onto an unbounded channel that a single named worker thread
//! drains in FIFO order. Shutdown closes the channel; the worker finishes
//! every job already queued and then exits.

use crate::core::config::DispatcherConfig;
use crate::dispatch::dispatcher::{Delivery, EventDispatcher};
use crate::dispatch::error::{DispatchError, DispatchResult};
use crate::dispatch::failure::{report_failure, FailureHandler};
use crate::dispatch::invoke::{invoke, Outcome};
use crate::dispatch::reply::{Dispatched, Reply, ReplyResult};
use crate::observers::event::Event;
use crate::observers::registry::SharedObserver;
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

struct Job<P, R> {
    event: Arc<Event<P>>,
    observer: SharedObserver<P, R>,
    reply: Option<oneshot::Sender<ReplyResult<R>>>,
}

/// Owned handle to the worker thread
///
/// Pass it to [`AsyncDispatcher::shutdown`] to drain and join.
#[derive(Debug)]
pub struct DispatcherHandle {
    name: String,
    thread: JoinHandle<()>,
}

impl DispatcherHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Whether the calling thread is this worker
    pub fn is_current(&self) -> bool {
        self.thread.thread().id() == std::thread::current().id()
    }
}

pub struct AsyncDispatcher<P, R> {
    queue: RwLock<Option<mpsc::UnboundedSender<Job<P, R>>>>,
    thread_name: String,
}

impl<P, R> AsyncDispatcher<P, R>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Spawn the worker thread named by `config.thread_name`
    pub fn start(
        config: &DispatcherConfig,
        failure_handler: Arc<dyn FailureHandler>,
    ) -> DispatchResult<(Self, DispatcherHandle)> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let name = config.thread_name.clone();
        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || work(receiver, failure_handler))
            .map_err(|source| DispatchError::Spawn {
                name: name.clone(),
                source,
            })?;
        log::debug!("Dispatcher thread '{}' started", name);

        let dispatcher = Self {
            queue: RwLock::new(Some(sender)),
            thread_name: name.clone(),
        };
        Ok((dispatcher, DispatcherHandle { name, thread }))
    }

    /// Close the queue; the worker drains what is already queued, then exits
    ///
    /// Later dispatches fail with [`DispatchError::ShutDown`]. Idempotent.
    pub fn close(&self) {
        let mut queue = self
            .queue
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if queue.take().is_some() {
            log::debug!("Dispatcher '{}' queue closed", self.thread_name);
        }
    }

    /// Close the queue and join the worker once it has drained
    ///
    /// Called from the worker itself (an observer stopping its own manager),
    /// the queue is closed and the worker is detached instead of joined; it
    /// exits on its own once the remaining jobs are done.
    pub fn shutdown(&self, handle: DispatcherHandle) -> DispatchResult<()> {
        self.close();
        if handle.is_current() {
            log::debug!(
                "Dispatcher thread '{}' shut down from itself, detaching",
                handle.name
            );
            return Ok(());
        }
        let DispatcherHandle { name, thread } = handle;
        thread
            .join()
            .map_err(|_| DispatchError::WorkerPanicked { name: name.clone() })?;
        log::debug!("Dispatcher thread '{}' joined", name);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.queue
            .read()
            .map(|queue| queue.is_none())
            .unwrap_or(true)
    }

}

impl<P, R> EventDispatcher<P, R> for AsyncDispatcher<P, R>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
{
    fn dispatch(
        &self,
        event: Arc<Event<P>>,
        observers: Vec<SharedObserver<P, R>>,
        delivery: Delivery,
    ) -> DispatchResult<Dispatched<R>> {
        // Held for the whole snapshot: close() cannot land between two jobs,
        // so either every observer is queued or none is.
        let queue = self
            .queue
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let sender = queue.as_ref().ok_or(DispatchError::ShutDown)?;
        if sender.is_closed() {
            return Err(DispatchError::ShutDown);
        }

        let mut replies = Vec::new();
        for observer in observers {
            let reply = match delivery {
                Delivery::RoundTrip => {
                    let (sender, receiver) = oneshot::channel();
                    replies.push(Reply::pending(receiver));
                    Some(sender)
                }
                Delivery::FireAndForget => None,
            };
            sender
                .send(Job {
                    event: Arc::clone(&event),
                    observer,
                    reply,
                })
                .map_err(|_| DispatchError::ShutDown)?;
        }
        Ok(Dispatched::new(replies))
    }
}

fn work<P, R>(mut receiver: mpsc::UnboundedReceiver<Job<P, R>>, failure_handler: Arc<dyn FailureHandler>) {
    let mut processed = 0usize;
    while let Some(job) = receiver.blocking_recv() {
        let Job {
            event,
            observer,
            reply,
        } = job;
        let outcome = invoke(observer.as_ref(), &event);

        if let Outcome::Failed(failure) = &outcome {
            report_failure(failure_handler.as_ref(), event.event_type(), failure);
        }

        // The caller may have dropped its reply; nothing to do then
        if let Some(reply) = reply {
            let _ = reply.send(outcome.into_reply());
        }
        processed += 1;
    }
    log::debug!("Dispatcher worker exiting after {} job(s)", processed);
}
