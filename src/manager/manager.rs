//! EventManager - a registry and a dispatcher wired together

use crate::core::error_handling::log_error_with_context;
use crate::dispatch::asynchronous::{AsyncDispatcher, DispatcherHandle};
use crate::dispatch::dispatcher::{Delivery, EventDispatcher};
use crate::dispatch::reply::Dispatched;
use crate::dispatch::synchronous::SyncDispatcher;
use crate::manager::builder::{DispatchMode, EventManagerBuilder, ObserverMode};
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::state::{Lifecycle, ManagerState};
use crate::observers::error::RegistryError;
use crate::observers::event::Event;
use crate::observers::multi::{MultiRegistry, Registration};
use crate::observers::observer::Observer;
use crate::observers::registry::{ObserverRegistry, SharedObserver};
use crate::observers::single::SingleSlotRegistry;
use std::sync::{Arc, Mutex};

pub(crate) enum Registry<P, R> {
    Single(SingleSlotRegistry<P, R>),
    Multi(MultiRegistry<P, R>),
}

impl<P: 'static, R: 'static> Registry<P, R> {
    fn as_dyn(&self) -> &dyn ObserverRegistry<P, R> {
        match self {
            Registry::Single(registry) => registry,
            Registry::Multi(registry) => registry,
        }
    }
}

pub(crate) enum Dispatcher<P, R> {
    Sync(SyncDispatcher),
    Async {
        dispatcher: AsyncDispatcher<P, R>,
        worker: Mutex<Option<DispatcherHandle>>,
    },
}

/// Triggers events on registered observers
///
/// One of eight combinations of [`ObserverMode`] × [`DispatchMode`] ×
/// [`Delivery`], chosen at construction. Triggers with no registered
/// observer are no-ops: nothing is dispatched and the hooks do not run.
/// Otherwise `before_dispatch`, the dispatch over one registry snapshot, and
/// `after_dispatch` run in that order on the triggering thread.
///
/// # Example
///
/// ```
/// use concord::manager::api::EventManager;
/// use concord::observers::api::{Capability, Event, EventType, Observer, ObserverError, ResultSink};
/// use std::sync::Arc;
///
/// struct Length;
///
/// impl Observer<String, usize> for Length {
///     fn can_handle_event(&self, _event: &Event<String>) -> Capability {
///         Capability::HandleWithReturn
///     }
///
///     fn on_event(&self, event: &Event<String>, sink: &mut ResultSink<usize>) -> Result<(), ObserverError> {
///         sink.put(event.payload().len());
///         Ok(())
///     }
/// }
///
/// let manager = EventManager::<String, usize>::single_sync_round_trip().unwrap();
/// manager.add_observer(&Arc::new(Length)).unwrap();
///
/// let words = EventType::new("words");
/// let reply = manager
///     .trigger(Event::new(&words, "hello".to_string()))
///     .unwrap()
///     .wait_one();
/// assert_eq!(reply, Some(Ok(Some(5))));
/// ```
pub struct EventManager<P, R>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
{
    registry: Registry<P, R>,
    dispatcher: Dispatcher<P, R>,
    observer_mode: ObserverMode,
    dispatch_mode: DispatchMode,
    delivery: Delivery,
    lifecycle: Lifecycle,
}

impl<P, R> EventManager<P, R>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
{
    pub fn builder() -> EventManagerBuilder<P, R> {
        EventManagerBuilder::new()
    }

    pub(crate) fn from_parts(
        registry: Registry<P, R>,
        dispatcher: Dispatcher<P, R>,
        observer_mode: ObserverMode,
        dispatch_mode: DispatchMode,
        delivery: Delivery,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            observer_mode,
            dispatch_mode,
            delivery,
            lifecycle: Lifecycle::default(),
        }
    }

    fn combination(
        observers: ObserverMode,
        dispatch: DispatchMode,
        delivery: Delivery,
    ) -> ManagerResult<Self> {
        Self::builder()
            .observers(observers)
            .dispatch(dispatch)
            .delivery(delivery)
            .build()
    }

    pub fn single_sync() -> ManagerResult<Self> {
        Self::combination(ObserverMode::Single, DispatchMode::Synchronous, Delivery::FireAndForget)
    }

    pub fn single_sync_round_trip() -> ManagerResult<Self> {
        Self::combination(ObserverMode::Single, DispatchMode::Synchronous, Delivery::RoundTrip)
    }

    pub fn single_async() -> ManagerResult<Self> {
        Self::combination(ObserverMode::Single, DispatchMode::Asynchronous, Delivery::FireAndForget)
    }

    pub fn single_async_round_trip() -> ManagerResult<Self> {
        Self::combination(ObserverMode::Single, DispatchMode::Asynchronous, Delivery::RoundTrip)
    }

    pub fn multi_sync() -> ManagerResult<Self> {
        Self::combination(ObserverMode::Multi, DispatchMode::Synchronous, Delivery::FireAndForget)
    }

    pub fn multi_sync_round_trip() -> ManagerResult<Self> {
        Self::combination(ObserverMode::Multi, DispatchMode::Synchronous, Delivery::RoundTrip)
    }

    pub fn multi_async() -> ManagerResult<Self> {
        Self::combination(ObserverMode::Multi, DispatchMode::Asynchronous, Delivery::FireAndForget)
    }

    pub fn multi_async_round_trip() -> ManagerResult<Self> {
        Self::combination(ObserverMode::Multi, DispatchMode::Asynchronous, Delivery::RoundTrip)
    }

    /// Register an observer
    ///
    /// Single mode holds the observer and fails with
    /// [`RegistryError::SlotOccupied`] when one is already registered. Multi
    /// mode holds it weakly and returns `false` if it was already a member.
    pub fn add_observer<O>(&self, observer: &Arc<O>) -> ManagerResult<bool>
    where
        O: Observer<P, R> + 'static,
    {
        match &self.registry {
            Registry::Single(registry) => {
                registry.add(observer.clone())?;
                Ok(true)
            }
            Registry::Multi(registry) => Ok(registry.add(observer)),
        }
    }

    /// Register an observer for the lifetime of the returned guard
    ///
    /// Multi mode only; `Ok(None)` if it was already a member.
    pub fn register<O>(&self, observer: &Arc<O>) -> ManagerResult<Option<Registration>>
    where
        O: Observer<P, R> + 'static,
    {
        match &self.registry {
            Registry::Single(_) => Err(RegistryError::RemovalUnsupported.into()),
            Registry::Multi(registry) => Ok(registry.register(observer)),
        }
    }

    /// Multi mode only; `Ok(false)` if it was not a member
    pub fn remove_observer<O>(&self, observer: &Arc<O>) -> ManagerResult<bool>
    where
        O: Observer<P, R> + 'static,
    {
        match &self.registry {
            Registry::Single(_) => Err(RegistryError::RemovalUnsupported.into()),
            Registry::Multi(registry) => Ok(registry.remove(observer)),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.registry.as_dyn().len()
    }

    pub fn state(&self) -> ManagerState {
        self.lifecycle.state(!self.registry.as_dyn().is_empty())
    }

    pub fn observer_mode(&self) -> ObserverMode {
        self.observer_mode
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.dispatch_mode
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// Dispatch `event` to the registered observers
    ///
    /// Returns one reply per observer in the snapshot for round-trip
    /// delivery, none for fire-and-forget. May be called re-entrantly from
    /// inside an observer. Fails with [`ManagerError::Stopped`] after `stop()`.
    pub fn trigger<E>(&self, event: E) -> ManagerResult<Dispatched<R>>
    where
        E: Into<Arc<Event<P>>>,
    {
        if self.lifecycle.is_stopped() {
            return Err(ManagerError::Stopped);
        }
        let _triggering = self.lifecycle.enter();

        let registry = self.registry.as_dyn();
        if registry.is_empty() {
            return Ok(Dispatched::none());
        }

        registry.before_dispatch();
        let observers = registry.snapshot();
        let dispatched = self.dispatch(event.into(), observers);
        registry.after_dispatch();
        dispatched
    }

    fn dispatch(
        &self,
        event: Arc<Event<P>>,
        observers: Vec<SharedObserver<P, R>>,
    ) -> ManagerResult<Dispatched<R>> {
        let dispatched = match &self.dispatcher {
            Dispatcher::Sync(dispatcher) => dispatcher.dispatch(event, observers, self.delivery),
            Dispatcher::Async { dispatcher, .. } => {
                dispatcher.dispatch(event, observers, self.delivery)
            }
        };
        dispatched.map_err(ManagerError::from)
    }

    /// Stop the manager, draining and joining the dispatcher thread if any
    ///
    /// Idempotent. Pending round-trip replies still complete, since the
    /// worker drains its queue before exiting.
    pub fn stop(&self) -> ManagerResult<()> {
        if !self.lifecycle.mark_stopped() {
            return Ok(());
        }
        if let Dispatcher::Async { dispatcher, worker } = &self.dispatcher {
            let handle = worker
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take();
            if let Some(handle) = handle {
                dispatcher.shutdown(handle).map_err(ManagerError::Dispatch)?;
            }
        }
        log::debug!("Event manager stopped");
        Ok(())
    }
}

impl<P, R> Drop for EventManager<P, R>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
{
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log_error_with_context(&e, "Stopping event manager on drop");
        }
    }
}
