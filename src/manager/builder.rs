//! EventManagerBuilder - choosing one of the eight manager combinations

use crate::core::config::DispatcherConfig;
use crate::dispatch::asynchronous::AsyncDispatcher;
use crate::dispatch::dispatcher::Delivery;
use crate::dispatch::failure::{FailureHandler, LoggingFailureHandler};
use crate::dispatch::synchronous::SyncDispatcher;
use crate::manager::error::ManagerResult;
use crate::manager::manager::{Dispatcher, EventManager, Registry};
use crate::observers::multi::{MultiRegistry, UnregistrationListener};
use crate::observers::registry::{DispatchHooks, NoHooks};
use crate::observers::single::SingleSlotRegistry;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObserverMode {
    /// Exactly one observer, held strongly
    #[default]
    Single,
    /// Any number of weakly held observers
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Observers run on the triggering thread
    #[default]
    Synchronous,
    /// Observers run on one background dispatcher thread
    Asynchronous,
}

/// Builder for [`EventManager`]
///
/// Defaults: single observer, synchronous, fire-and-forget, logging failure
/// handler, no hooks.
///
/// # Example
///
/// ```
/// use concord::manager::api::{Delivery, DispatchMode, EventManager, ObserverMode};
///
/// let manager = EventManager::<String, usize>::builder()
///     .observers(ObserverMode::Multi)
///     .dispatch(DispatchMode::Asynchronous)
///     .delivery(Delivery::RoundTrip)
///     .build()
///     .unwrap();
///
/// assert_eq!(manager.observer_mode(), ObserverMode::Multi);
/// manager.stop().unwrap();
/// ```
pub struct EventManagerBuilder<P, R> {
    observer_mode: ObserverMode,
    dispatch_mode: DispatchMode,
    delivery: Delivery,
    dispatcher_config: DispatcherConfig,
    failure_handler: Arc<dyn FailureHandler>,
    hooks: Arc<dyn DispatchHooks>,
    unregistration_listener: Option<Arc<dyn UnregistrationListener>>,
    _types: PhantomData<fn() -> (P, R)>,
}

impl<P, R> EventManagerBuilder<P, R>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            observer_mode: ObserverMode::default(),
            dispatch_mode: DispatchMode::default(),
            delivery: Delivery::default(),
            dispatcher_config: DispatcherConfig::default(),
            failure_handler: Arc::new(LoggingFailureHandler),
            hooks: Arc::new(NoHooks),
            unregistration_listener: None,
            _types: PhantomData,
        }
    }

    pub fn observers(mut self, mode: ObserverMode) -> Self {
        self.observer_mode = mode;
        self
    }

    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = mode;
        self
    }

    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Dispatcher thread settings; only used in asynchronous mode
    pub fn config(mut self, config: &DispatcherConfig) -> Self {
        self.dispatcher_config = config.clone();
        self
    }

    pub fn failure_handler(mut self, handler: Arc<dyn FailureHandler>) -> Self {
        self.failure_handler = handler;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Listener for unregistrations; only used in multi-observer mode
    pub fn unregistration_listener(mut self, listener: Arc<dyn UnregistrationListener>) -> Self {
        self.unregistration_listener = Some(listener);
        self
    }

    /// Build the manager, starting the dispatcher thread in asynchronous mode
    pub fn build(self) -> ManagerResult<EventManager<P, R>> {
        let registry = match self.observer_mode {
            ObserverMode::Single => {
                Registry::Single(SingleSlotRegistry::new().with_hooks(self.hooks))
            }
            ObserverMode::Multi => {
                let registry = MultiRegistry::new().with_hooks(self.hooks);
                match self.unregistration_listener {
                    Some(listener) => Registry::Multi(registry.with_unregistration_listener(listener)),
                    None => Registry::Multi(registry),
                }
            }
        };

        let dispatcher = match self.dispatch_mode {
            DispatchMode::Synchronous => Dispatcher::Sync(SyncDispatcher::new(self.failure_handler)),
            DispatchMode::Asynchronous => {
                let (dispatcher, handle) =
                    AsyncDispatcher::start(&self.dispatcher_config, self.failure_handler)?;
                Dispatcher::Async {
                    dispatcher,
                    worker: Mutex::new(Some(handle)),
                }
            }
        };

        log::debug!(
            "Built event manager: {:?} observer(s), {:?} dispatch, {:?}",
            self.observer_mode,
            self.dispatch_mode,
            self.delivery
        );
        Ok(EventManager::from_parts(
            registry,
            dispatcher,
            self.observer_mode,
            self.dispatch_mode,
            self.delivery,
        ))
    }
}

impl<P, R> Default for EventManagerBuilder<P, R>
where
    P: Send + Sync + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
