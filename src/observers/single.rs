//! SingleSlotRegistry - exactly one observer, wired once

use crate::core::sync::{handle_rwlock_write, read_ignoring_poison};
use crate::observers::error::{RegistryError, RegistryResult};
use crate::observers::registry::{DispatchHooks, NoHooks, ObserverRegistry, SharedObserver};
use std::sync::{Arc, RwLock};

/// Registry holding at most one observer
///
/// The observer is held strongly. A second `add` fails with
/// [`RegistryError::SlotOccupied`] and leaves the first observer in place.
pub struct SingleSlotRegistry<P, R> {
    slot: RwLock<Option<SharedObserver<P, R>>>,
    hooks: Arc<dyn DispatchHooks>,
}

impl<P, R> SingleSlotRegistry<P, R> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            hooks: Arc::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn add(&self, observer: SharedObserver<P, R>) -> RegistryResult<()> {
        let mut slot = handle_rwlock_write(self.slot.write(), |message| {
            RegistryError::Poisoned { message }
        })?;
        if slot.is_some() {
            log::warn!(
                "Rejected observer '{}': single-slot registry is occupied",
                observer.name()
            );
            return Err(RegistryError::SlotOccupied);
        }
        log::debug!("Registered observer '{}'", observer.name());
        *slot = Some(observer);
        Ok(())
    }

    pub fn observer(&self) -> Option<SharedObserver<P, R>> {
        read_ignoring_poison(self.slot.read()).clone()
    }
}

impl<P, R> Default for SingleSlotRegistry<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R> ObserverRegistry<P, R> for SingleSlotRegistry<P, R> {
    fn len(&self) -> usize {
        usize::from(read_ignoring_poison(self.slot.read()).is_some())
    }

    fn snapshot(&self) -> Vec<SharedObserver<P, R>> {
        self.observer().into_iter().collect()
    }

    fn before_dispatch(&self) {
        self.hooks.before_dispatch();
    }

    fn after_dispatch(&self) {
        self.hooks.after_dispatch();
    }
}
