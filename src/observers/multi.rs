//! MultiRegistry - weakly held observer set backed by a handle table
//!
//! The registry never keeps an observer alive. Each member occupies a slot in
//! a generation-counted table and is addressed by an [`ObserverHandle`]; a
//! slot freed by removal gets a new generation before reuse, so stale handles
//! never unregister someone else.
//!
//! Members leave the set in three ways, each reported to the
//! [`UnregistrationListener`]:
//! - `remove()` was called
//! - the [`Registration`] guard returned by `register()` was dropped
//! - the observer itself was dropped, noticed when the table is next pruned

use crate::core::sync::{handle_rwlock_write, read_ignoring_poison};
use crate::observers::observer::Observer;
use crate::observers::registry::{DispatchHooks, NoHooks, ObserverRegistry, SharedObserver};
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

/// Address of a slot in the handle table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle {
    index: usize,
    generation: u64,
}

impl ObserverHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnregistrationReason {
    /// `remove()` was called
    Removed,
    /// The `Registration` guard was dropped
    Released,
    /// The observer was dropped while still registered
    Reclaimed,
}

/// Receives every unregistration, including implicit ones
///
/// Called after the registry lock has been released, on whichever thread
/// caused the unregistration.
pub trait UnregistrationListener: Send + Sync {
    fn on_unregistered(&self, handle: ObserverHandle, reason: UnregistrationReason);
}

impl<F> UnregistrationListener for F
where
    F: Fn(ObserverHandle, UnregistrationReason) + Send + Sync,
{
    fn on_unregistered(&self, handle: ObserverHandle, reason: UnregistrationReason) {
        self(handle, reason)
    }
}

/// Default listener: one debug line per unregistration
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingUnregistrationListener;

impl UnregistrationListener for LoggingUnregistrationListener {
    fn on_unregistered(&self, handle: ObserverHandle, reason: UnregistrationReason) {
        log::debug!("Observer {} unregistered ({:?})", handle, reason);
    }
}

struct Slot<P, R> {
    generation: u64,
    // Registration order, used to keep snapshots stable across slot reuse
    sequence: u64,
    observer: Option<Weak<dyn Observer<P, R>>>,
}

struct HandleTable<P, R> {
    slots: Vec<Slot<P, R>>,
    free: Vec<usize>,
    next_sequence: u64,
}

impl<P, R> HandleTable<P, R> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            next_sequence: 0,
        }
    }

    fn find(&self, address: *const ()) -> Option<ObserverHandle> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let weak = slot.observer.as_ref()?;
            let same = weak.strong_count() > 0 && std::ptr::addr_eq(weak.as_ptr(), address);
            same.then_some(ObserverHandle {
                index,
                generation: slot.generation,
            })
        })
    }

    fn insert(&mut self, observer: Weak<dyn Observer<P, R>>) -> ObserverHandle {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.sequence = sequence;
                slot.observer = Some(observer);
                ObserverHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    sequence,
                    observer: Some(observer),
                });
                ObserverHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, handle: ObserverHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index) else {
            return false;
        };
        if slot.generation != handle.generation || slot.observer.is_none() {
            return false;
        }
        slot.observer = None;
        slot.generation += 1;
        self.free.push(handle.index);
        true
    }

    /// Free every slot whose observer is gone, returning the stale handles
    fn prune(&mut self) -> Vec<ObserverHandle> {
        let dead: Vec<ObserverHandle> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(&slot.observer, Some(weak) if weak.strong_count() == 0))
            .map(|(index, slot)| ObserverHandle {
                index,
                generation: slot.generation,
            })
            .collect();
        for handle in &dead {
            self.release(*handle);
        }
        dead
    }

    fn live(&self) -> (Vec<SharedObserver<P, R>>, bool) {
        let mut found_dead = false;
        let mut members: Vec<(u64, SharedObserver<P, R>)> = Vec::new();
        for slot in &self.slots {
            let Some(weak) = &slot.observer else {
                continue;
            };
            match weak.upgrade() {
                Some(observer) => members.push((slot.sequence, observer)),
                None => found_dead = true,
            }
        }
        members.sort_by_key(|(sequence, _)| *sequence);
        let members = members.into_iter().map(|(_, observer)| observer).collect();
        (members, found_dead)
    }
}

struct Shared<P, R> {
    table: RwLock<HandleTable<P, R>>,
    listener: RwLock<Arc<dyn UnregistrationListener>>,
}

impl<P, R> Shared<P, R> {
    fn notify(&self, handles: &[ObserverHandle], reason: UnregistrationReason) {
        if handles.is_empty() {
            return;
        }
        let listener = Arc::clone(&read_ignoring_poison(self.listener.read()));
        for handle in handles {
            listener.on_unregistered(*handle, reason);
        }
    }

    fn write_table(&self) -> std::sync::RwLockWriteGuard<'_, HandleTable<P, R>> {
        // Every table mutation completes before the guard drops, so a poisoned
        // lock still holds a consistent table
        self.table
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn unregister(&self, handle: ObserverHandle, reason: UnregistrationReason) -> bool {
        let released = self.write_table().release(handle);
        if released {
            self.notify(&[handle], reason);
        }
        released
    }

    fn prune(&self) {
        let dead = self.write_table().prune();
        self.notify(&dead, UnregistrationReason::Reclaimed);
    }
}

/// Type-erased unregistration entry point held by [`Registration`]
trait Unregister: Send + Sync {
    fn release(&self, handle: ObserverHandle) -> bool;
}

impl<P, R> Unregister for Shared<P, R> {
    fn release(&self, handle: ObserverHandle) -> bool {
        self.unregister(handle, UnregistrationReason::Released)
    }
}

/// Scoped membership: unregisters the observer when dropped
///
/// Outliving the registry is fine; the drop is then a no-op.
#[must_use = "dropping the registration unregisters the observer immediately"]
pub struct Registration {
    handle: ObserverHandle,
    registry: Weak<dyn Unregister>,
}

impl Registration {
    pub fn handle(&self) -> ObserverHandle {
        self.handle
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("handle", &self.handle)
            .finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.release(self.handle);
        }
    }
}

/// Registry holding any number of observers without owning them
///
/// Membership is a set by `Arc` identity. Because members are held weakly,
/// an observer can disappear between `is_empty()` and `snapshot()`; dispatch
/// code only ever works from one snapshot.
///
/// # Example
///
/// ```
/// use concord::observers::api::{
///     Capability, Event, MultiRegistry, Observer, ObserverError, ObserverRegistry, ResultSink,
/// };
/// use std::sync::Arc;
///
/// struct Echo;
///
/// impl Observer<String, String> for Echo {
///     fn can_handle_event(&self, _event: &Event<String>) -> Capability {
///         Capability::HandleWithReturn
///     }
///
///     fn on_event(&self, event: &Event<String>, sink: &mut ResultSink<String>) -> Result<(), ObserverError> {
///         sink.put(event.payload().clone());
///         Ok(())
///     }
/// }
///
/// let registry = MultiRegistry::<String, String>::new();
/// let echo = Arc::new(Echo);
/// assert!(registry.add(&echo));
/// assert!(!registry.add(&echo));
/// assert_eq!(registry.snapshot().len(), 1);
///
/// drop(echo);
/// assert!(registry.snapshot().is_empty());
/// ```
pub struct MultiRegistry<P, R> {
    shared: Arc<Shared<P, R>>,
    hooks: Arc<dyn DispatchHooks>,
}

impl<P: 'static, R: 'static> MultiRegistry<P, R> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                table: RwLock::new(HandleTable::new()),
                listener: RwLock::new(Arc::new(LoggingUnregistrationListener)),
            }),
            hooks: Arc::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_unregistration_listener(self, listener: Arc<dyn UnregistrationListener>) -> Self {
        self.set_unregistration_listener(listener);
        self
    }

    pub fn set_unregistration_listener(&self, listener: Arc<dyn UnregistrationListener>) {
        match handle_rwlock_write(self.shared.listener.write(), |message| message) {
            Ok(mut current) => *current = listener,
            Err(message) => log::error!("Unregistration listener not replaced: {}", message),
        }
    }

    /// Add `observer`; `false` if it is already a member
    pub fn add<O>(&self, observer: &Arc<O>) -> bool
    where
        O: Observer<P, R> + 'static,
    {
        self.insert(observer).is_some()
    }

    /// Add `observer` and return a guard that removes it again on drop
    ///
    /// `None` if it is already a member.
    pub fn register<O>(&self, observer: &Arc<O>) -> Option<Registration>
    where
        O: Observer<P, R> + 'static,
    {
        let handle = self.insert(observer)?;
        let shared: Arc<dyn Unregister> = self.shared.clone();
        Some(Registration {
            handle,
            registry: Arc::downgrade(&shared),
        })
    }

    /// Remove `observer`; `false` if it was not a member
    pub fn remove<O>(&self, observer: &Arc<O>) -> bool
    where
        O: Observer<P, R> + 'static,
    {
        let address = Arc::as_ptr(observer) as *const ();
        let handle = read_ignoring_poison(self.shared.table.read()).find(address);
        match handle {
            Some(handle) => self.shared.unregister(handle, UnregistrationReason::Removed),
            None => false,
        }
    }

    /// Remove the member behind `handle`; `false` if the handle is stale
    pub fn unregister(&self, handle: ObserverHandle) -> bool {
        self.shared.unregister(handle, UnregistrationReason::Removed)
    }

    pub fn contains<O>(&self, observer: &Arc<O>) -> bool
    where
        O: Observer<P, R> + 'static,
    {
        let address = Arc::as_ptr(observer) as *const ();
        read_ignoring_poison(self.shared.table.read())
            .find(address)
            .is_some()
    }

    fn insert<O>(&self, observer: &Arc<O>) -> Option<ObserverHandle>
    where
        O: Observer<P, R> + 'static,
    {
        let address = Arc::as_ptr(observer) as *const ();
        let weak: Weak<O> = Arc::downgrade(observer);
        let weak: Weak<dyn Observer<P, R>> = weak;
        let handle = {
            let mut table = self.shared.write_table();
            if table.find(address).is_some() {
                return None;
            }
            table.insert(weak)
        };
        log::debug!("Registered observer '{}' as {}", observer.name(), handle);
        Some(handle)
    }
}

impl<P: 'static, R: 'static> Default for MultiRegistry<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static, R: 'static> ObserverRegistry<P, R> for MultiRegistry<P, R> {
    fn len(&self) -> usize {
        read_ignoring_poison(self.shared.table.read())
            .slots
            .iter()
            .filter(|slot| matches!(&slot.observer, Some(weak) if weak.strong_count() > 0))
            .count()
    }

    fn snapshot(&self) -> Vec<SharedObserver<P, R>> {
        let (members, found_dead) = read_ignoring_poison(self.shared.table.read()).live();
        if found_dead {
            self.shared.prune();
        }
        members
    }

    fn before_dispatch(&self) {
        self.hooks.before_dispatch();
    }

    fn after_dispatch(&self) {
        self.hooks.after_dispatch();
    }
}
