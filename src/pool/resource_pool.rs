//! ResourcePool - fixed-size pool of lazily created resources
//!
//! A counting semaphore bounds the number of concurrent borrowers to the pool
//! capacity. Once a permit is held, one coarse mutex guards a linear scan of
//! the slot table; capacities are expected to be small, so O(N) is fine here.

use crate::core::cancel::CancellationToken;
use crate::core::config::PoolConfig;
use crate::core::error_handling::log_error_with_context;
use crate::core::sync::handle_mutex_poison;
use crate::pool::error::{PoolError, PoolResult};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

/// Zero-argument constructor invoked at most once per slot
///
/// Returning `None` is treated as a broken collaborator and panics the
/// borrowing thread.
pub type ResourceFactory<R> = Box<dyn Fn() -> Option<R> + Send + Sync>;

struct PoolSlot<R> {
    resource: Option<Arc<R>>,
    in_use: bool,
}

/// Counting semaphore built on a pre-filled bounded channel
///
/// Each message in the channel is one available permit, so `len()` is the
/// number of permits and a blocked `recv` is a blocked acquire.
struct Permits {
    give: Sender<()>,
    take: Receiver<()>,
}

impl Permits {
    fn new(count: usize) -> Self {
        let (give, take) = bounded(count);
        for _ in 0..count {
            // Cannot fail: the channel was sized for exactly `count` permits
            let _ = give.try_send(());
        }
        Self { give, take }
    }

    fn release(&self) {
        if self.give.try_send(()).is_err() {
            log::error!("Pool permit released with no outstanding borrow");
        }
    }

    fn available(&self) -> usize {
        self.take.len()
    }
}

/// Fixed-capacity pool of homogeneous, lazily created resources
///
/// Resources are handed out as `Arc<R>` and must be given back with
/// [`release`](Self::release), which matches by identity, not equality.
/// A resource is created on the first borrow that lands in its slot and lives
/// until the pool is dropped.
///
/// # Example
///
/// ```
/// use concord::pool::api::ResourcePool;
///
/// let pool = ResourcePool::new(2, || Some(Vec::<u8>::with_capacity(4096))).unwrap();
/// let buffer = pool.borrow().expect("a buffer");
/// assert_eq!(pool.available(), 1);
/// assert!(pool.release(&buffer));
/// assert_eq!(pool.available(), 2);
/// ```
pub struct ResourcePool<R> {
    slots: Mutex<Vec<PoolSlot<R>>>,
    permits: Permits,
    factory: ResourceFactory<R>,
    capacity: usize,
}

impl<R> ResourcePool<R> {
    /// Create a pool of `capacity` slots; `capacity` must be positive
    pub fn new<F>(capacity: usize, factory: F) -> PoolResult<Self>
    where
        F: Fn() -> Option<R> + Send + Sync + 'static,
    {
        if capacity == 0 {
            return Err(PoolError::InvalidCapacity { capacity });
        }

        let slots = (0..capacity)
            .map(|_| PoolSlot {
                resource: None,
                in_use: false,
            })
            .collect();

        Ok(Self {
            slots: Mutex::new(slots),
            permits: Permits::new(capacity),
            factory: Box::new(factory),
            capacity,
        })
    }

    pub fn with_config<F>(config: &PoolConfig, factory: F) -> PoolResult<Self>
    where
        F: Fn() -> Option<R> + Send + Sync + 'static,
    {
        Self::new(config.capacity, factory)
    }

    /// Borrow a resource, blocking while every slot is in use
    ///
    /// Returns `None` only if the slot table has become unusable (a factory
    /// panicked while holding the lock); the permit is returned in that case.
    ///
    /// # Panics
    ///
    /// Panics if the factory returns `None` for an empty slot.
    pub fn borrow(&self) -> Option<Arc<R>> {
        match self.permits.take.recv() {
            Ok(()) => self.claim_slot(),
            // The pool owns the sender, so this cannot disconnect while &self lives
            Err(_) => None,
        }
    }

    /// Borrow a resource, giving up if `cancel` fires while waiting
    ///
    /// A cancelled wait yields `None` and leaves the pool fully usable; the
    /// caller decides whether to retry or fail upward.
    pub fn borrow_cancellable(&self, cancel: &CancellationToken) -> Option<Arc<R>> {
        if cancel.is_cancelled() {
            log::warn!("Pool borrow cancelled before waiting");
            return None;
        }

        select! {
            recv(self.permits.take) -> permit => match permit {
                Ok(()) => self.claim_slot(),
                Err(_) => None,
            },
            recv(cancel.signal()) -> _ => {
                log::warn!("Pool borrow cancelled while waiting for a free slot");
                None
            }
        }
    }

    /// Borrow a resource only if one is free right now
    pub fn try_borrow(&self) -> Option<Arc<R>> {
        match self.permits.take.try_recv() {
            Ok(()) => self.claim_slot(),
            Err(_) => None,
        }
    }

    /// Return a borrowed resource to the pool
    ///
    /// Returns `false`, changing nothing, if `resource` is not currently
    /// borrowed from this pool (a foreign object, or a double release), so
    /// misuse can never mint extra permits.
    pub fn release(&self, resource: &Arc<R>) -> bool {
        let mut slots = match self.lock_slots() {
            Ok(slots) => slots,
            Err(e) => {
                log_error_with_context(&e, "Releasing pooled resource");
                return false;
            }
        };

        let found = slots.iter_mut().find(|slot| {
            slot.in_use
                && slot
                    .resource
                    .as_ref()
                    .is_some_and(|held| Arc::ptr_eq(held, resource))
        });

        match found {
            Some(slot) => {
                slot.in_use = false;
                drop(slots);
                self.permits.release();
                true
            }
            None => {
                log::warn!("Release of a resource that is not borrowed from this pool ignored");
                false
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently available (advisory)
    pub fn available(&self) -> usize {
        self.permits.available()
    }

    /// Slots currently marked in use (advisory)
    pub fn in_use(&self) -> usize {
        self.count_slots(|slot| slot.in_use)
    }

    /// Slots whose resource has been created so far (advisory)
    pub fn created(&self) -> usize {
        self.count_slots(|slot| slot.resource.is_some())
    }

    fn count_slots(&self, predicate: impl Fn(&PoolSlot<R>) -> bool) -> usize {
        match self.lock_slots() {
            Ok(slots) => slots.iter().filter(|slot| predicate(slot)).count(),
            Err(_) => 0,
        }
    }

    fn lock_slots(&self) -> PoolResult<MutexGuard<'_, Vec<PoolSlot<R>>>> {
        handle_mutex_poison(self.slots.lock(), |message| PoolError::Poisoned { message })
    }

    /// Claim the first free slot; the caller already holds one permit
    fn claim_slot(&self) -> Option<Arc<R>> {
        let mut slots = match self.lock_slots() {
            Ok(slots) => slots,
            Err(e) => {
                log_error_with_context(&e, "Borrowing pooled resource");
                self.permits.release();
                return None;
            }
        };

        let Some((index, slot)) = slots.iter_mut().enumerate().find(|(_, slot)| !slot.in_use)
        else {
            // A held permit guarantees a free slot; reaching here means the
            // permit count and the slot table disagree.
            log::error!("Pool permit acquired but no free slot found");
            self.permits.release();
            return None;
        };

        let resource = match &slot.resource {
            Some(existing) => Arc::clone(existing),
            None => {
                let created = match (self.factory)() {
                    Some(resource) => Arc::new(resource),
                    None => panic!("resource factory returned no resource for pool slot {index}"),
                };
                log::debug!("Created pooled resource for slot {}", index);
                slot.resource = Some(Arc::clone(&created));
                created
            }
        };

        slot.in_use = true;
        Some(resource)
    }
}

impl<R> std::fmt::Debug for ResourcePool<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .finish()
    }
}
