//! Registry abstraction shared by the single-slot and multi registries

use crate::observers::observer::Observer;
use std::sync::Arc;

/// Override points bracketing each dispatch
///
/// Both run exactly once per non-empty `trigger()`, on the triggering thread.
pub trait DispatchHooks: Send + Sync {
    fn before_dispatch(&self) {}

    fn after_dispatch(&self) {}
}

/// Hooks that do nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl DispatchHooks for NoHooks {}

/// Shared observer type stored by registries
pub type SharedObserver<P, R> = Arc<dyn Observer<P, R>>;

pub trait ObserverRegistry<P, R>: Send + Sync {
    /// Number of live observers
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Defensive copy of the current members
    ///
    /// Membership may change right after this returns; callers dispatch to the
    /// copy and never re-read the registry mid-dispatch.
    fn snapshot(&self) -> Vec<SharedObserver<P, R>>;

    fn before_dispatch(&self);

    fn after_dispatch(&self);
}
