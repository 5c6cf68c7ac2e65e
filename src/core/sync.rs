//! Lock poisoning helpers
//!
//! Every lock in this crate is taken through one of these helpers so that a
//! panic on another thread (for example inside an observer or a resource
//! factory) surfaces as a typed module error instead of cascading panics.

use std::sync::{LockResult, MutexGuard, RwLockReadGuard, RwLockWriteGuard};

fn poison_message(kind: &str, detail: impl std::fmt::Debug) -> String {
    format!(
        "Internal synchronisation error ({kind} poisoned): a thread panicked while holding the lock. PoisonError: {detail:?}"
    )
}

/// Convert a poisoned `Mutex::lock()` into a module error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use concord::core::sync::handle_mutex_poison;
/// use concord::pool::api::PoolError;
///
/// let slots = Mutex::new(vec![0u8; 4]);
/// let guard = handle_mutex_poison(slots.lock(), |message| PoolError::Poisoned { message })
///     .unwrap();
/// assert_eq!(guard.len(), 4);
/// ```
pub fn handle_mutex_poison<'a, T, E>(
    result: LockResult<MutexGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    result.map_err(|poison_err| error_constructor(poison_message("mutex", poison_err)))
}

/// Convert a poisoned `RwLock::read()` into a module error
pub fn handle_rwlock_read<'a, T, E>(
    result: LockResult<RwLockReadGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockReadGuard<'a, T>, E> {
    result.map_err(|poison_err| error_constructor(poison_message("RwLock read", poison_err)))
}

/// Convert a poisoned `RwLock::write()` into a module error
pub fn handle_rwlock_write<'a, T, E>(
    result: LockResult<RwLockWriteGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<'a, T>, E> {
    result.map_err(|poison_err| error_constructor(poison_message("RwLock write", poison_err)))
}

/// Take a read guard even if the lock is poisoned
///
/// Only for advisory queries (lengths, emptiness) where a stale or
/// half-updated view is acceptable and an error would be noise.
pub fn read_ignoring_poison<T>(result: LockResult<RwLockReadGuard<'_, T>>) -> RwLockReadGuard<'_, T> {
    result.unwrap_or_else(|poisoned| poisoned.into_inner())
}
