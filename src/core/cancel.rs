//! Cancellation signal for blocking waits
//!
//! None of the blocking operations in this crate take a timeout. A waiting
//! borrower or producer is released either by normal progress or by a
//! [`CancellationToken`] being cancelled from another thread, in which case the
//! wait turns into a soft failure (an absent value or a `Cancelled` error).

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct Inner {
    cancelled: AtomicBool,
    /// Dropped on cancel so every receiver observes a disconnect at once
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

/// Cloneable, one-shot cancellation signal shared between a waiter and a canceller
///
/// Cancellation is sticky: once [`cancel`](Self::cancel) has been called every
/// current and future wait observing this token returns immediately.
///
/// # Example
///
/// ```
/// use concord::core::cancel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let waiter = token.clone();
/// token.cancel();
/// assert!(waiter.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (trigger, signal) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// Cancel every wait observing this token
    pub fn cancel(&self) {
        // Release pairs with the Acquire in is_cancelled()
        self.inner.cancelled.store(true, Ordering::Release);
        let sender = match self.inner.trigger.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(sender);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Receiver that becomes ready (disconnected) once the token is cancelled
    ///
    /// Intended for use as one arm of a `crossbeam_channel::select!`.
    pub(crate) fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
