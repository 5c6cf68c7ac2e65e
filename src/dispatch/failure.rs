//! Observer failures and the handlers that receive them

use crate::core::error_handling::{log_error_with_context, panic_message, ContextualError};
use crate::observers::event::EventType;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Wrapped failure delivered to failure handlers and round-trip callers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObserverFailure {
    #[error("Observer '{observer}' failed: {message}")]
    Failed { observer: String, message: String },

    #[error("Observer '{observer}' panicked: {message}")]
    Panicked { observer: String, message: String },

    #[error("Dispatcher stopped before the observer replied")]
    Abandoned,
}

impl ContextualError for ObserverFailure {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Receives every observer failure caught during dispatch
///
/// Runs on the dispatching thread: the caller's thread for synchronous
/// dispatch, the worker thread for asynchronous dispatch.
pub trait FailureHandler: Send + Sync {
    fn handle_failure(&self, event_type: &EventType, failure: &ObserverFailure);
}

impl<F> FailureHandler for F
where
    F: Fn(&EventType, &ObserverFailure) + Send + Sync,
{
    fn handle_failure(&self, event_type: &EventType, failure: &ObserverFailure) {
        self(event_type, failure)
    }
}

/// Default handler: logs the failure at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFailureHandler;

impl FailureHandler for LoggingFailureHandler {
    fn handle_failure(&self, event_type: &EventType, failure: &ObserverFailure) {
        log_error_with_context(failure, &format!("Dispatching '{}'", event_type));
    }
}

/// Hand `failure` to `handler`, containing a panic raised by the handler itself
pub(crate) fn report_failure(
    handler: &dyn FailureHandler,
    event_type: &EventType,
    failure: &ObserverFailure,
) {
    let handled = catch_unwind(AssertUnwindSafe(|| handler.handle_failure(event_type, failure)));
    if let Err(payload) = handled {
        log::error!(
            "Failure handler panicked on '{}': {}",
            event_type,
            panic_message(payload.as_ref())
        );
    }
}
