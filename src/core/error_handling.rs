//! Error reporting shared by the blocking primitives and the dispatchers
//!
//! Failures raised by collaborators (performers, observers, factories) are
//! caught by this crate and reported here rather than propagated, so that a
//! misbehaving callback never takes down a consumer loop or dispatcher thread.

use std::any::Any;

/// Errors that know whether the caller can act on them
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True for precondition violations the caller caused and can fix
    /// (bad capacity, double registration, use after stop)
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// Log a caught failure with a one-line summary and detail at debug level
///
/// # Examples
/// ```rust,no_run
/// # use concord::core::error_handling::log_error_with_context;
/// # use concord::collector::api::CollectorError;
/// let error = CollectorError::Stopped;
/// log_error_with_context(&error, "submitting work item");
/// // Logs: "submitting work item: collector has been stopped"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("{}: {}", operation_context, user_msg)
        }
        _ => log::error!("{}: {}", operation_context, error),
    }
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Render a caught panic payload as text
///
/// `panic!` payloads are almost always `&'static str` or `String`; anything
/// else is reported generically.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
