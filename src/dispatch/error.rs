//! Dispatcher error types

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Dispatcher has been shut down")]
    ShutDown,

    #[error("Failed to spawn dispatcher thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Dispatcher thread '{name}' panicked")]
    WorkerPanicked { name: String },
}

impl crate::core::error_handling::ContextualError for DispatchError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, DispatchError::ShutDown)
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            DispatchError::ShutDown => Some("events cannot be dispatched after shutdown"),
            _ => None,
        }
    }
}

/// Result type for dispatcher operations
pub type DispatchResult<T> = Result<T, DispatchError>;
