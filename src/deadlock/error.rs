//! Deadlock monitor error types

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Failed to spawn monitor thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Monitor thread '{name}' panicked")]
    MonitorPanicked { name: String },
}

impl crate::core::error_handling::ContextualError for MonitorError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;
