//! Collector error types

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Collector capacity must be greater than 0 (got {capacity})")]
    InvalidCapacity { capacity: usize },

    #[error("Batch size limit must be greater than 0")]
    InvalidBatchSize,

    #[error("Collector has been stopped")]
    Stopped,

    #[error("Submit cancelled while waiting for queue capacity")]
    Cancelled,

    #[error("Collector queue is full (capacity: {capacity})")]
    Full { capacity: usize },

    #[error("Collector queue disconnected")]
    Disconnected,

    #[error("Failed to spawn consumer thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Consumer thread '{name}' panicked")]
    ConsumerPanicked { name: String },

    #[error("Collector state unavailable: {message}")]
    Poisoned { message: String },
}

impl crate::core::error_handling::ContextualError for CollectorError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            CollectorError::InvalidCapacity { .. }
                | CollectorError::InvalidBatchSize
                | CollectorError::Stopped
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CollectorError::InvalidCapacity { .. } => {
                Some("collector capacity must be greater than 0")
            }
            CollectorError::InvalidBatchSize => Some("batch size limit must be greater than 0"),
            CollectorError::Stopped => Some("collector has been stopped"),
            _ => None,
        }
    }
}

/// Result type for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;
