//! Resource pool error types

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Pool capacity must be greater than 0 (got {capacity})")]
    InvalidCapacity { capacity: usize },

    #[error("Pool slot table unavailable: {message}")]
    Poisoned { message: String },
}

impl crate::core::error_handling::ContextualError for PoolError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, PoolError::InvalidCapacity { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PoolError::InvalidCapacity { .. } => Some("pool capacity must be greater than 0"),
            PoolError::Poisoned { .. } => None,
        }
    }
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
