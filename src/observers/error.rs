//! Observer registry error types

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Single-slot registry already holds an observer")]
    SlotOccupied,

    #[error("Single-slot registry does not support removal")]
    RemovalUnsupported,

    #[error("Observer registry unavailable: {message}")]
    Poisoned { message: String },
}

impl crate::core::error_handling::ContextualError for RegistryError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            RegistryError::SlotOccupied | RegistryError::RemovalUnsupported
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            RegistryError::SlotOccupied => Some("only one observer can be registered"),
            RegistryError::RemovalUnsupported => {
                Some("observers cannot be removed from a single-slot registry")
            }
            RegistryError::Poisoned { .. } => None,
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
