//! Event manager error types

use crate::core::error_handling::ContextualError;
use crate::dispatch::error::DispatchError;
use crate::observers::error::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Event manager has been stopped")]
    Stopped,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Dispatch(DispatchError),
}

impl From<DispatchError> for ManagerError {
    fn from(error: DispatchError) -> Self {
        match error {
            // A racing stop() closed the queue after trigger() passed its check
            DispatchError::ShutDown => ManagerError::Stopped,
            other => ManagerError::Dispatch(other),
        }
    }
}

impl ContextualError for ManagerError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ManagerError::Stopped => true,
            ManagerError::Registry(e) => e.is_user_actionable(),
            ManagerError::Dispatch(e) => e.is_user_actionable(),
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ManagerError::Stopped => Some("the event manager has been stopped"),
            ManagerError::Registry(e) => e.user_message(),
            ManagerError::Dispatch(e) => e.user_message(),
        }
    }
}

/// Result type for event manager operations
pub type ManagerResult<T> = Result<T, ManagerError>;
