//! Public API for event managers

pub use crate::dispatch::api::{Delivery, Dispatched, ObserverFailure, Reply, ReplyResult};
pub use crate::manager::builder::{DispatchMode, EventManagerBuilder, ObserverMode};
pub use crate::manager::error::{ManagerError, ManagerResult};
pub use crate::manager::manager::EventManager;
pub use crate::manager::state::ManagerState;
