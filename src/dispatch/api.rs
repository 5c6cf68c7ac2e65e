//! Public API for event dispatch

pub use crate::dispatch::asynchronous::{AsyncDispatcher, DispatcherHandle};
pub use crate::dispatch::dispatcher::{Delivery, EventDispatcher};
pub use crate::dispatch::error::{DispatchError, DispatchResult};
pub use crate::dispatch::failure::{FailureHandler, LoggingFailureHandler, ObserverFailure};
pub use crate::dispatch::reply::{Dispatched, Reply, ReplyResult};
pub use crate::dispatch::synchronous::SyncDispatcher;
