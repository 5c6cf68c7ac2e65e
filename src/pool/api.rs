//! Public API for the resource pool

pub use crate::pool::error::{PoolError, PoolResult};
pub use crate::pool::resource_pool::{ResourceFactory, ResourcePool};
