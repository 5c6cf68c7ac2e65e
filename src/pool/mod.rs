//! Fixed-capacity resource pool
//!
//! A pool of N lazily created resources gated by a counting semaphore. At
//! most N borrowers hold a resource at once; the (N+1)-th blocks until a
//! resource is released, or gives up when its cancellation token fires.

pub(crate) mod error;
pub(crate) mod resource_pool;

pub mod api;

#[cfg(test)]
mod tests;
