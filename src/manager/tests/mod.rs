//! Test modules for the event manager
//!
//! - `fixtures`: shared observers and hooks
//! - `sync_managers`: inline dispatch, hooks, empty-registry no-op
//! - `async_managers`: background ordering, failure markers, stop
//! - `combinations`: every constructor end to end

mod async_managers;
mod combinations;
mod fixtures;
mod sync_managers;
