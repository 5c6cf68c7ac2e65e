//! Event managers: observer registry plus dispatcher
//!
//! Each manager is one of eight combinations:
//!
//! | observers | dispatch     | delivery        | constructor                  |
//! |-----------|--------------|-----------------|------------------------------|
//! | single    | synchronous  | fire-and-forget | `single_sync()`              |
//! | single    | synchronous  | round-trip      | `single_sync_round_trip()`   |
//! | single    | asynchronous | fire-and-forget | `single_async()`             |
//! | single    | asynchronous | round-trip      | `single_async_round_trip()`  |
//! | multi     | synchronous  | fire-and-forget | `multi_sync()`               |
//! | multi     | synchronous  | round-trip      | `multi_sync_round_trip()`    |
//! | multi     | asynchronous | fire-and-forget | `multi_async()`              |
//! | multi     | asynchronous | round-trip      | `multi_async_round_trip()`   |
//!
//! Use [`api::EventManagerBuilder`] for custom failure handlers, hooks or
//! dispatcher thread names.

pub(crate) mod builder;
pub(crate) mod error;
#[allow(clippy::module_inception)]
pub(crate) mod manager;
pub(crate) mod state;

pub mod api;

#[cfg(test)]
mod tests;
