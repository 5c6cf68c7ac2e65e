//! Deadlock detection
//!
//! [`api::DeadlockMonitor`] asks a [`api::ThreadIntrospector`] for wait
//! cycles, correlates every reported thread with its dump, and hands one
//! snapshot slice per cycle to each registered [`api::DeadlockListener`].

pub(crate) mod error;
pub(crate) mod introspect;
pub(crate) mod monitor;
pub(crate) mod snapshot;

pub mod api;

#[cfg(test)]
mod tests;
