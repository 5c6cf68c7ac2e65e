//! Events, observers and the registries that hold them
//!
//! Two registry flavors implement [`api::ObserverRegistry`]:
//! - [`api::SingleSlotRegistry`]: exactly one observer, held strongly
//! - [`api::MultiRegistry`]: a set of weakly held observers with handle-based
//!   membership and explicit unregistration notifications

pub(crate) mod error;
pub(crate) mod event;
pub(crate) mod multi;
pub(crate) mod observer;
pub(crate) mod registry;
pub(crate) mod single;

pub mod api;

#[cfg(test)]
mod tests;
