//! Event dispatch: calling observers inline or on a background thread
//!
//! Every observer call goes through one guard that turns `Err` returns and
//! panics into an [`api::ObserverFailure`]. Failures are routed to the
//! configured [`api::FailureHandler`] and, for round-trip delivery, into the
//! caller's [`api::Reply`].

pub(crate) mod asynchronous;
pub(crate) mod dispatcher;
pub(crate) mod error;
pub(crate) mod failure;
pub(crate) mod invoke;
pub(crate) mod reply;
pub(crate) mod synchronous;

pub mod api;

#[cfg(test)]
mod tests;
