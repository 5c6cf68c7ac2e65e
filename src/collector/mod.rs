//! Bounded producer/consumer collector
//!
//! A fixed-capacity buffer with blocking backpressure for producers and one
//! consumer loop that feeds a performer callback. The loop ends when it reads
//! the `Stop` entry enqueued by `request_stop`, after every item accepted
//! before it has been delivered.
//!
//! # Architecture
//!
//! ```text
//!  producer ─┐   submit (write lock)
//!  producer ─┼──────────────────────▶ [ P | P | P | Stop ] ──▶ run() ──▶ performer
//!  producer ─┘   request_stop (write lock)       bounded(C)    one consumer
//! ```
//!
//! Two flavors share the buffer and stop protocol:
//! - [`api::SingleCollector`] delivers one item per call, in submission order.
//! - [`api::BatchCollector`] delivers everything immediately available, capped
//!   at a configurable batch size.

pub(crate) mod batch;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod item;
pub(crate) mod performer;
pub(crate) mod single;

pub mod api;

#[cfg(test)]
mod tests;
