//! Test modules for the dispatchers

mod asynchronous;
