//! Multi-threaded tests for the resource pool
