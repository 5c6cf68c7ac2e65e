//! Test modules for the deadlock monitor
