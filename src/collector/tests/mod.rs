//! Test modules for the collector
//!
//! Organised by flavor plus the stop protocol shared by both.
