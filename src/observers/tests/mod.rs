//! Test modules for the observer registries

mod fixtures;
