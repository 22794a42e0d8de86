//! Landmark frames, distance classification, and debounce policies.

pub mod classifier;
pub mod debounce;
pub mod landmarks;
