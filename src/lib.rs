//! PinchLink library.
//!
//! Two halves share this crate: the gesture client (landmarks → debounced
//! commands → fire-and-forget sender) and the fault-isolating LED command
//! server. Everything below the binaries is exposed for integration
//! testing. ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

// Host backend for the embassy-sync critical section.
#[cfg(not(target_os = "espidf"))]
use critical_section as _;

pub mod adapters;
pub mod app;
pub mod client;
pub mod config;
pub mod drivers;
pub mod error;
pub mod gesture;
pub mod server;
