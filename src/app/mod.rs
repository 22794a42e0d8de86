//! Application core: domain logic behind port traits.
//!
//! The client pipeline ([`service`]) and the server's dispatch talk to
//! hardware and sockets only through the traits in [`ports`], so both run
//! under test without peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
