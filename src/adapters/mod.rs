//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements              | Connects to                 |
//! |------------|-------------------------|-----------------------------|
//! | `log_sink` | EventSink               | Serial / terminal log       |
//! | `sim_led`  | embedded-hal pin, delay | In-memory LED (host)        |
//! |            | TemperaturePort         | Fixed reading (host)        |
//! | `time`     | Clock                   | ESP32 timer / `Instant`     |
//!
//! The socket adapters live next to their users in
//! [`server::listener`](crate::server::listener) and
//! [`client::sender`](crate::client::sender).

pub mod log_sink;
pub mod sim_led;
pub mod time;
