//! LED command vocabulary shared by the perception client and the server.
//!
//! A [`Command`] travels as its lowercase selector (`on`, `off`, `blink`)
//! in the request query string.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Commands the actuator server recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Drive the LED on.
    LedOn,
    /// Drive the LED off.
    LedOff,
    /// Run the fixed on/off blink sequence (optional per deployment).
    LedBlink,
}

impl Command {
    /// Every command, in selector-table order.
    pub const ALL: [Command; 3] = [Command::LedOn, Command::LedOff, Command::LedBlink];

    /// Wire selector carried in the query string.
    pub const fn selector(self) -> &'static str {
        match self {
            Self::LedOn => "on",
            Self::LedOff => "off",
            Self::LedBlink => "blink",
        }
    }

    /// Exact (case-sensitive) selector lookup.
    pub fn from_selector(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.selector() == s)
    }

    /// Human-readable acknowledgement, e.g. `LED ON`.
    pub const fn ack_text(self) -> &'static str {
        match self {
            Self::LedOn => "LED ON",
            Self::LedOff => "LED OFF",
            Self::LedBlink => "LED BLINK",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ack_text())
    }
}
