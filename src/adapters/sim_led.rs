//! Host simulation hardware.
//!
//! `SimPin` and `SimDelay` implement the `embedded-hal` traits so the real
//! [`StatusLed`](crate::drivers::status_led::StatusLed) driver runs unchanged
//! off-target. `SimTemperature` stands in for the die sensor.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use log::info;

use crate::app::ports::TemperaturePort;

/// In-memory output pin. Counts level writes and logs visible changes.
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
    edges: u32,
    verbose: bool,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every level change (used by the host server binary).
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    /// Number of `set_high`/`set_low` calls so far.
    pub fn edges(&self) -> u32 {
        self.edges
    }

    fn write(&mut self, high: bool) {
        if self.verbose && high != self.high {
            info!("SIM | LED {}", if high { "ON" } else { "off" });
        }
        self.high = high;
        self.edges += 1;
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

/// Delay provider. Sleeps the thread unless built with [`SimDelay::instant`].
#[derive(Debug, Default)]
pub struct SimDelay {
    sleep: bool,
    total_ns: u64,
}

impl SimDelay {
    /// Real wall-clock delays.
    pub fn sleeping() -> Self {
        Self {
            sleep: true,
            total_ns: 0,
        }
    }

    /// Record requested delays without sleeping.
    pub fn instant() -> Self {
        Self::default()
    }

    /// Sum of all requested delays, in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        if self.sleep {
            std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
        }
    }
}

/// Fixed temperature reading.
#[derive(Debug, Clone, Copy)]
pub struct SimTemperature(pub f32);

impl TemperaturePort for SimTemperature {
    fn read_celsius(&mut self) -> Option<f32> {
        Some(self.0)
    }
}
