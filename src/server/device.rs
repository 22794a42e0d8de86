//! Device-held actuator and sensor state.
//!
//! Owned by the [`CommandServer`](super::CommandServer) and mutated only from
//! its dispatch step. Nothing is persisted: a restart always comes up with
//! the LED off.

use log::info;

use crate::app::commands::Command;
use crate::app::ports::{LedPort, NoSensor, TemperaturePort};
use crate::config::BlinkConfig;

/// Read-only view rendered into responses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub led_on: bool,
    pub temperature_c: Option<f32>,
}

pub struct DeviceState<L, T = NoSensor> {
    led: L,
    sensor: T,
    led_on: bool,
    blink: BlinkConfig,
}

impl<L: LedPort> DeviceState<L, NoSensor> {
    pub fn new(led: L, blink: BlinkConfig) -> Self {
        Self::with_sensor(led, NoSensor, blink)
    }
}

impl<L: LedPort, T: TemperaturePort> DeviceState<L, T> {
    pub fn with_sensor(mut led: L, sensor: T, blink: BlinkConfig) -> Self {
        led.set(false);
        Self {
            led,
            sensor,
            led_on: false,
            blink,
        }
    }

    /// Whether `blink` is accepted by this deployment.
    pub fn blink_enabled(&self) -> bool {
        self.blink.enabled
    }

    /// Apply one command. Returns `true` if the steady LED level changed.
    ///
    /// Blink runs the full sequence before returning and leaves the LED off.
    pub fn apply(&mut self, cmd: Command) -> bool {
        let before = self.led_on;
        match cmd {
            Command::LedOn => {
                self.led.set(true);
                self.led_on = true;
            }
            Command::LedOff => {
                self.led.set(false);
                self.led_on = false;
            }
            Command::LedBlink => {
                info!(
                    "SERVER | blink {}x{}ms ({} ms busy)",
                    self.blink.toggles,
                    self.blink.delay_ms,
                    self.blink.duration_ms()
                );
                self.led.blink(self.blink.toggles, self.blink.delay_ms);
                self.led_on = false;
            }
        }
        before != self.led_on
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    /// Sample the sensor and pair it with the LED level.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot {
            led_on: self.led_on,
            temperature_c: self.sensor.read_celsius(),
        }
    }

    pub fn led(&self) -> &L {
        &self.led
    }
}
