//! Single status LED driver.
//!
//! Generic over any `embedded_hal` output pin and delay provider, so the same
//! driver runs on an ESP-IDF `PinDriver` + `FreeRtos` delay and on the host
//! simulation pin.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::StatefulOutputPin;
use log::warn;

use crate::app::ports::LedPort;

pub struct StatusLed<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> StatusLed<P, D>
where
    P: StatefulOutputPin,
    D: DelayNs,
{
    /// Take the pin and drive it low. The LED always starts off.
    pub fn new(mut pin: P, delay: D) -> Self {
        if let Err(e) = pin.set_low() {
            warn!("LED | init set_low failed: {:?}", e);
        }
        Self { pin, delay }
    }

    /// Level the pin is actually latched at. `false` if the read fails.
    pub fn is_on(&mut self) -> bool {
        self.pin.is_set_high().unwrap_or(false)
    }

    /// Release the pin and delay provider.
    pub fn into_inner(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P, D> LedPort for StatusLed<P, D>
where
    P: StatefulOutputPin,
    D: DelayNs,
{
    fn set(&mut self, on: bool) {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = res {
            warn!("LED | set({}) failed: {:?}", on, e);
        }
    }

    fn blink(&mut self, toggles: u8, delay_ms: u32) {
        for _ in 0..toggles {
            self.set(true);
            self.delay.delay_ms(delay_ms);
            self.set(false);
            self.delay.delay_ms(delay_ms);
        }
    }
}
