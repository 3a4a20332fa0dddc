//! Single-colour indicator LED driver.
//!
//! Both the external status LED and the on-board LED are wired
//! active-low; the driver takes logical on/off and handles polarity.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the GPIO via hw_init.
//! On host/test: the write is a no-op.

use crate::drivers::hw_init;

pub struct StatusLed {
    gpio: i32,
    active_low: bool,
}

impl StatusLed {
    pub fn new(gpio: i32, active_low: bool) -> Self {
        Self { gpio, active_low }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, self.pin_level(on));
    }

    /// Electrical level that shows `on`.
    fn pin_level(&self, on: bool) -> bool {
        on != self.active_low
    }
}
