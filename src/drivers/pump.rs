//! Pump relay driver.
//!
//! On/off only: the pump sits behind a relay (or logic-level MOSFET) on a
//! single active-high GPIO.  There is no feedback line, so a write that
//! does not reach the motor goes unnoticed.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init helpers.
//! On host/test: the write is a no-op.

use crate::drivers::hw_init;
use crate::pins;

pub struct PumpDriver;

impl PumpDriver {
    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::PUMP_GPIO, on);
    }
}
