//! Hardware adapter: bridges the output drivers to domain port traits.
//!
//! Owns the pump relay and both LEDs, exposing them through [`PumpPort`]
//! and [`IndicatorPort`].  The probes are not here: they belong to the
//! sensing task (see [`SensingWorker`](crate::sensors::worker::SensingWorker)).
//! On non-espidf targets, the underlying drivers use cfg-gated simulation
//! stubs.

use crate::app::ports::{IndicatorPort, PumpPort};
use crate::drivers::pump::PumpDriver;
use crate::drivers::status_led::StatusLed;
use crate::pins;

pub struct HardwareAdapter {
    pump: PumpDriver,
    status: StatusLed,
    builtin: StatusLed,
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    pub fn new() -> Self {
        Self {
            pump: PumpDriver,
            status: StatusLed::new(pins::STATUS_LED_GPIO, true),
            builtin: StatusLed::new(pins::BUILTIN_LED_GPIO, true),
        }
    }
}

// ── PumpPort implementation ───────────────────────────────────

impl PumpPort for HardwareAdapter {
    fn set_pump(&mut self, on: bool) {
        self.pump.set(on);
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn set_status_led(&mut self, on: bool) {
        self.status.set(on);
    }

    fn set_builtin_led(&mut self, on: bool) {
        self.builtin.set(on);
    }
}
