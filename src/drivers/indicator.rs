//! Status indicator pattern engine.
//!
//! Maps controller state onto the external status LED and the on-board LED.
//! The main loop calls [`IndicatorDriver::render`] every control tick, so the
//! blink cadence is independent of how often the probes are sampled.
//!
//! ## Pattern selection (highest first)
//!
//! | Condition  | Status LED             | Builtin LED |
//! |------------|------------------------|-------------|
//! | pumping    | toggles every 500 ms   | on          |
//! | mid wet    | steady on              | off         |
//! | otherwise  | off                    | off         |
//!
//! [`flash_burst`] is a separate, blocking acknowledgement sequence used at
//! boot and on pump transitions.

use embedded_hal::delay::DelayNs;
use serde::Serialize;

use crate::app::ports::IndicatorPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndicatorPattern {
    Off,
    SteadyOn,
    Blinking,
}

/// What the status LED should show after one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOutput {
    SteadyOff,
    SteadyOn,
    /// Blinking; `toggled` is set on the render that flipped the phase.
    BlinkToggle { lit: bool, toggled: bool },
}

impl PatternOutput {
    pub fn is_lit(self) -> bool {
        match self {
            Self::SteadyOff => false,
            Self::SteadyOn => true,
            Self::BlinkToggle { lit, .. } => lit,
        }
    }
}

pub struct IndicatorDriver {
    blink_period_ms: u32,
    lit: bool,
    last_toggle_ms: u64,
}

impl IndicatorDriver {
    pub fn new(blink_period_ms: u32) -> Self {
        Self {
            blink_period_ms,
            lit: false,
            last_toggle_ms: 0,
        }
    }

    pub fn pattern(pumping: bool, mid: bool) -> IndicatorPattern {
        if pumping {
            IndicatorPattern::Blinking
        } else if mid {
            IndicatorPattern::SteadyOn
        } else {
            IndicatorPattern::Off
        }
    }

    pub fn render(&mut self, now_ms: u64, pumping: bool, mid: bool) -> PatternOutput {
        match Self::pattern(pumping, mid) {
            IndicatorPattern::Blinking => {
                let due = now_ms.saturating_sub(self.last_toggle_ms)
                    >= u64::from(self.blink_period_ms);
                if due {
                    self.lit = !self.lit;
                    self.last_toggle_ms = now_ms;
                }
                PatternOutput::BlinkToggle { lit: self.lit, toggled: due }
            }
            IndicatorPattern::SteadyOn => PatternOutput::SteadyOn,
            IndicatorPattern::Off => PatternOutput::SteadyOff,
        }
    }

    /// Push a rendered output to the LEDs.  The builtin LED only ever
    /// mirrors `pumping`.
    pub fn apply(output: PatternOutput, pumping: bool, port: &mut impl IndicatorPort) {
        port.set_status_led(output.is_lit());
        port.set_builtin_led(pumping);
    }
}

/// Blocking burst of `pulses` on/off flashes, `step_ms` each half.
/// Leaves the status LED off.
pub fn flash_burst(
    pulses: u8,
    step_ms: u32,
    port: &mut impl IndicatorPort,
    delay: &mut impl DelayNs,
) {
    for _ in 0..pulses {
        port.set_status_led(true);
        delay.delay_ms(step_ms);
        port.set_status_led(false);
        delay.delay_ms(step_ms);
    }
}
