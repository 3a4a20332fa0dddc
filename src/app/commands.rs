//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (push button,
//! status page handler) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

use crate::drivers::button::ButtonEvent;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Run the pump for one manual window.
    ManualPump,

    /// Replace the poll interval until the next pass (ms).
    OverrideInterval(u32),

    /// Force (or release) fast polling.  Persisted with the config.
    SetDebugFast(bool),
}

impl AppCommand {
    /// Map a button gesture onto an operator command.
    pub fn from_button(event: ButtonEvent, debug_fast: bool, fast_interval_ms: u32) -> Self {
        match event {
            ButtonEvent::ShortPress => Self::ManualPump,
            ButtonEvent::LongPress => Self::SetDebugFast(!debug_fast),
            ButtonEvent::DoublePress => Self::OverrideInterval(fast_interval_ms),
        }
    }
}
