//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::{AppEvent, StartCause};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | controller ready");
            }
            AppEvent::LevelsChanged { previous, current } => {
                info!(
                    "LEVEL | low {}->{} mid {}->{} high {}->{}",
                    previous.low, current.low, previous.mid, current.mid, previous.high, current.high
                );
            }
            AppEvent::PumpStarted { cause } => {
                let cause = match cause {
                    StartCause::Auto => "auto",
                    StartCause::Manual => "manual",
                };
                info!("PUMP  | started ({})", cause);
            }
            AppEvent::PumpStopped { cycles } => {
                info!("PUMP  | stopped, cycles={}", cycles);
            }
            AppEvent::ManualWindowExpired => {
                info!("PUMP  | manual window expired");
            }
            AppEvent::IntervalChanged { from_ms, to_ms, phase } => {
                info!("SCHED | {}ms -> {}ms ({:?})", from_ms, to_ms, phase);
            }
            AppEvent::DebugFastChanged(on) => {
                info!("SCHED | debug-fast {}", if *on { "on" } else { "off" });
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD   | rejected: {}", e);
            }
        }
    }
}
