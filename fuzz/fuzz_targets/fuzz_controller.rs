//! Fuzz target: `AppService` driven by arbitrary passes and commands
//!
//! Each input byte is one step: the low three bits are raw probe readings
//! for a pass, the high bits pick an optional operator command, and the
//! step advances a virtual clock.
//!
//! Invariants checked:
//! - No panics under any step sequence
//! - The relay output always matches the reported pump state
//! - The event log never holds more than its capacity
//!
//! cargo fuzz run fuzz_controller

#![no_main]

use embedded_hal::delay::DelayNs;
use levelpump::app::commands::AppCommand;
use levelpump::app::events::{AppEvent, EVENT_LOG_CAPACITY};
use levelpump::app::ports::{EventSink, IndicatorPort, PumpPort};
use levelpump::app::service::AppService;
use levelpump::config::SystemConfig;
use levelpump::sensors::PassReadings;
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Outputs {
    pump: bool,
}

impl PumpPort for Outputs {
    fn set_pump(&mut self, on: bool) {
        self.pump = on;
    }
}

impl IndicatorPort for Outputs {
    fn set_status_led(&mut self, _on: bool) {}
    fn set_builtin_led(&mut self, _on: bool) {}
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut app = AppService::new(SystemConfig::default());
    let mut out = Outputs::default();
    app.start(0, &mut out, &mut NoDelay, &mut Discard);

    let mut now = 0u64;
    for &b in data {
        now += 250 * u64::from(b >> 6) + 50;

        let cmd = match (b >> 3) & 0b111 {
            1 => Some(AppCommand::ManualPump),
            2 => Some(AppCommand::OverrideInterval(u32::from(b) * 20)),
            3 => Some(AppCommand::SetDebugFast(b & 1 == 1)),
            _ => None,
        };
        if let Some(cmd) = cmd {
            let _ = app.handle_command(now, cmd, &mut out, &mut Discard);
        }

        if app.pass_due(now) {
            let readings = PassReadings {
                low: b & 0b001 != 0,
                mid: b & 0b010 != 0,
                high: b & 0b100 != 0,
            };
            app.apply_pass(now, readings, &mut out, &mut NoDelay, &mut Discard);
        }
        app.service_timers(now, &mut out, &mut Discard);

        assert_eq!(out.pump, app.snapshot().pumping, "relay diverged from state");
        assert!(app.event_log().len() <= EVENT_LOG_CAPACITY);
    }
});
