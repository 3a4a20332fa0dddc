//! Mock hardware adapters for integration tests.
//!
//! Records every output call so tests can assert on the full command
//! history without touching real GPIO registers.

use std::cell::{Cell, RefCell};

use embedded_hal::delay::DelayNs;
use levelpump::app::events::AppEvent;
use levelpump::app::ports::{ConfigError, ConfigPort, EventSink, IndicatorPort, ProbePort, PumpPort};
use levelpump::config::SystemConfig;
use levelpump::sensors::probe::ProbeId;

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCall {
    Pump(bool),
    StatusLed(bool),
    BuiltinLed(bool),
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    pub calls: Vec<OutputCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pump_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                OutputCall::Pump(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn pump_writes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                OutputCall::Pump(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn status_led(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            OutputCall::StatusLed(on) => Some(*on),
            _ => None,
        })
    }

    pub fn builtin_led(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            OutputCall::BuiltinLed(on) => Some(*on),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl PumpPort for MockHardware {
    fn set_pump(&mut self, on: bool) {
        self.calls.push(OutputCall::Pump(on));
    }
}

impl IndicatorPort for MockHardware {
    fn set_status_led(&mut self, on: bool) {
        self.calls.push(OutputCall::StatusLed(on));
    }

    fn set_builtin_led(&mut self, on: bool) {
        self.calls.push(OutputCall::BuiltinLed(on));
    }
}

// ── MockProbes ────────────────────────────────────────────────

/// Probes that read a fixed level until changed.
#[derive(Debug, Default, Clone)]
pub struct MockProbes {
    pub low: bool,
    pub mid: bool,
    pub high: bool,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockProbes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, low: bool, mid: bool, high: bool) {
        self.low = low;
        self.mid = mid;
        self.high = high;
    }
}

impl ProbePort for MockProbes {
    fn read_raw(&mut self, probe: ProbeId) -> bool {
        self.reads += 1;
        match probe {
            ProbeId::Low => self.low,
            ProbeId::Mid => self.mid,
            ProbeId::High => self.high,
        }
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Accumulates requested delay instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ms: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns) / 1_000_000;
    }

    fn delay_us(&mut self, us: u32) {
        self.total_ms += u64::from(us) / 1_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── MockConfigStore ───────────────────────────────────────────

/// In-memory config storage that counts writes.
#[derive(Default)]
pub struct MockConfigStore {
    pub stored: RefCell<Option<SystemConfig>>,
    pub saves: Cell<u32>,
    pub fail_saves: Cell<bool>,
}

#[allow(dead_code)]
impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        self.stored.borrow().clone().ok_or(ConfigError::Corrupted)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        if self.fail_saves.get() {
            return Err(ConfigError::IoError);
        }
        *self.stored.borrow_mut() = Some(config.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
