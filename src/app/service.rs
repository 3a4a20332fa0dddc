//! Application service: the hexagonal core.
//!
//! [`AppService`] owns every piece of controller state: level filters,
//! pump state machine, poll scheduler, indicator phase and the event log.
//! It exposes a clean, hardware-agnostic API.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!    ProbePort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │          AppService           │
//!     PumpPort ◀── │ LevelBank · PumpController    │ ──▶ EventLog
//! IndicatorPort ◀──│ PollScheduler · Indicator     │
//!                  └──────────────────────────────┘
//! ```
//!
//! Two ways to drive it:
//!
//! - [`tick`](AppService::tick) samples the probes inline (blocking for a
//!   whole pass when one is due).
//! - [`pass_due`](AppService::pass_due) / [`apply_pass`](AppService::apply_pass) /
//!   [`service_timers`](AppService::service_timers) let a caller run the
//!   pass elsewhere (see [`SensingWorker`](crate::sensors::worker::SensingWorker))
//!   and keep the indicator and manual expiry on a fast cadence.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::pump::{PumpController, PumpState, PumpTransition};
use crate::drivers::indicator::{flash_burst, IndicatorDriver};
use crate::error::CommandError;
use crate::scheduler::{IntervalChange, PollScheduler};
use crate::sensors::sampler::StableProbeSampler;
use crate::sensors::{sample_pass, LevelBank, LevelFlags, PassReadings};

use super::commands::AppCommand;
use super::events::{AppEvent, EventLog, EventRecord, StartCause, StatusSnapshot};
use super::ports::{ConfigPort, EventSink, IndicatorPort, ProbePort, PumpPort};

/// Quiet period after a config change before it is written to storage.
const CONFIG_SAVE_DELAY_MS: u64 = 5_000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    sampler: StableProbeSampler,
    levels: LevelBank,
    pump: PumpController,
    scheduler: PollScheduler,
    indicator: IndicatorDriver,
    log: EventLog,
    passes: u64,
    config_dirty: bool,
    dirty_since_ms: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch any output; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            sampler: StableProbeSampler::from_config(&config),
            levels: LevelBank::new(config.stable_limit),
            pump: PumpController::new(config.start_policy, config.manual_pump_ms),
            scheduler: PollScheduler::new(&config),
            indicator: IndicatorDriver::new(config.blink_period_ms),
            log: EventLog::new(),
            passes: 0,
            config_dirty: false,
            dirty_since_ms: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output to idle and play the boot flash.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut (impl PumpPort + IndicatorPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        self.pump.force_off(hw);
        hw.set_status_led(false);
        hw.set_builtin_led(false);
        flash_burst(self.config.flash_pulses, self.config.flash_step_ms, hw, delay);
        self.record(now_ms, AppEvent::Started, sink);
        info!(
            "AppService started (interval={}ms, policy={:?}, debug_fast={})",
            self.scheduler.interval_ms(),
            self.pump.policy(),
            self.scheduler.debug_fast()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control tick with inline sensing.
    ///
    /// The pass (if due) runs before the manual-expiry check, so a window
    /// that expires on this tick cannot be followed by an auto-start until
    /// the next pass.
    ///
    /// Timers are serviced at `now_ms`, the tick's start.  A due pass blocks
    /// for its whole sampling burst, so a manual window ending during that
    /// burst is only closed on the following tick, and the blink phase lags
    /// by the same amount.  The worker-driven split API has no such lag.
    pub fn tick(
        &mut self,
        now_ms: u64,
        probes: &mut impl ProbePort,
        hw: &mut (impl PumpPort + IndicatorPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        if self.pass_due(now_ms) {
            let readings = sample_pass(&self.sampler, probes, delay);
            self.apply_pass(now_ms, readings, hw, delay, sink);
        }
        self.service_timers(now_ms, hw, sink);
    }

    pub fn pass_due(&self, now_ms: u64) -> bool {
        self.scheduler.is_due(now_ms)
    }

    /// Feed one completed pass through the filters, the pump state machine
    /// and the scheduler.  All three flags are updated before the pump
    /// looks at them.
    ///
    /// `started_ms` is when the pass began sampling; the next pass is due
    /// one interval after that, however long this one took.
    pub fn apply_pass(
        &mut self,
        started_ms: u64,
        readings: PassReadings,
        hw: &mut (impl PumpPort + IndicatorPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        self.passes += 1;
        let update = self.levels.apply(readings);
        let flags = update.current;
        debug!(
            "LEVEL | pass={} raw={}{}{} flags={}{}{}",
            self.passes,
            u8::from(readings.low),
            u8::from(readings.mid),
            u8::from(readings.high),
            u8::from(flags.low),
            u8::from(flags.mid),
            u8::from(flags.high)
        );
        if update.changed() {
            self.record(
                started_ms,
                AppEvent::LevelsChanged { previous: update.previous, current: flags },
                sink,
            );
        }

        let mut just_stopped = false;
        match self.pump.evaluate(flags, hw) {
            Some(PumpTransition::AutoStarted) => {
                self.record(started_ms, AppEvent::PumpStarted { cause: StartCause::Auto }, sink);
                self.flash(hw, delay);
            }
            Some(PumpTransition::AutoStopped { cycles }) => {
                just_stopped = true;
                self.record(started_ms, AppEvent::PumpStopped { cycles }, sink);
                self.flash(hw, delay);
            }
            _ => {}
        }

        let change = self.scheduler.reevaluate(flags.high, just_stopped);
        self.record_interval(started_ms, change, sink);
        self.scheduler.mark_pass(started_ms);
    }

    /// Manual-window expiry and indicator refresh.  Call every control
    /// tick, independent of sensing.
    pub fn service_timers(
        &mut self,
        now_ms: u64,
        hw: &mut (impl PumpPort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        if let Some(PumpTransition::ManualExpired) = self.pump.check_manual_expiry(now_ms, hw) {
            self.record(now_ms, AppEvent::ManualWindowExpired, sink);
        }
        let pumping = self.pump.is_pumping();
        let output = self.indicator.render(now_ms, pumping, self.levels.flags().mid);
        IndicatorDriver::apply(output, pumping, hw);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator command.  Rejections are returned and also
    /// recorded as a `CommandRejected` event.
    pub fn handle_command(
        &mut self,
        now_ms: u64,
        cmd: AppCommand,
        hw: &mut impl PumpPort,
        sink: &mut impl EventSink,
    ) -> Result<(), CommandError> {
        let result = match cmd {
            AppCommand::ManualPump => self
                .pump
                .request_manual(now_ms, hw)
                .map(|_| self.record(now_ms, AppEvent::PumpStarted { cause: StartCause::Manual }, sink)),
            AppCommand::OverrideInterval(ms) => self
                .scheduler
                .request_override(ms)
                .map(|change| self.record_interval(now_ms, change, sink)),
            AppCommand::SetDebugFast(on) => {
                self.set_debug_fast(now_ms, on, sink);
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("CMD   | {:?} rejected: {}", cmd, e);
            self.record(now_ms, AppEvent::CommandRejected(e), sink);
        }
        result
    }

    pub fn request_manual_pump(
        &mut self,
        now_ms: u64,
        hw: &mut impl PumpPort,
        sink: &mut impl EventSink,
    ) -> Result<(), CommandError> {
        self.handle_command(now_ms, AppCommand::ManualPump, hw, sink)
    }

    pub fn request_interval_override(
        &mut self,
        now_ms: u64,
        ms: u32,
        hw: &mut impl PumpPort,
        sink: &mut impl EventSink,
    ) -> Result<(), CommandError> {
        self.handle_command(now_ms, AppCommand::OverrideInterval(ms), hw, sink)
    }

    fn set_debug_fast(&mut self, now_ms: u64, on: bool, sink: &mut impl EventSink) {
        if self.scheduler.debug_fast() == on {
            return;
        }
        let change = self.scheduler.set_debug_fast(on);
        self.record(now_ms, AppEvent::DebugFastChanged(on), sink);
        self.record_interval(now_ms, change, sink);
        self.config.debug_fast = on;
        self.mark_config_dirty(now_ms);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> StatusSnapshot {
        let flags = self.levels.flags();
        StatusSnapshot {
            low: flags.low,
            mid: flags.mid,
            high: flags.high,
            pumping: self.pump.is_pumping(),
            manual_override: self.pump.is_manual(),
            pump_cycles: self.pump.cycles(),
            interval_ms: self.scheduler.interval_ms(),
            phase: self.scheduler.phase(),
            debug_fast: self.scheduler.debug_fast(),
        }
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &EventRecord> {
        self.log.iter()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn flags(&self) -> LevelFlags {
        self.levels.flags()
    }

    pub fn pump_state(&self) -> PumpState {
        self.pump.state()
    }

    /// Completed sensing passes since startup.
    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    pub fn current_config(&self) -> SystemConfig {
        self.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    fn record(&mut self, now_ms: u64, event: AppEvent, sink: &mut impl EventSink) {
        self.log.push(now_ms, &event);
        sink.emit(&event);
    }

    fn record_interval(&mut self, now_ms: u64, change: Option<IntervalChange>, sink: &mut impl EventSink) {
        if let Some(c) = change {
            self.record(
                now_ms,
                AppEvent::IntervalChanged { from_ms: c.from_ms, to_ms: c.to_ms, phase: c.phase },
                sink,
            );
        }
    }

    fn flash(&self, hw: &mut impl IndicatorPort, delay: &mut impl DelayNs) {
        flash_burst(self.config.flash_pulses, self.config.flash_step_ms, hw, delay);
    }

    // ── Config dirty-flag management ──────────────────────────

    fn mark_config_dirty(&mut self, now_ms: u64) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_ms = now_ms;
        }
    }

    /// Persist the config once it has been unchanged for a few seconds.
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, now_ms: u64, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty || now_ms.saturating_sub(self.dirty_since_ms) < CONFIG_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
