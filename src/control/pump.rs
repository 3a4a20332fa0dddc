//! Pump state machine.
//!
//! ```text
//!            auto-start (high + corroboration)
//!   ┌──────┐ ─────────────────────────────────▶ ┌─────────┐
//!   │ Idle │         manual-start               │ Running │
//!   │      │ ─────────────────────────────────▶ │ [manual]│
//!   └──────┘ ◀───────────────────────────────── └─────────┘
//!            auto-stop (low falls, all dry, not manual)
//!            manual-expiry (now >= expiry)
//! ```
//!
//! The controller is the only writer of the pump output: every
//! [`PumpPort::set_pump`] call in the firmware goes through a transition
//! here.

use serde::{Deserialize, Serialize};

use crate::app::ports::PumpPort;
use crate::error::CommandError;
use crate::sensors::LevelFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PumpState {
    Idle,
    Running,
}

/// Guard applied before an automatic start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartPolicy {
    /// High must be backed by mid or low.  Rejects a lone spurious high.
    RequireCorroboration,
    /// High alone is enough.
    HighOnly,
}

/// A state change the caller should react to (log, flash, reschedule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpTransition {
    AutoStarted,
    AutoStopped { cycles: u32 },
    ManualStarted { until_ms: u64 },
    ManualExpired,
}

#[derive(Debug, Clone)]
pub struct PumpController {
    state: PumpState,
    manual_until: Option<u64>,
    cycles: u32,
    last_low: bool,
    policy: StartPolicy,
    manual_window_ms: u32,
}

impl PumpController {
    pub fn new(policy: StartPolicy, manual_window_ms: u32) -> Self {
        Self {
            state: PumpState::Idle,
            manual_until: None,
            cycles: 0,
            last_low: false,
            policy,
            manual_window_ms,
        }
    }

    /// Drive the pump output to the idle state.  Used once at boot, before
    /// any pass, since the relay may have been left energised.
    pub fn force_off(&mut self, port: &mut impl PumpPort) {
        self.state = PumpState::Idle;
        self.manual_until = None;
        port.set_pump(false);
    }

    /// Run the automatic transitions against one pass worth of flags.
    pub fn evaluate(
        &mut self,
        flags: LevelFlags,
        port: &mut impl PumpPort,
    ) -> Option<PumpTransition> {
        let low_fell = self.last_low && !flags.low;
        self.last_low = flags.low;

        match self.state {
            PumpState::Idle if flags.high && self.corroborated(flags) => {
                self.state = PumpState::Running;
                port.set_pump(true);
                Some(PumpTransition::AutoStarted)
            }
            PumpState::Running
                if low_fell && !flags.mid && !flags.high && !self.is_manual() =>
            {
                self.state = PumpState::Idle;
                self.cycles = self.cycles.wrapping_add(1);
                port.set_pump(false);
                Some(PumpTransition::AutoStopped { cycles: self.cycles })
            }
            _ => None,
        }
    }

    /// Start (or take over) the pump for one manual window.
    pub fn request_manual(
        &mut self,
        now_ms: u64,
        port: &mut impl PumpPort,
    ) -> Result<PumpTransition, CommandError> {
        if self.is_manual() {
            return Err(CommandError::ManualOverrideActive);
        }
        let until_ms = now_ms.saturating_add(u64::from(self.manual_window_ms));
        self.manual_until = Some(until_ms);
        if self.state == PumpState::Idle {
            self.state = PumpState::Running;
            port.set_pump(true);
        }
        Ok(PumpTransition::ManualStarted { until_ms })
    }

    /// End an elapsed manual window.  Does not count as a pump cycle.
    pub fn check_manual_expiry(
        &mut self,
        now_ms: u64,
        port: &mut impl PumpPort,
    ) -> Option<PumpTransition> {
        let until = self.manual_until?;
        if now_ms < until {
            return None;
        }
        self.manual_until = None;
        self.state = PumpState::Idle;
        port.set_pump(false);
        Some(PumpTransition::ManualExpired)
    }

    fn corroborated(&self, flags: LevelFlags) -> bool {
        match self.policy {
            StartPolicy::RequireCorroboration => flags.mid || flags.low,
            StartPolicy::HighOnly => true,
        }
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_pumping(&self) -> bool {
        self.state == PumpState::Running
    }

    pub fn is_manual(&self) -> bool {
        self.manual_until.is_some()
    }

    pub fn manual_until(&self) -> Option<u64> {
        self.manual_until
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn policy(&self) -> StartPolicy {
        self.policy
    }
}
