//! Adaptive poll scheduler.
//!
//! Decides how long the controller waits between sensing passes.  The
//! interval is re-evaluated once per completed pass, never per tick.
//!
//! ```text
//!   debug_fast ──▶ Fast   (override requests rejected)
//!        │ no
//!   high flag ──▶ Fast   (1 s: pump about to run / running)
//!        │ no
//!   just stopped ─▶ Long  (60 s: reservoir just emptied)
//!        │ no
//!        └──────▶ Normal (3 s)
//! ```
//!
//! An accepted override replaces the current interval until the next
//! pass re-evaluates it.  Overrides must lie in `1..=long_interval_ms`, so
//! a pass is always due again within the longest configured interval.

use log::info;
use serde::Serialize;

use crate::config::SystemConfig;
use crate::error::CommandError;

/// Sensing cadence regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollPhase {
    Fast,
    Normal,
    Long,
}

/// Reported whenever the active interval changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalChange {
    pub from_ms: u32,
    pub to_ms: u32,
    pub phase: PollPhase,
}

#[derive(Debug, Clone)]
pub struct PollScheduler {
    fast_ms: u32,
    normal_ms: u32,
    long_ms: u32,
    debug_fast: bool,
    interval_ms: u32,
    phase: PollPhase,
    last_pass_ms: u64,
}

impl PollScheduler {
    /// Starts in the Normal phase, or Fast if debug mode is configured.
    pub fn new(config: &SystemConfig) -> Self {
        let mut s = Self {
            fast_ms: config.fast_interval_ms,
            normal_ms: config.normal_interval_ms,
            long_ms: config.long_interval_ms,
            debug_fast: config.debug_fast,
            interval_ms: config.normal_interval_ms,
            phase: PollPhase::Normal,
            last_pass_ms: 0,
        };
        if s.debug_fast {
            s.interval_ms = s.fast_ms;
            s.phase = PollPhase::Fast;
        }
        s
    }

    /// Pure policy: interval and phase for the given inputs.
    pub fn next_interval(&self, high: bool, just_auto_stopped: bool, debug_forced: bool) -> (u32, PollPhase) {
        if debug_forced || high {
            (self.fast_ms, PollPhase::Fast)
        } else if just_auto_stopped {
            (self.long_ms, PollPhase::Long)
        } else {
            (self.normal_ms, PollPhase::Normal)
        }
    }

    /// Re-derive the interval after a completed pass.
    pub fn reevaluate(&mut self, high: bool, just_auto_stopped: bool) -> Option<IntervalChange> {
        let (to_ms, phase) = self.next_interval(high, just_auto_stopped, self.debug_fast);
        self.apply(to_ms, phase)
    }

    /// Attempt an operator override.  Rejected while debug-fast is forced
    /// and for zero or anything above the long interval.
    pub fn request_override(&mut self, ms: u32) -> Result<Option<IntervalChange>, CommandError> {
        if self.debug_fast {
            return Err(CommandError::DebugFastActive);
        }
        if ms == 0 || ms > self.long_ms {
            return Err(CommandError::IntervalOutOfRange {
                requested_ms: ms,
                max_ms: self.long_ms,
            });
        }
        let phase = self.phase;
        Ok(self.apply(ms, phase))
    }

    /// Turning debug-fast on switches to the fast interval immediately;
    /// turning it off takes effect at the next pass.
    pub fn set_debug_fast(&mut self, on: bool) -> Option<IntervalChange> {
        self.debug_fast = on;
        if on {
            let fast = self.fast_ms;
            self.apply(fast, PollPhase::Fast)
        } else {
            None
        }
    }

    fn apply(&mut self, to_ms: u32, phase: PollPhase) -> Option<IntervalChange> {
        let from_ms = self.interval_ms;
        self.phase = phase;
        if from_ms == to_ms {
            return None;
        }
        self.interval_ms = to_ms;
        info!("SCHED | interval {}ms -> {}ms ({:?})", from_ms, to_ms, phase);
        Some(IntervalChange { from_ms, to_ms, phase })
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_pass_ms) >= u64::from(self.interval_ms)
    }

    pub fn mark_pass(&mut self, now_ms: u64) {
        self.last_pass_ms = now_ms;
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn debug_fast(&self) -> bool {
        self.debug_fast
    }
}
