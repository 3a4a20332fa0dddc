//! System configuration parameters
//!
//! All tunable parameters for the LevelPump controller.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::pump::StartPolicy;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sensing ---
    /// Settle time between driving a probe and sampling the reference (ms)
    pub debounce_ms: u32,
    /// Raw reads per stable sample
    pub samples_per_burst: u8,
    /// Raw reads that must agree on "submerged" for a `true` sample
    pub samples_required: u8,
    /// Spacing between consecutive raw reads (ms)
    pub sample_spacing_ms: u32,
    /// Consecutive disagreeing samples before a level flag flips
    pub stable_limit: u8,

    // --- Polling ---
    /// Poll interval while the high probe is submerged (ms)
    pub fast_interval_ms: u32,
    /// Default poll interval (ms)
    pub normal_interval_ms: u32,
    /// Poll interval right after an automatic pump stop (ms)
    pub long_interval_ms: u32,
    /// Force fast polling and lock out interval overrides
    pub debug_fast: bool,

    // --- Pump ---
    /// Length of a manual pump window (ms)
    pub manual_pump_ms: u32,
    /// Guard applied before an automatic start
    pub start_policy: StartPolicy,

    // --- Indicator ---
    /// Status LED toggle period while pumping (ms)
    pub blink_period_ms: u32,
    /// Pulses in a transition flash burst
    pub flash_pulses: u8,
    /// On (and off) time of one flash pulse (ms)
    pub flash_step_ms: u32,

    // --- Timing ---
    /// Control loop interval (ms)
    pub control_loop_interval_ms: u32,
    /// Pause after the boot flash before the first pass (ms)
    pub startup_settle_ms: u32,
    /// Task watchdog timeout (ms)
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sensing: 4 reads, 500 ms apart, 3 of 4 must agree
            debounce_ms: 10,
            samples_per_burst: 4,
            samples_required: 3,
            sample_spacing_ms: 500,
            stable_limit: 2,

            // Polling
            fast_interval_ms: 1_000,
            normal_interval_ms: 3_000,
            long_interval_ms: 60_000,
            debug_fast: false,

            // Pump
            manual_pump_ms: 10_000,
            start_policy: StartPolicy::RequireCorroboration,

            // Indicator
            blink_period_ms: 500,
            flash_pulses: 4,
            flash_step_ms: 80,

            // Timing
            control_loop_interval_ms: 50,
            startup_settle_ms: 1_000,
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Out-of-range values are rejected, never
    /// clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.debounce_ms) {
            return Err(ConfigError::ValidationFailed("debounce_ms must be 1–100"));
        }
        if !(1..=16).contains(&self.samples_per_burst) {
            return Err(ConfigError::ValidationFailed(
                "samples_per_burst must be 1–16",
            ));
        }
        if self.samples_required == 0 || self.samples_required > self.samples_per_burst {
            return Err(ConfigError::ValidationFailed(
                "samples_required must be 1..=samples_per_burst",
            ));
        }
        if self.sample_spacing_ms > 5_000 {
            return Err(ConfigError::ValidationFailed(
                "sample_spacing_ms must be 0–5000",
            ));
        }
        if !(1..=10).contains(&self.stable_limit) {
            return Err(ConfigError::ValidationFailed("stable_limit must be 1–10"));
        }
        if self.fast_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "fast_interval_ms must be non-zero",
            ));
        }
        if self.normal_interval_ms < self.fast_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "normal_interval_ms must be >= fast_interval_ms",
            ));
        }
        if self.long_interval_ms < self.normal_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "long_interval_ms must be >= normal_interval_ms",
            ));
        }
        if !(1_000..=600_000).contains(&self.manual_pump_ms) {
            return Err(ConfigError::ValidationFailed(
                "manual_pump_ms must be 1000–600000",
            ));
        }
        if !(50..=5_000).contains(&self.blink_period_ms) {
            return Err(ConfigError::ValidationFailed(
                "blink_period_ms must be 50–5000",
            ));
        }
        if self.flash_pulses > 10 || !(10..=500).contains(&self.flash_step_ms) {
            return Err(ConfigError::ValidationFailed(
                "flash burst must be 0–10 pulses of 10–500 ms",
            ));
        }
        if !(10..=1_000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 10–1000",
            ));
        }
        if self.watchdog_timeout_ms < 5_000 {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must be >= 5000",
            ));
        }
        Ok(())
    }
}
