//! Majority-vote sampling of a single probe.
//!
//! A stable sample is a burst of raw reads spaced out in time; the probe
//! counts as submerged only when enough of them agree.  With the default
//! 3-of-4 rule a single splash or dry flicker can never produce a `true`.
//!
//! ```text
//!   read ─ 500ms ─ read ─ 500ms ─ read ─ 500ms ─ read   → hits >= 3 ?
//! ```

use embedded_hal::delay::DelayNs;

use crate::app::ports::ProbePort;
use crate::config::SystemConfig;
use crate::error::SensorError;
use crate::sensors::probe::ProbeId;
use crate::sensors::worker::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableProbeSampler {
    samples: u8,
    required: u8,
    spacing_ms: u32,
}

impl Default for StableProbeSampler {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

impl StableProbeSampler {
    pub fn new(samples: u8, required: u8, spacing_ms: u32) -> Self {
        Self {
            samples: samples.max(1),
            required: required.clamp(1, samples.max(1)),
            spacing_ms,
        }
    }

    pub fn from_config(cfg: &SystemConfig) -> Self {
        Self::new(cfg.samples_per_burst, cfg.samples_required, cfg.sample_spacing_ms)
    }

    /// Blocking stable sample of `probe`.  Takes roughly
    /// `(samples - 1) * spacing` plus the port's own debounce time.
    pub fn sample(
        &self,
        probe: ProbeId,
        port: &mut impl ProbePort,
        delay: &mut impl DelayNs,
    ) -> bool {
        let mut hits = 0u8;
        for i in 0..self.samples {
            if i > 0 {
                delay.delay_ms(self.spacing_ms);
            }
            if port.read_raw(probe) {
                hits += 1;
            }
        }
        self.is_majority(hits)
    }

    /// Like [`sample`](Self::sample) but checks `cancel` before every raw
    /// read, so a shutdown never waits for a whole burst.
    pub fn sample_cancellable(
        &self,
        probe: ProbeId,
        port: &mut impl ProbePort,
        delay: &mut impl DelayNs,
        cancel: &CancelToken,
    ) -> Result<bool, SensorError> {
        let mut hits = 0u8;
        for i in 0..self.samples {
            if i > 0 {
                delay.delay_ms(self.spacing_ms);
            }
            if cancel.is_cancelled() {
                return Err(SensorError::Cancelled);
            }
            if port.read_raw(probe) {
                hits += 1;
            }
        }
        Ok(self.is_majority(hits))
    }

    pub fn is_majority(&self, hits: u8) -> bool {
        hits >= self.required
    }

    pub fn samples(&self) -> u8 {
        self.samples
    }

    pub fn spacing_ms(&self) -> u32 {
        self.spacing_ms
    }
}
