//! Sensing subsystem: probes, majority sampling, hysteresis, and the
//! background sensing worker.
//!
//! ```text
//!   ProbePort ──▶ StableProbeSampler ──▶ PassReadings ──▶ LevelBank ──▶ LevelFlags
//!   (raw reads)    (3-of-4 per probe)     (low,mid,high)   (hysteresis)
//! ```
//!
//! A *pass* samples all three probes in the fixed order low, mid, high.
//! The bank applies all three readings before anyone looks at the flags,
//! so pump logic always sees one consistent set.

pub mod level_filter;
pub mod probe;
pub mod sampler;
pub mod worker;

use embedded_hal::delay::DelayNs;
use serde::Serialize;

use crate::app::ports::ProbePort;
use crate::error::SensorError;
use level_filter::LevelFilter;
use probe::ProbeId;
use sampler::StableProbeSampler;
use worker::CancelToken;

/// Debounced level flags.  `true` = the probe is considered submerged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelFlags {
    pub low: bool,
    pub mid: bool,
    pub high: bool,
}

impl LevelFlags {
    pub fn get(&self, probe: ProbeId) -> bool {
        match probe {
            ProbeId::Low => self.low,
            ProbeId::Mid => self.mid,
            ProbeId::High => self.high,
        }
    }
}

/// Stable samples from one pass, before hysteresis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReadings {
    pub low: bool,
    pub mid: bool,
    pub high: bool,
}

impl PassReadings {
    fn set(&mut self, probe: ProbeId, value: bool) {
        match probe {
            ProbeId::Low => self.low = value,
            ProbeId::Mid => self.mid = value,
            ProbeId::High => self.high = value,
        }
    }
}

/// Result of feeding one pass into the [`LevelBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankUpdate {
    pub previous: LevelFlags,
    pub current: LevelFlags,
}

impl BankUpdate {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// One [`LevelFilter`] per probe.
#[derive(Debug, Clone)]
pub struct LevelBank {
    low: LevelFilter,
    mid: LevelFilter,
    high: LevelFilter,
}

impl LevelBank {
    pub fn new(limit: u8) -> Self {
        Self {
            low: LevelFilter::new(limit),
            mid: LevelFilter::new(limit),
            high: LevelFilter::new(limit),
        }
    }

    pub fn flags(&self) -> LevelFlags {
        LevelFlags {
            low: self.low.flag(),
            mid: self.mid.flag(),
            high: self.high.flag(),
        }
    }

    pub fn apply(&mut self, readings: PassReadings) -> BankUpdate {
        let previous = self.flags();
        self.low.update(readings.low);
        self.mid.update(readings.mid);
        self.high.update(readings.high);
        BankUpdate { previous, current: self.flags() }
    }
}

/// Sample every probe once, blocking.
pub fn sample_pass(
    sampler: &StableProbeSampler,
    port: &mut impl ProbePort,
    delay: &mut impl DelayNs,
) -> PassReadings {
    let mut readings = PassReadings::default();
    for probe in ProbeId::ALL {
        readings.set(probe, sampler.sample(probe, port, delay));
    }
    readings
}

/// Sample every probe once, giving up as soon as `cancel` fires.
pub fn sample_pass_cancellable(
    sampler: &StableProbeSampler,
    port: &mut impl ProbePort,
    delay: &mut impl DelayNs,
    cancel: &CancelToken,
) -> Result<PassReadings, SensorError> {
    let mut readings = PassReadings::default();
    for probe in ProbeId::ALL {
        readings.set(probe, sampler.sample_cancellable(probe, port, delay, cancel)?);
    }
    Ok(readings)
}
