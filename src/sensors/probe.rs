//! Capacitive level probes against a shared reference line.
//!
//! Three bare electrodes sit at the low, mid and high marks of the
//! reservoir.  A fourth line (the reference) idles as a pulled-up input.
//! To read one probe it is driven LOW; if water bridges probe and reference
//! the reference is pulled LOW too.
//!
//! ```text
//!   reference ──┬── pull-up          probe ── driven LOW
//!               │                      │
//!               └──────── water ───────┘   → reference reads LOW = submerged
//! ```
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reconfigures the GPIOs via hw_init helpers for every read.
//! On host/test: reads simulated levels (default: dry).

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use serde::Serialize;

use crate::app::ports::ProbePort;
use crate::pins;

static SIM_LOW: AtomicBool = AtomicBool::new(false);
static SIM_MID: AtomicBool = AtomicBool::new(false);
static SIM_HIGH: AtomicBool = AtomicBool::new(false);

/// Set the simulated submerged state of one probe.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_probe(probe: ProbeId, submerged: bool) {
    sim_cell(probe).store(submerged, Ordering::Relaxed);
}

fn sim_cell(probe: ProbeId) -> &'static AtomicBool {
    match probe {
        ProbeId::Low => &SIM_LOW,
        ProbeId::Mid => &SIM_MID,
        ProbeId::High => &SIM_HIGH,
    }
}

/// Which mark of the reservoir a probe sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProbeId {
    Low,
    Mid,
    High,
}

impl ProbeId {
    /// Sampling order used for every pass.
    pub const ALL: [ProbeId; 3] = [ProbeId::Low, ProbeId::Mid, ProbeId::High];

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }

    pub fn gpio(self) -> i32 {
        match self {
            Self::Low => pins::PROBE_LOW_GPIO,
            Self::Mid => pins::PROBE_MID_GPIO,
            Self::High => pins::PROBE_HIGH_GPIO,
        }
    }
}

/// GPIO-backed [`ProbePort`].
pub struct ProbeReader<D: DelayNs> {
    delay: D,
    debounce_ms: u32,
}

impl<D: DelayNs> ProbeReader<D> {
    pub fn new(delay: D, debounce_ms: u32) -> Self {
        Self { delay, debounce_ms }
    }

    #[cfg(target_os = "espidf")]
    fn sense(&mut self, probe: ProbeId) -> bool {
        use crate::drivers::hw_init;

        hw_init::gpio_make_input(pins::PROBE_REFERENCE_GPIO, true);
        hw_init::gpio_make_output(probe.gpio());
        hw_init::gpio_write(probe.gpio(), false);
        self.delay.delay_ms(self.debounce_ms);

        let submerged = !hw_init::gpio_read(pins::PROBE_REFERENCE_GPIO);

        // Release: probe floats, reference back to its pulled-up idle state.
        hw_init::gpio_make_input(probe.gpio(), false);
        hw_init::gpio_make_input(pins::PROBE_REFERENCE_GPIO, true);
        submerged
    }

    #[cfg(not(target_os = "espidf"))]
    fn sense(&mut self, probe: ProbeId) -> bool {
        self.delay.delay_ms(self.debounce_ms);
        sim_cell(probe).load(Ordering::Relaxed)
    }
}

impl<D: DelayNs> ProbePort for ProbeReader<D> {
    fn read_raw(&mut self, probe: ProbeId) -> bool {
        self.sense(probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn labels_and_order() {
        let labels: Vec<_> = ProbeId::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels, ["low", "mid", "high"]);
        assert!(ProbeId::Low < ProbeId::High);
    }

    #[test]
    fn each_probe_has_a_distinct_gpio() {
        let g: Vec<_> = ProbeId::ALL.iter().map(|p| p.gpio()).collect();
        assert_ne!(g[0], g[1]);
        assert_ne!(g[1], g[2]);
        assert!(!g.contains(&pins::PROBE_REFERENCE_GPIO));
    }

    #[test]
    fn sim_reads_follow_setter() {
        // Mid is used only by this test so parallel tests cannot interfere.
        let mut reader = ProbeReader::new(NoDelay, 10);
        sim_set_probe(ProbeId::Mid, true);
        assert!(reader.read_raw(ProbeId::Mid));
        sim_set_probe(ProbeId::Mid, false);
        assert!(!reader.read_raw(ProbeId::Mid));
    }
}
