//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (probes, pump relay, indicators, event sinks, config
//! storage) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches GPIO directly.
//!
//! The pump output and the indicator outputs are deliberately separate
//! traits: only [`PumpController`](crate::control::pump::PumpController)
//! is ever handed a `PumpPort`.

use crate::config::SystemConfig;
use crate::sensors::probe::ProbeId;

// ───────────────────────────────────────────────────────────────
// Probe port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One electrically debounced read of a single probe against the shared
/// reference line.
///
/// Implementations drive the probe, wait the debounce delay, sample the
/// reference, and must leave both lines in their idle configuration
/// afterwards.  No state is kept between calls.
pub trait ProbePort {
    /// `true` if the probe currently reads as submerged.
    fn read_raw(&mut self, probe: ProbeId) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The single pump output.
pub trait PumpPort {
    /// Energise (`true`) or de-energise the pump.  Writes are not
    /// confirmed; there is no feedback sensor.
    fn set_pump(&mut self, on: bool);
}

/// Status indicator outputs.
pub trait IndicatorPort {
    /// External status LED (logical level, polarity handled by the adapter).
    fn set_status_led(&mut self, on: bool);

    /// On-board LED.
    fn set_builtin_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, status
/// page, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting: invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
