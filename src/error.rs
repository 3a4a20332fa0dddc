//! Unified error types for the LevelPump firmware.
//!
//! Sensor noise never surfaces here: it is absorbed by the sampler and the
//! level filters.  What remains are rejected operator commands, cancelled
//! sensing passes, and boot-time failures.  All leaf variants are `Copy`.

use core::fmt;

use crate::app::ports::ConfigError;
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// A sensing pass did not complete.
    Sensor(SensorError),
    /// An operator command was rejected by policy.
    Command(CommandError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The pass was abandoned between probe reads (shutdown requested).
    Cancelled,
    /// The sensing task has exited; no further passes will run.
    WorkerStopped,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "sensing pass cancelled"),
            Self::WorkerStopped => write!(f, "sensing task stopped"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Operator commands that policy refuses.  Never fatal; the caller gets the
/// error back and a `CommandRejected` event is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum CommandError {
    /// Manual pump requested while a manual window is already running.
    ManualOverrideActive,
    /// Interval override requested while debug-fast polling is forced.
    DebugFastActive,
    /// Interval override of zero or longer than the long poll interval.
    IntervalOutOfRange { requested_ms: u32, max_ms: u32 },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManualOverrideActive => write!(f, "manual pump window already active"),
            Self::DebugFastActive => write!(f, "interval override locked by debug-fast mode"),
            Self::IntervalOutOfRange { requested_ms, max_ms } => {
                write!(f, "interval override {requested_ms}ms outside 1..={max_ms}ms")
            }
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
