//! GPIO pin assignments for the LevelPump controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Capacitive level probes
// ---------------------------------------------------------------------------

/// Probe at the low mark (~10 % fill).
pub const PROBE_LOW_GPIO: i32 = 4;
/// Probe at the mid mark (~50 % fill).
pub const PROBE_MID_GPIO: i32 = 5;
/// Probe at the high mark (~80 % fill).
pub const PROBE_HIGH_GPIO: i32 = 6;
/// Shared reference line every probe is measured against.
/// Idles as a pulled-up input; reads LOW while the driven probe is submerged.
pub const PROBE_REFERENCE_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Pump relay / MOSFET gate (active HIGH).
pub const PUMP_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// External status LED (active LOW).
pub const STATUS_LED_GPIO: i32 = 11;
/// On-board LED, mirrors the pump state (active LOW).
pub const BUILTIN_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// User button (active-low with pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button for manual pump / debug mode.
pub const BUTTON_GPIO: i32 = 0;
