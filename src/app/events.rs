//! Outbound application events and the bounded event log.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port and also keeps the most
//! recent ones in an [`EventLog`] for the status page.
//!
//! ```text
//!   AppService ──▶ AppEvent ──┬──▶ EventSink (serial log)
//!                             └──▶ EventLog  (last 10, seq-numbered)
//! ```

use core::fmt::{self, Write as _};

use heapless::Deque;
use serde::Serialize;

use crate::error::CommandError;
use crate::scheduler::PollPhase;
use crate::sensors::LevelFlags;

/// Ring capacity of the event log.
pub const EVENT_LOG_CAPACITY: usize = 10;

/// Max rendered length of one event line.
pub const EVENT_TEXT_LEN: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StartCause {
    Auto,
    Manual,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Boot sequence finished; outputs are in their idle state.
    Started,

    /// At least one level flag flipped on the last pass.
    LevelsChanged { previous: LevelFlags, current: LevelFlags },

    PumpStarted { cause: StartCause },

    /// Automatic stop after the reservoir drained; `cycles` is the new total.
    PumpStopped { cycles: u32 },

    /// A manual pump window ran out.
    ManualWindowExpired,

    IntervalChanged { from_ms: u32, to_ms: u32, phase: PollPhase },

    DebugFastChanged(bool),

    /// An operator command was refused by policy.
    CommandRejected(CommandError),
}

/// Discriminant of [`AppEvent`] for consumers that filter by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Started,
    LevelsChanged,
    PumpStarted,
    PumpStopped,
    ManualWindowExpired,
    IntervalChanged,
    DebugFastChanged,
    CommandRejected,
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Started => EventKind::Started,
            Self::LevelsChanged { .. } => EventKind::LevelsChanged,
            Self::PumpStarted { .. } => EventKind::PumpStarted,
            Self::PumpStopped { .. } => EventKind::PumpStopped,
            Self::ManualWindowExpired => EventKind::ManualWindowExpired,
            Self::IntervalChanged { .. } => EventKind::IntervalChanged,
            Self::DebugFastChanged(_) => EventKind::DebugFastChanged,
            Self::CommandRejected(_) => EventKind::CommandRejected,
        }
    }
}

fn wet(b: bool) -> char {
    if b { '1' } else { '0' }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "controller started"),
            Self::LevelsChanged { current, .. } => write!(
                f,
                "levels low={} mid={} high={}",
                wet(current.low),
                wet(current.mid),
                wet(current.high)
            ),
            Self::PumpStarted { cause: StartCause::Auto } => write!(f, "pump started (high level)"),
            Self::PumpStarted { cause: StartCause::Manual } => write!(f, "pump started (manual)"),
            Self::PumpStopped { cycles } => write!(f, "pump stopped, cycles={cycles}"),
            Self::ManualWindowExpired => write!(f, "pump auto-stopped after manual window"),
            Self::IntervalChanged { from_ms, to_ms, phase } => {
                write!(f, "interval {from_ms}ms -> {to_ms}ms ({phase:?})")
            }
            Self::DebugFastChanged(on) => {
                write!(f, "debug-fast {}", if *on { "on" } else { "off" })
            }
            Self::CommandRejected(e) => write!(f, "rejected: {e}"),
        }
    }
}

/// One retained log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Monotonic sequence number, never reused.
    pub seq: u32,
    pub timestamp_ms: u64,
    pub kind: EventKind,
    pub text: heapless::String<EVENT_TEXT_LEN>,
}

/// Bounded ring of the most recent events.  Oldest entries are evicted.
#[derive(Debug, Default)]
pub struct EventLog {
    records: Deque<EventRecord, EVENT_LOG_CAPACITY>,
    next_seq: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp_ms: u64, event: &AppEvent) -> u32 {
        let mut text = heapless::String::new();
        // Overlong lines are truncated at the failing write.
        let _ = write!(text, "{event}");

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);

        if self.records.is_full() {
            self.records.pop_front();
        }
        let record = EventRecord { seq, timestamp_ms, kind: event.kind(), text };
        // Cannot fail: a slot was freed above.
        let _ = self.records.push_back(record);
        seq
    }

    /// Oldest first.  Re-iterating yields the same records until the next push.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Records newer than `seq`.
    pub fn since(&self, seq: u32) -> impl Iterator<Item = &EventRecord> {
        self.records.iter().filter(move |r| r.seq > seq)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sequence number the next pushed record will get.
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }
}

/// Read-only view of the controller for status pages and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub low: bool,
    pub mid: bool,
    pub high: bool,
    pub pumping: bool,
    pub manual_override: bool,
    pub pump_cycles: u32,
    pub interval_ms: u32,
    pub phase: PollPhase,
    pub debug_fast: bool,
}
