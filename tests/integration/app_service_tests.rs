//! Integration tests for the AppService → commands → outputs pipeline.
//!
//! Drives the split API the firmware uses with a background worker
//! (`pass_due` / `apply_pass` / `service_timers`) plus command dispatch and
//! config persistence, all against recording mocks.

use super::mock_hw::{MockConfigStore, MockDelay, MockHardware, OutputCall, RecordingSink};

use levelpump::app::commands::AppCommand;
use levelpump::app::events::{AppEvent, EventKind, StartCause};
use levelpump::app::ports::ConfigPort;
use levelpump::app::service::AppService;
use levelpump::config::SystemConfig;
use levelpump::control::pump::PumpState;
use levelpump::error::CommandError;
use levelpump::scheduler::PollPhase;
use levelpump::sensors::PassReadings;

fn make_app() -> (AppService, MockHardware, MockDelay, RecordingSink) {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut delay = MockDelay::default();
    let mut sink = RecordingSink::new();
    app.start(0, &mut hw, &mut delay, &mut sink);
    hw.clear();
    (app, hw, delay, sink)
}

fn readings(low: bool, mid: bool, high: bool) -> PassReadings {
    PassReadings { low, mid, high }
}

// ── Boot ─────────────────────────────────────────────────────

#[test]
fn start_forces_every_output_off() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(0, &mut hw, &mut MockDelay::default(), &mut sink);

    assert_eq!(hw.calls[0], OutputCall::Pump(false), "pump is forced off first");
    assert_eq!(hw.status_led(), Some(false), "flash leaves the LED dark");
    assert_eq!(hw.builtin_led(), Some(false));
    assert_eq!(app.pump_state(), PumpState::Idle);
}

// ── Split sensing API ─────────────────────────────────────────

#[test]
fn apply_pass_drives_pump_without_inline_sampling() {
    let (mut app, mut hw, mut delay, mut sink) = make_app();

    assert!(!app.pass_due(2_999));
    assert!(app.pass_due(3_000));

    app.apply_pass(3_000, readings(true, true, true), &mut hw, &mut delay, &mut sink);
    app.apply_pass(6_000, readings(true, true, true), &mut hw, &mut delay, &mut sink);

    assert!(hw.pump_on(), "pump should run once high is stable");
    assert_eq!(hw.pump_writes(), [true]);
    assert_eq!(app.pass_count(), 2);
    assert_eq!(delay.total_ms, 2 * 640, "boot and auto-start flashes only");
    assert!(!app.pass_due(6_999));
    assert!(app.pass_due(7_000), "fast interval after high");
}

#[test]
fn levels_changed_reports_previous_and_current() {
    let (mut app, mut hw, mut delay, mut sink) = make_app();
    app.apply_pass(3_000, readings(true, false, false), &mut hw, &mut delay, &mut sink);
    assert_eq!(sink.count(|e| e.kind() == EventKind::LevelsChanged), 0);
    app.apply_pass(6_000, readings(true, false, false), &mut hw, &mut delay, &mut sink);

    let changed: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::LevelsChanged { previous, current } => Some((*previous, *current)),
            _ => None,
        })
        .collect();
    assert_eq!(changed.len(), 1);
    assert!(!changed[0].0.low);
    assert!(changed[0].1.low && !changed[0].1.mid);
}

#[test]
fn service_timers_blinks_between_passes() {
    let (mut app, mut hw, delay, mut sink) = make_app();
    app.handle_command(0, AppCommand::ManualPump, &mut hw, &mut sink).unwrap();
    hw.clear();

    let mut lit = Vec::new();
    for t in (500..=2_000).step_by(500) {
        app.service_timers(t, &mut hw, &mut sink);
        lit.push(hw.status_led().unwrap_or(false));
    }
    assert_eq!(lit, [true, false, true, false]);
    assert_eq!(hw.builtin_led(), Some(true));
    assert_eq!(delay.total_ms, 640, "no flash on manual start");
}

/// Replays the firmware loop with a background worker: 50 ms ticks, one
/// pass in flight at a time, each result arriving `pass_ms` after its
/// request.  Returns the request times.
fn run_worker_loop(levels: PassReadings, pass_ms: u64, until_ms: u64) -> (AppService, Vec<u64>) {
    let (mut app, mut hw, mut delay, mut sink) = make_app();
    let mut in_flight: Option<u64> = None;
    let mut requests = Vec::new();
    let mut now = 0;
    while now <= until_ms {
        if app.pass_due(now) && in_flight.is_none() {
            in_flight = Some(now);
            requests.push(now);
        }
        if let Some(requested) = in_flight.filter(|t| now >= t + pass_ms) {
            in_flight = None;
            app.apply_pass(requested, levels, &mut hw, &mut delay, &mut sink);
        }
        app.service_timers(now, &mut hw, &mut sink);
        now += 50;
    }
    (app, requests)
}

#[test]
fn worker_passes_keep_the_normal_cadence() {
    let (_, requests) = run_worker_loop(readings(false, false, false), 1_200, 20_000);

    assert_eq!(requests.first(), Some(&3_000));
    assert!(requests.len() >= 5);
    for gap in requests.windows(2).map(|w| w[1] - w[0]) {
        assert_eq!(gap, 3_000, "pass duration must not stretch the interval");
    }
}

#[test]
fn slow_passes_run_back_to_back_in_fast_phase() {
    let (app, requests) = run_worker_loop(readings(true, true, true), 4_620, 40_000);

    assert_eq!(app.pump_state(), PumpState::Running);
    assert_eq!(app.snapshot().interval_ms, 1_000);
    for gap in requests.windows(2).map(|w| w[1] - w[0]) {
        // Completion tick plus the next loop tick, never an extra interval.
        assert_eq!(gap, 4_700);
    }
}

// ── Command dispatch ──────────────────────────────────────────

#[test]
fn manual_command_starts_pump_and_records_cause() {
    let (mut app, mut hw, _delay, mut sink) = make_app();
    assert_eq!(app.handle_command(10, AppCommand::ManualPump, &mut hw, &mut sink), Ok(()));

    assert!(hw.pump_on());
    let s = app.snapshot();
    assert!(s.pumping && s.manual_override);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::PumpStarted { cause: StartCause::Manual })
    );
}

#[test]
fn manual_takes_over_running_auto_pump() {
    let (mut app, mut hw, mut delay, mut sink) = make_app();
    app.apply_pass(3_000, readings(true, true, true), &mut hw, &mut delay, &mut sink);
    app.apply_pass(6_000, readings(true, true, true), &mut hw, &mut delay, &mut sink);
    hw.clear();

    app.handle_command(6_500, AppCommand::ManualPump, &mut hw, &mut sink).unwrap();
    assert!(hw.pump_writes().is_empty(), "pump already on");
    assert!(app.snapshot().manual_override);

    app.service_timers(16_500, &mut hw, &mut sink);
    assert_eq!(hw.pump_writes(), [false], "expiry ends the run");
    assert_eq!(app.snapshot().pump_cycles, 0);
}

#[test]
fn debug_toggle_switches_interval_and_emits_event() {
    let (mut app, mut hw, _delay, mut sink) = make_app();
    app.handle_command(100, AppCommand::SetDebugFast(true), &mut hw, &mut sink).unwrap();

    let s = app.snapshot();
    assert!(s.debug_fast);
    assert_eq!((s.interval_ms, s.phase), (1_000, PollPhase::Fast));
    assert!(sink.events.contains(&AppEvent::DebugFastChanged(true)));

    assert_eq!(
        app.handle_command(200, AppCommand::OverrideInterval(5_000), &mut hw, &mut sink),
        Err(CommandError::DebugFastActive)
    );
}

#[test]
fn debug_off_waits_for_next_pass() {
    let (mut app, mut hw, mut delay, mut sink) = make_app();
    app.handle_command(0, AppCommand::SetDebugFast(true), &mut hw, &mut sink).unwrap();
    app.handle_command(100, AppCommand::SetDebugFast(false), &mut hw, &mut sink).unwrap();
    assert_eq!(app.snapshot().interval_ms, 1_000);

    app.apply_pass(1_000, readings(false, false, false), &mut hw, &mut delay, &mut sink);
    assert_eq!(app.snapshot().interval_ms, 3_000);
}

// ── Config persistence ───────────────────────────────────────

#[test]
fn debug_toggle_is_auto_saved_after_quiet_period() {
    let (mut app, mut hw, _delay, mut sink) = make_app();
    let store = MockConfigStore::new();

    app.handle_command(1_000, AppCommand::SetDebugFast(true), &mut hw, &mut sink).unwrap();
    assert!(!app.auto_save_if_needed(5_999, &store), "too early");
    assert!(app.auto_save_if_needed(6_000, &store));
    assert!(!app.is_config_dirty());
    assert_eq!(store.saves.get(), 1);
    assert!(store.load().map(|c| c.debug_fast).unwrap_or(false));

    assert!(!app.auto_save_if_needed(20_000, &store), "nothing new to save");
}

#[test]
fn failed_save_keeps_config_dirty() {
    let (mut app, mut hw, _delay, mut sink) = make_app();
    let store = MockConfigStore::new();
    store.fail_saves.set(true);

    app.handle_command(0, AppCommand::SetDebugFast(true), &mut hw, &mut sink).unwrap();
    assert!(!app.auto_save_if_needed(10_000, &store));
    assert!(app.is_config_dirty());

    store.fail_saves.set(false);
    assert!(app.auto_save_if_needed(10_050, &store));
}

#[test]
fn operational_state_is_not_persisted() {
    let (mut app, mut hw, _delay, mut sink) = make_app();
    app.handle_command(0, AppCommand::ManualPump, &mut hw, &mut sink).unwrap();
    app.handle_command(0, AppCommand::OverrideInterval(2_000), &mut hw, &mut sink).unwrap();
    assert!(!app.is_config_dirty());
}

// ── Event log ─────────────────────────────────────────────────

#[test]
fn event_log_mirrors_sink() {
    let (mut app, mut hw, _delay, mut sink) = make_app();
    app.handle_command(0, AppCommand::ManualPump, &mut hw, &mut sink).unwrap();
    let _ = app.handle_command(1, AppCommand::ManualPump, &mut hw, &mut sink);

    let logged: Vec<_> = app.events().map(|r| r.kind).collect();
    let emitted: Vec<_> = sink.events.iter().map(|e| e.kind()).collect();
    assert_eq!(logged, emitted);
    assert_eq!(
        logged,
        [EventKind::Started, EventKind::PumpStarted, EventKind::CommandRejected]
    );
    assert_eq!(app.event_log().next_seq(), 3);
}
