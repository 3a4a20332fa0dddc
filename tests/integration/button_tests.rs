//! Button gestures routed through the command layer.
//!
//! This is the only test in the binary that touches the simulated button
//! level, so it cannot race with the others.

use core::sync::atomic::{AtomicU32, Ordering};

use super::mock_hw::{MockDelay, MockHardware, RecordingSink};

use levelpump::app::commands::AppCommand;
use levelpump::app::events::AppEvent;
use levelpump::app::service::AppService;
use levelpump::config::SystemConfig;
use levelpump::drivers::button::{sim_set_pressed, ButtonDriver, ButtonEvent};

#[test]
fn long_press_toggles_debug_fast() {
    static EDGES: AtomicU32 = AtomicU32::new(0);
    let mut btn = ButtonDriver::with_edge_source(0, &EDGES);

    let config = SystemConfig::default();
    let mut app = AppService::new(config.clone());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(0, &mut hw, &mut MockDelay::default(), &mut sink);

    sim_set_pressed(true);
    EDGES.store(100, Ordering::Release);
    let mut gesture = None;
    for t in (100..=3_200).step_by(50) {
        if let Some(g) = btn.tick(t) {
            gesture = Some(g);
            break;
        }
    }
    sim_set_pressed(false);
    assert_eq!(gesture, Some(ButtonEvent::LongPress));

    let cmd = AppCommand::from_button(
        ButtonEvent::LongPress,
        app.snapshot().debug_fast,
        config.fast_interval_ms,
    );
    assert_eq!(cmd, AppCommand::SetDebugFast(true));
    app.handle_command(3_100, cmd, &mut hw, &mut sink).unwrap();

    assert!(app.snapshot().debug_fast);
    assert!(sink.events.contains(&AppEvent::DebugFastChanged(true)));

    // Released and idle: no further gestures.
    assert_eq!(btn.tick(3_500), None);
    assert_eq!(btn.tick(4_000), None);
}
