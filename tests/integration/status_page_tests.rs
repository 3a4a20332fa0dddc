//! Status page output for a controller driven through real transitions.

use super::mock_hw::{MockDelay, MockHardware, MockProbes, RecordingSink};

use levelpump::app::commands::AppCommand;
use levelpump::app::service::AppService;
use levelpump::config::SystemConfig;
use levelpump::status_page::{render_status_json, render_status_page, STATUS_TEMPLATE};

fn pumping_app() -> AppService {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut delay = MockDelay::default();
    let mut sink = RecordingSink::new();
    let mut probes = MockProbes::new();
    probes.set(true, true, true);

    app.start(0, &mut hw, &mut delay, &mut sink);
    app.tick(3_000, &mut probes, &mut hw, &mut delay, &mut sink);
    app.tick(6_000, &mut probes, &mut hw, &mut delay, &mut sink);
    app
}

#[test]
fn page_reflects_running_pump() {
    let app = pumping_app();
    let html = render_status_page(STATUS_TEMPLATE, &app.snapshot(), app.events());

    assert!(html.contains("<b>ON</b>"));
    assert!(html.contains("poll 1000 ms"));
    assert!(html.contains(r#"class="lvl green">high"#));
    assert!(html.contains("pump started (high level)"));
    assert!(!html.contains('%'), "every placeholder substituted");
}

#[test]
fn page_marks_manual_runs() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(0, &mut hw, &mut MockDelay::default(), &mut sink);
    app.handle_command(0, AppCommand::ManualPump, &mut hw, &mut sink).unwrap();

    let html = render_status_page("%PUMP% %LOWCLS%", &app.snapshot(), app.events());
    assert_eq!(html, "ON (manual) red");
}

#[test]
fn json_lists_events_oldest_first() {
    let app = pumping_app();
    let snapshot = app.snapshot();
    let json = render_status_json(&snapshot, app.events()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(v["status"]["pumping"], true);
    assert_eq!(v["status"]["interval_ms"], 1000);
    let kinds: Vec<_> = v["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(kinds.first().map(String::as_str), Some("Started"));
    assert!(kinds.contains(&"PumpStarted".to_owned()));
}
