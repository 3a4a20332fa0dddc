//! LevelPump firmware entry point
//!
//! Hexagonal architecture: the library holds all domain logic; this binary
//! wires ESP-IDF adapters around it and runs the control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (Pump+Indicator)  (EventSink)    (Config)     (clock)         │
//! │  SensingWorker ── ProbeReader (ProbePort, own core-pinned task)│
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  LevelBank · PumpController · PollScheduler · LEDs     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use esp_idf_hal::delay::FreeRtos;
use log::{debug, info, warn};

use levelpump::adapters::hardware::HardwareAdapter;
use levelpump::adapters::log_sink::LogEventSink;
use levelpump::adapters::nvs::NvsAdapter;
use levelpump::adapters::time::{Esp32TimeAdapter, PlatformDelay};
use levelpump::app::commands::AppCommand;
use levelpump::app::ports::ConfigPort;
use levelpump::app::service::AppService;
use levelpump::config::SystemConfig;
use levelpump::drivers::button::ButtonDriver;
use levelpump::drivers::hw_init;
use levelpump::drivers::watchdog::Watchdog;
use levelpump::error::Error;
use levelpump::pins;
use levelpump::sensors::probe::ProbeReader;
use levelpump::sensors::sampler::StableProbeSampler;
use levelpump::sensors::worker::SensingWorker;
use levelpump::status_page;

fn load_config(nvs: &NvsAdapter) -> levelpump::error::Result<SystemConfig> {
    let config = nvs.load()?;
    config.validate()?;
    Ok(config)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LevelPump v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    if let Err(e) = hw_init::init_isr_service() {
        log::error!("ISR service init failed: {}, button disabled", e);
    }

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let config = match nvs.as_ref().map(load_config) {
        Some(Ok(cfg)) => {
            info!("Config loaded from NVS");
            cfg
        }
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
        None => SystemConfig::default(),
    };

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 4. Construct adapters ─────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut delay: PlatformDelay = FreeRtos;
    let mut hw = HardwareAdapter::new();
    let mut log_sink = LogEventSink::new();
    let mut button = ButtonDriver::new(pins::BUTTON_GPIO);

    // ── 5. Construct app service + boot sequence ──────────────
    let mut app = AppService::new(config.clone());
    app.start(clock.uptime_ms(), &mut hw, &mut delay, &mut log_sink);
    delay.delay_ms(config.startup_settle_ms);

    // ── 6. Sensing task owns the probes from here on ──────────
    let mut worker = SensingWorker::spawn(
        StableProbeSampler::from_config(&config),
        ProbeReader::new(FreeRtos, config.debounce_ms),
        FreeRtos,
    )?;

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();

        // Refused while a pass is in flight.  Without the sensing task the
        // pump can no longer follow the levels, so reboot.
        if app.pass_due(now_ms) {
            if let Err(e) = worker.request_pass(now_ms) {
                log::error!("SENSE | {}, restarting", e);
                // SAFETY: esp_restart never returns; no state needs flushing.
                unsafe { esp_idf_svc::sys::esp_restart() };
            }
        }

        if let Some(pass) = worker.try_take() {
            app.apply_pass(pass.requested_ms, pass.readings, &mut hw, &mut delay, &mut log_sink);
            let snapshot = app.snapshot();
            match status_page::render_status_json(&snapshot, app.events()) {
                Ok(json) => debug!("STATUS | {}", json),
                Err(e) => warn!("STATUS | render failed: {}", e),
            }
        }

        app.service_timers(now_ms, &mut hw, &mut log_sink);

        if let Some(gesture) = button.tick(now_ms as u32) {
            let cmd = AppCommand::from_button(gesture, app.snapshot().debug_fast, config.fast_interval_ms);
            info!("Button: {:?} -> {:?}", gesture, cmd);
            // Rejections are logged and recorded by the service.
            let _ = app.handle_command(now_ms, cmd, &mut hw, &mut log_sink);
        }

        if let Some(nvs) = nvs.as_ref() {
            app.auto_save_if_needed(now_ms, nvs);
        }

        watchdog.feed();
        delay.delay_ms(config.control_loop_interval_ms);
    }
}
