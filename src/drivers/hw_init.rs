//! One-shot GPIO initialization and raw pin helpers.
//!
//! Configures GPIO directions using raw ESP-IDF sys calls. Called once
//! from `main()` before the control loop starts.  The probe lines are
//! reconfigured on every read by [`ProbeReader`](crate::sensors::probe::ProbeReader),
//! so they get their idle configuration here and nothing more.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_inputs()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn config_pin(pin: i32, mode: gpio_mode_t, pull_up: bool, intr: gpio_int_type_t) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: if pull_up {
            gpio_pullup_t_GPIO_PULLUP_ENABLE
        } else {
            gpio_pullup_t_GPIO_PULLUP_DISABLE
        },
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: intr,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // Probes float until driven; the reference idles pulled up.
    for pin in [pins::PROBE_LOW_GPIO, pins::PROBE_MID_GPIO, pins::PROBE_HIGH_GPIO] {
        unsafe { config_pin(pin, gpio_mode_t_GPIO_MODE_INPUT, false, gpio_int_type_t_GPIO_INTR_DISABLE)? };
    }
    unsafe {
        config_pin(
            pins::PROBE_REFERENCE_GPIO,
            gpio_mode_t_GPIO_MODE_INPUT,
            true,
            gpio_int_type_t_GPIO_INTR_DISABLE,
        )?;
        config_pin(pins::BUTTON_GPIO, gpio_mode_t_GPIO_MODE_INPUT, true, gpio_int_type_t_GPIO_INTR_NEGEDGE)?;
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

/// Reconfigure `pin` as an input, optionally pulled up.
#[cfg(target_os = "espidf")]
pub fn gpio_make_input(pin: i32, pull_up: bool) {
    // SAFETY: direction and pull registers of a pin owned by the caller.
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_INPUT);
        gpio_set_pull_mode(
            pin,
            if pull_up {
                gpio_pull_mode_t_GPIO_PULLUP_ONLY
            } else {
                gpio_pull_mode_t_GPIO_FLOATING
            },
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_make_input(_pin: i32, _pull_up: bool) {}

/// Reconfigure `pin` as a push-pull output.
#[cfg(target_os = "espidf")]
pub fn gpio_make_output(pin: i32) {
    // SAFETY: direction register of a pin owned by the caller.
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_make_output(_pin: i32) {}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    // (pin, idle level): pump off, both LEDs off (active low).
    let outputs = [
        (pins::PUMP_GPIO, 0),
        (pins::STATUS_LED_GPIO, 1),
        (pins::BUILTIN_LED_GPIO, 1),
    ];

    for (pin, idle) in outputs {
        unsafe {
            config_pin(pin, gpio_mode_t_GPIO_MODE_OUTPUT, false, gpio_int_type_t_GPIO_INTR_DISABLE)?;
            gpio_set_level(pin, idle);
        }
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn button_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is a RTC counter read; safe in ISR context.
    let now_ms = (unsafe { esp_timer_get_time() } / 1_000) as u32;
    crate::drivers::button::button_isr_handler(now_ms);
}

/// Install the GPIO ISR service and register the button handler.
/// Call after init_peripherals() and before the control loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service was already installed
    // (acceptable). The handler only stores into an atomic.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_set_intr_type(pins::BUTTON_GPIO, gpio_int_type_t_GPIO_INTR_NEGEDGE);
        gpio_isr_handler_add(pins::BUTTON_GPIO, Some(button_gpio_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::BUTTON_GPIO);
    }
    info!("hw_init: ISR service installed (button)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
