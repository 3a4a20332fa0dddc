//! ISR-debounced button driver with short, long, and double press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch on the boot-strap pin with pull-up. GPIO
//! fires on falling edge; the ISR records the raw timestamp into an atomic,
//! and `tick()` (called from the control loop) runs the debounce + gesture
//! state machine.
//!
//! ## Gestures
//!
//! | Gesture      | Condition                                 | Operator action          |
//! |--------------|-------------------------------------------|--------------------------|
//! | Short press  | Release < 3s, no second press within 300ms | manual pump window       |
//! | Long press   | Hold >= 3s                                | toggle debug-fast polling |
//! | Double press | Two presses within 300ms gap              | fast interval override   |

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::AtomicBool;
use core::sync::atomic::{AtomicU32, Ordering};

const DEBOUNCE_MS: u32 = 50;
const LONG_PRESS_MS: u32 = 3_000;
const DOUBLE_PRESS_WINDOW_MS: u32 = 300;

/// Raw ISR timestamp (milliseconds since boot, truncated to u32).
/// Written by the ISR, read by the control loop.  Zero = never pressed.
static BUTTON_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);

#[cfg(not(target_os = "espidf"))]
static SIM_PRESSED: AtomicBool = AtomicBool::new(false);

/// Host simulation: hold or release the button.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pressed(pressed: bool) {
    SIM_PRESSED.store(pressed, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
    DoublePress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u32 },
    Pressed { since_ms: u32 },
    WaitSecondPress { first_release_ms: u32 },
}

pub struct ButtonDriver {
    gpio: i32,
    edges: &'static AtomicU32,
    state: GestureState,
    last_isr_ms: u32,
}

impl ButtonDriver {
    pub fn new(gpio: i32) -> Self {
        Self::with_edge_source(gpio, &BUTTON_ISR_TIMESTAMP)
    }

    /// Read falling-edge timestamps from `edges` instead of the global ISR
    /// cell.
    pub fn with_edge_source(gpio: i32, edges: &'static AtomicU32) -> Self {
        Self {
            gpio,
            edges,
            state: GestureState::Idle,
            last_isr_ms: 0,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Call once per control tick.  Returns a classified gesture, if any.
    pub fn tick(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let isr_ms = self.edges.load(Ordering::Acquire);
        let new_press = isr_ms != 0 && isr_ms != self.last_isr_ms;
        if new_press {
            self.last_isr_ms = isr_ms;
        }

        match self.state {
            GestureState::Idle => {
                if new_press {
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = GestureState::Pressed { since_ms };
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                let held_ms = now_ms.wrapping_sub(since_ms);
                if held_ms >= LONG_PRESS_MS {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::LongPress);
                }
                if !self.is_pressed() {
                    self.state = GestureState::WaitSecondPress { first_release_ms: now_ms };
                }
                None
            }

            GestureState::WaitSecondPress { first_release_ms } => {
                let gap = now_ms.wrapping_sub(first_release_ms);
                if new_press && gap <= DOUBLE_PRESS_WINDOW_MS {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::DoublePress);
                }
                if gap > DOUBLE_PRESS_WINDOW_MS {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                None
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn is_pressed(&self) -> bool {
        !crate::drivers::hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_pressed(&self) -> bool {
        SIM_PRESSED.load(Ordering::Relaxed)
    }
}

/// ISR handler: register on the button GPIO falling edge.
/// Lock-free, safe from interrupt context.
pub fn button_isr_handler(now_ms: u32) {
    BUTTON_ISR_TIMESTAMP.store(now_ms.max(1), Ordering::Release);
}
