//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                 |
//! |------------|----------------|-----------------------------|
//! | `hardware` | PumpPort       | Pump relay GPIO             |
//! |            | IndicatorPort  | Status + on-board LED GPIOs |
//! | `log_sink` | EventSink      | Serial log output           |
//! | `nvs`      | ConfigPort     | NVS / in-memory store       |
//! | `time`     | (clock, delay) | ESP32 system timer, FreeRTOS|
//!
//! `ProbePort` is implemented by [`ProbeReader`](crate::sensors::probe::ProbeReader),
//! which lives with the rest of the sensing code.

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
