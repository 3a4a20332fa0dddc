//! LevelPump firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! firmware binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod scheduler;
pub mod status_page;

// Hardware-facing modules; host builds get simulation backends.
pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;
