//! Phenom marker firmware library.
//!
//! Exposes the pure-logic modules for host testing.  ESP-IDF specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module;
//! board bring-up lives in the binary.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod clock;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
