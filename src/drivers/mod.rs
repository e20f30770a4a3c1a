//! Hardware drivers behind the application ports.

pub mod button;
pub mod panel;
pub mod solenoid;
pub mod tick_timer;
pub mod trigger_switch;
pub mod watchdog;
