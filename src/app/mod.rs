//! Application core: pure domain logic, zero I/O.
//!
//! Hardware is reached only through the port traits in [`ports`], so the
//! service and preset logic run unchanged on the host under test.

pub mod ports;
pub mod presets;
pub mod service;
