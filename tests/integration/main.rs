//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! mock hardware.  All tests run on the host with no real hardware.

mod firing_scenarios;
mod service_flow;
