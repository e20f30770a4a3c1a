//! Platform adapters implementing the application ports.

pub mod nvs;
