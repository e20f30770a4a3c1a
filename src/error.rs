//! Unified error types for the marker firmware.
//!
//! The firing state machine itself never fails; these errors belong to
//! its collaborators (preset storage, GPIO setup).  All variants are
//! `Copy` so they can be logged and dropped without allocation.

use core::fmt;

use embedded_hal::digital::ErrorKind;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible collaborator operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Preset storage could not be read or written.
    Storage(StorageError),
    /// A GPIO read or write failed.
    Gpio(ErrorKind),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Gpio(kind) => write!(f, "gpio: {kind}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::Gpio(kind)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Errors from [`PresetStore`](crate::app::ports::PresetStore) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Nothing has been written to this slot yet.
    NotFound,
    /// Preset index beyond the bank capacity.
    OutOfRange,
    /// Generic I/O error from the storage backend.
    Io,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "slot not found"),
            Self::OutOfRange => write!(f, "preset index out of range"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
