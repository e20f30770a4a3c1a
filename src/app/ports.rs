//! Port traits: the boundary between firing logic and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FiringStateMachine / MarkerService
//! ```
//!
//! Drivers (trigger switches, solenoid, push-button, preset storage)
//! implement these traits.  The core consumes them via generics, so the
//! state machine never touches a GPIO directly and runs unchanged
//! against mocks on the host.

use crate::clock::Millis;
use crate::config::Preset;
use crate::error::StorageError;

// ───────────────────────────────────────────────────────────────
// Trigger input (driven adapter: switches → core)
// ───────────────────────────────────────────────────────────────

/// Raw trigger switch queries.
///
/// `held` and `released` are **not** complements.  An input may report
/// neither (switch mid-travel, a line that failed to read), and the state
/// machine then does nothing that cycle.
pub trait TriggerInput {
    /// At least one switch line reads actuated.
    fn held(&mut self) -> bool;

    /// Every switch line reads at rest.
    fn released(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator (driven adapter: core → solenoid)
// ───────────────────────────────────────────────────────────────

/// The solenoid valve, seen from the firing logic.
pub trait Actuator {
    /// Start one actuation pulse.  Must not block.
    fn fire_one_round(&mut self);

    /// Advance or terminate an in-progress pulse.  Called every cycle,
    /// whether or not a round was started.
    fn service_pending_pulse(&mut self, now: Millis);
}

// ───────────────────────────────────────────────────────────────
// Control panel (driven adapter: push-button + selector → service)
// ───────────────────────────────────────────────────────────────

/// Position of the two-way selector switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Selector {
    #[default]
    A = 0,
    B = 1,
}

impl Selector {
    pub const COUNT: usize = 2;

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Secondary user inputs polled once per cycle after the trigger.
pub trait ControlPanel {
    /// Raw push-button level (true = pressed).
    fn button_pressed(&mut self) -> bool;

    /// Current selector switch position.
    fn selector(&mut self) -> Selector;
}

// ───────────────────────────────────────────────────────────────
// Preset storage (driven adapter: service ↔ non-volatile memory)
// ───────────────────────────────────────────────────────────────

/// Persists presets and the active-preset index of each selector position.
///
/// Implementations return stored bytes as-is; callers sanitize.
pub trait PresetStore {
    /// Active preset index stored for `selector`.
    fn load_active(&self, selector: Selector) -> Result<u8, StorageError>;

    /// Persist the active preset index for `selector`.
    fn save_active(&mut self, selector: Selector, index: u8) -> Result<(), StorageError>;

    /// Read preset `index` of `selector`.
    fn load_preset(&self, selector: Selector, index: u8) -> Result<Preset, StorageError>;

    /// Write preset `index` of `selector`.
    fn save_preset(
        &mut self,
        selector: Selector,
        index: u8,
        preset: &Preset,
    ) -> Result<(), StorageError>;
}
