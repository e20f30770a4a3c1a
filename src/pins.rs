//! GPIO assignments for the marker control board.
//!
//! Single source of truth; `main` references these constants rather
//! than hard-coding pin numbers.  Every input is active-low with the
//! internal pull-up enabled.

// ---------------------------------------------------------------------------
// Trigger (two redundant micro-switches on one blade)
// ---------------------------------------------------------------------------

pub const TRIGGER_A_GPIO: i32 = 4;
pub const TRIGGER_B_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Solenoid valve (logic-level MOSFET gate, active HIGH)
// ---------------------------------------------------------------------------

pub const SOLENOID_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// User controls
// ---------------------------------------------------------------------------

/// Momentary push-button: cycles the active preset.
pub const BUTTON_GPIO: i32 = 15;
/// Two-position selector switch: LOW = position B.
pub const SELECTOR_GPIO: i32 = 16;
