//! Polled push-button with press debounce.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up, read once per main-loop
//! cycle.  `tick()` runs the debounce state machine on the raw level and
//! reports a press once it has been stable for [`DEBOUNCE_MS`].
//!
//! ```text
//!  Idle ──[low]──▶ DebounceWait ──[50ms low]──▶ Pressed ──▶ emits Press
//!   ▲                  │ [high]                    │ [high]
//!   │                  ▼                           ▼
//!   └──────────────── Idle ◀──[50ms high]── ReleaseWait
//! ```

use crate::clock::{Millis, elapsed};

pub const DEBOUNCE_MS: Millis = 50;

/// Button events emitted after debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Press,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Idle,
    DebounceWait { since_ms: Millis },
    Pressed,
    ReleaseWait { since_ms: Millis },
}

pub struct ButtonDriver {
    state: PressState,
}

impl ButtonDriver {
    pub fn new() -> Self {
        Self {
            state: PressState::Idle,
        }
    }

    /// Call once per main-loop cycle with the raw level (true = pressed).
    /// Returns an event on the cycle a press is confirmed.
    pub fn tick(&mut self, now_ms: Millis, pressed: bool) -> Option<ButtonEvent> {
        match self.state {
            PressState::Idle => {
                if pressed {
                    self.state = PressState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            PressState::DebounceWait { since_ms } => {
                if !pressed {
                    self.state = PressState::Idle;
                    return None;
                }
                if elapsed(now_ms, since_ms) >= DEBOUNCE_MS {
                    self.state = PressState::Pressed;
                    return Some(ButtonEvent::Press);
                }
                None
            }

            PressState::Pressed => {
                if !pressed {
                    self.state = PressState::ReleaseWait { since_ms: now_ms };
                }
                None
            }

            PressState::ReleaseWait { since_ms } => {
                if pressed {
                    self.state = PressState::Pressed;
                } else if elapsed(now_ms, since_ms) >= DEBOUNCE_MS {
                    self.state = PressState::Idle;
                }
                None
            }
        }
    }
}

impl Default for ButtonDriver {
    fn default() -> Self {
        Self::new()
    }
}
