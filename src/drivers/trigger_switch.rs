//! Dual-line trigger switch.
//!
//! ## Hardware
//!
//! Two redundant active-low micro-switches with pull-ups, both closed by
//! the same trigger blade.  Their readings are combined as:
//!
//! | Query      | Condition                 |
//! |------------|---------------------------|
//! | `held`     | either line low (OR)      |
//! | `released` | both lines high (AND)     |
//!
//! While the lines disagree the trigger is `held` but not `released`;
//! the state machine uses that gap as part of its debounce.  A line that
//! fails to read counts as neither actuated nor at rest, which keeps the
//! firing logic idle rather than guessing.

use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

use crate::app::ports::TriggerInput;

pub struct DualSwitchTrigger<A: InputPin, B: InputPin> {
    line_a: A,
    line_b: B,
}

impl<A: InputPin, B: InputPin> DualSwitchTrigger<A, B> {
    pub fn new(line_a: A, line_b: B) -> Self {
        Self { line_a, line_b }
    }

    pub fn release(self) -> (A, B) {
        (self.line_a, self.line_b)
    }

    /// `Some(true)` when the line reads actuated (low), `None` on error.
    fn actuated<P: InputPin>(line: &mut P, name: &str) -> Option<bool> {
        match line.is_low() {
            Ok(low) => Some(low),
            Err(e) => {
                warn!("trigger: line {} read failed ({:?})", name, e.kind());
                None
            }
        }
    }
}

impl<A: InputPin, B: InputPin> TriggerInput for DualSwitchTrigger<A, B> {
    fn held(&mut self) -> bool {
        Self::actuated(&mut self.line_a, "A") == Some(true)
            || Self::actuated(&mut self.line_b, "B") == Some(true)
    }

    fn released(&mut self) -> bool {
        Self::actuated(&mut self.line_a, "A") == Some(false)
            && Self::actuated(&mut self.line_b, "B") == Some(false)
    }
}
