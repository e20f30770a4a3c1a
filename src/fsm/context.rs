//! Mutable firing state threaded through every mode policy.
//!
//! One record holds the debounced trigger flag, the shot queue, the
//! safety-shot counter, and the timers that gate them.  Every policy
//! reads and writes the same fields, so switching policy mid-hold keeps
//! whatever state the previous one left (apart from the explicit reset
//! on a mode change).

use crate::clock::{Millis, elapsed};
use crate::config::Settings;

/// Idle time after the last fired round that resets the safety-shot count.
pub const SAFETY_IDLE_RESET_MS: Millis = 1000;

/// Largest queue auto-response may hold (one for the pull, one for the release).
pub const AUTO_RESPONSE_MAX_QUEUE: u8 = 2;

/// State owned by the firing state machine for the life of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FiringState {
    // -- Trigger edge state --
    /// Debounced trigger state (distinct from the raw switch reading).
    pub pulled: bool,
    /// Last time `pulled` changed, or a full-auto hold re-armed.
    pub active_time: Millis,

    // -- Queue --
    /// Rounds still owed to the actuator.
    pub pending_rounds: u8,
    /// Last time a round was drained from the queue.
    pub last_drain_time: Millis,

    // -- Safety throttle --
    /// Rounds fired since the marker was last idle, clamped at limit + 1.
    pub shots_since_idle: u8,
    /// Last time a round was fired.
    pub last_fire_time: Millis,
}

impl FiringState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since the trigger flag last changed.
    #[inline]
    pub fn since_active(&self, now: Millis) -> Millis {
        elapsed(now, self.active_time)
    }

    /// Mark a trigger edge at `now`.
    #[inline]
    pub fn set_pulled(&mut self, pulled: bool, now: Millis) {
        self.pulled = pulled;
        self.active_time = now;
    }

    /// Pull debounce has elapsed since the last edge.
    #[inline]
    pub fn pull_settled(&self, now: Millis, settings: &Settings) -> bool {
        self.since_active(now) >= settings.pull_debounce
    }

    /// Release debounce has elapsed since the last edge.
    #[inline]
    pub fn release_settled(&self, now: Millis, settings: &Settings) -> bool {
        self.since_active(now) >= settings.release_debounce
    }

    /// Safety throttle satisfied, with `>=` (auto-response, burst).
    #[inline]
    pub fn safety_reached(&self, settings: &Settings) -> bool {
        settings.safety_shot_limit == 0 || self.shots_since_idle >= settings.safety_shot_limit
    }

    /// Safety throttle satisfied, with strict `>` (full-auto hold).
    ///
    /// Holding the trigger already re-qualifies through the last safety
    /// shot, so full-auto must see one more.
    #[inline]
    pub fn safety_exceeded(&self, settings: &Settings) -> bool {
        settings.safety_shot_limit == 0 || self.shots_since_idle > settings.safety_shot_limit
    }

    /// Drop any in-flight trigger and queue state.
    pub fn clear_trigger(&mut self) {
        self.pulled = false;
        self.pending_rounds = 0;
    }
}
