//! Trigger/firing state machine.
//!
//! ```text
//!            ┌──────────── run(now) ─────────────┐
//!            │                                   │
//!  trigger ──▶  mode policy (pull/hold/release)  │
//!            │        │ grows pending_rounds     │
//!            │        ▼                          │
//!            │  queue drain ──▶ fire_one_round   ├──▶ Actuator
//!            │  safety idle reset                │
//!            │  service_pending_pulse ───────────┤
//!            └───────────────────────────────────┘
//! ```
//!
//! The scheduler calls [`FiringStateMachine::run`] exactly once per cycle
//! with a fresh clock sample.  The active [`FiringMode`] policy decides
//! whether the queue grows, then the drain step fires at most one round,
//! paced by `round_delay`, and always services the actuator.  Every call
//! does bounded, non-blocking work.
//!
//! A mode change, either noticed through `Settings::mode` or announced
//! via [`FiringStateMachine::on_mode_changed`], drops the debounced
//! trigger flag and the queue before the new policy runs.

pub mod context;
pub mod modes;

use log::debug;

use crate::app::ports::{Actuator, TriggerInput};
use crate::clock::{Millis, elapsed};
use crate::config::{FiringMode, Settings};
use context::{FiringState, SAFETY_IDLE_RESET_MS};

/// The core firing controller.  One instance per marker.
pub struct FiringStateMachine {
    state: FiringState,
    mode: FiringMode,
}

impl FiringStateMachine {
    /// Construct with all state zeroed and `mode` active.
    pub fn new(mode: FiringMode) -> Self {
        Self {
            state: FiringState::new(),
            mode,
        }
    }

    /// Advance one scheduler cycle.
    ///
    /// 1. If `settings.mode` differs from the active policy, reset (see
    ///    [`on_mode_changed`](Self::on_mode_changed)).
    /// 2. Run the active mode policy.
    /// 3. Drain the queue, apply the safety idle reset, service the pulse.
    pub fn run(
        &mut self,
        now: Millis,
        settings: &Settings,
        trigger: &mut impl TriggerInput,
        actuator: &mut impl Actuator,
    ) {
        if settings.mode != self.mode {
            self.on_mode_changed(settings.mode);
        }

        modes::apply(self.mode, &mut self.state, settings, now, trigger);
        self.drain(now, settings, actuator);
    }

    /// Switch to `mode`, stopping any in-flight trigger and queue state.
    pub fn on_mode_changed(&mut self, mode: FiringMode) {
        debug!(
            "firing mode {:?} -> {:?}, dropping {} queued round(s)",
            self.mode, mode, self.state.pending_rounds
        );
        self.state.clear_trigger();
        self.mode = mode;
    }

    /// Fire one queued round if the pace allows, then the housekeeping
    /// that runs every cycle regardless.
    fn drain(&mut self, now: Millis, settings: &Settings, actuator: &mut impl Actuator) {
        let s = &mut self.state;

        if s.pending_rounds > 0 && elapsed(now, s.last_drain_time) >= settings.round_delay {
            s.last_fire_time = now;
            // Clamp keeps a stable "exceeded" value under sustained fire.
            let ceiling = settings.safety_shot_limit.saturating_add(1);
            s.shots_since_idle = s.shots_since_idle.saturating_add(1).min(ceiling);
            s.pending_rounds -= 1;
            actuator.fire_one_round();
            s.last_drain_time = now;
        }

        // Evaluated after the drain so a round fired this cycle never resets.
        if elapsed(now, s.last_fire_time) > SAFETY_IDLE_RESET_MS {
            s.shots_since_idle = 0;
        }

        actuator.service_pending_pulse(now);
    }

    pub fn mode(&self) -> FiringMode {
        self.mode
    }

    /// Snapshot of the internal state.
    pub fn state(&self) -> &FiringState {
        &self.state
    }

    pub fn is_pulled(&self) -> bool {
        self.state.pulled
    }

    pub fn pending_rounds(&self) -> u8 {
        self.state.pending_rounds
    }

    pub fn shots_since_idle(&self) -> u8 {
        self.state.shots_since_idle
    }
}
