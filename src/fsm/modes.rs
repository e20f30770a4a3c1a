//! The four mode policies.
//!
//! Each policy decides how the queue grows on a pull edge, while the
//! trigger is held, and on a release edge.  They are plain functions over
//! the shared [`FiringState`], dispatched by `match` on [`FiringMode`].
//! Checks run in the order pull → hold → release within one call.
//!
//! | Mode         | Pull edge                      | Hold                             | Release edge        |
//! |--------------|--------------------------------|----------------------------------|---------------------|
//! | SingleShot   | queue = 1                      |                                  |                     |
//! | FullAuto     | queue = 1                      | every round_delay, if `>` limit  |                     |
//! | AutoResponse | queue += 1                     |                                  | += 1 if `>=` limit  |
//! | Burst        | burst_size if `>=` limit, or 1 |                                  |                     |

use super::context::{AUTO_RESPONSE_MAX_QUEUE, FiringState};
use crate::app::ports::TriggerInput;
use crate::clock::Millis;
use crate::config::{FiringMode, Settings};

/// Run the policy for `mode` against one clock sample.
pub fn apply(
    mode: FiringMode,
    state: &mut FiringState,
    settings: &Settings,
    now: Millis,
    trigger: &mut impl TriggerInput,
) {
    match mode {
        FiringMode::SingleShot => single_shot(state, settings, now, trigger),
        FiringMode::FullAuto => full_auto(state, settings, now, trigger),
        FiringMode::AutoResponse => auto_response(state, settings, now, trigger),
        FiringMode::Burst => burst(state, settings, now, trigger),
    }
}

/// Pull edge gated on the release debounce: the previous release must
/// have settled before a new pull is trusted.
fn pull_edge(
    state: &FiringState,
    settings: &Settings,
    now: Millis,
    trigger: &mut impl TriggerInput,
) -> bool {
    !state.pulled && trigger.held() && state.release_settled(now, settings)
}

/// Release edge gated on the pull debounce.
fn release_edge(
    state: &FiringState,
    settings: &Settings,
    now: Millis,
    trigger: &mut impl TriggerInput,
) -> bool {
    state.pulled && trigger.released() && state.pull_settled(now, settings)
}

fn single_shot(
    state: &mut FiringState,
    settings: &Settings,
    now: Millis,
    trigger: &mut impl TriggerInput,
) {
    if pull_edge(state, settings, now, trigger) {
        state.set_pulled(true, now);
        state.pending_rounds = 1;
    }

    if release_edge(state, settings, now, trigger) {
        state.set_pulled(false, now);
    }
}

fn full_auto(
    state: &mut FiringState,
    settings: &Settings,
    now: Millis,
    trigger: &mut impl TriggerInput,
) {
    if pull_edge(state, settings, now, trigger) {
        state.set_pulled(true, now);
        state.pending_rounds = 1;
    }

    if state.pulled
        && trigger.held()
        && state.pull_settled(now, settings)
        && state.since_active(now) >= settings.round_delay
    {
        // Re-arm the hold timer whether or not a round is granted.
        state.active_time = now;
        if state.safety_exceeded(settings) {
            state.pending_rounds = 1;
        }
    }

    if release_edge(state, settings, now, trigger) {
        state.set_pulled(false, now);
    }
}

fn auto_response(
    state: &mut FiringState,
    settings: &Settings,
    now: Millis,
    trigger: &mut impl TriggerInput,
) {
    if pull_edge(state, settings, now, trigger) {
        state.set_pulled(true, now);
        state.pending_rounds = state.pending_rounds.saturating_add(1);
    }

    if release_edge(state, settings, now, trigger) {
        if state.safety_reached(settings) {
            state.pending_rounds = state.pending_rounds.saturating_add(1);
        }
        state.set_pulled(false, now);
    }

    state.pending_rounds = state.pending_rounds.min(AUTO_RESPONSE_MAX_QUEUE);
}

fn burst(
    state: &mut FiringState,
    settings: &Settings,
    now: Millis,
    trigger: &mut impl TriggerInput,
) {
    // Burst trusts a pull after the pull debounce, unlike the other modes.
    if !state.pulled && trigger.held() && state.pull_settled(now, settings) {
        state.set_pulled(true, now);
        state.pending_rounds = if state.safety_reached(settings) {
            settings.burst_size
        } else {
            1
        };
    }

    if release_edge(state, settings, now, trigger) {
        state.set_pulled(false, now);
    }
}
