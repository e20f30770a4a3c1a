//! Fuzz target: `FiringStateMachine::run`
//!
//! The first six bytes pick a preset (rate, mode, burst size, ammo
//! limit, safety shot) and the pull debounce; the rest are consumed in
//! pairs of (milliseconds to advance, trigger lines).  After every cycle
//! the queue and safety-counter bounds must hold and at most one round
//! may have fired.
//!
//! cargo fuzz run fuzz_trigger_inputs

#![no_main]

use libfuzzer_sys::fuzz_target;
use phenom::app::ports::{Actuator, TriggerInput};
use phenom::clock::Millis;
use phenom::config::{FiringMode, Preset, TimingConfig};
use phenom::fsm::FiringStateMachine;

/// Two switch lines, bit 0 and bit 1, set = actuated.
struct Lines(u8);

impl TriggerInput for Lines {
    fn held(&mut self) -> bool {
        self.0 & 0b11 != 0
    }
    fn released(&mut self) -> bool {
        self.0 & 0b11 == 0
    }
}

#[derive(Default)]
struct Counter(u32);

impl Actuator for Counter {
    fn fire_one_round(&mut self) {
        self.0 += 1;
    }
    fn service_pending_pulse(&mut self, _now: Millis) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((head, steps)) = data.split_first_chunk::<6>() else {
        return;
    };

    let preset = Preset {
        balls_per_second: head[0],
        firing_mode: head[1],
        burst_size: head[2],
        ammo_limit: head[3],
        safety_shot: head[4],
    };
    let timing = TimingConfig {
        pull_debounce_ms: Millis::from(head[5] % 50) + 1,
        ..TimingConfig::default()
    };
    let settings = preset.settings(&timing);

    let mut fsm = FiringStateMachine::new(settings.mode);
    let mut valve = Counter::default();
    let mut now: Millis = u32::MAX - 2_000;

    for step in steps.chunks_exact(2) {
        now = now.wrapping_add(Millis::from(step[0]));
        let before = valve.0;
        fsm.run(now, &settings, &mut Lines(step[1]), &mut valve);

        assert!(valve.0 - before <= 1, "more than one round in a cycle");
        let cap = match settings.mode {
            FiringMode::Burst => settings.burst_size,
            FiringMode::AutoResponse => 2,
            _ => 1,
        };
        assert!(fsm.pending_rounds() <= cap, "queue above cap");
        assert!(
            u16::from(fsm.shots_since_idle()) <= u16::from(settings.safety_shot_limit) + 1,
            "safety counter above limit + 1"
        );
    }
});
