//! Firing state machine against a scripted trigger on a 1 ms scheduler.

use phenom::clock::elapsed;
use phenom::config::FiringMode;

use crate::mock_hw::{Bench, ValveCall, settings};

// ── Single shot ───────────────────────────────────────────────

#[test]
fn single_shot_fires_once_per_pull() {
    let mut bench = Bench::new(settings(FiringMode::SingleShot, 0));
    bench.release(100);
    bench.hold(500);
    assert_eq!(bench.fired, vec![100]);

    bench.release(100);
    bench.hold(50);
    assert_eq!(bench.fired, vec![100, 700]);
}

#[test]
fn pulse_serviced_every_cycle() {
    let mut bench = Bench::new(settings(FiringMode::SingleShot, 0));
    bench.release(100);
    bench.hold(3);
    assert_eq!(
        bench.valve.calls[100..],
        [
            ValveCall::Fire,
            ValveCall::Service(100),
            ValveCall::Service(101),
            ValveCall::Service(102),
        ]
    );
    assert_eq!(bench.valve.serviced(), 103);
}

// ── Full auto ─────────────────────────────────────────────────

#[test]
fn full_auto_without_limit_fires_every_round_delay() {
    let mut bench = Bench::new(settings(FiringMode::FullAuto, 0));
    bench.release(100);
    bench.hold(1000);

    assert_eq!(bench.fired.len(), 20);
    assert_eq!(bench.fired[0], 100);
    assert!(bench.fired.windows(2).all(|w| w[1] - w[0] == 50));
    assert_eq!(bench.fsm.shots_since_idle(), 1);
}

#[test]
fn full_auto_hold_needs_safety_shots_first() {
    let mut bench = Bench::new(settings(FiringMode::FullAuto, 2));
    bench.release(100);
    bench.hold(500);
    assert_eq!(bench.fired, vec![100]);
}

#[test]
fn dead_zone_neither_pulls_nor_releases() {
    let mut bench = Bench::new(settings(FiringMode::FullAuto, 0));
    bench.release(100);
    bench.hold(120);
    assert_eq!(bench.fired, vec![100, 150, 200]);

    bench.dead_zone(200);
    assert!(bench.fsm.is_pulled());
    assert_eq!(bench.fired.len(), 3);

    bench.hold(40);
    assert_eq!(bench.fired, vec![100, 150, 200, 420]);
}

// ── Burst ─────────────────────────────────────────────────────

#[test]
fn burst_engages_once_safety_shots_are_spent() {
    let mut bench = Bench::new(settings(FiringMode::Burst, 2));
    bench.release(100);

    // Two single safety shots.
    bench.hold(30);
    bench.release(30);
    bench.hold(30);
    bench.release(30);
    assert_eq!(bench.fired, vec![100, 160]);
    assert_eq!(bench.fsm.shots_since_idle(), 2);

    // shots == limit: full burst.
    bench.hold(180);
    assert_eq!(bench.fired[2..], [220, 270, 320]);
    assert_eq!(bench.fsm.shots_since_idle(), 3);

    // shots == limit + 1 still satisfies `>=`.
    bench.release(30);
    bench.hold(200);
    assert_eq!(bench.fired[5..], [430, 480, 530]);
    assert!(bench.max_pending <= 3);
}

#[test]
fn mode_change_mid_burst_drops_queued_rounds() {
    let mut bench = Bench::new(settings(FiringMode::Burst, 0));
    bench.release(100);
    bench.hold(10);
    assert_eq!(bench.fsm.pending_rounds(), 2);

    bench.settings.mode = FiringMode::SingleShot;
    bench.cycle();
    assert_eq!(bench.fsm.pending_rounds(), 0);
    assert!(!bench.fsm.is_pulled());

    // The held trigger re-qualifies as a single-shot pull.
    bench.hold(300);
    assert_eq!(bench.fired, vec![100, 150]);
}

// ── Auto response ─────────────────────────────────────────────

#[test]
fn auto_response_fires_on_pull_and_release() {
    let mut bench = Bench::new(settings(FiringMode::AutoResponse, 0));
    bench.release(100);
    bench.hold(10);
    bench.release(200);
    assert_eq!(bench.fired, vec![100, 150]);
}

#[test]
fn auto_response_queue_clamps_at_two() {
    let mut bench = Bench::new(settings(FiringMode::AutoResponse, 0));
    bench.release(100);
    bench.hold(10);
    bench.release(20);
    bench.hold(10);
    bench.release(200);

    assert_eq!(bench.max_pending, 2);
    assert_eq!(bench.fired, vec![100, 150, 200]);
}

#[test]
fn auto_response_release_waits_for_safety_shots() {
    let mut bench = Bench::new(settings(FiringMode::AutoResponse, 2));
    bench.release(100);
    bench.hold(10);
    bench.release(200);
    assert_eq!(bench.fired, vec![100]);
}

// ── Safety idle reset ─────────────────────────────────────────

#[test]
fn safety_count_resets_after_idle_second() {
    let mut bench = Bench::new(settings(FiringMode::SingleShot, 3));
    bench.release(100);
    bench.hold(1);
    assert_eq!(bench.fsm.shots_since_idle(), 1);

    bench.hold(1000);
    assert_eq!(bench.now, 1101);
    assert_eq!(bench.fsm.shots_since_idle(), 1);

    bench.cycle();
    assert_eq!(bench.fsm.shots_since_idle(), 0);
}

// ── Clock wraparound ──────────────────────────────────────────

#[test]
fn full_auto_cadence_survives_clock_wrap() {
    let start = u32::MAX - 120;
    let mut bench = Bench::starting_at(settings(FiringMode::FullAuto, 0), start);
    bench.release(20);
    bench.hold(300);

    assert_eq!(bench.fired.len(), 6);
    assert_eq!(bench.fired[0], start + 20);
    assert!(bench.fired.windows(2).all(|w| elapsed(w[1], w[0]) == 50));
}

#[test]
fn debounce_and_pacing_across_wrap() {
    let mut bench = Bench::starting_at(settings(FiringMode::SingleShot, 0), u32::MAX - 30);
    bench.release(25);
    bench.hold(10);
    assert_eq!(bench.fired, vec![u32::MAX - 5]);
    assert_eq!(bench.now, 4);

    // Release settles 10 ms after the pull, on the far side of the wrap.
    bench.release(30);
    assert!(!bench.fsm.is_pulled());

    // Next pull at 34 waits out the round delay until 44.
    bench.hold(30);
    assert_eq!(bench.fired, vec![u32::MAX - 5, 44]);
}

// ── Idempotence ───────────────────────────────────────────────

#[test]
fn repeated_clock_sample_changes_nothing() {
    for mode in [
        FiringMode::SingleShot,
        FiringMode::FullAuto,
        FiringMode::AutoResponse,
        FiringMode::Burst,
    ] {
        let mut bench = Bench::new(settings(mode, 0));
        bench.release(100);
        bench.hold(75);

        // Replay the last sample.
        bench.now -= 1;
        let state = *bench.fsm.state();
        let fired = bench.valve.fired();
        bench.cycle();
        bench.cycle();
        assert_eq!(*bench.fsm.state(), state, "{:?}", mode);
        assert_eq!(bench.valve.fired(), fired, "{:?}", mode);
    }
}
