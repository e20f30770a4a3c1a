//! MarkerService: presets, selector and button driving the firing core.

use phenom::adapters::nvs::NvsPresetStore;
use phenom::app::ports::{ControlPanel, PresetStore, Selector};
use phenom::app::presets::PresetBank;
use phenom::app::service::MarkerService;
use phenom::clock::Millis;
use phenom::config::{FiringMode, Preset, TimingConfig};
use phenom::error::StorageError;

use phenom::drivers::panel::PanelInputs;

use crate::mock_hw::{FlakyStore, MockPanel, RecordingValve, ScriptedTrigger, SharedLine};

fn preset(mode: FiringMode, balls_per_second: u8) -> Preset {
    Preset {
        balls_per_second,
        firing_mode: mode.as_raw(),
        ..Preset::default()
    }
}

/// A0 full auto, A1 burst at 10 bps, A2 single shot; B0 single shot.
fn bank() -> PresetBank {
    let mut bank = PresetBank::filled(Preset::default());
    bank.save_preset(Selector::A, 1, &preset(FiringMode::Burst, 10))
        .unwrap();
    bank.save_preset(Selector::A, 2, &preset(FiringMode::SingleShot, 20))
        .unwrap();
    bank.save_preset(Selector::B, 0, &preset(FiringMode::SingleShot, 20))
        .unwrap();
    bank
}

struct Rig<S: PresetStore, P: ControlPanel = MockPanel> {
    svc: MarkerService<S>,
    trigger: ScriptedTrigger,
    valve: RecordingValve,
    panel: P,
    now: Millis,
    fired: Vec<Millis>,
}

impl<S: PresetStore> Rig<S> {
    fn new(store: S) -> Self {
        Rig::with_panel(store, MockPanel::default(), Selector::A)
    }

    /// One debounced button press and release.
    fn press_button(&mut self) {
        self.panel.pressed = true;
        self.run_for(60);
        self.panel.pressed = false;
        self.run_for(60);
    }
}

impl<S: PresetStore, P: ControlPanel> Rig<S, P> {
    fn with_panel(store: S, panel: P, selector: Selector) -> Self {
        Self {
            svc: MarkerService::new(store, TimingConfig::default(), selector),
            trigger: ScriptedTrigger::resting(),
            valve: RecordingValve::default(),
            panel,
            now: 0,
            fired: Vec::new(),
        }
    }

    fn run_for(&mut self, ms: Millis) {
        for _ in 0..ms {
            let before = self.valve.fired();
            self.svc
                .cycle(self.now, &mut self.trigger, &mut self.valve, &mut self.panel);
            if self.valve.fired() > before {
                self.fired.push(self.now);
            }
            self.now += 1;
        }
    }

    fn pull(&mut self, ms: Millis) {
        self.trigger.held = true;
        self.trigger.released = false;
        self.run_for(ms);
    }
}

#[test]
fn button_press_selects_burst_preset() {
    let mut rig = Rig::new(bank());
    assert_eq!(rig.svc.settings().mode, FiringMode::FullAuto);

    rig.press_button();
    assert_eq!(rig.svc.preset_index(), 1);
    assert_eq!(rig.svc.fsm().mode(), FiringMode::Burst);
    assert_eq!(rig.svc.store().load_active(Selector::A), Ok(1));

    // (1000 - 8) / 10 = 99 ms between rounds.
    rig.pull(400);
    assert_eq!(rig.fired, vec![120, 219, 318]);
}

#[test]
fn selector_flip_drops_queued_burst() {
    let mut store = bank();
    store.save_active(Selector::A, 1).unwrap();
    let mut rig = Rig::new(store);

    rig.run_for(100);
    rig.pull(10);
    assert_eq!(rig.fired, vec![100]);
    assert_eq!(rig.svc.fsm().pending_rounds(), 2);

    rig.panel.selector = Selector::B;
    rig.run_for(1);
    assert_eq!(rig.svc.selector(), Selector::B);
    assert_eq!(rig.svc.fsm().mode(), FiringMode::SingleShot);
    assert_eq!(rig.svc.fsm().pending_rounds(), 0);

    // Held trigger re-qualifies as one single shot.
    rig.pull(300);
    assert_eq!(rig.fired, vec![100, 149]);
}

#[test]
fn active_preset_survives_restart() {
    let mut rig = Rig::new(bank());
    rig.press_button();
    rig.press_button();
    assert_eq!(rig.svc.preset_index(), 2);

    let restarted = MarkerService::new(
        rig.svc.store().clone(),
        TimingConfig::default(),
        Selector::A,
    );
    assert_eq!(restarted.preset_index(), 2);
    assert_eq!(restarted.settings().mode, FiringMode::SingleShot);
}

#[test]
fn preset_index_wraps_after_last() {
    let mut rig = Rig::new(bank());
    for _ in 0..3 {
        rig.press_button();
    }
    assert_eq!(rig.svc.preset_index(), 0);
    assert_eq!(rig.svc.fsm().mode(), FiringMode::FullAuto);
}

#[test]
fn unreadable_store_runs_on_defaults() {
    let mut store = FlakyStore::new(bank());
    store.fail_loads = true;
    let rig = Rig::new(store);
    assert_eq!(rig.svc.preset_index(), 0);
    assert_eq!(rig.svc.settings().mode, FiringMode::FullAuto);
    assert_eq!(rig.svc.settings().round_delay, 49);
}

#[test]
fn failed_save_still_advances() {
    let mut store = FlakyStore::new(bank());
    store.fail_saves = true;
    let mut rig = Rig::new(store);

    rig.press_button();
    assert_eq!(rig.svc.store().saves, 1);
    assert_eq!(rig.svc.preset_index(), 1);
    assert_eq!(rig.svc.settings().mode, FiringMode::Burst);
    assert_eq!(rig.svc.store().inner.load_active(Selector::A), Ok(0));

    assert!(rig.svc.next_preset().is_err());
    assert_eq!(rig.svc.preset_index(), 2);
}

#[test]
fn selector_glitch_keeps_queued_burst() {
    let mut store = bank();
    store
        .save_preset(Selector::B, 1, &preset(FiringMode::Burst, 10))
        .unwrap();
    store.save_active(Selector::B, 1).unwrap();

    // Selector switch closed: position B.
    let selector = SharedLine::at(false);
    let panel = PanelInputs::new(SharedLine::at(true), selector.clone());
    let mut rig = Rig::with_panel(store, panel, Selector::B);

    rig.run_for(100);
    rig.pull(10);
    assert_eq!(rig.fired, vec![100]);
    assert_eq!(rig.svc.fsm().pending_rounds(), 2);

    selector.set(None);
    rig.run_for(5);
    assert_eq!(rig.svc.selector(), Selector::B);
    assert_eq!(rig.svc.fsm().mode(), FiringMode::Burst);
    assert_eq!(rig.svc.fsm().pending_rounds(), 2);

    selector.set(Some(false));
    rig.pull(300);
    assert_eq!(rig.fired, vec![100, 199, 298]);
    assert_eq!(rig.svc.preset_index(), 1);
}

#[test]
fn flash_store_keeps_active_preset_across_restart() {
    let mut nvs = NvsPresetStore::new().unwrap();
    nvs.save_preset(Selector::A, 1, &preset(FiringMode::Burst, 10))
        .unwrap();
    nvs.save_preset(Selector::A, 2, &preset(FiringMode::SingleShot, 20))
        .unwrap();

    // Blank active index and slot 0 come up as preset 0 at defaults.
    let mut rig = Rig::new(nvs);
    assert_eq!(rig.svc.preset_index(), 0);
    assert_eq!(rig.svc.settings().mode, FiringMode::FullAuto);

    rig.press_button();
    rig.press_button();
    assert_eq!(rig.svc.preset_index(), 2);

    let restarted = MarkerService::new(
        rig.svc.into_store(),
        TimingConfig::default(),
        Selector::A,
    );
    assert_eq!(restarted.preset_index(), 2);
    assert_eq!(restarted.settings().mode, FiringMode::SingleShot);
    assert_eq!(restarted.store().load_active(Selector::A), Ok(2));
    assert_eq!(
        restarted.store().load_active(Selector::B),
        Err(StorageError::NotFound)
    );
}
