//! Marker service, the application core.
//!
//! [`MarkerService`] owns the firing state machine, the active settings,
//! and the preset store.  It exposes a hardware-agnostic per-cycle API;
//! all I/O flows through the port traits passed in at call sites.
//!
//! ```text
//!  TriggerInput ──▶ ┌──────────────────────────┐ ──▶ Actuator
//!                   │      MarkerService       │
//!  ControlPanel ──▶ │  FSM · Settings · Store  │ ◀─▶ PresetStore
//!                   └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::clock::Millis;
use crate::config::{Preset, Settings, TimingConfig};
use crate::drivers::button::{ButtonDriver, ButtonEvent};
use crate::error::Result;
use crate::fsm::FiringStateMachine;

use super::ports::{Actuator, ControlPanel, PresetStore, Selector, TriggerInput};
use super::presets::{MAX_PRESETS, next_index};

// ───────────────────────────────────────────────────────────────
// MarkerService
// ───────────────────────────────────────────────────────────────

pub struct MarkerService<S: PresetStore> {
    fsm: FiringStateMachine,
    settings: Settings,
    timing: TimingConfig,
    store: S,
    selector: Selector,
    preset_index: u8,
    button: ButtonDriver,
    cycles: u64,
}

impl<S: PresetStore> MarkerService<S> {
    /// Load the active preset for `selector` and build the state machine
    /// around it.  Store failures fall back to the default preset.
    pub fn new(store: S, timing: TimingConfig, selector: Selector) -> Self {
        let (preset_index, preset) = load_selection(&store, selector);
        let settings = preset.settings(&timing);
        info!(
            "marker up: selector {:?} preset {} mode {:?} round delay {}ms",
            selector, preset_index, settings.mode, settings.round_delay
        );

        Self {
            fsm: FiringStateMachine::new(settings.mode),
            settings,
            timing,
            store,
            selector,
            preset_index,
            button: ButtonDriver::new(),
            cycles: 0,
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one main-loop cycle: firing logic, then the control panel.
    ///
    /// Preset changes made by the panel take effect from the next cycle.
    pub fn cycle(
        &mut self,
        now: Millis,
        trigger: &mut impl TriggerInput,
        actuator: &mut impl Actuator,
        panel: &mut impl ControlPanel,
    ) {
        self.cycles = self.cycles.wrapping_add(1);

        self.fsm.run(now, &self.settings, trigger, actuator);

        let selector = panel.selector();
        if selector != self.selector {
            self.selector = selector;
            self.reload();
        }

        if let Some(ButtonEvent::Press) = self.button.tick(now, panel.button_pressed()) {
            if let Err(e) = self.next_preset() {
                warn!("preset advance not persisted: {}", e);
            }
        }
    }

    // ── Presets ───────────────────────────────────────────────

    /// Advance to the next preset of the current selector position,
    /// wrapping after the last.
    ///
    /// The new index is applied even when persisting it fails; the error
    /// is returned so the caller can report it.
    pub fn next_preset(&mut self) -> Result<()> {
        let next = next_index(self.preset_index);
        let saved = self.store.save_active(self.selector, next);
        self.preset_index = next;
        self.apply(self.load_preset(next));
        saved?;
        Ok(())
    }

    /// Re-read the active preset for the current selector position.
    pub fn reload(&mut self) {
        let (index, preset) = load_selection(&self.store, self.selector);
        self.preset_index = index;
        self.apply(preset);
    }

    fn load_preset(&self, index: u8) -> Preset {
        self.store
            .load_preset(self.selector, index)
            .unwrap_or_else(|e| {
                warn!("preset {:?}/{}: {}, using default", self.selector, index, e);
                Preset::default()
            })
    }

    fn apply(&mut self, preset: Preset) {
        self.settings = preset.settings(&self.timing);
        self.fsm.on_mode_changed(self.settings.mode);
        info!(
            "selector {:?} preset {}: {:?} at {} bps",
            self.selector,
            self.preset_index,
            self.settings.mode,
            preset.sanitized().balls_per_second
        );
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fsm(&self) -> &FiringStateMachine {
        &self.fsm
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn preset_index(&self) -> u8 {
        self.preset_index
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Shut the service down and hand back its store.
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

/// Active index and preset for `selector`, falling back to index 0 and
/// the default preset on any store failure.
fn load_selection(store: &impl PresetStore, selector: Selector) -> (u8, Preset) {
    let index = match store.load_active(selector) {
        Ok(i) if usize::from(i) < MAX_PRESETS => i,
        Ok(i) => {
            warn!("selector {:?}: active preset {} out of range", selector, i);
            0
        }
        Err(e) => {
            warn!("selector {:?}: active preset unreadable ({})", selector, e);
            0
        }
    };
    let preset = store.load_preset(selector, index).unwrap_or_else(|e| {
        warn!("preset {:?}/{}: {}, using default", selector, index, e);
        Preset::default()
    });
    (index, preset)
}
