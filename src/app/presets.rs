//! RAM-backed preset bank.
//!
//! Each selector position owns up to [`MAX_PRESETS`] presets and its own
//! active-preset index.  Slots that were never written read back as
//! [`StorageError::NotFound`], the same as a blank non-volatile cell.

use core::iter::repeat_n;

use heapless::Vec;

use super::ports::{PresetStore, Selector};
use crate::config::Preset;
use crate::error::StorageError;

/// Presets per selector position.
pub const MAX_PRESETS: usize = 3;

/// Next preset index, wrapping to the first after the last.
pub fn next_index(index: u8) -> u8 {
    if usize::from(index) >= MAX_PRESETS - 1 {
        0
    } else {
        index + 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct PresetBank {
    slots: [Vec<Preset, MAX_PRESETS>; Selector::COUNT],
    active: [Option<u8>; Selector::COUNT],
}

impl PresetBank {
    /// An empty bank: every read is `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bank with every slot holding `preset` and preset 0 active.
    pub fn filled(preset: Preset) -> Self {
        Self {
            slots: core::array::from_fn(|_| repeat_n(preset, MAX_PRESETS).collect()),
            active: [Some(0); Selector::COUNT],
        }
    }

    fn check(index: u8) -> Result<usize, StorageError> {
        let idx = usize::from(index);
        if idx < MAX_PRESETS {
            Ok(idx)
        } else {
            Err(StorageError::OutOfRange)
        }
    }
}

impl PresetStore for PresetBank {
    fn load_active(&self, selector: Selector) -> Result<u8, StorageError> {
        self.active[selector.index()].ok_or(StorageError::NotFound)
    }

    fn save_active(&mut self, selector: Selector, index: u8) -> Result<(), StorageError> {
        Self::check(index)?;
        self.active[selector.index()] = Some(index);
        Ok(())
    }

    fn load_preset(&self, selector: Selector, index: u8) -> Result<Preset, StorageError> {
        let idx = Self::check(index)?;
        self.slots[selector.index()]
            .get(idx)
            .copied()
            .ok_or(StorageError::NotFound)
    }

    fn save_preset(
        &mut self,
        selector: Selector,
        index: u8,
        preset: &Preset,
    ) -> Result<(), StorageError> {
        let idx = Self::check(index)?;
        let slots = &mut self.slots[selector.index()];
        // Unwritten slots below `idx` take the default preset.
        while slots.len() <= idx {
            slots.push(Preset::default()).map_err(|_| StorageError::Io)?;
        }
        slots[idx] = *preset;
        Ok(())
    }
}
