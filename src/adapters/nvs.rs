//! NVS (Non-Volatile Storage) preset store.
//!
//! Implements [`PresetStore`] on the ESP-IDF NVS partition so the active
//! preset of each selector position survives a power cycle.  Everything
//! lives in one namespace:
//!
//! | key      | type | content                              |
//! |----------|------|--------------------------------------|
//! | `act_a`  | u8   | active preset index, position A      |
//! | `act_b`  | u8   | active preset index, position B      |
//! | `p_a0`.. | blob | one [`Preset`] record per slot       |
//!
//! A key that was never written reads back as [`StorageError::NotFound`].
//! On the host the partition is simulated with a `HashMap`.

use log::info;

use crate::app::ports::{PresetStore, Selector};
use crate::app::presets::MAX_PRESETS;
use crate::config::Preset;
use crate::error::StorageError;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use crate::config::PRESET_BYTES;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"phenom\0";

/// Null-terminated NVS key.
type Key = [u8; 8];

fn active_key(selector: Selector) -> Key {
    let mut key = *b"act_a\0\0\0";
    key[4] = selector_tag(selector);
    key
}

fn preset_key(selector: Selector, index: u8) -> Key {
    let mut key = *b"p_a0\0\0\0\0";
    key[2] = selector_tag(selector);
    key[3] = b'0' + index;
    key
}

fn selector_tag(selector: Selector) -> u8 {
    match selector {
        Selector::A => b'a',
        Selector::B => b'b',
    }
}

/// Open the namespace, run `f` with the handle, then close it.
///
/// `ESP_ERR_NVS_NOT_FOUND`, from the key or from a namespace never
/// written, maps to [`StorageError::NotFound`].
#[cfg(target_os = "espidf")]
fn with_handle<F>(write: bool, f: F) -> Result<(), StorageError>
where
    F: FnOnce(nvs_handle_t) -> esp_err_t,
{
    let mode = if write {
        nvs_open_mode_t_NVS_READWRITE
    } else {
        nvs_open_mode_t_NVS_READONLY
    };

    let mut handle: nvs_handle_t = 0;
    let mut ret = unsafe { nvs_open(NAMESPACE.as_ptr() as *const _, mode, &mut handle) };
    if ret == ESP_OK as esp_err_t {
        ret = f(handle);
        unsafe {
            nvs_close(handle);
        }
    }

    match ret {
        r if r == ESP_OK as esp_err_t => Ok(()),
        r if r == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Err(StorageError::NotFound),
        r => {
            warn!("NVS: {} failed ({})", if write { "write" } else { "read" }, r);
            Err(StorageError::Io)
        }
    }
}

fn check(index: u8) -> Result<u8, StorageError> {
    if usize::from(index) < MAX_PRESETS {
        Ok(index)
    } else {
        Err(StorageError::OutOfRange)
    }
}

pub struct NvsPresetStore {
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<Key, Vec<u8>>,
}

impl NvsPresetStore {
    /// Initialise NVS flash and open the preset store.
    ///
    /// On first boot or after a version mismatch the partition is erased
    /// and re-initialised.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as esp_err_t {
                    return Err(StorageError::Io);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(StorageError::Io);
                }
            } else if ret != ESP_OK as esp_err_t {
                warn!("NVS: flash init failed ({})", ret);
                return Err(StorageError::Io);
            }
            info!("NvsPresetStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsPresetStore: simulation backend");

        Ok(Self::unavailable())
    }

    /// A store without flash initialisation.  On the target every access
    /// fails with [`StorageError::Io`], so callers run on defaults.
    pub fn unavailable() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        }
    }
}

impl PresetStore for NvsPresetStore {
    fn load_active(&self, selector: Selector) -> Result<u8, StorageError> {
        let key = active_key(selector);

        #[cfg(not(target_os = "espidf"))]
        {
            match self.store.get(&key).map(Vec::as_slice) {
                Some(&[index]) => Ok(index),
                Some(_) => Err(StorageError::Io),
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let mut index = 0u8;
            with_handle(false, |handle| unsafe {
                nvs_get_u8(handle, key.as_ptr() as *const _, &mut index)
            })?;
            Ok(index)
        }
    }

    fn save_active(&mut self, selector: Selector, index: u8) -> Result<(), StorageError> {
        let index = check(index)?;
        let key = active_key(selector);

        #[cfg(not(target_os = "espidf"))]
        self.store.insert(key, vec![index]);

        #[cfg(target_os = "espidf")]
        with_handle(true, |handle| unsafe {
            match nvs_set_u8(handle, key.as_ptr() as *const _, index) {
                ret if ret == ESP_OK as esp_err_t => nvs_commit(handle),
                ret => ret,
            }
        })?;

        info!("NvsPresetStore: {:?} active preset {}", selector, index);
        Ok(())
    }

    fn load_preset(&self, selector: Selector, index: u8) -> Result<Preset, StorageError> {
        let key = preset_key(selector, check(index)?);

        #[cfg(not(target_os = "espidf"))]
        {
            let bytes = self.store.get(&key).ok_or(StorageError::NotFound)?;
            Preset::from_bytes(bytes).ok_or(StorageError::Io)
        }

        #[cfg(target_os = "espidf")]
        {
            let mut buf = [0u8; PRESET_BYTES];
            let mut size = buf.len();
            // A longer blob fails with ESP_ERR_NVS_INVALID_LENGTH.
            with_handle(false, |handle| unsafe {
                nvs_get_blob(
                    handle,
                    key.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            })?;
            Preset::from_bytes(&buf[..size]).ok_or(StorageError::Io)
        }
    }

    fn save_preset(
        &mut self,
        selector: Selector,
        index: u8,
        preset: &Preset,
    ) -> Result<(), StorageError> {
        let key = preset_key(selector, check(index)?);
        let bytes = preset.to_bytes();

        #[cfg(not(target_os = "espidf"))]
        self.store.insert(key, bytes.to_vec());

        #[cfg(target_os = "espidf")]
        with_handle(true, |handle| unsafe {
            match nvs_set_blob(
                handle,
                key.as_ptr() as *const _,
                bytes.as_ptr() as *const _,
                bytes.len(),
            ) {
                ret if ret == ESP_OK as esp_err_t => nvs_commit(handle),
                ret => ret,
            }
        })?;

        Ok(())
    }
}
