//! Task Watchdog Timer (TWDT) guard for the firing loop.
//!
//! The firing loop never sleeps, so it holds a [`Watchdog`] and feeds it
//! every cycle.  A stall longer than [`TIMEOUT_MS`] panics and resets the
//! board, which drops the solenoid output.  A `Watchdog` only exists once
//! the main task is actually subscribed.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

use log::info;

/// Stall time before the watchdog resets the device.
pub const TIMEOUT_MS: u32 = 2_000;

/// Proof that the calling task is subscribed to the TWDT.
#[derive(Debug)]
pub struct Watchdog {
    _subscribed: (),
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    ///
    /// `None` if the task could not be subscribed; the loop then runs
    /// unguarded.
    pub fn subscribe() -> Option<Self> {
        #[cfg(target_os = "espidf")]
        {
            let cfg = esp_task_wdt_config_t {
                timeout_ms: TIMEOUT_MS,
                // The busy loop starves the idle tasks; leave them unwatched.
                idle_core_mask: 0,
                trigger_panic: true,
            };
            // SAFETY: plain FFI calls made from the task being subscribed.
            let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
            if ret != ESP_OK as esp_err_t {
                warn!("watchdog: reconfigure returned {}, keeping current timeout", ret);
            }
            let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
            if ret != ESP_OK as esp_err_t {
                warn!("watchdog: subscribe failed ({}), firing loop unguarded", ret);
                return None;
            }
        }

        info!("watchdog: {}ms stall timeout", TIMEOUT_MS);
        Some(Self { _subscribed: () })
    }

    /// Reset the stall timer.  Call once per firing-loop cycle.
    pub fn feed(&self) {
        // SAFETY: `self` exists only for a subscribed task.
        #[cfg(target_os = "espidf")]
        unsafe {
            esp_task_wdt_reset();
        }
    }
}
