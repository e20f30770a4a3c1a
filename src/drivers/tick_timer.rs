//! 1 kHz time base on ESP-IDF's esp_timer API.
//!
//! A periodic esp_timer advances [`CLOCK`] once per millisecond.  The
//! callback runs in the esp_timer task, not in an ISR, and only touches
//! the critical-section guarded counter.
//!
//! On the host nothing is started; tests drive a [`MillisCounter`]
//! directly.

use crate::clock::MillisCounter;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

/// Timer period.
pub const PERIOD_US: u64 = 1_000;

/// The marker's millisecond clock.
pub static CLOCK: MillisCounter = MillisCounter::new();

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(_arg: *mut core::ffi::c_void) {
    CLOCK.tick();
}

/// Start the periodic tick.  Returns `false` if the timer could not be
/// created or started; the clock then stays frozen and nothing fires.
#[cfg(target_os = "espidf")]
pub fn start() -> bool {
    // SAFETY: TICK_TIMER is written here once at boot from the main task,
    // before the callback can fire.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"ms_tick".as_ptr(),
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&args, &raw mut TICK_TIMER);
        if ret != ESP_OK {
            log::error!("tick_timer: create failed (rc={})", ret);
            return false;
        }
        let ret = esp_timer_start_periodic(TICK_TIMER, PERIOD_US);
        if ret != ESP_OK {
            log::error!("tick_timer: start failed (rc={})", ret);
            return false;
        }
    }
    info!("tick_timer: 1 kHz clock started");
    true
}

#[cfg(not(target_os = "espidf"))]
pub fn start() -> bool {
    log::info!("tick_timer(sim): not started, clock driven by caller");
    true
}
