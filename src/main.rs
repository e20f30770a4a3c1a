//! Phenom marker firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Drivers (outer ring)                     │
//! │  DualSwitchTrigger   Solenoid   PanelInputs   tick_timer │
//! │  (TriggerInput)      (Actuator) (ControlPanel) (CLOCK)   │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ─────────────────  │
//! │                                                          │
//! │   ┌──────────────────────────────────────────────────┐   │
//! │   │        MarkerService (pure logic)                │   │
//! │   │  FiringStateMachine · Settings · NvsPresetStore  │   │
//! │   └──────────────────────────────────────────────────┘   │
//! │                                                          │
//! │  Busy loop: sample CLOCK → cycle → feed watchdog         │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, Input, PinDriver, Pull};
use log::{error, info, warn};

use phenom::adapters::nvs::NvsPresetStore;
use phenom::app::ports::ControlPanel;
use phenom::app::service::MarkerService;
use phenom::config::TimingConfig;
use phenom::drivers::panel::PanelInputs;
use phenom::drivers::solenoid::Solenoid;
use phenom::drivers::tick_timer::{self, CLOCK};
use phenom::drivers::trigger_switch::DualSwitchTrigger;
use phenom::drivers::watchdog::Watchdog;
use phenom::pins;

/// Active-low input with the internal pull-up enabled.
fn pulled_up_input(gpio: i32) -> Result<PinDriver<'static, AnyIOPin, Input>> {
    // SAFETY: each GPIO number in `pins` is claimed exactly once, here.
    let pin = unsafe { AnyIOPin::new(gpio) };
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Phenom v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Drivers ────────────────────────────────────────────
    let timing = TimingConfig::default();
    timing.validate()?;

    let mut trigger = DualSwitchTrigger::new(
        pulled_up_input(pins::TRIGGER_A_GPIO)?,
        pulled_up_input(pins::TRIGGER_B_GPIO)?,
    );
    // SAFETY: see `pulled_up_input`.
    let solenoid_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::SOLENOID_GPIO) })?;
    let mut solenoid = Solenoid::new(solenoid_pin, timing.dwell_ms)?;
    let mut panel = PanelInputs::new(
        pulled_up_input(pins::BUTTON_GPIO)?,
        pulled_up_input(pins::SELECTOR_GPIO)?,
    );

    if !tick_timer::start() {
        // Without a clock nothing can be paced; hold the valve shut.
        error!("no time base, halting with solenoid closed");
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = Watchdog::subscribe();

    // ── 3. Application core ───────────────────────────────────
    let store = NvsPresetStore::new().unwrap_or_else(|e| {
        warn!("preset storage unavailable ({}), running on defaults", e);
        NvsPresetStore::unavailable()
    });
    let selector = panel.selector();
    let mut service = MarkerService::new(store, timing, selector);

    info!("System ready. Entering firing loop.");

    // ── 4. Firing loop ────────────────────────────────────────
    loop {
        let now = CLOCK.now();
        service.cycle(now, &mut trigger, &mut solenoid, &mut panel);
        if let Some(wd) = &watchdog {
            wd.feed();
        }
    }
}
