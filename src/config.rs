//! Firing configuration.
//!
//! A [`Preset`] is the raw record the preset bank stores: five bytes a
//! user edits through the configuration menu.  Stored bytes are not
//! trusted; [`Preset::sanitized`] clamps every out-of-range field to its
//! safe default before anything else sees it.  The firing state machine
//! never reads a `Preset` directly, only the derived [`Settings`].

use crate::clock::Millis;
use crate::error::{Error, Result};

// --- Preset field ranges ---
pub const BPS_MIN: u8 = 5;
pub const BPS_MAX: u8 = 40;
pub const BPS_DEFAULT: u8 = 20;

pub const BURST_MIN: u8 = 2;
pub const BURST_MAX: u8 = 10;
pub const BURST_DEFAULT: u8 = 3;

pub const AMMO_LIMIT_MAX: u8 = 250;
pub const SAFETY_SHOT_MAX: u8 = 5;

/// Stored size of one preset record.
pub const PRESET_BYTES: usize = 5;

/// How a trigger pull/hold/release maps onto queued rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FiringMode {
    #[default]
    FullAuto = 0,
    Burst = 1,
    AutoResponse = 2,
    SingleShot = 3,
}

impl FiringMode {
    /// Decode a stored mode byte.  Unrecognised values select `FullAuto`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Burst,
            2 => Self::AutoResponse,
            3 => Self::SingleShot,
            _ => Self::FullAuto,
        }
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

/// One stored preset, exactly as the bank holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Rate of fire in balls per second (5–40).
    pub balls_per_second: u8,
    /// Raw firing mode byte, see [`FiringMode::from_raw`].
    pub firing_mode: u8,
    /// Rounds per burst pull (2–10).
    pub burst_size: u8,
    /// Rounds per magazine, 0 = unlimited (0–250).  Stored only.
    pub ammo_limit: u8,
    /// Safety shots before burst/auto modes engage, 0 = disabled (0–5).
    pub safety_shot: u8,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            balls_per_second: BPS_DEFAULT,
            firing_mode: FiringMode::FullAuto.as_raw(),
            burst_size: BURST_DEFAULT,
            ammo_limit: 0,
            safety_shot: 0,
        }
    }
}

impl Preset {
    /// Clamp every field that is out of range back to its default.
    pub fn sanitized(self) -> Self {
        let mut p = self;
        if !(BPS_MIN..=BPS_MAX).contains(&p.balls_per_second) {
            p.balls_per_second = BPS_DEFAULT;
        }
        if !(BURST_MIN..=BURST_MAX).contains(&p.burst_size) {
            p.burst_size = BURST_DEFAULT;
        }
        if p.ammo_limit > AMMO_LIMIT_MAX {
            p.ammo_limit = 0;
        }
        if p.safety_shot > SAFETY_SHOT_MAX {
            p.safety_shot = 0;
        }
        if p.firing_mode > FiringMode::SingleShot.as_raw() {
            p.firing_mode = FiringMode::FullAuto.as_raw();
        }
        p
    }

    pub fn mode(&self) -> FiringMode {
        FiringMode::from_raw(self.firing_mode)
    }

    /// Storage layout: rate, mode, burst size, ammo limit, safety shots.
    pub fn to_bytes(&self) -> [u8; PRESET_BYTES] {
        [
            self.balls_per_second,
            self.firing_mode,
            self.burst_size,
            self.ammo_limit,
            self.safety_shot,
        ]
    }

    /// Inverse of [`Preset::to_bytes`].  `None` if `bytes` is not exactly
    /// one record long.  Field values are left unchecked.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let [balls_per_second, firing_mode, burst_size, ammo_limit, safety_shot] =
            <[u8; PRESET_BYTES]>::try_from(bytes).ok()?;
        Some(Self {
            balls_per_second,
            firing_mode,
            burst_size,
            ammo_limit,
            safety_shot,
        })
    }

    /// Derive the firing parameters the state machine consumes.
    pub fn settings(&self, timing: &TimingConfig) -> Settings {
        let p = self.sanitized();
        Settings {
            mode: p.mode(),
            round_delay: timing.round_delay(p.balls_per_second),
            pull_debounce: timing.pull_debounce_ms,
            release_debounce: timing.release_debounce_ms,
            burst_size: p.burst_size,
            safety_shot_limit: p.safety_shot,
        }
    }
}

/// Fixed timing parameters of the marker hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Solenoid on-time per shot.
    pub dwell_ms: Millis,
    /// Minimum time a pull must stand before a release is trusted.
    pub pull_debounce_ms: Millis,
    /// Minimum time a release must stand before a pull is trusted.
    pub release_debounce_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            dwell_ms: 8,
            pull_debounce_ms: 10,
            release_debounce_ms: 20,
        }
    }
}

impl TimingConfig {
    /// Reject timings the firing loop cannot run on.
    pub fn validate(&self) -> Result<()> {
        if self.dwell_ms >= 1000 {
            return Err(Error::Config("dwell must be shorter than one second"));
        }
        if self.pull_debounce_ms == 0 || self.release_debounce_ms == 0 {
            return Err(Error::Config("debounce windows must be non-zero"));
        }
        Ok(())
    }

    /// Inter-round delay for a rate of fire, leaving room for the dwell.
    pub fn round_delay(&self, balls_per_second: u8) -> Millis {
        let bps = Millis::from(balls_per_second.max(1));
        1000u32.saturating_sub(self.dwell_ms) / bps
    }
}

/// Read-only firing parameters handed to the state machine every cycle.
///
/// Every field is assumed already valid; the state machine performs no
/// further checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub mode: FiringMode,
    /// Minimum time between two solenoid firings.
    pub round_delay: Millis,
    pub pull_debounce: Millis,
    pub release_debounce: Millis,
    pub burst_size: u8,
    /// 0 disables the safety-shot throttle.
    pub safety_shot_limit: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Preset::default().settings(&TimingConfig::default())
    }
}
