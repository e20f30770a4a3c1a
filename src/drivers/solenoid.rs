//! Solenoid valve driver.
//!
//! One shot is a single dwell-long pulse on the solenoid output.
//! [`Actuator::fire_one_round`] energises the coil immediately and arms
//! the pulse; the next [`Actuator::service_pending_pulse`] stamps the
//! start time, and the pulse closes once `dwell` has elapsed.
//!
//! ## Safety contract
//!
//! The driver never decides *whether* to fire.  Pacing and throttling
//! live in the firing state machine; this is a dumb actuator.  A failed
//! GPIO write is logged and the driver keeps going, since there is
//! nothing better to do from inside the control loop.

use embedded_hal::digital::{Error as _, OutputPin};
use log::error;

use crate::app::ports::Actuator;
use crate::clock::{Millis, elapsed};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseState {
    Closed,
    /// Coil energised, start time not yet stamped.
    Armed,
    Open { since: Millis },
}

pub struct Solenoid<P: OutputPin> {
    pin: P,
    dwell: Millis,
    state: PulseState,
    shots: u32,
}

impl<P: OutputPin> Solenoid<P> {
    /// Take the output pin and drive it low.
    pub fn new(mut pin: P, dwell: Millis) -> Result<Self> {
        pin.set_low().map_err(|e| e.kind())?;
        Ok(Self {
            pin,
            dwell,
            state: PulseState::Closed,
            shots: 0,
        })
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, PulseState::Closed)
    }

    /// Pulses started since power-on (wraps).
    pub fn shots(&self) -> u32 {
        self.shots
    }

    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, high: bool) {
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = res {
            error!("solenoid: GPIO write failed ({:?})", e.kind());
        }
    }
}

impl<P: OutputPin> Actuator for Solenoid<P> {
    fn fire_one_round(&mut self) {
        self.drive(true);
        self.state = PulseState::Armed;
        self.shots = self.shots.wrapping_add(1);
    }

    fn service_pending_pulse(&mut self, now: Millis) {
        match self.state {
            PulseState::Closed => {}
            PulseState::Armed => {
                self.state = PulseState::Open { since: now };
            }
            PulseState::Open { since } => {
                if elapsed(now, since) >= self.dwell {
                    self.drive(false);
                    self.state = PulseState::Closed;
                }
            }
        }
    }
}
