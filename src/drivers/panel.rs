//! Front-panel inputs: preset button and two-position selector.
//!
//! Both lines are active-low with pull-ups.  A failed button read is
//! logged and treated as "not pressed".  A failed selector read is logged
//! and answers the last position read successfully, so a glitch on the
//! selector line never looks like a switch flip.

use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

use crate::app::ports::{ControlPanel, Selector};

pub struct PanelInputs<B: InputPin, S: InputPin> {
    button: B,
    selector: S,
    last_selector: Selector,
}

impl<B: InputPin, S: InputPin> PanelInputs<B, S> {
    pub fn new(button: B, selector: S) -> Self {
        Self {
            button,
            selector,
            last_selector: Selector::default(),
        }
    }
}

impl<B: InputPin, S: InputPin> ControlPanel for PanelInputs<B, S> {
    fn button_pressed(&mut self) -> bool {
        self.button.is_low().unwrap_or_else(|e| {
            warn!("panel: button read failed ({:?})", e.kind());
            false
        })
    }

    fn selector(&mut self) -> Selector {
        match self.selector.is_low() {
            Ok(true) => self.last_selector = Selector::B,
            Ok(false) => self.last_selector = Selector::A,
            Err(e) => warn!(
                "panel: selector read failed ({:?}), holding {:?}",
                e.kind(),
                self.last_selector
            ),
        }
        self.last_selector
    }
}
