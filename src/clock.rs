//! Millisecond time base.
//!
//! The marker runs off a single free-running millisecond counter that a
//! periodic timer interrupt advances.  The main loop samples it once per
//! cycle and hands the sample to everything downstream, so time never
//! moves within one iteration.
//!
//! ## Wraparound
//!
//! [`Millis`] wraps after ~49.7 days.  Every elapsed-time comparison in the
//! crate goes through [`elapsed`], which subtracts modulo 2^32, so a
//! timestamp taken just before the wrap still compares correctly against
//! one taken just after it.
//!
//! ## Torn reads
//!
//! The counter is read and written inside a critical section.  On targets
//! whose native word is narrower than 32 bits a plain load could observe
//! half of an in-flight increment; the critical section rules that out on
//! every platform without relying on native 32-bit atomics.

use core::cell::Cell;

use critical_section::Mutex;

/// Monotonic millisecond timestamp (wraps at `u32::MAX`).
pub type Millis = u32;

/// Milliseconds elapsed from `since` to `now`, tolerant of counter wrap.
#[inline]
pub const fn elapsed(now: Millis, since: Millis) -> Millis {
    now.wrapping_sub(since)
}

/// Interrupt-advanced millisecond counter shared with the main loop.
pub struct MillisCounter {
    ticks: Mutex<Cell<Millis>>,
}

impl MillisCounter {
    pub const fn new() -> Self {
        Self {
            ticks: Mutex::new(Cell::new(0)),
        }
    }

    /// Advance by one millisecond.  Call from the 1 kHz timer callback.
    pub fn tick(&self) {
        self.advance(1);
    }

    /// Advance by `ms` milliseconds, wrapping at the counter width.
    pub fn advance(&self, ms: Millis) {
        critical_section::with(|cs| {
            let cell = self.ticks.borrow(cs);
            cell.set(cell.get().wrapping_add(ms));
        });
    }

    /// Current sample.
    pub fn now(&self) -> Millis {
        critical_section::with(|cs| self.ticks.borrow(cs).get())
    }
}

impl Default for MillisCounter {
    fn default() -> Self {
        Self::new()
    }
}
