//! Down-counting divider, the basic clocking element of the APU

use serde::{Deserialize, Serialize};

/// A divider emits one clock every `period + 1` input clocks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Divider {
    /// Reload value
    pub(crate) period: u16,
    /// Current count
    counter: u16,
}

impl Divider {
    pub fn new() -> Self {
        Divider {
            period: 0,
            counter: 0,
        }
    }

    /// Count down one input clock; true when the divider fires and reloads
    pub fn clock(&mut self) -> bool {
        if self.counter == 0 {
            self.counter = self.period;
            true
        } else {
            self.counter -= 1;
            false
        }
    }

    /// Set the reload value without touching the count
    pub fn set_period(&mut self, period: u16) {
        self.period = period;
    }

    /// Replace the low or high byte of an 11-bit period
    pub fn set_period_bytes(&mut self, low: u8, high: u8) {
        self.period = (low as u16) | ((high as u16 & 0x07) << 8);
    }

    /// Current reload value
    pub fn period(&self) -> u16 {
        self.period
    }

    /// Current count
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Force the count back to the reload value
    pub fn reload(&mut self) {
        self.counter = self.period;
    }
}
