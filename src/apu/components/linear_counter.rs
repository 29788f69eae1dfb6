//! Linear counter: the triangle channel's fine-grained duration gate

use serde::{Deserialize, Serialize};

/// Linear counter clocked by quarter frames
///
/// Works alongside the length counter; the triangle sequencer only advances
/// while both are non-zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearCounter {
    /// Current count
    counter: u8,
    /// Reload value from register bits 6-0
    reload_value: u8,
    /// Control flag (register bit 7); while set, the reload flag sticks
    control: bool,
    /// Reload requested by a register-3 write
    reload_flag: bool,
}

impl LinearCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quarter-frame clock
    pub fn clock(&mut self) {
        if self.reload_flag {
            self.counter = self.reload_value;
        } else if self.counter > 0 {
            self.counter -= 1;
        }

        if !self.control {
            self.reload_flag = false;
        }
    }

    /// Counter has not expired
    pub fn is_active(&self) -> bool {
        self.counter > 0
    }

    /// Decode $4008: control flag and reload value
    pub fn write_control(&mut self, value: u8) {
        self.control = value & 0x80 != 0;
        self.reload_value = value & 0x7F;
    }

    /// Request a reload ($400B side effect)
    pub fn set_reload_flag(&mut self) {
        self.reload_flag = true;
    }
}
