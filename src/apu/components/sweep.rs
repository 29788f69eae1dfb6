//! Sweep unit: automatic period slides for the pulse channels

use serde::{Deserialize, Serialize};

use super::Divider;

/// Sweep unit clocked by half frames
///
/// Computes a target period by shifting the current period and adding or
/// subtracting it. The two pulse channels negate differently: pulse 1 by
/// ones' complement (subtract one extra), pulse 2 by twos' complement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sweep {
    /// Enabled flag (register bit 7)
    enabled: bool,
    /// Divider clocked by half frames
    divider: Divider,
    /// Negate flag (register bit 3)
    negate: bool,
    /// Shift count (register bits 0-2)
    shift: u8,
    /// Divider reload requested by a register write
    reload: bool,
    /// True for pulse 1 (ones'-complement negate)
    ones_complement: bool,
}

impl Sweep {
    /// `ones_complement` selects the pulse-1 negate behavior
    pub fn new(ones_complement: bool) -> Self {
        Sweep {
            enabled: false,
            divider: Divider::new(),
            negate: false,
            shift: 0,
            reload: false,
            ones_complement,
        }
    }

    /// The period the sweep is driving toward
    pub fn target_period(&self, current: u16) -> u16 {
        let change = current >> self.shift;
        if self.negate {
            let target = if self.ones_complement {
                current.wrapping_sub(change).wrapping_sub(1)
            } else {
                current.wrapping_sub(change)
            };
            // Clamp underflow to zero
            if target & 0x8000 != 0 {
                0
            } else {
                target
            }
        } else {
            current.wrapping_add(change)
        }
    }

    /// The sweep mutes its channel below period 8 or past $7FF
    pub fn is_muting(&self, current: u16) -> bool {
        current < 8 || self.target_period(current) > 0x7FF
    }

    /// Half-frame clock; Some(new_period) when the channel period updates
    pub fn clock(&mut self, current: u16) -> Option<u16> {
        let mut update = None;

        if self.divider.counter() == 0 && self.enabled && self.shift > 0 && !self.is_muting(current)
        {
            update = Some(self.target_period(current));
        }

        if self.divider.counter() == 0 || self.reload {
            self.divider.reload();
            self.reload = false;
        } else {
            self.divider.clock();
        }

        update
    }

    /// Decode a channel's register 1
    pub fn write_control(&mut self, value: u8) {
        self.enabled = value & 0x80 != 0;
        self.divider.set_period(((value >> 4) & 0x07) as u16);
        self.negate = value & 0x08 != 0;
        self.shift = value & 0x07;
        self.reload = true;
    }
}
