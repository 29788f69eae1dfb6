//! Noise channel

use serde::{Deserialize, Serialize};

use crate::apu::components::{Divider, Envelope, LengthCounter};
use crate::apu::constants::NOISE_PERIOD_TABLE;

/// Noise channel: a 15-bit LFSR gated by envelope and length counter
///
/// The shift register seeds with 1 and feeds back bit 0 XOR bit 1 (or bit 6
/// in the short mode), inserted at bit 14 after each right shift, so it can
/// never reach the all-zero lockup state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseChannel {
    /// Enabled flag (from $4015)
    pub(crate) enabled: bool,
    /// Envelope generator
    pub(crate) envelope: Envelope,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer divider clocked at the APU rate
    pub(crate) timer: Divider,
    /// 15-bit linear feedback shift register
    pub(crate) lfsr: u16,
    /// Mode flag ($400E bit 7): feedback from bit 6 for periodic noise
    mode: bool,
}

impl NoiseChannel {
    pub fn new() -> Self {
        NoiseChannel {
            enabled: false,
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(),
            timer: Divider::new(),
            lfsr: 1,
            mode: false,
        }
    }

    /// $400C: length halt and envelope setup
    pub fn write_register_0(&mut self, value: u8) {
        self.length_counter.set_halt(value & 0x20 != 0);
        self.envelope.write_control(value);
    }

    /// $400D: unused
    pub fn write_register_1(&mut self, _value: u8) {}

    /// $400E: mode flag and period table index
    pub fn write_register_2(&mut self, value: u8) {
        self.mode = value & 0x80 != 0;
        self.timer
            .set_period(NOISE_PERIOD_TABLE[(value & 0x0F) as usize]);
    }

    /// $400F: length counter load
    pub fn write_register_3(&mut self, value: u8) {
        if self.enabled {
            self.length_counter.load(value >> 3);
        }
        self.envelope.restart();
    }

    /// $4015 enable/disable; disabling clears the length counter
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.clear();
        }
    }

    /// Length counter still running (feeds the $4015 status read)
    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    /// Timer clock at the APU rate; each expiry steps the LFSR
    pub fn clock_timer(&mut self) {
        if !self.timer.clock() {
            return;
        }

        let tap = if self.mode { 6 } else { 1 };
        let feedback = (self.lfsr ^ (self.lfsr >> tap)) & 0x01;
        self.lfsr >>= 1;
        self.lfsr |= feedback << 14;
    }

    /// Quarter-frame clock
    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    /// Half-frame clock
    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Current output level (0 or the envelope volume)
    pub fn output(&self) -> u8 {
        if !self.enabled || !self.length_counter.is_active() {
            return 0;
        }
        if self.lfsr & 0x01 != 0 {
            return 0;
        }
        self.envelope.output()
    }
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}
