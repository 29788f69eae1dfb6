//! Pulse wave channel (both pulse 1 and pulse 2)

use serde::{Deserialize, Serialize};

use crate::apu::components::{Divider, Envelope, LengthCounter, Sweep};
use crate::apu::constants::DUTY_PATTERNS;

/// Square wave channel with envelope, sweep and length counter
///
/// The timer divider reloads with period + 1 APU cycles; each expiry steps
/// the 8-position duty sequence. Output gates: channel enabled, length
/// counter live, sweep not muting, and the duty sequence high.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseChannel {
    /// Enabled flag (from $4015)
    pub(crate) enabled: bool,
    /// Duty cycle select (0-3)
    duty: u8,
    /// Position in the 8-step duty sequence
    sequence_index: u8,
    /// Envelope generator
    pub(crate) envelope: Envelope,
    /// Sweep unit
    pub(crate) sweep: Sweep,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer divider (11-bit period)
    pub(crate) timer: Divider,
}

impl PulseChannel {
    /// `pulse1` selects the sweep's ones'-complement negate behavior
    pub fn new(pulse1: bool) -> Self {
        PulseChannel {
            enabled: false,
            duty: 0,
            sequence_index: 0,
            envelope: Envelope::new(),
            sweep: Sweep::new(pulse1),
            length_counter: LengthCounter::new(),
            timer: Divider::new(),
        }
    }

    /// $4000/$4004: duty, length halt, envelope
    pub fn write_register_0(&mut self, value: u8) {
        self.duty = (value >> 6) & 0x03;
        self.length_counter.set_halt(value & 0x20 != 0);
        self.envelope.write_control(value);
    }

    /// $4001/$4005: sweep setup
    pub fn write_register_1(&mut self, value: u8) {
        self.sweep.write_control(value);
    }

    /// $4002/$4006: timer period low byte
    pub fn write_register_2(&mut self, value: u8) {
        let high = (self.timer.period() >> 8) as u8;
        self.timer.set_period_bytes(value, high);
    }

    /// $4003/$4007: length counter load and timer period high bits
    pub fn write_register_3(&mut self, value: u8) {
        let low = self.timer.period() as u8;
        self.timer.set_period_bytes(low, value & 0x07);

        // The length counter only loads while the channel is enabled
        if self.enabled {
            self.length_counter.load(value >> 3);
        }

        self.envelope.restart();
        self.sequence_index = 0;
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

    /// Timer clock at the APU rate (every other CPU cycle)
    pub fn clock_timer(&mut self) {
        if self.timer.clock() {
            self.sequence_index = (self.sequence_index + 1) % 8;
        }
    }

    /// Quarter-frame clock
    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    /// Half-frame clock: length counter and sweep
    pub fn clock_half_frame(&mut self) {
        self.length_counter.clock();
        if let Some(period) = self.sweep.clock(self.timer.period()) {
            self.timer.set_period(period);
        }
    }

    /// Current output level (0 or the envelope volume)
    pub fn output(&self) -> u8 {
        if !self.enabled || !self.length_counter.is_active() {
            return 0;
        }
        if self.sweep.is_muting(self.timer.period()) {
            return 0;
        }
        if DUTY_PATTERNS[self.duty as usize][self.sequence_index as usize] == 0 {
            return 0;
        }
        self.envelope.output()
    }
}
