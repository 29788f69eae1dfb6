//! Triangle wave channel

use serde::{Deserialize, Serialize};

use crate::apu::components::{Divider, LengthCounter, LinearCounter};
use crate::apu::constants::TRIANGLE_SEQUENCE;

/// Triangle channel: a 32-step ramp gated by two duration counters
///
/// Unlike the pulse channels, the timer runs at the full CPU rate, and
/// silencing never forces the output to zero: the sequencer simply stops
/// advancing and the last ramp value holds, which is what keeps the
/// channel from popping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleChannel {
    /// Enabled flag (from $4015)
    pub(crate) enabled: bool,
    /// Linear counter (quarter-frame gate)
    pub(crate) linear_counter: LinearCounter,
    /// Length counter (half-frame gate)
    pub(crate) length_counter: LengthCounter,
    /// Timer divider clocked at CPU rate
    pub(crate) timer: Divider,
    /// Position in the 32-step ramp
    sequence_index: u8,
}

impl TriangleChannel {
    pub fn new() -> Self {
        TriangleChannel {
            enabled: false,
            linear_counter: LinearCounter::new(),
            length_counter: LengthCounter::new(),
            timer: Divider::new(),
            sequence_index: 0,
        }
    }

    /// $4008: control flag (doubles as length halt) and linear reload value
    pub fn write_register_0(&mut self, value: u8) {
        self.length_counter.set_halt(value & 0x80 != 0);
        self.linear_counter.write_control(value);
    }

    /// $4009: unused
    pub fn write_register_1(&mut self, _value: u8) {}

    /// $400A: timer period low byte
    pub fn write_register_2(&mut self, value: u8) {
        let high = (self.timer.period() >> 8) as u8;
        self.timer.set_period_bytes(value, high);
    }

    /// $400B: length counter load and timer period high bits
    pub fn write_register_3(&mut self, value: u8) {
        let low = self.timer.period() as u8;
        self.timer.set_period_bytes(low, value & 0x07);

        if self.enabled {
            self.length_counter.load(value >> 3);
        }
        self.linear_counter.set_reload_flag();
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

    /// Timer clock at the CPU rate
    ///
    /// The ramp advances only while both counters are live and the period
    /// is audible (>= 2); otherwise the output parks on its last value.
    pub fn clock_timer(&mut self) {
        let fired = self.timer.clock();
        if fired
            && self.timer.period() >= 2
            && self.linear_counter.is_active()
            && self.length_counter.is_active()
        {
            self.sequence_index = (self.sequence_index + 1) % 32;
        }
    }

    /// Quarter-frame clock
    pub fn clock_linear_counter(&mut self) {
        self.linear_counter.clock();
    }

    /// Half-frame clock
    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Current ramp value (0-15)
    pub fn output(&self) -> u8 {
        TRIANGLE_SEQUENCE[self.sequence_index as usize]
    }
}

impl Default for TriangleChannel {
    fn default() -> Self {
        Self::new()
    }
}
