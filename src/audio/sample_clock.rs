//! Output-rate sample clock
//!
//! The APU is effectively sampled at the CPU rate (~1.79 MHz) while hosts
//! want something like 44.1 kHz. Rather than a floating-point timestamp
//! that drifts over hours of play, the clock keeps a rational accumulator:
//! it adds the output rate once per CPU cycle and emits a sample each time
//! the sum clears the CPU rate.

use super::CPU_CLOCK_HZ;

/// Rational divider deciding which CPU cycles emit an output sample
pub struct SampleClock {
    /// Output sample rate in Hz
    sample_rate: u32,
    /// Accumulator in units of 1/CPU_CLOCK_HZ seconds
    accumulator: u64,
}

impl SampleClock {
    /// Clock for the given output rate
    pub fn new(sample_rate: u32) -> Self {
        SampleClock {
            sample_rate,
            accumulator: 0,
        }
    }

    /// The configured output rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Advance one CPU cycle; true when a sample is due
    pub fn tick(&mut self) -> bool {
        self.accumulator += self.sample_rate as u64;
        if self.accumulator >= CPU_CLOCK_HZ as u64 {
            self.accumulator -= CPU_CLOCK_HZ as u64;
            true
        } else {
            false
        }
    }

    /// Restart the accumulator
    pub fn reset(&mut self) {
        self.accumulator = 0;
    }
}
