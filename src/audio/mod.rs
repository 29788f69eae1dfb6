//! Audio output path: non-linear channel mixing and output-rate timing
//!
//! The APU produces raw channel levels every CPU cycle; the mixer folds
//! them through the console's non-linear resistor network, and the sample
//! clock decides which CPU cycles coincide with an output sample at the
//! host's declared rate.

mod mixer;
mod sample_clock;

pub use mixer::Mixer;
pub use sample_clock::SampleClock;

/// NTSC CPU clock rate in Hz, the rate the APU is sampled at
pub const CPU_CLOCK_HZ: u32 = 1_789_773;
