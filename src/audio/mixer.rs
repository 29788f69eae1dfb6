//! APU non-linear mixer
//!
//! The console mixes its channels through two resistor ladders whose
//! response is distinctly non-linear; using the documented formulas instead
//! of a plain sum is what keeps relative channel volumes right:
//!
//! ```text
//! pulse_out = 95.88 / (8128 / (pulse1 + pulse2) + 100)
//! tnd_out = 159.79 / (1 / (triangle/8227 + noise/12241 + dmc/22638) + 100)
//! output = pulse_out + tnd_out
//! ```

use crate::apu::ChannelLevels;

/// Mixer implementing the console's non-linear formula
pub struct Mixer {
    /// Master volume (0.0 mute, 1.0 full)
    volume: f32,
}

impl Mixer {
    /// Mixer at full volume
    pub fn new() -> Self {
        Mixer { volume: 1.0 }
    }

    /// Set the master volume
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Current master volume
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Mix one set of channel levels into a sample in [0.0, 1.0]
    pub fn mix(&self, levels: ChannelLevels) -> f32 {
        let output = Self::mix_pulse(levels.pulse1, levels.pulse2)
            + Self::mix_tnd(levels.triangle, levels.noise, levels.dmc);
        (output * self.volume).clamp(0.0, 1.0)
    }

    /// Pulse ladder: `95.88 / (8128 / (p1 + p2) + 100)`
    fn mix_pulse(pulse1: u8, pulse2: u8) -> f32 {
        let sum = pulse1 as f32 + pulse2 as f32;
        if sum == 0.0 {
            return 0.0;
        }
        95.88 / (8128.0 / sum + 100.0)
    }

    /// Triangle/noise/DMC ladder:
    /// `159.79 / (1 / (t/8227 + n/12241 + d/22638) + 100)`
    fn mix_tnd(triangle: u8, noise: u8, dmc: u8) -> f32 {
        let inner =
            triangle as f32 / 8227.0 + noise as f32 / 12241.0 + dmc as f32 / 22638.0;
        if inner == 0.0 {
            return 0.0;
        }
        159.79 / (1.0 / inner + 100.0)
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
