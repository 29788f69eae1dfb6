//! Envelope generator shared by the pulse and noise channels

use serde::{Deserialize, Serialize};

use super::Divider;

/// Envelope generator producing either a decaying or a constant volume
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Set by a register-3 write; the next quarter frame restarts decay
    start: bool,
    /// Divider clocked by quarter frames
    divider: Divider,
    /// Decay level (15 down to 0)
    decay_level: u8,
    /// Volume field: constant volume level and divider period in one
    volume: u8,
    /// Loop flag (register bit 5): decay wraps 0 -> 15
    loop_flag: bool,
    /// Constant volume flag (register bit 4)
    constant_volume: bool,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quarter-frame clock
    pub fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay_level = 15;
            self.divider.reload();
            return;
        }

        if self.divider.clock() {
            if self.decay_level > 0 {
                self.decay_level -= 1;
            } else if self.loop_flag {
                self.decay_level = 15;
            }
        }
    }

    /// Current output volume (0-15)
    pub fn output(&self) -> u8 {
        if self.constant_volume {
            self.volume
        } else {
            self.decay_level
        }
    }

    /// Decode the envelope fields of a channel's register 0
    pub fn write_control(&mut self, value: u8) {
        self.loop_flag = value & 0x20 != 0;
        self.constant_volume = value & 0x10 != 0;
        self.volume = value & 0x0F;
        self.divider.set_period(self.volume as u16);
    }

    /// Flag a restart (register-3 side effect)
    pub fn restart(&mut self) {
        self.start = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_reloads_decay() {
        let mut envelope = Envelope::new();
        envelope.write_control(0x00); // period 0, decaying
        envelope.restart();

        envelope.clock();
        assert_eq!(envelope.output(), 15, "first clock after restart loads 15");
        envelope.clock();
        assert_eq!(envelope.output(), 14);
    }

    #[test]
    fn test_decay_stops_at_zero_without_loop() {
        let mut envelope = Envelope::new();
        envelope.write_control(0x00);
        envelope.restart();

        for _ in 0..40 {
            envelope.clock();
        }
        assert_eq!(envelope.output(), 0, "decay floors at zero");
    }

    #[test]
    fn test_decay_wraps_with_loop_flag() {
        let mut envelope = Envelope::new();
        envelope.write_control(0x20); // loop, period 0
        envelope.restart();

        envelope.clock(); // 15
        for _ in 0..16 {
            envelope.clock(); // down to 0 then wrap
        }
        assert_eq!(envelope.output(), 15, "loop flag wraps the decay level");
    }

    #[test]
    fn test_constant_volume_uses_period_field() {
        let mut envelope = Envelope::new();
        envelope.write_control(0x17); // constant volume 7
        assert_eq!(envelope.output(), 7);

        for _ in 0..10 {
            envelope.clock();
        }
        assert_eq!(envelope.output(), 7, "constant volume never decays");
    }

    #[test]
    fn test_divider_period_slows_decay() {
        let mut envelope = Envelope::new();
        envelope.write_control(0x02); // divider period 2: decay every 3 clocks
        envelope.restart();

        envelope.clock(); // load 15
        envelope.clock();
        envelope.clock();
        assert_eq!(envelope.output(), 15, "divider still counting");
        envelope.clock();
        assert_eq!(envelope.output(), 14, "divider fired");
    }
}
