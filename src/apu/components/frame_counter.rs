//! Frame counter: the APU's low-frequency sequencer
//!
//! Ticked once per CPU cycle, it advances its internal step counter every
//! other tick (the APU cycle rate) and emits quarter-frame and half-frame
//! signals that clock envelopes, linear counters, sweeps and length
//! counters. The 4-step sequence also drives the frame IRQ.

use serde::{Deserialize, Serialize};

/// What the sequencer wants clocked this CPU cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSignal {
    /// Nothing this cycle
    Idle,
    /// Clock envelopes and the linear counter
    Quarter,
    /// Quarter plus length counters and sweeps
    Half,
}

/// APU cycle indices of the sequence steps
const STEP_1: i32 = 3728;
const STEP_2: i32 = 7456;
const STEP_3: i32 = 11185;
const STEP_4: i32 = 14914;
const STEP_5: i32 = 18640;

/// Frame counter (the $4017 register)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameCounter {
    /// 5-step mode (bit 7); no IRQ and a longer sequence
    five_step: bool,
    /// IRQ inhibit (bit 6)
    irq_inhibit: bool,
    /// Frame IRQ line
    irq_flag: bool,
    /// Divide-by-two phase: the step counter advances on one half, the
    /// step comparison runs on the other
    advance_phase: bool,
    /// APU cycle counter; a $4017 write parks it below zero to model the
    /// 3-or-4 CPU cycle reset delay
    cycle: i32,
    /// Wrap the counter on the next advance
    end_reached: bool,
    /// Bit 7 was just written: emit one half-frame clock right away
    immediate_half: bool,
}

impl FrameCounter {
    pub fn new() -> Self {
        FrameCounter {
            five_step: false,
            irq_inhibit: false,
            irq_flag: false,
            advance_phase: true,
            // One advance behind so the first step lands at the hardware's
            // CPU cycle 7457
            cycle: -1,
            end_reached: false,
            immediate_half: false,
        }
    }

    /// Tick one CPU cycle and report what to clock
    pub fn tick(&mut self) -> FrameSignal {
        // First half of each APU cycle advances the counter
        self.advance_phase = !self.advance_phase;
        if !self.advance_phase {
            if self.end_reached {
                self.end_reached = false;
                self.cycle = 0;
            } else {
                self.cycle += 1;
            }
            return FrameSignal::Idle;
        }

        // Second half compares against the step table
        let mut signal = match self.cycle {
            STEP_1 | STEP_3 => FrameSignal::Quarter,
            STEP_2 => FrameSignal::Half,
            STEP_5 => {
                self.end_reached = true;
                FrameSignal::Half
            }
            STEP_4 => {
                if self.five_step {
                    FrameSignal::Idle
                } else {
                    if !self.irq_inhibit {
                        self.irq_flag = true;
                        log::trace!("frame counter IRQ raised");
                    }
                    self.end_reached = true;
                    FrameSignal::Half
                }
            }
            _ => FrameSignal::Idle,
        };

        if self.immediate_half {
            self.immediate_half = false;
            signal = FrameSignal::Half;
        }

        signal
    }

    /// Handle a $4017 write
    ///
    /// The sequencer restarts 3 or 4 CPU cycles later depending on where
    /// the divide-by-two stands; writing bit 7 also clocks a half frame
    /// immediately.
    pub fn write_control(&mut self, value: u8) {
        self.five_step = value & 0x80 != 0;
        self.immediate_half = self.five_step;
        self.irq_inhibit = value & 0x40 != 0;

        if self.irq_inhibit {
            self.irq_flag = false;
        }

        if self.advance_phase {
            // Mid-APU-cycle: restart lands 3 CPU cycles out
            self.cycle = -1;
            self.advance_phase = false;
        } else {
            // 4 CPU cycles out
            self.cycle = -2;
        }
        self.end_reached = false;
    }

    /// Level of the frame IRQ line
    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// Clear the frame IRQ ($4015 read or service acknowledgement)
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tick `cpu_cycles` times, collecting non-idle signals
    fn run(counter: &mut FrameCounter, cpu_cycles: u32) -> Vec<(u32, FrameSignal)> {
        let mut events = Vec::new();
        for i in 0..cpu_cycles {
            let signal = counter.tick();
            if signal != FrameSignal::Idle {
                events.push((i, signal));
            }
        }
        events
    }

    #[test]
    fn test_four_step_sequence() {
        let mut counter = FrameCounter::new();
        let events = run(&mut counter, 30000);

        let signals: Vec<FrameSignal> = events.iter().map(|&(_, s)| s).collect();
        assert_eq!(
            &signals[0..4],
            &[
                FrameSignal::Quarter,
                FrameSignal::Half,
                FrameSignal::Quarter,
                FrameSignal::Half,
            ],
            "quarter, half, quarter, half per 4-step frame"
        );

        // Steps land at roughly 2x the APU cycle indices
        assert!((7456..7460).contains(&events[0].0), "step 1 near CPU 7457");
        assert!((29828..29832).contains(&events[3].0), "step 4 near CPU 29829");
    }

    #[test]
    fn test_four_step_raises_irq() {
        let mut counter = FrameCounter::new();
        run(&mut counter, 30000);
        assert!(counter.irq_pending(), "step 4 sets the frame IRQ");

        counter.clear_irq();
        assert!(!counter.irq_pending());
    }

    #[test]
    fn test_irq_inhibit_blocks_and_clears() {
        let mut counter = FrameCounter::new();
        counter.write_control(0x40);
        run(&mut counter, 30000);
        assert!(!counter.irq_pending(), "inhibited sequence never raises IRQ");

        // Raising the flag then inhibiting clears it
        let mut counter = FrameCounter::new();
        run(&mut counter, 30000);
        assert!(counter.irq_pending());
        counter.write_control(0x40);
        assert!(!counter.irq_pending(), "inhibit write clears a pending IRQ");
    }

    #[test]
    fn test_five_step_mode_never_raises_irq() {
        let mut counter = FrameCounter::new();
        counter.write_control(0x80);
        let events = run(&mut counter, 40000);
        assert!(!counter.irq_pending());

        // The immediate half-frame clock from bit 7 arrives first
        assert_eq!(events[0].1, FrameSignal::Half, "bit 7 clocks a half frame");
        assert!(events[0].0 < 4, "and it lands within the reset delay");
    }

    #[test]
    fn test_sequence_repeats() {
        let mut counter = FrameCounter::new();
        let events = run(&mut counter, 60000);
        let signals: Vec<FrameSignal> = events.iter().map(|&(_, s)| s).collect();
        assert!(signals.len() >= 8, "two frames of events");
        assert_eq!(&signals[4..8], &signals[0..4], "sequence loops");
    }
}
