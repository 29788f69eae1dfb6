// APU module - Audio Processing Unit (2A03) emulation
//
// Five channels run under a shared frame sequencer:
//
// ## Register map
//
// | Address     | Channel  | Contents                                |
// |-------------|----------|-----------------------------------------|
// | $4000-$4003 | Pulse 1  | duty/envelope, sweep, timer, length     |
// | $4004-$4007 | Pulse 2  | duty/envelope, sweep, timer, length     |
// | $4008-$400B | Triangle | linear counter, -, timer, length        |
// | $400C-$400F | Noise    | envelope, -, mode/period, length        |
// | $4010-$4013 | DMC      | flags/rate, direct load, address, length|
// | $4015       | Status   | channel enables (W), activity + IRQs (R)|
// | $4017       | Frame counter (W)                                  |
//
// The APU ticks once per CPU cycle. Pulse and noise timers advance every
// other tick (the APU cycle), triangle and DMC every tick. The DMC memory
// reader fetches through the cartridge and reports how many cycles the CPU
// must stall (3 on a get cycle, 4 on a put cycle).

pub mod channels;
pub mod components;
pub mod constants;

use serde::{Deserialize, Serialize};

use crate::cartridge::Cartridge;
use channels::{DmcChannel, NoiseChannel, PulseChannel, TriangleChannel};
use components::{FrameCounter, FrameSignal};

/// Raw per-channel output levels for the mixer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelLevels {
    /// Pulse 1 (0-15)
    pub pulse1: u8,
    /// Pulse 2 (0-15)
    pub pulse2: u8,
    /// Triangle (0-15)
    pub triangle: u8,
    /// Noise (0-15)
    pub noise: u8,
    /// DMC (0-127)
    pub dmc: u8,
}

/// APU structure composing the channels and the frame sequencer
#[derive(Clone, Serialize, Deserialize)]
pub struct Apu {
    /// Pulse channel 1 (ones'-complement sweep)
    pulse1: PulseChannel,
    /// Pulse channel 2
    pulse2: PulseChannel,
    /// Triangle channel
    triangle: TriangleChannel,
    /// Noise channel
    noise: NoiseChannel,
    /// Delta modulation channel
    dmc: DmcChannel,
    /// Frame sequencer ($4017)
    frame_counter: FrameCounter,
    /// Divide-by-two phase for the pulse/noise timers
    apu_cycle: bool,
}

impl Apu {
    /// Create a new APU in its power-on state
    pub fn new() -> Self {
        Apu {
            pulse1: PulseChannel::new(true),
            pulse2: PulseChannel::new(false),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(),
            frame_counter: FrameCounter::new(),
            apu_cycle: false,
        }
    }

    /// Reset the APU to its power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ========================================
    // Clocking
    // ========================================

    /// Advance the APU by one CPU cycle
    ///
    /// Returns the number of extra cycles the CPU must stall for a DMC
    /// memory-reader fetch (0 when no fetch happened).
    pub fn tick(&mut self, cartridge: &mut Cartridge, dma_get_cycle: bool) -> u32 {
        // DMC memory reader: one byte per empty buffer, CPU pays the stall
        let mut stall = 0;
        if let Some(address) = self.dmc.pending_fetch() {
            let value = cartridge.cpu_read(address).unwrap_or(0);
            self.dmc.finish_fetch(value);
            stall = if dma_get_cycle { 3 } else { 4 };
        }

        // Frame sequencer clocks
        match self.frame_counter.tick() {
            FrameSignal::Quarter => self.clock_quarter_frame(),
            FrameSignal::Half => {
                self.clock_quarter_frame();
                self.clock_half_frame();
            }
            FrameSignal::Idle => {}
        }

        // Channel timers: triangle and DMC at CPU rate, the rest at the
        // APU rate
        self.triangle.clock_timer();
        self.dmc.clock_timer();
        self.apu_cycle = !self.apu_cycle;
        if self.apu_cycle {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
        }

        stall
    }

    /// Quarter-frame clock: envelopes and the linear counter
    fn clock_quarter_frame(&mut self) {
        self.pulse1.clock_envelope();
        self.pulse2.clock_envelope();
        self.noise.clock_envelope();
        self.triangle.clock_linear_counter();
    }

    /// Half-frame clock: length counters and sweeps
    fn clock_half_frame(&mut self) {
        self.pulse1.clock_half_frame();
        self.pulse2.clock_half_frame();
        self.triangle.clock_length_counter();
        self.noise.clock_length_counter();
    }

    // ========================================
    // Register Interface
    // ========================================

    /// Write an APU register ($4000-$4017, excluding $4014/$4016)
    pub fn write_register(&mut self, address: u16, value: u8) {
        match address {
            0x4000 => self.pulse1.write_register_0(value),
            0x4001 => self.pulse1.write_register_1(value),
            0x4002 => self.pulse1.write_register_2(value),
            0x4003 => self.pulse1.write_register_3(value),

            0x4004 => self.pulse2.write_register_0(value),
            0x4005 => self.pulse2.write_register_1(value),
            0x4006 => self.pulse2.write_register_2(value),
            0x4007 => self.pulse2.write_register_3(value),

            0x4008 => self.triangle.write_register_0(value),
            0x4009 => self.triangle.write_register_1(value),
            0x400A => self.triangle.write_register_2(value),
            0x400B => self.triangle.write_register_3(value),

            0x400C => self.noise.write_register_0(value),
            0x400D => self.noise.write_register_1(value),
            0x400E => self.noise.write_register_2(value),
            0x400F => self.noise.write_register_3(value),

            0x4010 => self.dmc.write_register_0(value),
            0x4011 => self.dmc.write_register_1(value),
            0x4012 => self.dmc.write_register_2(value),
            0x4013 => self.dmc.write_register_3(value),

            0x4015 => self.write_status(value),
            0x4017 => self.frame_counter.write_control(value),

            _ => {}
        }
    }

    /// $4015 write: per-channel enables
    fn write_status(&mut self, value: u8) {
        self.pulse1.set_enabled(value & 0x01 != 0);
        self.pulse2.set_enabled(value & 0x02 != 0);
        self.triangle.set_enabled(value & 0x04 != 0);
        self.noise.set_enabled(value & 0x08 != 0);
        self.dmc.set_enabled(value & 0x10 != 0);
    }

    /// $4015 read: channel activity plus the two IRQ lines
    ///
    /// Reading acknowledges the frame IRQ (the DMC IRQ stays until the
    /// channel is rewritten or disabled).
    pub fn read_status(&mut self) -> u8 {
        let mut status = 0u8;
        if self.pulse1.is_active() {
            status |= 0x01;
        }
        if self.pulse2.is_active() {
            status |= 0x02;
        }
        if self.triangle.is_active() {
            status |= 0x04;
        }
        if self.noise.is_active() {
            status |= 0x08;
        }
        if self.dmc.is_active() {
            status |= 0x10;
        }
        if self.frame_counter.irq_pending() {
            status |= 0x40;
        }
        if self.dmc.irq_pending() {
            status |= 0x80;
        }

        self.frame_counter.clear_irq();
        status
    }

    // ========================================
    // IRQ Lines
    // ========================================

    /// Level of the combined APU IRQ line (frame counter or DMC)
    pub fn irq_pending(&self) -> bool {
        self.frame_counter.irq_pending() || self.dmc.irq_pending()
    }

    /// Drop both IRQ lines (service acknowledgement)
    pub fn clear_irq_signals(&mut self) {
        self.frame_counter.clear_irq();
        self.dmc.clear_irq();
    }

    // ========================================
    // Output
    // ========================================

    /// Raw output levels of the five channels
    pub fn channel_levels(&self) -> ChannelLevels {
        ChannelLevels {
            pulse1: self.pulse1.output(),
            pulse2: self.pulse2.output(),
            triangle: self.triangle.output(),
            noise: self.noise.output(),
            dmc: self.dmc.output(),
        }
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
