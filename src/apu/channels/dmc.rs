//! DMC (delta modulation channel): 1-bit sample playback

use serde::{Deserialize, Serialize};

use crate::apu::components::Divider;
use crate::apu::constants::DMC_RATE_TABLE;

/// DMC channel
///
/// A memory reader fetches sample bytes over the CPU bus (stalling the CPU
/// for the duration), a shift register plays them back one bit at a time,
/// and the output unit slews a 7-bit level up or down by 2 per bit, clamped
/// to 0-127.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmcChannel {
    /// IRQ enable flag ($4010 bit 7)
    irq_enabled: bool,
    /// Loop flag ($4010 bit 6)
    loop_flag: bool,
    /// Rate divider clocked at the CPU rate
    pub(crate) timer: Divider,

    /// Programmed sample start address ($C000 + value * 64)
    sample_address: u16,
    /// Programmed sample length (value * 16 + 1 bytes)
    sample_length: u16,

    /// Memory reader: next fetch address
    pub(crate) current_address: u16,
    /// Memory reader: bytes left in the sample
    pub(crate) bytes_remaining: u16,

    /// Sample buffer between the reader and the shift register
    sample_buffer: u8,
    /// Sample buffer holds a byte
    buffer_full: bool,

    /// Playback shift register
    shift_register: u8,
    /// Bits left in the shift register
    bits_remaining: u8,
    /// Output unit holds level instead of slewing
    silenced: bool,
    /// 7-bit output level
    output_level: u8,

    /// DMC IRQ line
    irq_flag: bool,
}

impl DmcChannel {
    pub fn new() -> Self {
        let mut timer = Divider::new();
        timer.set_period(DMC_RATE_TABLE[0]);
        DmcChannel {
            irq_enabled: false,
            loop_flag: false,
            timer,
            sample_address: 0xC000,
            sample_length: 1,
            current_address: 0xC000,
            bytes_remaining: 0,
            sample_buffer: 0,
            buffer_full: false,
            shift_register: 0,
            bits_remaining: 8,
            silenced: true,
            output_level: 0,
            irq_flag: false,
        }
    }

    /// $4010: IRQ enable, loop flag, rate select
    pub fn write_register_0(&mut self, value: u8) {
        self.irq_enabled = value & 0x80 != 0;
        self.loop_flag = value & 0x40 != 0;
        if !self.irq_enabled {
            self.irq_flag = false;
        }
        self.timer
            .set_period(DMC_RATE_TABLE[(value & 0x0F) as usize]);
    }

    /// $4011: direct 7-bit load of the output level
    pub fn write_register_1(&mut self, value: u8) {
        self.output_level = value & 0x7F;
    }

    /// $4012: sample start address
    pub fn write_register_2(&mut self, value: u8) {
        self.sample_address = 0xC000 | ((value as u16) << 6);
    }

    /// $4013: sample length
    pub fn write_register_3(&mut self, value: u8) {
        self.sample_length = ((value as u16) << 4) | 1;
    }

    /// $4015 enable/disable
    ///
    /// Disabling stops the reader; enabling restarts the sample when it had
    /// run dry. Both clear the DMC IRQ.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.irq_flag = false;
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart_sample();
        }
    }

    fn restart_sample(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    /// Reader still has bytes to fetch (feeds the $4015 status read)
    pub fn is_active(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// Level of the DMC IRQ line
    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// Drop the DMC IRQ line
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    /// Address the memory reader wants to fetch, if the buffer ran empty
    pub fn pending_fetch(&self) -> Option<u16> {
        if !self.buffer_full && self.bytes_remaining > 0 {
            Some(self.current_address)
        } else {
            None
        }
    }

    /// Complete a memory-reader fetch with the byte from the bus
    ///
    /// Advances the address (wrapping $FFFF to $8000) and counts the byte
    /// off; an exhausted sample either loops or raises the DMC IRQ.
    pub fn finish_fetch(&mut self, value: u8) {
        if self.bytes_remaining == 0 {
            return;
        }

        self.sample_buffer = value;
        self.buffer_full = true;

        self.current_address = if self.current_address == 0xFFFF {
            0x8000
        } else {
            self.current_address + 1
        };

        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart_sample();
            } else if self.irq_enabled {
                self.irq_flag = true;
                log::trace!("DMC IRQ raised at end of sample");
            }
        }
    }

    /// Timer clock at the CPU rate
    pub fn clock_timer(&mut self) {
        if !self.timer.clock() {
            return;
        }

        // Output unit: slew by +-2 within 0-127
        if !self.silenced {
            if self.shift_register & 0x01 != 0 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
        }

        self.shift_register >>= 1;
        self.bits_remaining -= 1;

        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            if self.buffer_full {
                self.silenced = false;
                self.shift_register = self.sample_buffer;
                self.buffer_full = false;
            } else {
                self.silenced = true;
            }
        }
    }

    /// Current 7-bit output level
    pub fn output(&self) -> u8 {
        self.output_level
    }
}

impl Default for DmcChannel {
    fn default() -> Self {
        Self::new()
    }
}
