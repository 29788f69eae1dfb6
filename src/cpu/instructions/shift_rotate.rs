//! Shift and rotate instructions
//!
//! Each comes in an accumulator variant and a read-modify-write memory
//! variant; the dispatch passes which one applies.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// ASL - arithmetic shift left. Flags: C (bit 7 out), Z, N
    pub(crate) fn asl(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        let value = if accumulator {
            self.a
        } else {
            bus.read(addr_result.address)
        };

        let result = value << 1;
        self.update_flag(flags::CARRY, value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);

        if accumulator {
            self.a = result;
        } else {
            bus.write(addr_result.address, result);
        }
    }

    /// LSR - logical shift right. Flags: C (bit 0 out), Z, N (always clear)
    pub(crate) fn lsr(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        let value = if accumulator {
            self.a
        } else {
            bus.read(addr_result.address)
        };

        let result = value >> 1;
        self.update_flag(flags::CARRY, value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);

        if accumulator {
            self.a = result;
        } else {
            bus.write(addr_result.address, result);
        }
    }

    /// ROL - rotate left through carry. Flags: C, Z, N
    pub(crate) fn rol(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        let value = if accumulator {
            self.a
        } else {
            bus.read(addr_result.address)
        };

        let result = (value << 1) | self.get_flag(flags::CARRY) as u8;
        self.update_flag(flags::CARRY, value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);

        if accumulator {
            self.a = result;
        } else {
            bus.write(addr_result.address, result);
        }
    }

    /// ROR - rotate right through carry. Flags: C, Z, N
    pub(crate) fn ror(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        let value = if accumulator {
            self.a
        } else {
            bus.read(addr_result.address)
        };

        let result = (value >> 1) | ((self.get_flag(flags::CARRY) as u8) << 7);
        self.update_flag(flags::CARRY, value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);

        if accumulator {
            self.a = result;
        } else {
            bus.write(addr_result.address, result);
        }
    }
}
