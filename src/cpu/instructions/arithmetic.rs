//! Arithmetic instructions
//!
//! The 2A03 has no decimal mode: the D flag is settable but ADC/SBC always
//! run binary math.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// ADC - add with carry. Flags: C, Z, V, N
    ///
    /// `A' = A + M + C`; carry is the 8-bit carry-out, overflow is set
    /// when both operands share a sign the result does not.
    pub(crate) fn adc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let operand = self.read_operand(bus, addr_result);
        self.add_to_accumulator(operand);
    }

    /// SBC - subtract with carry. Flags: C, Z, V, N
    ///
    /// Implemented as `A + !M + C`; a clear carry afterwards means borrow.
    pub(crate) fn sbc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let operand = self.read_operand(bus, addr_result);
        self.add_to_accumulator(!operand);
    }

    /// Shared ADC/SBC core
    fn add_to_accumulator(&mut self, operand: u8) {
        let carry_in = self.get_flag(flags::CARRY) as u16;
        let sum = self.a as u16 + operand as u16 + carry_in;
        let result = sum as u8;

        self.update_flag(flags::CARRY, sum > 0xFF);
        self.update_flag(
            flags::OVERFLOW,
            (self.a ^ result) & (operand ^ result) & 0x80 != 0,
        );
        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    /// INC - increment memory. Flags: Z, N
    pub(crate) fn inc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = bus.read(addr_result.address).wrapping_add(1);
        bus.write(addr_result.address, value);
        self.update_zero_and_negative_flags(value);
    }

    /// DEC - decrement memory. Flags: Z, N
    pub(crate) fn dec(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = bus.read(addr_result.address).wrapping_sub(1);
        bus.write(addr_result.address, value);
        self.update_zero_and_negative_flags(value);
    }

    /// INX - increment X. Flags: Z, N
    pub(crate) fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// INY - increment Y. Flags: Z, N
    pub(crate) fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    /// DEX - decrement X. Flags: Z, N
    pub(crate) fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// DEY - decrement Y. Flags: Z, N
    pub(crate) fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }
}
