//! Jump, subroutine and return instructions

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// JMP - jump (absolute or indirect, the addressing step resolved both)
    pub(crate) fn jmp(&mut self, addr_result: &AddressingResult) {
        self.pc = addr_result.address;
    }

    /// JSR - jump to subroutine
    ///
    /// Pushes the address of the last operand byte (PC - 1); RTS undoes
    /// the off-by-one when it returns.
    pub(crate) fn jsr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let return_minus_one = self.pc.wrapping_sub(1);
        self.stack_push_u16(bus, return_minus_one);
        self.pc = addr_result.address;
    }

    /// RTS - return from subroutine: pulled address plus one
    pub(crate) fn rts(&mut self, bus: &mut Bus) {
        self.pc = self.stack_pull_u16(bus).wrapping_add(1);
    }
}
