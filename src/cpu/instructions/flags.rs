//! Flag manipulation instructions
//!
//! CLI and SEI participate in the one-instruction IRQ delay: the poll at
//! the next instruction boundary still sees the old I value.

use crate::cpu::{flags, Cpu};

impl Cpu {
    /// CLC - clear carry
    pub(crate) fn clc(&mut self) {
        self.clear_flag(flags::CARRY);
    }

    /// SEC - set carry
    pub(crate) fn sec(&mut self) {
        self.set_flag(flags::CARRY);
    }

    /// CLD - clear decimal (the 2A03 ignores it either way)
    pub(crate) fn cld(&mut self) {
        self.clear_flag(flags::DECIMAL);
    }

    /// SED - set decimal
    pub(crate) fn sed(&mut self) {
        self.set_flag(flags::DECIMAL);
    }

    /// CLI - clear interrupt disable (delayed for the IRQ poll)
    pub(crate) fn cli(&mut self) {
        self.latch_i_delay();
        self.clear_flag(flags::INTERRUPT_DISABLE);
    }

    /// SEI - set interrupt disable (delayed for the IRQ poll)
    pub(crate) fn sei(&mut self) {
        self.latch_i_delay();
        self.set_flag(flags::INTERRUPT_DISABLE);
    }

    /// CLV - clear overflow
    pub(crate) fn clv(&mut self) {
        self.clear_flag(flags::OVERFLOW);
    }
}
