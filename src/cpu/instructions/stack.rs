//! Stack instructions

use crate::bus::Bus;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// PHA - push accumulator
    pub(crate) fn pha(&mut self, bus: &mut Bus) {
        self.stack_push(bus, self.a);
    }

    /// PLA - pull accumulator. Flags: Z, N
    pub(crate) fn pla(&mut self, bus: &mut Bus) {
        self.a = self.stack_pull(bus);
        self.update_zero_and_negative_flags(self.a);
    }

    /// PHP - push processor status with B and U forced high
    pub(crate) fn php(&mut self, bus: &mut Bus) {
        self.stack_push(bus, self.status | flags::BREAK | flags::UNUSED);
    }

    /// PLP - pull processor status
    ///
    /// B is discarded (it only exists in pushed copies) and U reads back
    /// as 1. Changing I through PLP is subject to the one-instruction IRQ
    /// delay, so the shadow latches first.
    pub(crate) fn plp(&mut self, bus: &mut Bus) {
        self.latch_i_delay();
        let pulled = self.stack_pull(bus);
        self.status = (pulled & !flags::BREAK) | flags::UNUSED;
    }

    /// TXS - transfer X to stack pointer. Flags: none
    pub(crate) fn txs(&mut self) {
        self.sp = self.x;
    }

    /// TSX - transfer stack pointer to X. Flags: Z, N
    pub(crate) fn tsx(&mut self) {
        self.x = self.sp;
        self.update_zero_and_negative_flags(self.x);
    }
}
