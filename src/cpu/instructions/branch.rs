//! Branch instructions
//!
//! All eight test one flag against the relative target the addressing step
//! already resolved. A taken branch costs one extra cycle, two when the
//! target sits in a different page than the instruction that follows.

use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// Shared branch core: returns the extra cycles consumed
    fn branch_if(&mut self, condition: bool, addr_result: &AddressingResult) -> u8 {
        if !condition {
            return 0;
        }

        self.pc = addr_result.address;
        if addr_result.page_crossed {
            2
        } else {
            1
        }
    }

    /// BCC - branch if carry clear
    pub(crate) fn bcc(&mut self, addr_result: &AddressingResult) -> u8 {
        self.branch_if(!self.get_flag(flags::CARRY), addr_result)
    }

    /// BCS - branch if carry set
    pub(crate) fn bcs(&mut self, addr_result: &AddressingResult) -> u8 {
        self.branch_if(self.get_flag(flags::CARRY), addr_result)
    }

    /// BEQ - branch if zero set
    pub(crate) fn beq(&mut self, addr_result: &AddressingResult) -> u8 {
        self.branch_if(self.get_flag(flags::ZERO), addr_result)
    }

    /// BNE - branch if zero clear
    pub(crate) fn bne(&mut self, addr_result: &AddressingResult) -> u8 {
        self.branch_if(!self.get_flag(flags::ZERO), addr_result)
    }

    /// BMI - branch if negative set
    pub(crate) fn bmi(&mut self, addr_result: &AddressingResult) -> u8 {
        self.branch_if(self.get_flag(flags::NEGATIVE), addr_result)
    }

    /// BPL - branch if negative clear
    pub(crate) fn bpl(&mut self, addr_result: &AddressingResult) -> u8 {
        self.branch_if(!self.get_flag(flags::NEGATIVE), addr_result)
    }

    /// BVC - branch if overflow clear
    pub(crate) fn bvc(&mut self, addr_result: &AddressingResult) -> u8 {
        self.branch_if(!self.get_flag(flags::OVERFLOW), addr_result)
    }

    /// BVS - branch if overflow set
    pub(crate) fn bvs(&mut self, addr_result: &AddressingResult) -> u8 {
        self.branch_if(self.get_flag(flags::OVERFLOW), addr_result)
    }
}
