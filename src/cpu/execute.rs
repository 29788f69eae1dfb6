// CPU fetch/decode/dispatch

use crate::bus::Bus;
use crate::cpu::addressing::AddressingMode;
use crate::cpu::opcodes::OPCODE_TABLE;
use crate::cpu::{Cpu, Fault};

impl Cpu {
    /// Execute exactly one instruction
    ///
    /// Fetches the opcode at PC, resolves its addressing mode, runs it and
    /// accounts the cycles: base cost, plus one for page-crossing reads,
    /// plus whatever the instruction itself reports (taken branches).
    ///
    /// A parked CPU (illegal opcode) burns two cycles per call without
    /// touching any state, so the rest of the machine keeps a coherent
    /// clock while the host decides what to do with the fault.
    ///
    /// # Returns
    ///
    /// The number of cycles consumed.
    pub fn step(&mut self, bus: &mut Bus) -> u8 {
        if self.fault.is_some() {
            self.cycles = self.cycles.wrapping_add(2);
            return 2;
        }

        // Each instruction gets a fresh IRQ-delay window
        self.i_delayed = false;

        let opcode_pc = self.pc;
        let opcode = bus.read(self.pc);
        let info = &OPCODE_TABLE[opcode as usize];

        if info.is_illegal() {
            log::warn!("illegal opcode {:#04X} at {:#06X}; CPU parked", opcode, opcode_pc);
            self.fault = Some(Fault::IllegalOpcode {
                pc: opcode_pc,
                opcode,
            });
            self.cycles = self.cycles.wrapping_add(2);
            return 2;
        }

        self.pc = self.pc.wrapping_add(1);

        let addr_result = match info.mode {
            AddressingMode::Implied => self.addr_implied(),
            AddressingMode::Accumulator => self.addr_accumulator(),
            AddressingMode::Immediate => self.addr_immediate(bus),
            AddressingMode::ZeroPage => self.addr_zero_page(bus),
            AddressingMode::ZeroPageX => self.addr_zero_page_x(bus),
            AddressingMode::ZeroPageY => self.addr_zero_page_y(bus),
            AddressingMode::Relative => self.addr_relative(bus),
            AddressingMode::Absolute => self.addr_absolute(bus),
            AddressingMode::AbsoluteX => self.addr_absolute_x(bus),
            AddressingMode::AbsoluteY => self.addr_absolute_y(bus),
            AddressingMode::Indirect => self.addr_indirect(bus),
            AddressingMode::IndexedIndirect => self.addr_indexed_indirect(bus),
            AddressingMode::IndirectIndexed => self.addr_indirect_indexed(bus),
        };

        let extra_cycles = self.execute_instruction(opcode, &addr_result, bus);

        let mut cycles = info.cycles;
        if info.page_cycle && addr_result.page_crossed && info.mode != AddressingMode::Relative {
            cycles += 1;
        }
        cycles += extra_cycles;

        self.cycles = self.cycles.wrapping_add(cycles as u64);
        cycles
    }

    /// Dispatch a decoded opcode to its implementation
    ///
    /// Returns the extra cycles the instruction itself adds (branches).
    fn execute_instruction(
        &mut self,
        opcode: u8,
        addr_result: &crate::cpu::addressing::AddressingResult,
        bus: &mut Bus,
    ) -> u8 {
        match opcode {
            // Load/store
            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => self.lda(bus, addr_result),
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => self.ldx(bus, addr_result),
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => self.ldy(bus, addr_result),
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => self.sta(bus, addr_result),
            0x86 | 0x96 | 0x8E => self.stx(bus, addr_result),
            0x84 | 0x94 | 0x8C => self.sty(bus, addr_result),

            // Arithmetic
            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => self.adc(bus, addr_result),
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 => self.sbc(bus, addr_result),
            0xE6 | 0xF6 | 0xEE | 0xFE => self.inc(bus, addr_result),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xC6 | 0xD6 | 0xCE | 0xDE => self.dec(bus, addr_result),
            0xCA => self.dex(),
            0x88 => self.dey(),

            // Logic
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => self.and(bus, addr_result),
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => self.ora(bus, addr_result),
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => self.eor(bus, addr_result),
            0x24 | 0x2C => self.bit(bus, addr_result),

            // Shifts / rotates
            0x0A => self.asl(bus, addr_result, true),
            0x06 | 0x16 | 0x0E | 0x1E => self.asl(bus, addr_result, false),
            0x4A => self.lsr(bus, addr_result, true),
            0x46 | 0x56 | 0x4E | 0x5E => self.lsr(bus, addr_result, false),
            0x2A => self.rol(bus, addr_result, true),
            0x26 | 0x36 | 0x2E | 0x3E => self.rol(bus, addr_result, false),
            0x6A => self.ror(bus, addr_result, true),
            0x66 | 0x76 | 0x6E | 0x7E => self.ror(bus, addr_result, false),

            // Compare
            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => self.cmp(bus, addr_result),
            0xE0 | 0xE4 | 0xEC => self.cpx(bus, addr_result),
            0xC0 | 0xC4 | 0xCC => self.cpy(bus, addr_result),

            // Branches (report their own extra cycles)
            0x90 => return self.bcc(addr_result),
            0xB0 => return self.bcs(addr_result),
            0xF0 => return self.beq(addr_result),
            0x30 => return self.bmi(addr_result),
            0xD0 => return self.bne(addr_result),
            0x10 => return self.bpl(addr_result),
            0x50 => return self.bvc(addr_result),
            0x70 => return self.bvs(addr_result),

            // Jumps and subroutines
            0x4C | 0x6C => self.jmp(addr_result),
            0x20 => self.jsr(bus, addr_result),
            0x60 => self.rts(bus),

            // Stack
            0x48 => self.pha(bus),
            0x68 => self.pla(bus),
            0x08 => self.php(bus),
            0x28 => self.plp(bus),
            0x9A => self.txs(),
            0xBA => self.tsx(),

            // Transfer
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0x8A => self.txa(),
            0x98 => self.tya(),

            // Flag operations
            0x18 => self.clc(),
            0xD8 => self.cld(),
            0x58 => self.cli(),
            0xB8 => self.clv(),
            0x38 => self.sec(),
            0xF8 => self.sed(),
            0x78 => self.sei(),

            // Miscellaneous
            0x00 => self.brk(bus),
            0x40 => self.rti(bus),
            0xEA => self.nop(),

            // Unreachable: illegal bytes were filtered before dispatch
            _ => {}
        }

        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bus with `program` at $8000 and the reset vector pointing there
    fn program_bus(program: &[u8]) -> Bus {
        Bus::with_test_program(program, 0x8000)
    }

    fn ready_cpu(bus: &mut Bus) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.reset(bus);
        cpu
    }

    #[test]
    fn test_lda_immediate_timing_and_flags() {
        let mut bus = program_bus(&[0xA9, 0x42]);
        let mut cpu = ready_cpu(&mut bus);

        let elapsed = cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x42);
        assert!(!cpu.get_flag(crate::cpu::flags::ZERO));
        assert!(!cpu.get_flag(crate::cpu::flags::NEGATIVE));
        assert_eq!(elapsed, 2);
    }

    #[test]
    fn test_page_cross_penalty_applies_to_reads() {
        // LDA $80FF,X with X=1 crosses into $8100
        let mut bus = program_bus(&[0xBD, 0xFF, 0x80]);
        let mut cpu = ready_cpu(&mut bus);
        cpu.x = 1;
        assert_eq!(cpu.step(&mut bus), 5, "4 + 1 page-cross cycle");

        // Same access without the cross
        let mut bus = program_bus(&[0xBD, 0x00, 0x81]);
        let mut cpu = ready_cpu(&mut bus);
        cpu.x = 1;
        assert_eq!(cpu.step(&mut bus), 4);
    }

    #[test]
    fn test_page_cross_penalty_not_applied_to_stores() {
        // STA $01FF,X with X=1: store to RAM across a page
        let mut bus = program_bus(&[0x9D, 0xFF, 0x01]);
        let mut cpu = ready_cpu(&mut bus);
        cpu.x = 1;
        cpu.a = 0x55;
        assert_eq!(cpu.step(&mut bus), 5, "stores always cost their base");
        assert_eq!(bus.read(0x0200), 0x55);
    }

    #[test]
    fn test_illegal_opcode_parks_the_cpu() {
        let mut bus = program_bus(&[0x02]);
        let mut cpu = ready_cpu(&mut bus);

        let elapsed = cpu.step(&mut bus);
        assert_eq!(elapsed, 2);
        assert_eq!(
            cpu.fault(),
            Some(Fault::IllegalOpcode {
                pc: 0x8000,
                opcode: 0x02
            })
        );
        assert_eq!(cpu.pc, 0x8000, "PC stays on the offending byte");

        // Subsequent steps burn cycles without moving
        let pc = cpu.pc;
        assert_eq!(cpu.step(&mut bus), 2);
        assert_eq!(cpu.pc, pc);
    }

    #[test]
    fn test_cycle_counter_accumulates() {
        let mut bus = program_bus(&[0xA9, 0x01, 0xEA, 0xEA]);
        let mut cpu = ready_cpu(&mut bus);
        let start = cpu.cycles;

        let mut elapsed = 0u64;
        for _ in 0..3 {
            elapsed += cpu.step(&mut bus) as u64;
        }
        assert_eq!(cpu.cycles - start, elapsed, "counter matches step sums");
        assert_eq!(elapsed, 6);
    }
}
