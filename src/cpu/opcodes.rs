// Opcode descriptor table for the official 6502 instruction set
//
// A 256-entry lookup maps every opcode byte to its mnemonic, addressing
// mode, base cycle count and whether indexing page-crosses add a cycle.
// Bytes outside the official set resolve to the "XXX" sentinel; fetching
// one parks the CPU with an illegal-opcode diagnostic.

use super::addressing::AddressingMode;

/// Descriptor of one opcode
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    /// Three-letter mnemonic, or "XXX" for unofficial bytes
    pub mnemonic: &'static str,
    /// Addressing mode
    pub mode: AddressingMode,
    /// Base cycle count
    pub cycles: u8,
    /// Reads add one cycle when the indexed access crosses a page
    pub page_cycle: bool,
}

impl OpcodeInfo {
    /// Whether this entry is the illegal-opcode sentinel
    pub fn is_illegal(&self) -> bool {
        self.mnemonic == "XXX"
    }

    /// Instruction length in bytes (opcode plus operands)
    pub fn length(&self) -> u8 {
        match self.mode {
            AddressingMode::Implied | AddressingMode::Accumulator => 1,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed => 2,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 3,
        }
    }
}

const fn op(mnemonic: &'static str, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        cycles,
        page_cycle: false,
    }
}

const fn op_page(mnemonic: &'static str, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        cycles,
        page_cycle: true,
    }
}

/// The illegal-opcode sentinel
const XXX: OpcodeInfo = op("XXX", AddressingMode::Implied, 2);

const fn build_table() -> [OpcodeInfo; 256] {
    use AddressingMode::*;

    let mut t = [XXX; 256];

    // Load
    t[0xA9] = op("LDA", Immediate, 2);
    t[0xA5] = op("LDA", ZeroPage, 3);
    t[0xB5] = op("LDA", ZeroPageX, 4);
    t[0xAD] = op("LDA", Absolute, 4);
    t[0xBD] = op_page("LDA", AbsoluteX, 4);
    t[0xB9] = op_page("LDA", AbsoluteY, 4);
    t[0xA1] = op("LDA", IndexedIndirect, 6);
    t[0xB1] = op_page("LDA", IndirectIndexed, 5);

    t[0xA2] = op("LDX", Immediate, 2);
    t[0xA6] = op("LDX", ZeroPage, 3);
    t[0xB6] = op("LDX", ZeroPageY, 4);
    t[0xAE] = op("LDX", Absolute, 4);
    t[0xBE] = op_page("LDX", AbsoluteY, 4);

    t[0xA0] = op("LDY", Immediate, 2);
    t[0xA4] = op("LDY", ZeroPage, 3);
    t[0xB4] = op("LDY", ZeroPageX, 4);
    t[0xAC] = op("LDY", Absolute, 4);
    t[0xBC] = op_page("LDY", AbsoluteX, 4);

    // Store (indexed stores always pay the extra cycle: it is in the base)
    t[0x85] = op("STA", ZeroPage, 3);
    t[0x95] = op("STA", ZeroPageX, 4);
    t[0x8D] = op("STA", Absolute, 4);
    t[0x9D] = op("STA", AbsoluteX, 5);
    t[0x99] = op("STA", AbsoluteY, 5);
    t[0x81] = op("STA", IndexedIndirect, 6);
    t[0x91] = op("STA", IndirectIndexed, 6);

    t[0x86] = op("STX", ZeroPage, 3);
    t[0x96] = op("STX", ZeroPageY, 4);
    t[0x8E] = op("STX", Absolute, 4);

    t[0x84] = op("STY", ZeroPage, 3);
    t[0x94] = op("STY", ZeroPageX, 4);
    t[0x8C] = op("STY", Absolute, 4);

    // Transfer
    t[0xAA] = op("TAX", Implied, 2);
    t[0xA8] = op("TAY", Implied, 2);
    t[0xBA] = op("TSX", Implied, 2);
    t[0x8A] = op("TXA", Implied, 2);
    t[0x9A] = op("TXS", Implied, 2);
    t[0x98] = op("TYA", Implied, 2);

    // Stack
    t[0x48] = op("PHA", Implied, 3);
    t[0x08] = op("PHP", Implied, 3);
    t[0x68] = op("PLA", Implied, 4);
    t[0x28] = op("PLP", Implied, 4);

    // Logic
    t[0x29] = op("AND", Immediate, 2);
    t[0x25] = op("AND", ZeroPage, 3);
    t[0x35] = op("AND", ZeroPageX, 4);
    t[0x2D] = op("AND", Absolute, 4);
    t[0x3D] = op_page("AND", AbsoluteX, 4);
    t[0x39] = op_page("AND", AbsoluteY, 4);
    t[0x21] = op("AND", IndexedIndirect, 6);
    t[0x31] = op_page("AND", IndirectIndexed, 5);

    t[0x49] = op("EOR", Immediate, 2);
    t[0x45] = op("EOR", ZeroPage, 3);
    t[0x55] = op("EOR", ZeroPageX, 4);
    t[0x4D] = op("EOR", Absolute, 4);
    t[0x5D] = op_page("EOR", AbsoluteX, 4);
    t[0x59] = op_page("EOR", AbsoluteY, 4);
    t[0x41] = op("EOR", IndexedIndirect, 6);
    t[0x51] = op_page("EOR", IndirectIndexed, 5);

    t[0x09] = op("ORA", Immediate, 2);
    t[0x05] = op("ORA", ZeroPage, 3);
    t[0x15] = op("ORA", ZeroPageX, 4);
    t[0x0D] = op("ORA", Absolute, 4);
    t[0x1D] = op_page("ORA", AbsoluteX, 4);
    t[0x19] = op_page("ORA", AbsoluteY, 4);
    t[0x01] = op("ORA", IndexedIndirect, 6);
    t[0x11] = op_page("ORA", IndirectIndexed, 5);

    t[0x24] = op("BIT", ZeroPage, 3);
    t[0x2C] = op("BIT", Absolute, 4);

    // Arithmetic
    t[0x69] = op("ADC", Immediate, 2);
    t[0x65] = op("ADC", ZeroPage, 3);
    t[0x75] = op("ADC", ZeroPageX, 4);
    t[0x6D] = op("ADC", Absolute, 4);
    t[0x7D] = op_page("ADC", AbsoluteX, 4);
    t[0x79] = op_page("ADC", AbsoluteY, 4);
    t[0x61] = op("ADC", IndexedIndirect, 6);
    t[0x71] = op_page("ADC", IndirectIndexed, 5);

    t[0xE9] = op("SBC", Immediate, 2);
    t[0xE5] = op("SBC", ZeroPage, 3);
    t[0xF5] = op("SBC", ZeroPageX, 4);
    t[0xED] = op("SBC", Absolute, 4);
    t[0xFD] = op_page("SBC", AbsoluteX, 4);
    t[0xF9] = op_page("SBC", AbsoluteY, 4);
    t[0xE1] = op("SBC", IndexedIndirect, 6);
    t[0xF1] = op_page("SBC", IndirectIndexed, 5);

    // Compare
    t[0xC9] = op("CMP", Immediate, 2);
    t[0xC5] = op("CMP", ZeroPage, 3);
    t[0xD5] = op("CMP", ZeroPageX, 4);
    t[0xCD] = op("CMP", Absolute, 4);
    t[0xDD] = op_page("CMP", AbsoluteX, 4);
    t[0xD9] = op_page("CMP", AbsoluteY, 4);
    t[0xC1] = op("CMP", IndexedIndirect, 6);
    t[0xD1] = op_page("CMP", IndirectIndexed, 5);

    t[0xE0] = op("CPX", Immediate, 2);
    t[0xE4] = op("CPX", ZeroPage, 3);
    t[0xEC] = op("CPX", Absolute, 4);

    t[0xC0] = op("CPY", Immediate, 2);
    t[0xC4] = op("CPY", ZeroPage, 3);
    t[0xCC] = op("CPY", Absolute, 4);

    // Increment / decrement (read-modify-write pays in the base cost)
    t[0xE6] = op("INC", ZeroPage, 5);
    t[0xF6] = op("INC", ZeroPageX, 6);
    t[0xEE] = op("INC", Absolute, 6);
    t[0xFE] = op("INC", AbsoluteX, 7);
    t[0xE8] = op("INX", Implied, 2);
    t[0xC8] = op("INY", Implied, 2);

    t[0xC6] = op("DEC", ZeroPage, 5);
    t[0xD6] = op("DEC", ZeroPageX, 6);
    t[0xCE] = op("DEC", Absolute, 6);
    t[0xDE] = op("DEC", AbsoluteX, 7);
    t[0xCA] = op("DEX", Implied, 2);
    t[0x88] = op("DEY", Implied, 2);

    // Shifts / rotates
    t[0x0A] = op("ASL", Accumulator, 2);
    t[0x06] = op("ASL", ZeroPage, 5);
    t[0x16] = op("ASL", ZeroPageX, 6);
    t[0x0E] = op("ASL", Absolute, 6);
    t[0x1E] = op("ASL", AbsoluteX, 7);

    t[0x4A] = op("LSR", Accumulator, 2);
    t[0x46] = op("LSR", ZeroPage, 5);
    t[0x56] = op("LSR", ZeroPageX, 6);
    t[0x4E] = op("LSR", Absolute, 6);
    t[0x5E] = op("LSR", AbsoluteX, 7);

    t[0x2A] = op("ROL", Accumulator, 2);
    t[0x26] = op("ROL", ZeroPage, 5);
    t[0x36] = op("ROL", ZeroPageX, 6);
    t[0x2E] = op("ROL", Absolute, 6);
    t[0x3E] = op("ROL", AbsoluteX, 7);

    t[0x6A] = op("ROR", Accumulator, 2);
    t[0x66] = op("ROR", ZeroPage, 5);
    t[0x76] = op("ROR", ZeroPageX, 6);
    t[0x6E] = op("ROR", Absolute, 6);
    t[0x7E] = op("ROR", AbsoluteX, 7);

    // Jumps and subroutines
    t[0x4C] = op("JMP", Absolute, 3);
    t[0x6C] = op("JMP", Indirect, 5);
    t[0x20] = op("JSR", Absolute, 6);
    t[0x60] = op("RTS", Implied, 6);
    t[0x40] = op("RTI", Implied, 6);

    // Branches: base 2, +1 taken, +1 more on page cross (handled inline)
    t[0x90] = op("BCC", Relative, 2);
    t[0xB0] = op("BCS", Relative, 2);
    t[0xF0] = op("BEQ", Relative, 2);
    t[0x30] = op("BMI", Relative, 2);
    t[0xD0] = op("BNE", Relative, 2);
    t[0x10] = op("BPL", Relative, 2);
    t[0x50] = op("BVC", Relative, 2);
    t[0x70] = op("BVS", Relative, 2);

    // Flag operations
    t[0x18] = op("CLC", Implied, 2);
    t[0xD8] = op("CLD", Implied, 2);
    t[0x58] = op("CLI", Implied, 2);
    t[0xB8] = op("CLV", Implied, 2);
    t[0x38] = op("SEC", Implied, 2);
    t[0xF8] = op("SED", Implied, 2);
    t[0x78] = op("SEI", Implied, 2);

    // Miscellaneous
    t[0xEA] = op("NOP", Implied, 2);
    t[0x00] = op("BRK", Implied, 7);

    t
}

/// Opcode byte to descriptor lookup
pub static OPCODE_TABLE: [OpcodeInfo; 256] = build_table();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_opcode_count() {
        let legal = OPCODE_TABLE.iter().filter(|i| !i.is_illegal()).count();
        assert_eq!(legal, 151, "the official set has 151 opcodes");
    }

    #[test]
    fn test_sentinel_fills_the_gaps() {
        assert!(OPCODE_TABLE[0x02].is_illegal(), "$02 is a jam opcode");
        assert!(OPCODE_TABLE[0xFF].is_illegal(), "$FF is unofficial");
        assert!(!OPCODE_TABLE[0xEA].is_illegal(), "NOP is official");
    }

    #[test]
    fn test_representative_entries() {
        let lda_imm = &OPCODE_TABLE[0xA9];
        assert_eq!(lda_imm.mnemonic, "LDA");
        assert_eq!(lda_imm.cycles, 2);
        assert!(!lda_imm.page_cycle);
        assert_eq!(lda_imm.length(), 2);

        let lda_abs_x = &OPCODE_TABLE[0xBD];
        assert!(lda_abs_x.page_cycle, "indexed loads pay on page cross");
        assert_eq!(lda_abs_x.length(), 3);

        let sta_abs_x = &OPCODE_TABLE[0x9D];
        assert_eq!(sta_abs_x.cycles, 5, "stores bake the penalty in");
        assert!(!sta_abs_x.page_cycle);

        let brk = &OPCODE_TABLE[0x00];
        assert_eq!(brk.cycles, 7);
    }
}
