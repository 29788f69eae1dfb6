//! 6502 disassembler over the opcode descriptor table

use crate::bus::Bus;
use crate::cpu::addressing::AddressingMode;
use crate::cpu::opcodes::OPCODE_TABLE;

/// One decoded instruction
#[derive(Debug, Clone)]
pub struct DisassembledInstruction {
    /// Address of the opcode byte
    pub address: u16,
    /// The opcode byte
    pub opcode: u8,
    /// Mnemonic ("LDA", "JMP", ... or "XXX")
    pub mnemonic: &'static str,
    /// Addressing mode
    pub mode: AddressingMode,
    /// Operand bytes (zero to two)
    pub operands: Vec<u8>,
    /// Total length in bytes
    pub length: u8,
}

impl DisassembledInstruction {
    /// Render as assembly source, e.g. `LDA #$42` or `JMP $8000`
    pub fn format_assembly(&self) -> String {
        let operand = |i: usize| self.operands.get(i).copied().unwrap_or(0);
        let word = ((operand(1) as u16) << 8) | operand(0) as u16;

        match self.mode {
            AddressingMode::Implied => self.mnemonic.to_string(),
            AddressingMode::Accumulator => format!("{} A", self.mnemonic),
            AddressingMode::Immediate => format!("{} #${:02X}", self.mnemonic, operand(0)),
            AddressingMode::ZeroPage => format!("{} ${:02X}", self.mnemonic, operand(0)),
            AddressingMode::ZeroPageX => format!("{} ${:02X},X", self.mnemonic, operand(0)),
            AddressingMode::ZeroPageY => format!("{} ${:02X},Y", self.mnemonic, operand(0)),
            AddressingMode::Relative => {
                // Branch targets print resolved, the way trace logs do
                let target = self
                    .address
                    .wrapping_add(2)
                    .wrapping_add(operand(0) as i8 as u16);
                format!("{} ${:04X}", self.mnemonic, target)
            }
            AddressingMode::Absolute => format!("{} ${:04X}", self.mnemonic, word),
            AddressingMode::AbsoluteX => format!("{} ${:04X},X", self.mnemonic, word),
            AddressingMode::AbsoluteY => format!("{} ${:04X},Y", self.mnemonic, word),
            AddressingMode::Indirect => format!("{} (${:04X})", self.mnemonic, word),
            AddressingMode::IndexedIndirect => {
                format!("{} (${:02X},X)", self.mnemonic, operand(0))
            }
            AddressingMode::IndirectIndexed => {
                format!("{} (${:02X}),Y", self.mnemonic, operand(0))
            }
        }
    }

    /// Raw bytes as hex, e.g. `A9 42`
    pub fn format_bytes(&self) -> String {
        let mut out = format!("{:02X}", self.opcode);
        for byte in &self.operands {
            out.push_str(&format!(" {:02X}", byte));
        }
        out
    }
}

/// Decode the instruction at `address`
pub fn disassemble_instruction(bus: &mut Bus, address: u16) -> DisassembledInstruction {
    let opcode = bus.read(address);
    let info = &OPCODE_TABLE[opcode as usize];

    let length = info.length();
    let operands = (1..length)
        .map(|i| bus.read(address.wrapping_add(i as u16)))
        .collect();

    DisassembledInstruction {
        address,
        opcode,
        mnemonic: info.mnemonic,
        mode: info.mode,
        operands,
        length,
    }
}

/// Decode `count` consecutive instructions starting at `address`
pub fn disassemble_range(bus: &mut Bus, address: u16, count: usize) -> Vec<DisassembledInstruction> {
    let mut out = Vec::with_capacity(count);
    let mut pc = address;
    for _ in 0..count {
        let instruction = disassemble_instruction(bus, pc);
        pc = pc.wrapping_add(instruction.length as u16);
        out.push(instruction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_common_forms() {
        let mut bus = Bus::with_test_program(
            &[0xA9, 0x42, 0x8D, 0x00, 0x20, 0xD0, 0xFE, 0xEA, 0x0A],
            0x8000,
        );

        let listing = disassemble_range(&mut bus, 0x8000, 5);
        assert_eq!(listing[0].format_assembly(), "LDA #$42");
        assert_eq!(listing[1].format_assembly(), "STA $2000");
        assert_eq!(listing[2].format_assembly(), "BNE $8005", "resolved target");
        assert_eq!(listing[3].format_assembly(), "NOP");
        assert_eq!(listing[4].format_assembly(), "ASL A");
    }

    #[test]
    fn test_disassemble_indexed_forms() {
        let mut bus =
            Bus::with_test_program(&[0xB1, 0x40, 0xA1, 0x40, 0x6C, 0xFC, 0xFF], 0x8000);

        let listing = disassemble_range(&mut bus, 0x8000, 3);
        assert_eq!(listing[0].format_assembly(), "LDA ($40),Y");
        assert_eq!(listing[1].format_assembly(), "LDA ($40,X)");
        assert_eq!(listing[2].format_assembly(), "JMP ($FFFC)");
    }

    #[test]
    fn test_byte_formatting_and_lengths() {
        let mut bus = Bus::with_test_program(&[0x8D, 0x34, 0x12], 0x8000);
        let instruction = disassemble_instruction(&mut bus, 0x8000);
        assert_eq!(instruction.format_bytes(), "8D 34 12");
        assert_eq!(instruction.length, 3);
    }

    #[test]
    fn test_illegal_bytes_decode_as_sentinel() {
        let mut bus = Bus::with_test_program(&[0x02], 0x8000);
        let instruction = disassemble_instruction(&mut bus, 0x8000);
        assert_eq!(instruction.mnemonic, "XXX");
        assert_eq!(instruction.length, 1);
    }
}
