//! CPU execution trace formatting
//!
//! Produces the classic one-line-per-instruction log format used by 6502
//! golden logs: address, raw bytes, disassembly and the register file.

use super::disassembler::disassemble_instruction;
use crate::bus::Bus;
use crate::cpu::Cpu;

/// Format the instruction the CPU is about to execute as a trace line
///
/// ```text
/// C000  4C F5 C5  JMP $C5F5     A:00 X:00 Y:00 P:24 SP:FD CYC:7
/// ```
pub fn trace_line(cpu: &Cpu, bus: &mut Bus) -> String {
    let instruction = disassemble_instruction(bus, cpu.pc);

    format!(
        "{:04X}  {:<8}  {:<14}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        cpu.pc,
        instruction.format_bytes(),
        instruction.format_assembly(),
        cpu.a,
        cpu.x,
        cpu.y,
        cpu.status,
        cpu.sp,
        cpu.cycles,
    )
}
