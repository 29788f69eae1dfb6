//! Debugging helpers: 6502 disassembly and CPU execution tracing

mod disassembler;
mod trace;

pub use disassembler::{disassemble_instruction, disassemble_range, DisassembledInstruction};
pub use trace::trace_line;
