// Save state functionality
//
// A save state is a versioned JSON snapshot of every piece of mutable
// machine state: CPU register file, internal RAM, PPU, APU, controller
// latches, and the mapper's registers and RAM-backed memories. The frame
// buffer and audio buffers are transient and re-render within a frame of
// restoring.

use std::io;

use serde::{Deserialize, Serialize};

use crate::apu::Apu;
use crate::cartridge::MapperState;
use crate::cpu::Cpu;
use crate::input::ControllerPorts;
use crate::ppu::Ppu;

/// Current save state format version
const SAVE_STATE_VERSION: u32 = 1;

/// Errors from capturing or restoring save states
#[derive(Debug)]
pub enum SaveStateError {
    /// I/O error while reading or writing a state file
    Io(io::Error),
    /// JSON encode/decode error
    Serialization(serde_json::Error),
    /// The snapshot was written by an incompatible core version
    VersionMismatch { expected: u32, found: u32 },
}

impl std::fmt::Display for SaveStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStateError::Io(error) => write!(f, "I/O error: {}", error),
            SaveStateError::Serialization(error) => {
                write!(f, "serialization error: {}", error)
            }
            SaveStateError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "save state version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveStateError {}

impl From<io::Error> for SaveStateError {
    fn from(error: io::Error) -> Self {
        SaveStateError::Io(error)
    }
}

impl From<serde_json::Error> for SaveStateError {
    fn from(error: serde_json::Error) -> Self {
        SaveStateError::Serialization(error)
    }
}

/// Complete machine snapshot
#[derive(Serialize, Deserialize)]
pub struct SaveState {
    /// Format version for compatibility checking
    version: u32,

    /// CPU register file and fault state
    pub(crate) cpu: Cpu,

    /// 2 KiB internal RAM
    pub(crate) ram: Vec<u8>,

    /// Full PPU state (frame buffer excluded, it re-renders)
    pub(crate) ppu: Ppu,

    /// Full APU state
    pub(crate) apu: Apu,

    /// Controller latches and shift registers
    pub(crate) controllers: ControllerPorts,

    /// Mapper registers plus PRG/CHR RAM contents
    pub(crate) mapper: MapperState,
}

impl SaveState {
    /// Assemble a snapshot from the machine's parts
    pub(crate) fn capture(
        cpu: &Cpu,
        ram: &[u8],
        ppu: &Ppu,
        apu: &Apu,
        controllers: &ControllerPorts,
        mapper: MapperState,
    ) -> Self {
        SaveState {
            version: SAVE_STATE_VERSION,
            cpu: cpu.clone(),
            ram: ram.to_vec(),
            ppu: ppu.clone(),
            apu: apu.clone(),
            controllers: *controllers,
            mapper,
        }
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveStateError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from JSON bytes, checking the version field
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SaveStateError> {
        let state: SaveState = serde_json::from_slice(bytes)?;
        if state.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: state.version,
            });
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_byte_roundtrip() {
        let cpu = Cpu::new();
        let ppu = Ppu::new();
        let apu = Apu::new();
        let controllers = ControllerPorts::new();
        let mapper = MapperState {
            registers: vec![1, 2, 3],
            prg_ram: Some(vec![0xAA; 16]),
            chr_ram: None,
            mirroring: crate::cartridge::Mirroring::Vertical,
        };

        let state = SaveState::capture(&cpu, &[0x55; 2048], &ppu, &apu, &controllers, mapper);
        let bytes = state.to_bytes().unwrap();
        let restored = SaveState::from_bytes(&bytes).unwrap();

        assert_eq!(restored.cpu.sp, 0xFD);
        assert_eq!(restored.ram.len(), 2048);
        assert_eq!(restored.ram[0], 0x55);
        assert_eq!(restored.mapper.registers, vec![1, 2, 3]);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let cpu = Cpu::new();
        let ppu = Ppu::new();
        let apu = Apu::new();
        let controllers = ControllerPorts::new();
        let mapper = MapperState {
            registers: Vec::new(),
            prg_ram: None,
            chr_ram: None,
            mirroring: crate::cartridge::Mirroring::Horizontal,
        };

        let mut state = SaveState::capture(&cpu, &[0; 2048], &ppu, &apu, &controllers, mapper);
        state.version = 99;
        let bytes = state.to_bytes().unwrap();

        assert!(matches!(
            SaveState::from_bytes(&bytes),
            Err(SaveStateError::VersionMismatch {
                expected: 1,
                found: 99
            })
        ));
    }

    #[test]
    fn test_garbage_bytes_are_a_serialization_error() {
        assert!(matches!(
            SaveState::from_bytes(b"definitely not json"),
            Err(SaveStateError::Serialization(_))
        ));
    }
}
