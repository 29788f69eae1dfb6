// Shared helpers for facade-level integration tests
//
// Every test here builds its ROM image in memory, so the suite runs with no
// external files.

#![allow(dead_code)]

use famicore::{Emulator, EmulatorConfig, StepEvent};

/// Builder for minimal iNES images
pub struct RomBuilder {
    prg: Vec<u8>,
    chr_banks: u8,
    mapper: u8,
    flags6_low: u8,
}

impl RomBuilder {
    /// Start an image with `prg_banks` zeroed 16 KiB PRG banks and CHR-RAM
    pub fn new(prg_banks: u8) -> Self {
        RomBuilder {
            prg: vec![0; prg_banks as usize * 16 * 1024],
            chr_banks: 0,
            mapper: 0,
            flags6_low: 0,
        }
    }

    /// Select the mapper number
    pub fn mapper(mut self, mapper: u8) -> Self {
        self.mapper = mapper;
        self
    }

    /// Declare vertical mirroring
    pub fn vertical(mut self) -> Self {
        self.flags6_low |= 0x01;
        self
    }

    /// Declare battery-backed PRG-RAM
    pub fn battery(mut self) -> Self {
        self.flags6_low |= 0x02;
        self
    }

    /// Write bytes at a raw PRG offset
    pub fn prg_at(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.prg[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Write bytes at a CPU address, assuming the flat $8000 mapping of a
    /// 32 KiB image
    pub fn code(self, cpu_addr: u16, bytes: &[u8]) -> Self {
        let offset = (cpu_addr as usize) - 0x8000;
        self.prg_at(offset, bytes)
    }

    /// Point the reset vector (last bank, so valid for every mapper whose
    /// tail is fixed) at `addr`
    pub fn reset_vector(self, addr: u16) -> Self {
        let offset = self.prg.len() - 4;
        self.prg_at(offset, &[addr as u8, (addr >> 8) as u8])
    }

    /// Point the NMI vector at `addr`
    pub fn nmi_vector(self, addr: u16) -> Self {
        let offset = self.prg.len() - 6;
        self.prg_at(offset, &[addr as u8, (addr >> 8) as u8])
    }

    /// Assemble the iNES image
    pub fn build(self) -> Vec<u8> {
        let mut image = vec![0u8; 16];
        image[0..4].copy_from_slice(b"NES\x1A");
        image[4] = (self.prg.len() / (16 * 1024)) as u8;
        image[5] = self.chr_banks;
        image[6] = (self.mapper << 4) | self.flags6_low;
        image[7] = self.mapper & 0xF0;
        image.extend(self.prg);
        image
    }
}

/// Route `log` output through env_logger when RUST_LOG asks for it
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Configuration with a zeroed power-on palette for reproducible frames
pub fn deterministic_config() -> EmulatorConfig {
    let mut config = EmulatorConfig::default();
    config.video.palette_noise_seed = None;
    config
}

/// Run until `frames` complete frames have been produced and consumed
pub fn run_frames(emulator: &mut Emulator, frames: u32) {
    for _ in 0..frames {
        loop {
            match emulator.step() {
                StepEvent::FrameReady => {
                    emulator.take_frame();
                    break;
                }
                StepEvent::AudioBufferReady => {
                    emulator.drain_audio();
                }
            }
        }
    }
}
