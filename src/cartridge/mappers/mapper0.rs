// Mapper 0 (NROM) - no bank switching at all
//
// Memory layout:
// - CPU $8000-$BFFF: first 16 KiB of PRG-ROM
// - CPU $C000-$FFFF: last 16 KiB of PRG-ROM (mirror of the first for 16 KiB ROMs)
// - PPU $0000-$1FFF: 8 KiB CHR-ROM or CHR-RAM
//
// NROM-128 carries one PRG bank and sees it twice; NROM-256 carries two.

use crate::cartridge::{ChrMemory, INesHeader, Mapper, MapperState, Mirroring};

/// Mapper 0 implementation (NROM)
///
/// Used by the earliest cartridges (Super Mario Bros., Donkey Kong, Balloon
/// Fight). The mapper is stateless: address decoding alone.
pub struct Mapper0 {
    /// PRG-ROM data (16 or 32 KiB)
    prg_rom: Vec<u8>,
    /// CHR-ROM or CHR-RAM data (8 KiB)
    chr: Vec<u8>,
    /// Whether CHR memory accepts writes
    chr_is_ram: bool,
    /// Fixed nametable arrangement from the header
    mirroring: Mirroring,
}

impl Mapper0 {
    pub fn new(header: &INesHeader, prg_rom: Vec<u8>, chr: ChrMemory) -> Self {
        let chr_is_ram = chr.is_ram();
        Mapper0 {
            prg_rom,
            chr: match chr {
                ChrMemory::Rom(data) | ChrMemory::Ram(data) => data,
            },
            chr_is_ram,
            mirroring: header.mirroring,
        }
    }
}

impl Mapper for Mapper0 {
    fn reset(&mut self) {
        // No registers to clear
    }

    fn cpu_read(&self, address: u16) -> Option<u8> {
        match address {
            // Modulo folds $C000-$FFFF onto the single bank of 16 KiB ROMs
            0x8000..=0xFFFF => {
                let index = (address - 0x8000) as usize;
                Some(self.prg_rom[index % self.prg_rom.len()])
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, _address: u16, _value: u8) -> bool {
        // No registers, no PRG-RAM: every write falls through
        false
    }

    fn ppu_read(&mut self, address: u16, _dot: u16) -> u8 {
        self.chr[(address as usize) & 0x1FFF]
    }

    fn ppu_write(&mut self, address: u16, value: u8, _dot: u16) {
        if self.chr_is_ram {
            self.chr[(address as usize) & 0x1FFF] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn save_state(&self) -> MapperState {
        MapperState {
            registers: Vec::new(),
            prg_ram: None,
            chr_ram: self.chr_is_ram.then(|| self.chr.clone()),
            mirroring: self.mirroring,
        }
    }

    fn load_state(&mut self, state: &MapperState) {
        if let Some(ref chr_ram) = state.chr_ram {
            if self.chr_is_ram && chr_ram.len() == self.chr.len() {
                self.chr.copy_from_slice(chr_ram);
            }
        }
    }

    fn patch_prg(&mut self, address: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let index =
                (address.wrapping_add(i as u16).wrapping_sub(0x8000)) as usize % self.prg_rom.len();
            self.prg_rom[index] = byte;
        }
    }
}
