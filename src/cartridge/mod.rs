// Cartridge module - iNES container parsing and the mapper interface
//
// A cartridge couples program memory (PRG-ROM, optional PRG-RAM) and pattern
// memory (CHR-ROM or CHR-RAM) to the console through a mapper: the bank
// switching logic that decides which physical bytes answer a given bus
// address. The `Cartridge` type owns the parsed header plus a boxed `Mapper`
// and is the single entry point the bus and the PPU talk to.
//
// # iNES 1.0 container layout
//
// ```text
// offset  size  contents
// 0       4     magic "NES\x1A"
// 4       1     PRG-ROM banks (x 16 KiB)
// 5       1     CHR-ROM banks (x 8 KiB, 0 = cartridge has CHR-RAM)
// 6       1     flags 6: mirroring, battery, trainer, four-screen, mapper low
// 7       1     flags 7: Vs/PlayChoice bits, NES 2.0 marker, mapper high
// 8       1     PRG-RAM banks (x 8 KiB, 0 treated as 1)
// 9       1     TV system
// 10      6     padding
// 16      ...   PRG-ROM data, then CHR-ROM data
// ```
//
// Trainer images, NES 2.0 headers, Vs.System and PlayChoice-10 dumps are
// rejected at load time.

pub mod mappers;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use mappers::create_mapper;

/// PRG-ROM bank granularity in the iNES header (16 KiB)
pub const PRG_BANK_SIZE: usize = 16 * 1024;

/// CHR bank granularity in the iNES header (8 KiB)
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// PRG-RAM bank granularity in the iNES header (8 KiB)
pub const PRG_RAM_BANK_SIZE: usize = 8 * 1024;

/// Nametable arrangement exposed by the cartridge
///
/// MMC1 and MMC3 re-point this at run time; the other mappers keep whatever
/// the header declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirroring {
    /// $2000=$2400 and $2800=$2C00 (scrolls vertically)
    Horizontal,
    /// $2000=$2800 and $2400=$2C00 (scrolls horizontally)
    Vertical,
    /// Every nametable maps to the first 1 KiB of VRAM
    SingleScreenLow,
    /// Every nametable maps to the second 1 KiB of VRAM
    SingleScreenHigh,
    /// Four independent nametables (cartridge supplies the extra VRAM)
    FourScreen,
}

/// Errors surfaced while loading a ROM image
///
/// All of these are fatal: a cartridge either loads completely or not at all.
#[derive(Debug)]
pub enum CartridgeError {
    /// The 16-byte header is missing or the magic bytes are wrong
    InvalidHeader,
    /// The image uses a container feature this core does not run
    /// (trainer, NES 2.0 header, Vs.System, PlayChoice-10)
    UnsupportedFeature(&'static str),
    /// The mapper number has no implementation here
    UnsupportedMapper(u8),
    /// The header promises more PRG/CHR data than the image contains
    RomTruncated { expected: usize, actual: usize },
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::InvalidHeader => write!(f, "not an iNES image"),
            CartridgeError::UnsupportedFeature(what) => {
                write!(f, "unsupported container feature: {}", what)
            }
            CartridgeError::UnsupportedMapper(num) => {
                write!(f, "mapper {} is not supported", num)
            }
            CartridgeError::RomTruncated { expected, actual } => {
                write!(
                    f,
                    "ROM image truncated: header promises {} bytes, image has {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for CartridgeError {}

/// Parsed iNES 1.0 header
#[derive(Debug, Clone, Copy)]
pub struct INesHeader {
    /// Number of 16 KiB PRG-ROM banks
    pub prg_banks: u8,
    /// Number of 8 KiB CHR-ROM banks (0 means the cartridge carries CHR-RAM)
    pub chr_banks: u8,
    /// Mapper number assembled from flags 6/7
    pub mapper: u8,
    /// Nametable arrangement declared by flags 6
    pub mirroring: Mirroring,
    /// Battery-backed PRG-RAM present (flags 6 bit 1)
    pub battery: bool,
    /// Number of 8 KiB PRG-RAM banks (flags 8, 0 treated as 1)
    pub prg_ram_banks: u8,
}

impl INesHeader {
    /// Parse the 16-byte header, rejecting every container feature the core
    /// does not run.
    pub fn parse(bytes: &[u8]) -> Result<Self, CartridgeError> {
        if bytes.len() < 16 || &bytes[0..4] != b"NES\x1A" {
            return Err(CartridgeError::InvalidHeader);
        }

        if bytes[4] == 0 {
            // No PRG-ROM means nothing to execute
            return Err(CartridgeError::InvalidHeader);
        }

        let flags6 = bytes[6];
        let flags7 = bytes[7];

        if flags6 & 0x04 != 0 {
            return Err(CartridgeError::UnsupportedFeature("trainer"));
        }
        if flags7 & 0x0C != 0 {
            // Anything but 0 in bits 2-3 marks NES 2.0 or an archaic dump
            return Err(CartridgeError::UnsupportedFeature("NES 2.0 header"));
        }
        if flags7 & 0x01 != 0 {
            return Err(CartridgeError::UnsupportedFeature("Vs.System"));
        }
        if flags7 & 0x02 != 0 {
            return Err(CartridgeError::UnsupportedFeature("PlayChoice-10"));
        }

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(INesHeader {
            prg_banks: bytes[4],
            chr_banks: bytes[5],
            mapper: (flags7 & 0xF0) | (flags6 >> 4),
            mirroring,
            battery: flags6 & 0x02 != 0,
            prg_ram_banks: if bytes[8] == 0 { 1 } else { bytes[8] },
        })
    }
}

/// Snapshot of a mapper's mutable state for save states
///
/// Each mapper packs its registers into `registers` in its own order and
/// unpacks them the same way; the RAM-backed memories travel alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperState {
    /// Mapper-specific register bytes
    pub registers: Vec<u8>,
    /// PRG-RAM contents, if the mapper exposes any
    pub prg_ram: Option<Vec<u8>>,
    /// CHR-RAM contents, if the pattern memory is writable
    pub chr_ram: Option<Vec<u8>>,
    /// Current nametable arrangement
    pub mirroring: Mirroring,
}

/// Address translation and bank switching strategy of a cartridge
///
/// Reads outside the cartridge's windows return `None` so the bus can apply
/// its open-bus rule; writes return whether the cartridge absorbed them.
/// PPU accesses carry the current dot within the scanline because MMC3
/// derives its scanline IRQ from the pattern-fetch address pattern.
pub trait Mapper {
    /// Return the mapper to its power-on register state (memories persist)
    fn reset(&mut self);

    /// Read from CPU address space ($4020-$FFFF); `None` when unmapped
    fn cpu_read(&self, address: u16) -> Option<u8>;

    /// Write to CPU address space; returns true when the cartridge claimed
    /// the address (RAM store or register write)
    fn cpu_write(&mut self, address: u16, value: u8) -> bool;

    /// Read from PPU address space ($0000-$1FFF pattern tables)
    fn ppu_read(&mut self, address: u16, dot: u16) -> u8;

    /// Write to PPU address space (only effective for CHR-RAM)
    fn ppu_write(&mut self, address: u16, value: u8, dot: u16);

    /// Current nametable arrangement
    fn mirroring(&self) -> Mirroring;

    /// Level of the mapper's IRQ line
    fn irq_pending(&self) -> bool {
        false
    }

    /// Drop the IRQ line (service acknowledgement)
    fn clear_irq(&mut self) {}

    /// Battery-backed PRG-RAM contents, if any
    fn prg_ram(&self) -> Option<&[u8]> {
        None
    }

    /// Seed PRG-RAM from a previous session's contents
    fn load_prg_ram(&mut self, _data: &[u8]) {}

    /// Capture the mutable mapper state
    fn save_state(&self) -> MapperState;

    /// Restore a state captured by `save_state`
    fn load_state(&mut self, state: &MapperState);

    /// Overwrite PRG-ROM bytes in place (test and bench support; only the
    /// NROM mapper implements it)
    #[doc(hidden)]
    fn patch_prg(&mut self, _address: u16, _bytes: &[u8]) {}
}

/// A loaded cartridge: parsed header plus its mapper
pub struct Cartridge {
    header: INesHeader,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Load a cartridge from a complete iNES image in memory.
    ///
    /// # Errors
    ///
    /// Any [`CartridgeError`]: bad magic, rejected container features,
    /// truncated data, or an unimplemented mapper.
    pub fn from_ines_bytes(bytes: &[u8]) -> Result<Self, CartridgeError> {
        let header = INesHeader::parse(bytes)?;

        let prg_len = header.prg_banks as usize * PRG_BANK_SIZE;
        let chr_len = header.chr_banks as usize * CHR_BANK_SIZE;
        let expected = 16 + prg_len + chr_len;
        if bytes.len() < expected {
            return Err(CartridgeError::RomTruncated {
                expected,
                actual: bytes.len(),
            });
        }

        let prg_rom = bytes[16..16 + prg_len].to_vec();
        let chr = if header.chr_banks == 0 {
            // CHR-RAM cartridge: allocate one writable 8 KiB bank
            ChrMemory::Ram(vec![0; CHR_BANK_SIZE])
        } else {
            ChrMemory::Rom(bytes[16 + prg_len..16 + prg_len + chr_len].to_vec())
        };

        let (chr_kind, chr_bytes) = if header.chr_banks == 0 {
            ("RAM", CHR_BANK_SIZE)
        } else {
            ("ROM", chr_len)
        };
        let chr_kib = chr_bytes / 1024;

        let mapper = create_mapper(&header, prg_rom, chr)?;

        log::debug!(
            "loaded cartridge: mapper {}, {} KiB PRG, {} KiB CHR-{}, {:?} mirroring{}",
            header.mapper,
            prg_len / 1024,
            chr_kib,
            chr_kind,
            header.mirroring,
            if header.battery { ", battery" } else { "" },
        );

        Ok(Cartridge { header, mapper })
    }

    /// Build a cartridge directly from its parts (test and tooling entry)
    pub fn from_parts(
        header: INesHeader,
        prg_rom: Vec<u8>,
        chr: ChrMemory,
    ) -> Result<Self, CartridgeError> {
        let mapper = create_mapper(&header, prg_rom, chr)?;
        Ok(Cartridge { header, mapper })
    }

    /// The parsed header
    pub fn header(&self) -> &INesHeader {
        &self.header
    }

    /// Return the mapper to its power-on state
    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    /// CPU-side read; `None` when the cartridge does not decode the address
    pub fn cpu_read(&self, address: u16) -> Option<u8> {
        self.mapper.cpu_read(address)
    }

    /// CPU-side write; returns whether the cartridge claimed it
    pub fn cpu_write(&mut self, address: u16, value: u8) -> bool {
        self.mapper.cpu_write(address, value)
    }

    /// PPU-side pattern table read (`dot` feeds the MMC3 A12 watcher)
    pub fn ppu_read(&mut self, address: u16, dot: u16) -> u8 {
        self.mapper.ppu_read(address, dot)
    }

    /// PPU-side pattern table write
    pub fn ppu_write(&mut self, address: u16, value: u8, dot: u16) {
        self.mapper.ppu_write(address, value, dot);
    }

    /// Current nametable arrangement (mappers may change it at run time)
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    /// Level of the mapper IRQ line
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    /// Drop the mapper IRQ line
    pub fn clear_irq(&mut self) {
        self.mapper.clear_irq();
    }

    /// Battery-backed PRG-RAM contents, when the header battery bit is set
    pub fn save_ram(&self) -> Option<&[u8]> {
        if self.header.battery {
            self.mapper.prg_ram()
        } else {
            None
        }
    }

    /// Seed PRG-RAM from a previous session
    pub fn load_save_ram(&mut self, data: &[u8]) {
        self.mapper.load_prg_ram(data);
    }

    /// Capture mapper state for a save state
    pub fn save_state(&self) -> MapperState {
        self.mapper.save_state()
    }

    /// Restore mapper state from a save state
    pub fn load_state(&mut self, state: &MapperState) {
        self.mapper.load_state(state);
    }

    /// Overwrite PRG-ROM bytes in place (test and bench support)
    #[doc(hidden)]
    pub fn patch_prg(&mut self, address: u16, bytes: &[u8]) {
        self.mapper.patch_prg(address, bytes);
    }
}

/// Pattern memory handed to a mapper: read-only CHR-ROM or writable CHR-RAM
pub enum ChrMemory {
    Rom(Vec<u8>),
    Ram(Vec<u8>),
}

impl ChrMemory {
    /// Raw bytes regardless of writability
    pub fn bytes(&self) -> &[u8] {
        match self {
            ChrMemory::Rom(data) | ChrMemory::Ram(data) => data,
        }
    }

    /// Whether writes stick
    pub fn is_ram(&self) -> bool {
        matches!(self, ChrMemory::Ram(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Test Helpers
    // ========================================

    /// Assemble a minimal iNES image in memory
    pub(crate) fn build_ines(
        prg_banks: u8,
        chr_banks: u8,
        mapper: u8,
        flags6_low: u8,
    ) -> Vec<u8> {
        let mut image = vec![0u8; 16];
        image[0..4].copy_from_slice(b"NES\x1A");
        image[4] = prg_banks;
        image[5] = chr_banks;
        image[6] = (mapper << 4) | flags6_low;
        image[7] = mapper & 0xF0;
        image.extend(vec![0u8; prg_banks as usize * PRG_BANK_SIZE]);
        image.extend(vec![0u8; chr_banks as usize * CHR_BANK_SIZE]);
        image
    }

    // ========================================
    // Header Parsing Tests
    // ========================================

    #[test]
    fn test_parse_minimal_header() {
        let image = build_ines(1, 1, 0, 0x00);
        let header = INesHeader::parse(&image).unwrap();
        assert_eq!(header.prg_banks, 1);
        assert_eq!(header.chr_banks, 1);
        assert_eq!(header.mapper, 0);
        assert_eq!(header.mirroring, Mirroring::Horizontal);
        assert!(!header.battery);
        assert_eq!(header.prg_ram_banks, 1, "zero PRG-RAM banks reads as one");
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let mut image = build_ines(1, 1, 0, 0x00);
        image[0] = b'X';
        assert!(matches!(
            INesHeader::parse(&image),
            Err(CartridgeError::InvalidHeader)
        ));
    }

    #[test]
    fn test_parse_rejects_short_input() {
        assert!(matches!(
            INesHeader::parse(b"NES\x1A"),
            Err(CartridgeError::InvalidHeader)
        ));
    }

    #[test]
    fn test_parse_rejects_trainer() {
        let image = build_ines(1, 1, 0, 0x04);
        assert!(matches!(
            INesHeader::parse(&image),
            Err(CartridgeError::UnsupportedFeature("trainer"))
        ));
    }

    #[test]
    fn test_parse_rejects_nes2() {
        let mut image = build_ines(1, 1, 0, 0x00);
        image[7] |= 0x08;
        assert!(matches!(
            INesHeader::parse(&image),
            Err(CartridgeError::UnsupportedFeature("NES 2.0 header"))
        ));
    }

    #[test]
    fn test_parse_rejects_vs_system() {
        let mut image = build_ines(1, 1, 0, 0x00);
        image[7] |= 0x01;
        assert!(matches!(
            INesHeader::parse(&image),
            Err(CartridgeError::UnsupportedFeature("Vs.System"))
        ));
    }

    #[test]
    fn test_parse_mirroring_bits() {
        let vertical = build_ines(1, 1, 0, 0x01);
        assert_eq!(
            INesHeader::parse(&vertical).unwrap().mirroring,
            Mirroring::Vertical
        );

        // Four-screen wins over the horizontal/vertical bit
        let four_screen = build_ines(1, 1, 0, 0x09);
        assert_eq!(
            INesHeader::parse(&four_screen).unwrap().mirroring,
            Mirroring::FourScreen
        );
    }

    #[test]
    fn test_parse_mapper_nibbles() {
        let mut image = build_ines(1, 1, 0, 0x00);
        image[6] = 0x40; // mapper low nibble = 4
        image[7] = 0x20; // mapper high nibble = 2
        assert_eq!(INesHeader::parse(&image).unwrap().mapper, 0x24);
    }

    // ========================================
    // Cartridge Loading Tests
    // ========================================

    #[test]
    fn test_load_rejects_truncated_image() {
        let mut image = build_ines(2, 1, 0, 0x00);
        image.truncate(16 + PRG_BANK_SIZE); // half the promised PRG data
        assert!(matches!(
            Cartridge::from_ines_bytes(&image),
            Err(CartridgeError::RomTruncated { .. })
        ));
    }

    #[test]
    fn test_load_rejects_unknown_mapper() {
        let image = build_ines(1, 1, 9, 0x00);
        assert!(matches!(
            Cartridge::from_ines_bytes(&image),
            Err(CartridgeError::UnsupportedMapper(9))
        ));
    }

    #[test]
    fn test_load_nrom_roundtrip() {
        let mut image = build_ines(1, 1, 0, 0x00);
        image[16] = 0xA9; // first PRG byte
        let cartridge = Cartridge::from_ines_bytes(&image).unwrap();

        // 16 KiB NROM mirrors $8000 into $C000
        assert_eq!(cartridge.cpu_read(0x8000), Some(0xA9));
        assert_eq!(cartridge.cpu_read(0xC000), Some(0xA9));
        assert_eq!(cartridge.cpu_read(0x4020), None, "below the PRG window");
    }

    #[test]
    fn test_chr_ram_is_writable() {
        let image = build_ines(1, 0, 0, 0x00);
        let mut cartridge = Cartridge::from_ines_bytes(&image).unwrap();
        cartridge.ppu_write(0x0123, 0x5A, 0);
        assert_eq!(cartridge.ppu_read(0x0123, 0), 0x5A);
    }

    #[test]
    fn test_save_ram_requires_battery() {
        let no_battery = build_ines(1, 1, 1, 0x00);
        let cartridge = Cartridge::from_ines_bytes(&no_battery).unwrap();
        assert!(cartridge.save_ram().is_none());

        let battery = build_ines(1, 1, 1, 0x02);
        let cartridge = Cartridge::from_ines_bytes(&battery).unwrap();
        assert!(cartridge.save_ram().is_some());
    }
}
