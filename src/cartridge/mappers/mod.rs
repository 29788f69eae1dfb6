// Mappers module - bank switching strategies for the supported cartridges
//
// The factory turns a parsed header plus the raw PRG/CHR memories into a
// boxed `Mapper`. Each implementation owns its memories outright; the
// `Cartridge` wrapper only ever talks through the trait.

mod mapper0;
mod mapper1;
mod mapper2;
mod mapper3;
mod mapper4;

pub use mapper0::Mapper0;
pub use mapper1::Mapper1;
pub use mapper2::Mapper2;
pub use mapper3::Mapper3;
pub use mapper4::Mapper4;

use super::{CartridgeError, ChrMemory, INesHeader, Mapper};

/// Create the mapper named by the header
///
/// # Errors
///
/// `CartridgeError::UnsupportedMapper` for any mapper number outside the
/// implemented set {0, 1, 2, 3, 4}.
pub fn create_mapper(
    header: &INesHeader,
    prg_rom: Vec<u8>,
    chr: ChrMemory,
) -> Result<Box<dyn Mapper>, CartridgeError> {
    match header.mapper {
        0 => Ok(Box::new(Mapper0::new(header, prg_rom, chr))),
        1 => Ok(Box::new(Mapper1::new(header, prg_rom, chr))),
        2 => Ok(Box::new(Mapper2::new(header, prg_rom, chr))),
        3 => Ok(Box::new(Mapper3::new(header, prg_rom, chr))),
        4 => Ok(Box::new(Mapper4::new(header, prg_rom, chr))),
        number => Err(CartridgeError::UnsupportedMapper(number)),
    }
}
