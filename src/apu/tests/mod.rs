//! APU integration tests over the composed unit
//!
//! The per-channel and per-component details live next to their types;
//! these cover register routing, the $4015 status register, the frame
//! sequencer wiring and DMC DMA.

use super::*;
use crate::cartridge::Cartridge;

/// NROM cartridge whose PRG is filled with `fill`
pub(crate) fn test_cartridge(fill: u8) -> Cartridge {
    let mut image = vec![0u8; 16];
    image[0..4].copy_from_slice(b"NES\x1A");
    image[4] = 2; // 32 KiB PRG
    image[5] = 1;
    image.extend(vec![fill; 32 * 1024]);
    image.extend(vec![0u8; 8 * 1024]);
    Cartridge::from_ines_bytes(&image).expect("test image must parse")
}

/// Tick the APU `cycles` times, accumulating DMC stalls
pub(crate) fn run(apu: &mut Apu, cartridge: &mut Cartridge, cycles: u32) -> u32 {
    let mut stalls = 0;
    for i in 0..cycles {
        stalls += apu.tick(cartridge, i % 2 == 0);
    }
    stalls
}

mod status_tests;
