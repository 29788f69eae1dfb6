// PPU module - Picture Processing Unit (2C02) emulation
//
// This is a dot-accurate implementation: the PPU advances one dot at a time
// through 262 scanlines of 341 dots, interleaving memory fetches, scroll
// register updates and pixel output exactly where the hardware does.
//
// ## Frame timing
//
// - Scanlines 0-239: visible; background fetches, sprite evaluation and
//   pixel output run together.
// - Scanline 240: post-render idle.
// - Scanline 241 dot 1: VBlank flag set, frame handed to the host, NMI
//   raised when enabled.
// - Scanline 261 (pre-render): VBlank/sprite flags cleared at dot 1,
//   vertical scroll reloaded during dots 280-304, and on odd frames one dot
//   is skipped at dot 339 while rendering is enabled.
//
// ## Scroll state
//
// The scrolling model is the loopy register pair: a 15-bit current address
// `v`, a 15-bit temporary address `t` laid out as `yyy NN YYYYY XXXXX`
// (fine Y, nametable select, coarse Y, coarse X), a 3-bit fine X, and the
// shared write toggle `w` used by PPUSCROLL/PPUADDR.
//
// ## Register map
//
// | Address | Name       | Access  | Description                    |
// |---------|------------|---------|--------------------------------|
// | $2000   | PPUCTRL    | Write   | NMI enable, sprite size, bases |
// | $2001   | PPUMASK    | Write   | Rendering enable and masking   |
// | $2002   | PPUSTATUS  | Read    | VBlank, sprite 0, overflow     |
// | $2003   | OAMADDR    | Write   | OAM address port               |
// | $2004   | OAMDATA    | R/W     | OAM data port                  |
// | $2005   | PPUSCROLL  | Write x2| Scroll position                |
// | $2006   | PPUADDR    | Write x2| VRAM address                   |
// | $2007   | PPUDATA    | R/W     | VRAM data port (buffered read) |

pub mod constants;
mod memory;
pub mod palette;
mod registers;
mod rendering;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cartridge::Cartridge;
use constants::*;
use palette::NES_PALETTE;

/// Blank RGB frame for deserialized PPUs (pixels are transient state)
fn blank_frame() -> Vec<u8> {
    vec![0; SCREEN_WIDTH * SCREEN_HEIGHT * PIXEL_CHANNELS]
}

/// PPU structure holding the full rendering and register state
#[derive(Clone, Serialize, Deserialize)]
pub struct Ppu {
    // ========================================
    // Registers ($2000-$2007)
    // ========================================
    /// $2000: PPUCTRL
    ///
    /// Bit layout:
    /// - 7: generate NMI at VBlank start
    /// - 5: sprite size (0: 8x8, 1: 8x16)
    /// - 4: background pattern table base (0: $0000, 1: $1000)
    /// - 3: sprite pattern table base (0: $0000, 1: $1000)
    /// - 2: VRAM address increment (0: +1, 1: +32)
    /// - 1-0: base nametable select (copied into `t`)
    pub(crate) ppuctrl: u8,

    /// $2001: PPUMASK
    ///
    /// Bit layout:
    /// - 4: show sprites
    /// - 3: show background
    /// - 2: show sprites in the leftmost 8 columns
    /// - 1: show background in the leftmost 8 columns
    pub(crate) ppumask: u8,

    /// $2002: PPUSTATUS (bits 7/6/5: VBlank, sprite 0 hit, overflow)
    pub(crate) ppustatus: u8,

    /// $2003: OAMADDR
    pub(crate) oam_addr: u8,

    // ========================================
    // Internal Scroll Registers
    // ========================================
    /// v: current VRAM address (15 bits), also the live scroll position
    pub(crate) v: u16,

    /// t: temporary VRAM address; the "top-left corner" the next frame
    /// starts from
    pub(crate) t: u16,

    /// x: fine X scroll (3 bits)
    pub(crate) fine_x: u8,

    /// w: shared write toggle for PPUSCROLL/PPUADDR (false = first write)
    pub(crate) write_latch: bool,

    /// Read buffer for PPUDATA; non-palette reads lag one access behind
    pub(crate) read_buffer: u8,

    // ========================================
    // PPU Memory
    // ========================================
    /// 2 KiB internal VRAM backing the nametables
    pub(crate) nametables: Vec<u8>,

    /// 32 bytes of palette RAM
    ///
    /// $3F10/$3F14/$3F18/$3F1C alias $3F00/$3F04/$3F08/$3F0C.
    pub(crate) palette_ram: [u8; PALETTE_SIZE],

    /// 256-byte object attribute memory (64 sprites x 4 bytes)
    pub(crate) oam: Vec<u8>,

    // ========================================
    // Timing
    // ========================================
    /// Current scanline (0-261)
    pub(crate) scanline: u16,

    /// Current dot within the scanline (0-340)
    pub(crate) dot: u16,

    /// Odd-frame flag; odd frames skip one pre-render dot while rendering
    pub(crate) odd_frame: bool,

    /// Set once the first pre-render scanline has run; PPUCTRL/PPUMASK
    /// writes are dropped before that
    pub(crate) warmed_up: bool,

    // ========================================
    // Frame Output
    // ========================================
    /// 256x240 RGB output buffer
    #[serde(skip, default = "blank_frame")]
    frame: Vec<u8>,

    /// Frame completed and ready for the host
    frame_ready: bool,

    // ========================================
    // NMI
    // ========================================
    /// VBlank period active and not yet acknowledged via $2002
    pub(crate) nmi_occurred: bool,

    /// NMI line to the CPU (edge-latched by the facade)
    pub(crate) nmi_signal: bool,

    // ========================================
    // Background Fetch Latches
    // ========================================
    /// Latched nametable byte (tile index)
    pub(crate) bg_nametable: u8,
    /// Latched attribute table byte
    pub(crate) bg_attribute: u8,
    /// Latched pattern table low bitplane
    pub(crate) bg_pattern_low: u8,
    /// Latched pattern table high bitplane
    pub(crate) bg_pattern_high: u8,

    // ========================================
    // Sprite Evaluation State
    // ========================================
    /// Secondary OAM filled during dots 65-256
    pub(crate) secondary_oam: [u8; 32],
    /// Copy of secondary OAM the current line renders from
    pub(crate) sprite_line_buffer: [u8; 32],
    /// Pattern bytes of the eight buffered sprites (LSB/MSB pairs)
    pub(crate) sprite_patterns: [u8; 16],
    /// Byte latched from primary OAM on odd evaluation cycles
    pub(crate) oam_transfer: u8,
    /// Sprite index walked through primary OAM (0-64)
    pub(crate) oam_sprite_index: u8,
    /// Byte index within the sprite being copied (0-3)
    pub(crate) oam_byte_index: u8,
    /// Write index into secondary OAM (0-32)
    pub(crate) secondary_index: u8,
    /// A sprite is mid-copy into secondary OAM
    pub(crate) copying_sprite: bool,
    /// Sprite 0 was copied into secondary OAM for the next line
    pub(crate) sprite0_on_next_line: bool,
    /// Sprite 0 is in the line buffer being rendered
    pub(crate) sprite0_on_line: bool,
}

impl Ppu {
    /// Create a new PPU in its power-on state
    pub fn new() -> Self {
        Ppu {
            ppuctrl: 0x00,
            ppumask: 0x00,
            ppustatus: 0xA0,
            oam_addr: 0x00,

            v: 0x0000,
            t: 0x0000,
            fine_x: 0,
            write_latch: false,
            read_buffer: 0x00,

            nametables: vec![0; NAMETABLE_SIZE * 2],
            palette_ram: [0; PALETTE_SIZE],
            oam: vec![0; 256],

            scanline: 0,
            dot: 0,
            odd_frame: false,
            warmed_up: false,

            frame: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT * PIXEL_CHANNELS],
            frame_ready: false,

            nmi_occurred: false,
            nmi_signal: false,

            bg_nametable: 0,
            bg_attribute: 0,
            bg_pattern_low: 0,
            bg_pattern_high: 0,

            secondary_oam: [0xFF; 32],
            sprite_line_buffer: [0xFF; 32],
            sprite_patterns: [0; 16],
            oam_transfer: 0,
            oam_sprite_index: 0,
            oam_byte_index: 0,
            secondary_index: 0,
            copying_sprite: false,
            sprite0_on_next_line: false,
            sprite0_on_line: false,
        }
    }

    /// Reset the PPU to its power-on state
    ///
    /// Palette RAM comes up with noise on real hardware; a seed reproduces
    /// that deterministically, `None` leaves it zeroed.
    pub fn reset(&mut self, palette_seed: Option<u64>) {
        let frame_len = self.frame.len();
        let mut fresh = Ppu::new();
        fresh.frame = vec![0; frame_len];

        if let Some(seed) = palette_seed {
            let mut rng = SmallRng::seed_from_u64(seed);
            for entry in fresh.palette_ram.iter_mut() {
                *entry = rng.random::<u8>() & 0x3F;
            }
        }

        // OAM and nametables persist across a console reset
        fresh.oam.copy_from_slice(&self.oam);
        fresh.nametables.copy_from_slice(&self.nametables);

        *self = fresh;
    }

    /// Force the backing buffers to their canonical sizes
    ///
    /// Deserialized state could carry short vectors; the rest of the PPU
    /// indexes these unconditionally, so restore normalizes first.
    pub(crate) fn normalize_buffers(&mut self) {
        self.nametables.resize(NAMETABLE_SIZE * 2, 0);
        self.oam.resize(256, 0);
        self.frame
            .resize(SCREEN_WIDTH * SCREEN_HEIGHT * PIXEL_CHANNELS, 0);
    }

    // ========================================
    // Frame Output
    // ========================================

    /// The 256x240 RGB frame buffer (rows of `SCREEN_WIDTH * 3` bytes)
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Whether a complete frame is waiting for the host
    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    /// Acknowledge the pending frame
    pub fn clear_frame_ready(&mut self) {
        self.frame_ready = false;
    }

    /// Write one output pixel from a 6-bit color code
    pub(crate) fn set_pixel(&mut self, color_code: u8, row: u16, col: u16) {
        if col as usize >= SCREEN_WIDTH || row as usize >= SCREEN_HEIGHT {
            return;
        }
        let rgb = NES_PALETTE[(color_code & 0x3F) as usize];
        let base = (row as usize * SCREEN_WIDTH + col as usize) * PIXEL_CHANNELS;
        self.frame[base..base + PIXEL_CHANNELS].copy_from_slice(&rgb);
    }

    // ========================================
    // NMI Line
    // ========================================

    /// Level of the NMI line toward the CPU
    pub fn nmi_signal(&self) -> bool {
        self.nmi_signal
    }

    /// Acknowledge the NMI (called by the facade when servicing)
    pub fn clear_nmi_signal(&mut self) {
        self.nmi_signal = false;
        self.nmi_occurred = false;
    }

    // ========================================
    // OAM DMA Port
    // ========================================

    /// Write one DMA byte to OAM at the current OAMADDR and advance it
    pub fn write_oam_dma(&mut self, value: u8) {
        self.oam[self.oam_addr as usize] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// Direct OAM read (diagnostics and tests)
    pub fn read_oam(&self, addr: u8) -> u8 {
        self.oam[addr as usize]
    }

    // ========================================
    // Dot Loop
    // ========================================

    /// Whether background or sprite rendering is enabled
    pub(crate) fn rendering_enabled(&self) -> bool {
        self.ppumask & 0x18 != 0
    }

    /// Advance the PPU by one dot
    ///
    /// Called three times per CPU cycle. The cartridge rides along for
    /// pattern fetches and for the MMC3 A12 watcher.
    pub fn tick(&mut self, cartridge: &mut Cartridge) {
        match self.scanline {
            0..=LAST_VISIBLE_SCANLINE => self.visible_scanline_dot(cartridge),
            POSTRENDER_SCANLINE => {}
            VBLANK_SET_SCANLINE => {
                if self.dot == 1 {
                    self.ppustatus |= 0x80;
                    self.nmi_occurred = true;
                    self.frame_ready = true;
                }
            }
            PRERENDER_SCANLINE => self.prerender_scanline_dot(cartridge),
            _ => {}
        }

        // The NMI line follows (PPUCTRL.7 AND vblank): enabling NMI while
        // the flag is still set fires a late NMI, as hardware does.
        if self.ppuctrl & 0x80 != 0 && self.nmi_occurred {
            self.nmi_signal = true;
        }

        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
            }
        }
    }

    /// Current scanline (0-261)
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Current dot within the scanline (0-340)
    pub fn dot(&self) -> u16 {
        self.dot
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
