//! PPU register behavior tests
//!
//! Covers initialization, the two-write protocols, PPUDATA buffering, and
//! the loopy t/v/x/w bookkeeping games depend on.

use super::*;

// ========================================
// Initialization Tests
// ========================================

#[test]
fn test_ppu_initialization() {
    let ppu = Ppu::new();
    assert_eq!(ppu.ppuctrl, 0x00);
    assert_eq!(ppu.ppumask, 0x00);
    assert_eq!(ppu.ppustatus, 0xA0, "power-on status pattern");
    assert_eq!(ppu.oam_addr, 0x00);
    assert_eq!(ppu.v, 0);
    assert_eq!(ppu.t, 0);
    assert!(!ppu.write_latch);
}

#[test]
fn test_reset_with_seed_randomizes_palette() {
    let mut ppu = Ppu::new();
    ppu.reset(Some(0x1234));
    let first: Vec<u8> = ppu.palette_ram.to_vec();
    assert!(
        first.iter().any(|&c| c != 0),
        "seeded reset should scribble the palette"
    );
    assert!(first.iter().all(|&c| c < 0x40), "color codes stay 6-bit");

    // Same seed reproduces the same noise
    let mut again = Ppu::new();
    again.reset(Some(0x1234));
    assert_eq!(again.palette_ram.to_vec(), first);
}

#[test]
fn test_reset_without_seed_zeroes_palette() {
    let mut ppu = Ppu::new();
    ppu.reset(None);
    assert!(ppu.palette_ram.iter().all(|&c| c == 0));
}

// ========================================
// Warm-Up Suppression Tests
// ========================================

#[test]
fn test_ctrl_and_mask_writes_dropped_before_warmup() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = Ppu::new();

    ppu.write_register(PPUCTRL, 0x80, &mut cartridge);
    ppu.write_register(PPUMASK, 0x1E, &mut cartridge);
    assert_eq!(ppu.ppuctrl, 0x00, "PPUCTRL ignored before warm-up");
    assert_eq!(ppu.ppumask, 0x00, "PPUMASK ignored before warm-up");

    ppu.warmed_up = true;
    ppu.write_register(PPUCTRL, 0x80, &mut cartridge);
    ppu.write_register(PPUMASK, 0x1E, &mut cartridge);
    assert_eq!(ppu.ppuctrl, 0x80);
    assert_eq!(ppu.ppumask, 0x1E);
}

// ========================================
// PPUSTATUS Tests
// ========================================

#[test]
fn test_status_read_clears_vblank_and_latch() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();
    ppu.ppustatus = 0x80;
    ppu.write_latch = true;

    let status = ppu.read_register(PPUSTATUS, &mut cartridge);
    assert_eq!(status & 0x80, 0x80, "first read reports VBlank");
    assert_eq!(ppu.ppustatus & 0x80, 0, "flag cleared by the read");
    assert!(!ppu.write_latch, "write toggle reset");

    let status = ppu.read_register(PPUSTATUS, &mut cartridge);
    assert_eq!(status & 0x80, 0, "second read sees it clear");
}

#[test]
fn test_status_read_suppresses_nmi() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();
    ppu.ppustatus = 0x80;
    ppu.nmi_occurred = true;
    ppu.nmi_signal = true;

    ppu.read_register(PPUSTATUS, &mut cartridge);
    assert!(!ppu.nmi_signal, "racing $2002 read kills the NMI");
}

// ========================================
// Scroll / Address Protocol Tests
// ========================================

#[test]
fn test_ppuscroll_writes_build_t_and_x() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();

    // X = 0x7D: coarse X = 15, fine X = 5
    ppu.write_register(PPUSCROLL, 0x7D, &mut cartridge);
    assert_eq!(ppu.t & 0x001F, 15);
    assert_eq!(ppu.fine_x, 5);
    assert!(ppu.write_latch);

    // Y = 0x5E: coarse Y = 11, fine Y = 6
    ppu.write_register(PPUSCROLL, 0x5E, &mut cartridge);
    assert_eq!((ppu.t >> 5) & 0x1F, 11);
    assert_eq!((ppu.t >> 12) & 0x07, 6);
    assert!(!ppu.write_latch);
}

#[test]
fn test_ppuaddr_second_write_copies_t_to_v() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();

    ppu.write_register(PPUADDR, 0x21, &mut cartridge);
    assert_eq!(ppu.v, 0, "v untouched after the first write");

    ppu.write_register(PPUADDR, 0x08, &mut cartridge);
    assert_eq!(ppu.v, 0x2108, "second write lands t in v");
    assert!(!ppu.write_latch);
}

#[test]
fn test_ppuaddr_first_write_masks_high_bits() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();

    ppu.write_register(PPUADDR, 0xFF, &mut cartridge);
    ppu.write_register(PPUADDR, 0x00, &mut cartridge);
    assert_eq!(ppu.v, 0x3F00, "only six high bits survive");
}

#[test]
fn test_ppuctrl_sets_nametable_bits_of_t() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();

    ppu.write_register(PPUCTRL, 0x03, &mut cartridge);
    assert_eq!(ppu.t & 0x0C00, 0x0C00, "nametable select copied into t");
}

// ========================================
// PPUDATA Tests
// ========================================

#[test]
fn test_ppudata_read_is_buffered() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();

    // Put a value into a nametable and point v at it
    ppu.write_register(PPUADDR, 0x20, &mut cartridge);
    ppu.write_register(PPUADDR, 0x00, &mut cartridge);
    ppu.write_register(PPUDATA, 0x42, &mut cartridge);

    ppu.write_register(PPUADDR, 0x20, &mut cartridge);
    ppu.write_register(PPUADDR, 0x00, &mut cartridge);

    let stale = ppu.read_register(PPUDATA, &mut cartridge);
    let fresh = ppu.read_register(PPUDATA, &mut cartridge);
    assert_ne!(stale, 0x42, "first read returns the old buffer");
    assert_eq!(fresh, 0x42, "second read returns the data");
}

#[test]
fn test_ppudata_palette_read_is_immediate() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();

    ppu.write_register(PPUADDR, 0x3F, &mut cartridge);
    ppu.write_register(PPUADDR, 0x01, &mut cartridge);
    ppu.write_register(PPUDATA, 0x2A, &mut cartridge);

    ppu.write_register(PPUADDR, 0x3F, &mut cartridge);
    ppu.write_register(PPUADDR, 0x01, &mut cartridge);
    let value = ppu.read_register(PPUDATA, &mut cartridge);
    assert_eq!(value, 0x2A, "palette reads skip the buffer");
}

#[test]
fn test_ppudata_increment_step() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();

    ppu.write_register(PPUADDR, 0x20, &mut cartridge);
    ppu.write_register(PPUADDR, 0x00, &mut cartridge);
    ppu.write_register(PPUDATA, 0x00, &mut cartridge);
    assert_eq!(ppu.v, 0x2001, "+1 stride by default");

    ppu.write_register(PPUCTRL, 0x04, &mut cartridge);
    ppu.write_register(PPUDATA, 0x00, &mut cartridge);
    assert_eq!(ppu.v, 0x2021, "+32 stride with PPUCTRL.2");
}

// ========================================
// OAM Port Tests
// ========================================

#[test]
fn test_oamdata_write_increments_addr() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();

    ppu.write_register(OAMADDR, 0x10, &mut cartridge);
    ppu.write_register(OAMDATA, 0x55, &mut cartridge);
    assert_eq!(ppu.oam[0x10], 0x55);
    assert_eq!(ppu.oam_addr, 0x11);
}

#[test]
fn test_oamdata_write_during_rendering_glitches_addr() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();
    ppu.ppumask = 0x18;
    ppu.scanline = 100;

    ppu.write_register(OAMADDR, 0x00, &mut cartridge);
    ppu.write_register(OAMDATA, 0x55, &mut cartridge);
    assert_eq!(ppu.oam[0], 0x00, "store suppressed while rendering");
    assert_eq!(ppu.oam_addr, 0x04, "address bumps by a whole sprite");
}

#[test]
fn test_oamdata_read_masks_attribute_bytes() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();
    ppu.scanline = 250; // outside the forced-$FF window

    ppu.oam[2] = 0xFF;
    ppu.write_register(OAMADDR, 2, &mut cartridge);
    let value = ppu.read_register(OAMDATA, &mut cartridge);
    assert_eq!(value, 0xE3, "attribute bytes have no middle bits");
}

#[test]
fn test_oamdata_read_returns_ff_during_clear_window() {
    let mut cartridge = test_cartridge(false);
    let mut ppu = warmed_ppu();
    ppu.scanline = 10;
    ppu.dot = 32;

    ppu.oam[0] = 0x12;
    let value = ppu.read_register(OAMDATA, &mut cartridge);
    assert_eq!(value, 0xFF, "clear window forces $FF");
}
