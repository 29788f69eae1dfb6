//! $4015 status register tests

use super::*;

#[test]
fn test_initial_status_is_clear() {
    let mut apu = Apu::new();
    assert_eq!(apu.read_status(), 0x00);
}

#[test]
fn test_enabled_channels_report_length_activity() {
    let mut apu = Apu::new();
    apu.write_register(0x4015, 0x0F);

    // Load every length counter
    apu.write_register(0x4003, 0x08);
    apu.write_register(0x4007, 0x08);
    apu.write_register(0x400B, 0x08);
    apu.write_register(0x400F, 0x08);

    assert_eq!(apu.read_status() & 0x0F, 0x0F, "all four lengths running");
}

#[test]
fn test_disable_clears_length_counters() {
    let mut apu = Apu::new();
    apu.write_register(0x4015, 0x03);
    apu.write_register(0x4003, 0x08);
    apu.write_register(0x4007, 0x08);
    assert_eq!(apu.read_status() & 0x03, 0x03);

    apu.write_register(0x4015, 0x02);
    assert_eq!(
        apu.read_status() & 0x03,
        0x02,
        "disabling pulse 1 clears only its counter"
    );
}

#[test]
fn test_load_while_disabled_is_ignored() {
    let mut apu = Apu::new();
    apu.write_register(0x4003, 0x08);
    assert_eq!(apu.read_status() & 0x01, 0, "disabled channel stays silent");
}

#[test]
fn test_status_read_clears_frame_irq() {
    let mut apu = Apu::new();
    let mut cartridge = test_cartridge(0);

    run(&mut apu, &mut cartridge, 30_000);
    assert!(apu.irq_pending(), "4-step sequence raised the frame IRQ");

    let status = apu.read_status();
    assert_eq!(status & 0x40, 0x40, "IRQ visible in the read");
    assert!(!apu.irq_pending(), "and acknowledged by it");

    let status = apu.read_status();
    assert_eq!(status & 0x40, 0, "second read sees it clear");
}

#[test]
fn test_dmc_activity_bit() {
    let mut apu = Apu::new();
    apu.write_register(0x4013, 0x10); // 257-byte sample
    apu.write_register(0x4015, 0x10);
    assert_eq!(apu.read_status() & 0x10, 0x10, "reader active after enable");

    apu.write_register(0x4015, 0x00);
    assert_eq!(apu.read_status() & 0x10, 0, "disable stops the reader");
}
