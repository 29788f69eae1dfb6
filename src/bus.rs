// Bus module - the CPU's view of the console
//
// The bus owns every memory-mapped component and routes CPU accesses to
// them. It also latches OAM DMA requests ($4014) for the facade to execute
// between instructions.
//
// # CPU memory map
//
// ```text
// $0000-$07FF: 2 KiB internal RAM
// $0800-$1FFF: RAM mirrors (three more copies)
// $2000-$2007: PPU registers
// $2008-$3FFF: PPU register mirrors (every 8 bytes)
// $4000-$4013: APU channel registers
// $4014:       OAM DMA trigger
// $4015:       APU status
// $4016:       controller 1 data / strobe
// $4017:       controller 2 data (read), APU frame counter (write)
// $4018-$401F: test registers (disabled on retail units)
// $4020-$FFFF: cartridge (PRG-ROM, PRG-RAM, mapper registers)
// ```
//
// Unmapped reads return 0 as the open-bus approximation; unmapped writes
// vanish.

use crate::apu::Apu;
use crate::cartridge::{Cartridge, ChrMemory, INesHeader, Mirroring};
use crate::input::ControllerPorts;
use crate::ppu::Ppu;

/// Main memory bus owning the memory-mapped components
pub struct Bus {
    /// 2 KiB internal RAM, mirrored through $1FFF
    ram: [u8; 2048],

    /// Picture processing unit ($2000-$3FFF)
    pub ppu: Ppu,

    /// Audio processing unit ($4000-$4017)
    pub apu: Apu,

    /// The inserted cartridge ($4020-$FFFF and the PPU pattern space)
    pub cartridge: Cartridge,

    /// The two controller ports ($4016/$4017)
    pub controllers: ControllerPorts,

    /// Page latched by a $4014 write, waiting for the facade to run DMA
    oam_dma_page: Option<u8>,
}

impl Bus {
    /// Bus around a loaded cartridge
    pub fn with_cartridge(cartridge: Cartridge) -> Self {
        Bus {
            ram: [0; 2048],
            ppu: Ppu::new(),
            apu: Apu::new(),
            cartridge,
            controllers: ControllerPorts::new(),
            oam_dma_page: None,
        }
    }

    /// Bus around a blank NROM cartridge (component tests)
    pub fn new() -> Self {
        Self::with_test_program(&[], 0x8000)
    }

    /// Bus around a fabricated 32 KiB NROM image with `program` at
    /// `origin` and the reset vector pointing there (tests and benches)
    pub fn with_test_program(program: &[u8], origin: u16) -> Self {
        let header = INesHeader {
            prg_banks: 2,
            chr_banks: 0,
            mapper: 0,
            mirroring: Mirroring::Horizontal,
            battery: false,
            prg_ram_banks: 1,
        };

        let mut prg = vec![0u8; 32 * 1024];
        let prg_len = prg.len();
        let start = (origin as usize).saturating_sub(0x8000);
        for (i, &byte) in program.iter().enumerate() {
            prg[(start + i) % prg_len] = byte;
        }
        // Reset vector
        prg[0x7FFC] = origin as u8;
        prg[0x7FFD] = (origin >> 8) as u8;

        let cartridge = Cartridge::from_parts(header, prg, ChrMemory::Ram(vec![0; 8192]))
            .expect("fabricated NROM image is always valid");
        Self::with_cartridge(cartridge)
    }

    /// Overwrite fabricated ROM bytes, e.g. interrupt vectors (tests)
    pub fn patch_rom(&mut self, address: u16, bytes: &[u8]) {
        self.cartridge.patch_prg(address, bytes);
    }

    /// Read a byte from the bus
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // Internal RAM with its three mirrors
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],

            // PPU registers, mirrored every 8 bytes
            0x2000..=0x3FFF => self
                .ppu
                .read_register(addr & 0x0007, &mut self.cartridge),

            // APU status
            0x4015 => self.apu.read_status(),

            // Controller ports
            0x4016 => self.controllers.read_port1(),
            0x4017 => self.controllers.read_port2(),

            // Write-only APU/DMA registers and the test range: open bus
            0x4000..=0x4014 | 0x4018..=0x401F => 0,

            // Cartridge space
            0x4020..=0xFFFF => self.cartridge.cpu_read(addr).unwrap_or(0),
        }
    }

    /// Write a byte to the bus
    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,

            0x2000..=0x3FFF => {
                self.ppu
                    .write_register(addr & 0x0007, data, &mut self.cartridge)
            }

            // OAM DMA: latched here, executed by the facade between
            // instructions
            0x4014 => self.oam_dma_page = Some(data),

            // Controller strobe
            0x4016 => self.controllers.write_strobe(data),

            // APU channels, status and the frame counter
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write_register(addr, data),

            // Test range: absorbed
            0x4018..=0x401F => {}

            0x4020..=0xFFFF => {
                self.cartridge.cpu_write(addr, data);
            }
        }
    }

    /// Read a 16-bit little-endian word
    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Write a 16-bit little-endian word
    pub fn write_u16(&mut self, addr: u16, data: u16) {
        self.write(addr, (data & 0xFF) as u8);
        self.write(addr.wrapping_add(1), (data >> 8) as u8);
    }

    // ========================================
    // OAM DMA
    // ========================================

    /// A $4014 write is waiting to be serviced
    pub fn oam_dma_pending(&self) -> bool {
        self.oam_dma_page.is_some()
    }

    /// Execute the pending OAM DMA transfer
    ///
    /// Copies 256 bytes from the latched page into OAM starting at the
    /// current OAMADDR. Costs 513 CPU cycles when started on a get cycle,
    /// 514 on a put cycle; the CPU is suspended for the duration while the
    /// PPU and APU keep running (the facade handles that part).
    pub fn run_oam_dma(&mut self, get_cycle: bool) -> u32 {
        let page = match self.oam_dma_page.take() {
            Some(page) => page,
            None => return 0,
        };

        let base = (page as u16) << 8;
        for offset in 0..256 {
            let value = self.read(base + offset);
            self.ppu.write_oam_dma(value);
        }

        if get_cycle {
            513
        } else {
            514
        }
    }

    // ========================================
    // Clock Fan-Out
    // ========================================

    /// Advance the PPU by `dots` dots
    pub fn tick_ppu(&mut self, dots: u32) {
        for _ in 0..dots {
            self.ppu.tick(&mut self.cartridge);
        }
    }

    /// Advance the APU by one CPU cycle; returns DMC stall cycles
    pub fn tick_apu(&mut self, dma_get_cycle: bool) -> u32 {
        self.apu.tick(&mut self.cartridge, dma_get_cycle)
    }

    /// Internal RAM contents (save states)
    pub(crate) fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Replace internal RAM contents (save states)
    pub(crate) fn load_ram(&mut self, data: &[u8]) {
        let len = data.len().min(self.ram.len());
        self.ram[..len].copy_from_slice(&data[..len]);
    }

    /// Level of the IRQ line into the CPU (APU frame/DMC or mapper)
    pub fn irq_pending(&self) -> bool {
        self.apu.irq_pending() || self.cartridge.irq_pending()
    }

    /// Acknowledge every IRQ source (the facade calls this at service)
    pub fn acknowledge_irqs(&mut self) {
        self.apu.clear_irq_signals();
        self.cartridge.clear_irq();
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
