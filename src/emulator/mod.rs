// Emulator module - the console facade
//
// `Emulator` owns the CPU and the bus (which owns everything else) and
// arbitrates the clocks: each round it picks the next CPU event in priority
// order (pending OAM DMA, NMI, IRQ, or one instruction), then fans the
// elapsed cycles out as one APU tick per CPU cycle and three PPU dots per
// CPU cycle. DMC memory-reader stalls extend the fan-out on the fly.
//
// Hosts drive it with `step`, which runs until either a frame or an audio
// buffer is ready, and collect output through `take_frame`/`drain_audio`.

mod config;
mod save_state;

pub use config::{AudioConfig, AudioFormat, EmulatorConfig, VideoConfig};
pub use save_state::{SaveState, SaveStateError};

use crate::apu::ChannelLevels;
use crate::audio::{Mixer, SampleClock};
use crate::bus::Bus;
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::{Cpu, Fault};

/// What `step` ran up against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// A full frame is waiting in `take_frame`
    FrameReady,
    /// `audio.buffer_size` samples are waiting in `drain_audio`
    AudioBufferReady,
}

/// Main emulator structure
pub struct Emulator {
    /// CPU (6502 core)
    cpu: Cpu,

    /// Bus owning PPU, APU, cartridge and controllers
    bus: Bus,

    /// Core configuration
    config: EmulatorConfig,

    /// Non-linear channel mixer
    mixer: Mixer,

    /// Output-rate divider
    sample_clock: SampleClock,

    /// Quantized PCM samples waiting for the host
    audio_buffer: Vec<u8>,

    /// Channel levels at the last emitted sample (visualization tap)
    channel_taps: ChannelLevels,

    /// Get/put parity of the current cycle, for DMA and DMC costs
    dma_get_cycle: bool,
}

impl Emulator {
    /// Build a console around an iNES image with default configuration
    ///
    /// # Errors
    ///
    /// Any [`CartridgeError`] from the image: bad header, rejected
    /// container features, truncation, unsupported mapper.
    pub fn new(rom: &[u8]) -> Result<Self, CartridgeError> {
        Self::with_config(rom, EmulatorConfig::default())
    }

    /// Build a console around an iNES image with explicit configuration
    pub fn with_config(rom: &[u8], config: EmulatorConfig) -> Result<Self, CartridgeError> {
        let cartridge = Cartridge::from_ines_bytes(rom)?;
        let mut mixer = Mixer::new();
        mixer.set_volume(config.audio.volume);

        let mut emulator = Emulator {
            cpu: Cpu::new(),
            bus: Bus::with_cartridge(cartridge),
            sample_clock: SampleClock::new(config.audio.sample_rate),
            mixer,
            audio_buffer: Vec::with_capacity(config.audio.buffer_size),
            channel_taps: ChannelLevels::default(),
            dma_get_cycle: false,
            config,
        };
        emulator.reset();
        Ok(emulator)
    }

    /// Press the reset button: every subsystem back to power-on state
    pub fn reset(&mut self) {
        self.bus.cartridge.reset();
        self.bus.apu.reset();
        self.bus
            .ppu
            .reset(self.config.video.palette_noise_seed);
        self.cpu.reset(&mut self.bus);

        self.dma_get_cycle = false;
        self.sample_clock.reset();
        self.audio_buffer.clear();
        self.channel_taps = ChannelLevels::default();
    }

    // ========================================
    // Clock Arbitration
    // ========================================

    /// Run one CPU event: pending DMA, NMI, IRQ, or one instruction
    ///
    /// Interrupt lines are sampled only here, at instruction boundaries.
    fn run_cpu_event(&mut self) -> u32 {
        if self.bus.oam_dma_pending() {
            return self.bus.run_oam_dma(self.dma_get_cycle);
        }

        if self.bus.ppu.nmi_signal() {
            let cycles = self.cpu.nmi(&mut self.bus) as u32;
            self.bus.ppu.clear_nmi_signal();
            return cycles;
        }

        if self.bus.irq_pending() {
            let cycles = self.cpu.irq(&mut self.bus) as u32;
            if cycles > 0 {
                // Acknowledge at service time; a level-held line would
                // re-enter before the guest's handler can run
                self.bus.acknowledge_irqs();
                return cycles;
            }
            // Masked: fall through and execute normally
        }

        self.cpu.step(&mut self.bus) as u32
    }

    /// Advance one CPU event and fan the clocks out
    ///
    /// Returns the CPU cycles consumed, including DMC stalls.
    fn run_one_event(&mut self) -> u32 {
        let cycles = self.run_cpu_event();
        self.dma_get_cycle = (self.dma_get_cycle as u32 + cycles) % 2 != 0;

        // One APU tick per CPU cycle; DMC fetches stretch the window
        let mut total = cycles;
        let mut ticked = 0;
        while ticked < total {
            total += self.bus.tick_apu(self.dma_get_cycle);

            if self.sample_clock.tick() {
                let levels = self.bus.apu.channel_levels();
                self.channel_taps = levels;
                let sample = self.mixer.mix(levels);
                self.push_sample(sample);
            }
            ticked += 1;
        }

        // Three PPU dots per CPU cycle
        self.bus.tick_ppu(3 * total);

        total
    }

    /// Run until the next frame or full audio buffer
    pub fn step(&mut self) -> StepEvent {
        loop {
            self.run_one_event();

            if self.bus.ppu.frame_ready() {
                return StepEvent::FrameReady;
            }
            if self.audio_buffer.len() >= self.config.audio.buffer_size {
                return StepEvent::AudioBufferReady;
            }
        }
    }

    /// Quantize one mixed sample into the configured PCM format
    fn push_sample(&mut self, sample: f32) {
        let byte = match self.config.audio.format {
            // The mix is unipolar: [0, 1] maps straight onto [0, 255]
            AudioFormat::Unsigned8 => (sample * 255.0) as u8,
            // Signed output recenters the same span around zero
            AudioFormat::Signed8 => ((sample * 255.0) as i16 - 128).clamp(-128, 127) as i8 as u8,
        };
        self.audio_buffer.push(byte);
    }

    // ========================================
    // Host Interface
    // ========================================

    /// The finished 256x240 RGB frame; acknowledges it as consumed
    pub fn take_frame(&mut self) -> &[u8] {
        self.bus.ppu.clear_frame_ready();
        self.bus.ppu.frame()
    }

    /// Drain the accumulated PCM samples
    pub fn drain_audio(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.audio_buffer)
    }

    /// Raw channel levels at the last emitted sample
    pub fn channel_taps(&self) -> ChannelLevels {
        self.channel_taps
    }

    /// Supply the controller 1 button mask (bit layout per `Button`)
    pub fn set_controller(&mut self, mask: u8) {
        self.bus.controllers.controller1().set_state(mask);
    }

    /// Supply the controller 2 button mask
    pub fn set_controller2(&mut self, mask: u8) {
        self.bus.controllers.controller2().set_state(mask);
    }

    /// Battery-backed PRG-RAM contents, when the cartridge has any
    pub fn save_ram(&self) -> Option<&[u8]> {
        self.bus.cartridge.save_ram()
    }

    /// Seed PRG-RAM from a previous session
    pub fn load_save_ram(&mut self, data: &[u8]) {
        self.bus.cartridge.load_save_ram(data);
    }

    /// The diagnostic the CPU parked on, if any
    pub fn fault(&self) -> Option<Fault> {
        self.cpu.fault()
    }

    /// Total CPU cycles executed
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Shared access to the bus (debugging and tests)
    pub fn bus(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Shared access to the CPU (debugging and tests)
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The active configuration
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    // ========================================
    // Save States
    // ========================================

    /// Capture the complete machine state
    pub fn save_state(&self) -> SaveState {
        SaveState::capture(
            &self.cpu,
            self.bus.ram(),
            &self.bus.ppu,
            &self.bus.apu,
            &self.bus.controllers,
            self.bus.cartridge.save_state(),
        )
    }

    /// Restore a previously captured machine state
    pub fn load_state(&mut self, state: &SaveState) {
        self.cpu = state.cpu.clone();
        self.bus.load_ram(&state.ram);
        self.bus.ppu = state.ppu.clone();
        self.bus.ppu.normalize_buffers();
        self.bus.apu = state.apu.clone();
        self.bus.controllers = state.controllers;
        self.bus.cartridge.load_state(&state.mapper);

        self.audio_buffer.clear();
        self.sample_clock.reset();
    }
}
