//! Cycle-accurate NES/Famicom core.
//!
//! The crate models the three interlocked subsystems of the console - the
//! 6502-family CPU, the 2C02-family PPU and the bus-level address decoder -
//! at per-bus-cycle granularity, with the APU and controllers as opaque
//! register stubs. The [`Nes`] coordinator owns every component; the bus and
//! the peripherals only ever hold borrows for the duration of a single
//! cycle, so there is no reference counting anywhere in the hot path.

use std::path::Path;

use tracing::debug;

use crate::apu::Apu;
use crate::bus::{CpuBus, OpenBus};
use crate::cartridge::Cartridge;
use crate::controller::{Button, Controller};
use crate::cpu::{Cpu, CpuSnapshot};
use crate::error::Error;
use crate::mem::blocks::WorkRam;
use crate::ppu::Ppu;
use crate::region::{Region, Timing};
use crate::reset_kind::ResetKind;
use crate::state::{Reader, SlotVisitor, Writer};

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod mem;
pub mod memory;
pub mod ppu;
pub mod region;
pub mod reset_kind;
pub mod state;

const STATE_MAGIC: [u8; 4] = *b"FMC0";

/// Builder making the power-on configuration explicit.
#[derive(Debug, Clone, Copy)]
pub struct NesBuilder {
    region: Region,
    power_on_reset: bool,
}

impl Default for NesBuilder {
    fn default() -> Self {
        Self {
            region: Region::Auto,
            power_on_reset: true,
        }
    }
}

impl NesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the region; `Auto` resolves from the ROM header on load.
    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Disables the initial power-on reset (tests that want a cold core).
    pub fn power_on_reset(mut self, enabled: bool) -> Self {
        self.power_on_reset = enabled;
        self
    }

    pub fn build(self) -> Nes {
        let timing = self.region.timing();
        let mut nes = Nes {
            cpu: Cpu::new(),
            ppu: Ppu::new(timing),
            apu: Apu::new(),
            ram: WorkRam::new(),
            cartridge: None,
            controllers: [Controller::new(), Controller::new()],
            open_bus: OpenBus::new(),
            pending_oam_dma: None,
            cycles: 0,
            pal_phase: 0,
            config_region: self.region,
            timing,
        };
        if self.power_on_reset {
            nes.reset(ResetKind::PowerOn);
        }
        nes
    }
}

/// The console: sole owner of every component and the only place where the
/// per-cycle bus view is assembled.
#[derive(Debug)]
pub struct Nes {
    cpu: Cpu,
    ppu: Ppu,
    apu: Apu,
    ram: WorkRam,
    cartridge: Option<Cartridge>,
    controllers: [Controller; 2],
    /// CPU data-bus latch for floating reads.
    open_bus: OpenBus,
    /// Page written to `$4014`, waiting for the next instruction boundary.
    pending_oam_dma: Option<u8>,
    /// CPU cycles since power-on.
    cycles: u64,
    /// CPU-cycle counter modulo five for PAL's extra PPU dot.
    pal_phase: u8,
    /// User-selected region; `Auto` defers to the ROM header.
    config_region: Region,
    timing: &'static Timing,
}

/// Assembles the borrowed per-cycle bus view.
macro_rules! cpu_bus {
    ($nes:ident) => {
        CpuBus {
            ram: &mut $nes.ram,
            ppu: &mut $nes.ppu,
            apu: &mut $nes.apu,
            cartridge: $nes.cartridge.as_mut(),
            controllers: &mut $nes.controllers,
            open_bus: &mut $nes.open_bus,
            pending_oam_dma: &mut $nes.pending_oam_dma,
            cycles: &mut $nes.cycles,
            timing: $nes.timing,
            pal_phase: &mut $nes.pal_phase,
        }
    };
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    /// A powered-on console with no cartridge inserted.
    pub fn new() -> Self {
        NesBuilder::new().build()
    }

    pub fn builder() -> NesBuilder {
        NesBuilder::new()
    }

    /// Loads a cartridge from disk (with its battery RAM sidecar), inserts
    /// it and power-cycles the console.
    pub fn load_cartridge_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let cartridge = Cartridge::from_file(path)?;
        self.insert_cartridge(cartridge);
        Ok(())
    }

    /// Inserts an already-parsed cartridge and power-cycles the console.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        let region = Region::resolve(self.config_region, cartridge.header().tv_system);
        self.timing = region.timing();
        self.ppu.set_timing(self.timing);
        debug!(%region, mapper = cartridge.mapper().id(), "cartridge inserted");
        self.cartridge = Some(cartridge);
        self.reset(ResetKind::PowerOn);
    }

    /// Removes the cartridge, writing battery RAM out first.
    pub fn eject_cartridge(&mut self) {
        if let Some(cartridge) = self.cartridge.take() {
            cartridge.persist_battery_ram();
        }
        self.reset(ResetKind::PowerOn);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Applies a power-on or soft reset across every component, then runs
    /// the CPU reset sequence.
    pub fn reset(&mut self, kind: ResetKind) {
        if kind == ResetKind::PowerOn {
            self.ram.fill(0);
        }
        self.ppu.reset(kind);
        self.apu.reset(kind);
        if let Some(cartridge) = self.cartridge.as_mut() {
            cartridge.reset(kind);
        }
        self.open_bus.reset();
        self.pending_oam_dma = None;
        self.cycles = 0;
        self.pal_phase = 0;

        let mut bus = cpu_bus!(self);
        self.cpu.reset(&mut bus, kind);
    }

    /// Advances the machine by one CPU cycle (three PPU dots, 3.2 on PAL).
    pub fn step_cpu_cycle(&mut self) {
        let mut bus = cpu_bus!(self);
        self.cpu.step_cycle(&mut bus);
    }

    /// Runs until the PPU finishes the current frame.
    pub fn run_frame(&mut self) {
        let frame = self.ppu.frame_count();
        while self.ppu.frame_count() == frame {
            self.step_cpu_cycle();
        }
    }

    /// Executes exactly one instruction (or one interrupt/DMA sequence).
    /// A jammed CPU only burns one cycle per call.
    pub fn step_instruction(&mut self) {
        let mut seen_active = false;
        loop {
            self.step_cpu_cycle();
            if self.cpu.jammed() {
                break;
            }
            if self.cpu.mid_instruction() {
                seen_active = true;
            } else if seen_active {
                break;
            }
        }
    }

    /// Reads a CPU-visible byte without advancing timing.
    pub fn peek_cpu_byte(&mut self, addr: u16) -> u8 {
        let mut bus = cpu_bus!(self);
        bus.peek(addr)
    }

    /// Updates a controller button (port 0 or 1).
    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        if let Some(pad) = self.controllers.get_mut(port) {
            pad.set_button(button, pressed);
        }
    }

    /// RGB24 framebuffer of the last rendered lines.
    pub fn framebuffer(&self) -> &[u8] {
        self.ppu.framebuffer()
    }

    pub fn frame_count(&self) -> u64 {
        self.ppu.frame_count()
    }

    /// CPU cycles since power-on.
    pub fn cpu_cycles(&self) -> u64 {
        self.cycles
    }

    pub fn cpu_snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    /// `(scanline, dot)` of the PPU, for tracing.
    pub fn ppu_position(&self) -> (i16, u16) {
        self.ppu.position()
    }

    pub fn region_timing(&self) -> &'static Timing {
        self.timing
    }

    // Save states ------------------------------------------------------------

    /// Serializes the core state as a flat list of primitive slots.
    pub fn save_state(&mut self) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.bytes(&mut STATE_MAGIC.clone());
        self.persist_with(&mut writer);
        writer.finish()
    }

    /// Restores a snapshot produced by [`Nes::save_state`]. Returns `false`
    /// (leaving the core in a mixed state no worse than a fresh reset) when
    /// the buffer is missing data; the caller may retry or reset.
    pub fn load_state(&mut self, bytes: &[u8]) -> bool {
        let mut reader = Reader::new(bytes);
        let mut magic = [0u8; 4];
        reader.bytes(&mut magic);
        if magic != STATE_MAGIC {
            tracing::warn!("save state rejected: bad magic");
            return false;
        }
        self.persist_with(&mut reader);
        if reader.truncated() {
            tracing::warn!("save state truncated; state only partially restored");
            return false;
        }
        true
    }

    fn persist_with<V: SlotVisitor>(&mut self, visitor: &mut V) {
        self.cpu.persist_with(visitor);
        visitor.bytes(self.ram.as_mut_slice());
        self.ppu.persist_with(visitor);
        self.apu.persist_with(visitor);
        for pad in self.controllers.iter_mut() {
            pad.persist_with(visitor);
        }
        let mut open_bus = self.open_bus.sample();
        visitor.u8(&mut open_bus);
        self.open_bus.latch(open_bus);
        visitor.u64(&mut self.cycles);
        visitor.u8(&mut self.pal_phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::test_support::ines_image;

    /// Builds a console around a 32 KiB NROM image whose PRG the test can
    /// lay out freely (vectors live at file offsets `$7FFA..$7FFF`).
    fn nes_with_program(setup: impl FnOnce(&mut [u8])) -> Nes {
        let mut prg = vec![0xEA; 32 * 1024]; // NOP carpet
        prg[0x7FFC] = 0x00; // reset vector $8000
        prg[0x7FFD] = 0x80;
        setup(&mut prg);
        let image = ines_image(&prg, &[], 0, 0);
        let cartridge = Cartridge::from_bytes(&image).unwrap();
        let mut nes = Nes::new();
        nes.insert_cartridge(cartridge);
        nes
    }

    #[test]
    fn reset_reads_vector_from_cartridge() {
        let nes = nes_with_program(|_| {});
        let snapshot = nes.cpu_snapshot();
        assert_eq!(snapshot.pc, 0x8000);
        assert_eq!(snapshot.s, 0xFD);
        assert_ne!(snapshot.p & 0x04, 0, "I must be set after reset");
    }

    #[test]
    fn instruction_timing_is_visible_in_the_cycle_counter() {
        let mut nes = nes_with_program(|prg| {
            prg[0] = 0xA9; // LDA #$01
            prg[1] = 0x01;
            prg[2] = 0x8D; // STA $0203
            prg[3] = 0x03;
            prg[4] = 0x02;
        });

        let before = nes.cpu_cycles();
        nes.step_instruction();
        assert_eq!(nes.cpu_cycles() - before, 2, "LDA immediate is 2 cycles");

        let before = nes.cpu_cycles();
        nes.step_instruction();
        assert_eq!(nes.cpu_cycles() - before, 4, "STA absolute is 4 cycles");
        assert_eq!(nes.ram[0x0203], 0x01);
    }

    #[test]
    fn nmi_handler_runs_during_vblank() {
        let mut nes = nes_with_program(|prg| {
            // $8000: enable NMI, then spin.
            let program = [
                0xA9, 0x80, // LDA #$80
                0x8D, 0x00, 0x20, // STA $2000
                0x4C, 0x05, 0x80, // JMP $8005
            ];
            prg[..program.len()].copy_from_slice(&program);
            // $9000: NMI handler stores a marker and returns.
            let handler = [
                0xA9, 0x42, // LDA #$42
                0x8D, 0x00, 0x02, // STA $0200
                0x40, // RTI
            ];
            prg[0x1000..0x1000 + handler.len()].copy_from_slice(&handler);
            prg[0x7FFA] = 0x00; // NMI vector $9000
            prg[0x7FFB] = 0x90;
        });

        nes.run_frame();
        nes.run_frame();
        assert_eq!(nes.ram[0x0200], 0x42);
    }

    #[test]
    fn oam_dma_copies_a_page_and_preserves_oamaddr() {
        let mut nes = nes_with_program(|prg| {
            let program = [
                0xA9, 0x37, // LDA #$37
                0x8D, 0x03, 0x20, // STA $2003 (OAMADDR)
                0xA9, 0x02, // LDA #$02
                0x8D, 0x14, 0x40, // STA $4014
            ];
            prg[..program.len()].copy_from_slice(&program);
        });

        for i in 0..256usize {
            nes.ram[0x0200 + i] = (i as u8).wrapping_mul(3);
        }

        // Four instructions set OAMADDR and trigger the DMA; the fifth
        // "instruction" is the stall itself.
        for _ in 0..5 {
            nes.step_instruction();
        }

        assert_eq!(nes.ppu.registers.oam_addr, 0x37);
        for i in 0..256usize {
            let oam_index = (0x37 + i) & 0xFF;
            assert_eq!(
                nes.ppu.registers.oam[oam_index],
                (i as u8).wrapping_mul(3),
                "OAM byte {oam_index}"
            );
        }
    }

    #[test]
    fn identical_runs_produce_identical_output() {
        let build = || {
            nes_with_program(|prg| {
                let program = [
                    0xA9, 0x1E, // LDA #$1E (both layers + left columns)
                    0x8D, 0x01, 0x20, // STA $2001
                    0x4C, 0x05, 0x80, // spin
                ];
                prg[..program.len()].copy_from_slice(&program);
            })
        };

        let mut first = build();
        let mut second = build();
        for _ in 0..3 {
            first.run_frame();
            second.run_frame();
        }

        assert_eq!(first.framebuffer(), second.framebuffer());
        assert_eq!(first.cpu_snapshot(), second.cpu_snapshot());
        assert_eq!(first.cpu_cycles(), second.cpu_cycles());
        assert_eq!(first.ppu_position(), second.ppu_position());
    }

    #[test]
    fn save_state_round_trips() {
        let mut nes = nes_with_program(|_| {});
        nes.run_frame();
        let reference = nes.save_state();

        let mut other = nes_with_program(|_| {});
        assert!(other.load_state(&reference));
        assert_eq!(other.cpu_snapshot(), nes.cpu_snapshot());
        assert_eq!(other.cpu_cycles(), nes.cpu_cycles());
        assert_eq!(other.ppu_position(), nes.ppu_position());

        assert!(!other.load_state(&reference[..reference.len() - 4]));
        assert!(!other.load_state(b"nope"));
    }

    #[test]
    fn open_bus_returns_last_driven_value() {
        let mut nes = nes_with_program(|prg| {
            let program = [
                0xA9, 0x5A, // LDA #$5A
                0x8D, 0x00, 0x03, // STA $0300 (drives the bus with $5A... then)
                0xAD, 0x18, 0x40, // LDA $4018 (APU test space floats)
                0x8D, 0x00, 0x02, // STA $0200
            ];
            prg[..program.len()].copy_from_slice(&program);
        });

        for _ in 0..4 {
            nes.step_instruction();
        }
        // The float read returns the high byte of $4018 left on the bus by
        // the operand fetch.
        assert_eq!(nes.ram[0x0200], 0x40);
    }
}
