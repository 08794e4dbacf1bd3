//! Production CPU bus: address decoding plus the per-cycle clock machinery.
//!
//! `CpuBus` borrows every device from the coordinator for the duration of one
//! call, so ownership stays at the system level without reference counting.
//! Each primitive performs the access first, then runs the fixed per-cycle
//! sequence: one APU tick, two PPU dots, the CPU interrupt-input poll, the
//! third PPU dot (plus PAL's catch-up dot every fifth cycle), and finally the
//! PPU open-bus decay accounting.

use crate::apu::Apu;
use crate::bus::{Bus, OpenBus};
use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::cpu::Cpu;
use crate::mem::blocks::WorkRam;
use crate::memory::cpu as cpu_mem;
use crate::ppu::Ppu;
use crate::region::Timing;

/// Mutable view of the machine as seen from the CPU for one bus call.
pub struct CpuBus<'a> {
    pub(crate) ram: &'a mut WorkRam,
    pub(crate) ppu: &'a mut Ppu,
    pub(crate) apu: &'a mut Apu,
    pub(crate) cartridge: Option<&'a mut Cartridge>,
    pub(crate) controllers: &'a mut [Controller; 2],
    pub(crate) open_bus: &'a mut OpenBus,
    pub(crate) pending_oam_dma: &'a mut Option<u8>,
    pub(crate) cycles: &'a mut u64,
    pub(crate) timing: &'static Timing,
    /// Counts CPU cycles modulo five for PAL's extra dot.
    pub(crate) pal_phase: &'a mut u8,
}

impl CpuBus<'_> {
    /// Level of the IRQ line: wired-OR of the APU and mapper outputs.
    fn irq_line(&self) -> bool {
        let mapper_irq = self
            .cartridge
            .as_deref()
            .map(Cartridge::irq_pending)
            .unwrap_or(false);
        self.apu.irq_pending() || mapper_irq
    }

    /// The fixed per-cycle sequence that follows every access.
    fn clock(&mut self, cpu: &mut Cpu) {
        self.apu.tick();

        self.ppu.dot(self.cartridge.as_deref_mut());
        self.ppu.dot(self.cartridge.as_deref_mut());
        cpu.poll_interrupt_inputs(self.ppu.nmi_line(), self.irq_line());
        self.ppu.dot(self.cartridge.as_deref_mut());

        let mut dots = 3;
        if self.timing.extra_dot_every_fifth_cycle {
            *self.pal_phase += 1;
            if *self.pal_phase == 5 {
                *self.pal_phase = 0;
                self.ppu.dot(self.cartridge.as_deref_mut());
                dots = 4;
            }
        }
        self.ppu.tick_open_bus(dots);
    }

    fn decode_read(&mut self, addr: u16) -> u8 {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_MIRROR_END => {
                self.ppu.read_register(addr, self.cartridge.as_deref_mut())
            }
            cpu_mem::OAM_DMA => self.open_bus.sample(),
            cpu_mem::APU_STATUS => match self.apu.read(addr) {
                // Bit 5 of $4015 is not driven.
                Some(value) => value | (self.open_bus.sample() & 0x20),
                None => self.open_bus.sample(),
            },
            cpu_mem::CONTROLLER_PORT_1 => {
                (self.open_bus.sample() & 0xE0) | (self.controllers[0].read() & 0x1F)
            }
            cpu_mem::CONTROLLER_PORT_2 => {
                (self.open_bus.sample() & 0xE0) | (self.controllers[1].read() & 0x1F)
            }
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_CHANNEL_END => self
                .apu
                .read(addr)
                .unwrap_or_else(|| self.open_bus.sample()),
            cpu_mem::TEST_MODE_BASE..=cpu_mem::TEST_MODE_END => self.open_bus.sample(),
            _ => match self.cartridge.as_deref_mut() {
                Some(cart) => cart
                    .read_prg(addr)
                    .unwrap_or_else(|| self.open_bus.sample()),
                None => self.open_bus.sample(),
            },
        }
    }

    fn decode_write(&mut self, addr: u16, data: u8) {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize] = data;
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_MIRROR_END => {
                self.ppu
                    .write_register(addr, data, self.cartridge.as_deref_mut());
            }
            cpu_mem::OAM_DMA => *self.pending_oam_dma = Some(data),
            cpu_mem::CONTROLLER_PORT_1 => {
                for pad in self.controllers.iter_mut() {
                    pad.write_strobe(data);
                }
            }
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_CHANNEL_END
            | cpu_mem::APU_STATUS
            | cpu_mem::CONTROLLER_PORT_2 => self.apu.write(addr, data),
            cpu_mem::TEST_MODE_BASE..=cpu_mem::TEST_MODE_END => {}
            _ => {
                if let Some(cart) = self.cartridge.as_deref_mut() {
                    cart.write_prg(addr, data);
                }
            }
        }
    }

    /// Side-effect-free read for debuggers and test harnesses; does not
    /// advance timing or disturb latches.
    pub fn peek(&mut self, addr: u16) -> u8 {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_MIRROR_END => {
                self.ppu.peek_register(addr)
            }
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::TEST_MODE_END => self.open_bus.sample(),
            _ => match self.cartridge.as_deref_mut() {
                Some(cart) => cart
                    .read_prg(addr)
                    .unwrap_or_else(|| self.open_bus.sample()),
                None => self.open_bus.sample(),
            },
        }
    }
}

impl Bus for CpuBus<'_> {
    fn read_cycle(&mut self, addr: u16, cpu: &mut Cpu) -> u8 {
        *self.cycles = self.cycles.wrapping_add(1);
        let value = self.decode_read(addr);
        self.open_bus.latch(value);
        self.clock(cpu);
        value
    }

    fn write_cycle(&mut self, addr: u16, data: u8, cpu: &mut Cpu) {
        *self.cycles = self.cycles.wrapping_add(1);
        self.open_bus.latch(data);
        self.decode_write(addr, data);
        self.clock(cpu);
    }

    fn idle_cycle(&mut self, cpu: &mut Cpu) {
        *self.cycles = self.cycles.wrapping_add(1);
        self.clock(cpu);
    }

    fn cycles(&self) -> u64 {
        *self.cycles
    }

    fn take_oam_dma(&mut self) -> Option<u8> {
        self.pending_oam_dma.take()
    }
}
