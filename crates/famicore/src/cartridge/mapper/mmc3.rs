//! Mapper 4 (MMC3-style board).
//!
//! Register map (CPU side, even/odd address pairs):
//!
//! | Address          | Even write          | Odd write            |
//! |------------------|---------------------|----------------------|
//! | `$8000-$9FFF`    | bank select         | bank data            |
//! | `$A000-$BFFF`    | mirroring           | PRG-RAM protect      |
//! | `$C000-$DFFF`    | IRQ latch           | IRQ reload strobe    |
//! | `$E000-$FFFF`    | IRQ disable + ack   | IRQ enable           |
//!
//! PRG-ROM is banked in 8 KiB slots with two layouts (bank-select bit 6);
//! CHR is banked as two 2 KiB plus four 1 KiB windows, optionally swapped
//! between the halves of the pattern space (bank-select bit 7). The IRQ
//! counter is clocked by the PPU's filtered A12 rising edge: it reloads from
//! the latch when zero or when a reload is pending, otherwise decrements,
//! and asserts IRQ when it reaches zero while enabled.

use crate::cartridge::header::{Header, Mirroring};
use crate::cartridge::mapper::{ChrStorage, Mapper};
use crate::memory::cpu as cpu_mem;

const PRG_BANK_SIZE: usize = 8 * 1024;
const CHR_BANK_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub struct Mmc3 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: ChrStorage,
    battery: bool,

    /// `$8000`: bits 0-2 target register, bit 6 PRG mode, bit 7 CHR inversion.
    bank_select: u8,
    /// R0-R7 bank registers.
    bank_regs: [u8; 8],
    mirroring: Mirroring,
    /// Hardwired four-screen boards ignore the mirroring register.
    four_screen: bool,
    prg_ram_enable: bool,
    prg_ram_write_protect: bool,

    irq_latch: u8,
    irq_counter: u8,
    /// Set by the `$C001` strobe; the next A12 clock reloads instead of
    /// decrementing.
    irq_reload: bool,
    irq_enabled: bool,
    irq_pending: bool,
}

impl Mmc3 {
    pub fn new(header: &Header, prg_rom: Vec<u8>, chr_rom: Vec<u8>) -> Self {
        Self {
            prg_rom,
            prg_ram: vec![0; header.prg_ram_size],
            chr: ChrStorage::select(header, chr_rom),
            battery: header.battery_backed_ram,
            bank_select: 0,
            bank_regs: [0; 8],
            mirroring: if header.mirroring == Mirroring::FourScreen {
                Mirroring::FourScreen
            } else {
                Mirroring::Vertical
            },
            four_screen: header.mirroring == Mirroring::FourScreen,
            prg_ram_enable: true,
            prg_ram_write_protect: false,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
        }
    }

    fn prg_bank_count(&self) -> usize {
        self.prg_rom.len() / PRG_BANK_SIZE
    }

    fn prg_bank(&self, reg: u8) -> usize {
        let count = self.prg_bank_count();
        if count == 0 {
            0
        } else {
            reg as usize % count
        }
    }

    fn read_prg_rom(&self, addr: u16) -> u8 {
        if self.prg_rom.is_empty() {
            return 0;
        }
        let count = self.prg_bank_count();
        let last = count.saturating_sub(1);
        let second_last = count.saturating_sub(2);
        let slot = (addr as usize - cpu_mem::PRG_ROM_START as usize) / PRG_BANK_SIZE;
        let swap_at_c000 = self.bank_select & 0x40 != 0;

        let bank = match (slot, swap_at_c000) {
            (0, false) => self.prg_bank(self.bank_regs[6]),
            (0, true) => second_last,
            (1, _) => self.prg_bank(self.bank_regs[7]),
            (2, false) => second_last,
            (2, true) => self.prg_bank(self.bank_regs[6]),
            _ => last,
        };

        let offset = (addr as usize - cpu_mem::PRG_ROM_START as usize) % PRG_BANK_SIZE;
        self.prg_rom[bank * PRG_BANK_SIZE + offset]
    }

    /// Resolves a pattern-space address to a CHR byte index, applying the
    /// 2 KiB / 1 KiB window layout and the A12 inversion bit.
    fn chr_index(&self, addr: u16) -> usize {
        let mut a = addr & 0x1FFF;
        if self.bank_select & 0x80 != 0 {
            // Inversion swaps the $0000 and $1000 halves.
            a ^= 0x1000;
        }

        let (bank, inner) = match a {
            0x0000..=0x07FF => ((self.bank_regs[0] & !1) as usize, (a & 0x07FF) as usize),
            0x0800..=0x0FFF => ((self.bank_regs[1] & !1) as usize, (a & 0x07FF) as usize),
            0x1000..=0x13FF => (self.bank_regs[2] as usize, (a & 0x03FF) as usize),
            0x1400..=0x17FF => (self.bank_regs[3] as usize, (a & 0x03FF) as usize),
            0x1800..=0x1BFF => (self.bank_regs[4] as usize, (a & 0x03FF) as usize),
            _ => (self.bank_regs[5] as usize, (a & 0x03FF) as usize),
        };

        bank * CHR_BANK_SIZE + inner
    }

    fn prg_ram_index(&self, addr: u16) -> Option<usize> {
        if self.prg_ram.is_empty() || !self.prg_ram_enable {
            return None;
        }
        Some((addr - cpu_mem::PRG_RAM_START) as usize % self.prg_ram.len())
    }
}

impl Mapper for Mmc3 {
    fn read_prg(&mut self, addr: u16) -> Option<u8> {
        match addr {
            cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END => {
                self.prg_ram_index(addr).map(|idx| self.prg_ram[idx])
            }
            cpu_mem::PRG_ROM_START..=cpu_mem::CPU_ADDR_END => Some(self.read_prg_rom(addr)),
            _ => None,
        }
    }

    fn write_prg(&mut self, addr: u16, data: u8) {
        match addr {
            cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END => {
                if !self.prg_ram_write_protect {
                    if let Some(idx) = self.prg_ram_index(addr) {
                        self.prg_ram[idx] = data;
                    }
                }
            }
            0x8000..=0x9FFF => {
                if addr & 1 == 0 {
                    self.bank_select = data;
                } else {
                    let target = (self.bank_select & 0x07) as usize;
                    self.bank_regs[target] = data;
                }
            }
            0xA000..=0xBFFF => {
                if addr & 1 == 0 {
                    if !self.four_screen {
                        self.mirroring = if data & 1 == 0 {
                            Mirroring::Vertical
                        } else {
                            Mirroring::Horizontal
                        };
                    }
                } else {
                    self.prg_ram_write_protect = data & 0x40 != 0;
                    self.prg_ram_enable = data & 0x80 != 0;
                }
            }
            0xC000..=0xDFFF => {
                if addr & 1 == 0 {
                    self.irq_latch = data;
                } else {
                    self.irq_reload = true;
                    self.irq_counter = 0;
                }
            }
            0xE000..=0xFFFF => {
                if addr & 1 == 0 {
                    // Disable also acknowledges any pending IRQ.
                    self.irq_enabled = false;
                    self.irq_pending = false;
                } else {
                    self.irq_enabled = true;
                }
            }
            _ => {}
        }
    }

    fn read_chr(&mut self, addr: u16) -> u8 {
        let idx = self.chr_index(addr);
        self.chr.read(idx % self.chr.len().max(1))
    }

    fn write_chr(&mut self, addr: u16, data: u8) {
        let idx = self.chr_index(addr);
        let len = self.chr.len().max(1);
        self.chr.write(idx % len, data);
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn clock_irq(&mut self) {
        if self.irq_reload || self.irq_counter == 0 {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter = self.irq_counter.wrapping_sub(1);
        }

        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    fn battery_ram(&self) -> Option<&[u8]> {
        (self.battery && !self.prg_ram.is_empty()).then_some(self.prg_ram.as_slice())
    }

    fn battery_ram_mut(&mut self) -> Option<&mut [u8]> {
        (self.battery && !self.prg_ram.is_empty()).then_some(self.prg_ram.as_mut_slice())
    }

    fn id(&self) -> u16 {
        4
    }

    fn name(&self) -> &'static str {
        "MMC3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::header::TvSystem;

    fn mmc3(prg_banks: usize, chr_size: usize) -> Mmc3 {
        let header = Header {
            mapper: 4,
            mirroring: Mirroring::Horizontal,
            battery_backed_ram: false,
            trainer_present: false,
            prg_rom_size: prg_banks * PRG_BANK_SIZE,
            chr_rom_size: chr_size,
            prg_ram_size: 8 * 1024,
            chr_ram_size: if chr_size == 0 { 8 * 1024 } else { 0 },
            tv_system: TvSystem::Ntsc,
        };
        // Tag each PRG bank with its own index for easy assertions.
        let prg: Vec<u8> = (0..header.prg_rom_size)
            .map(|i| (i / PRG_BANK_SIZE) as u8)
            .collect();
        let chr: Vec<u8> = (0..chr_size).map(|i| (i / CHR_BANK_SIZE) as u8).collect();
        Mmc3::new(&header, prg, chr)
    }

    #[test]
    fn fixed_banks_follow_prg_mode() {
        let mut cart = mmc3(8, 0x2000);
        // Mode 0: $C000 is the second-to-last bank, $E000 the last.
        assert_eq!(cart.read_prg(0xC000), Some(6));
        assert_eq!(cart.read_prg(0xE000), Some(7));
        // Mode 1 swaps the fixed window to $8000.
        cart.write_prg(0x8000, 0x40);
        assert_eq!(cart.read_prg(0x8000), Some(6));
        assert_eq!(cart.read_prg(0xE000), Some(7));
    }

    #[test]
    fn bank_register_selects_prg() {
        let mut cart = mmc3(8, 0x2000);
        cart.write_prg(0x8000, 6); // target R6
        cart.write_prg(0x8001, 3);
        assert_eq!(cart.read_prg(0x8000), Some(3));
    }

    #[test]
    fn chr_inversion_swaps_halves() {
        let mut cart = mmc3(2, 0x8000);
        cart.write_prg(0x8000, 0); // R0
        cart.write_prg(0x8001, 4); // 2 KiB bank at $0000 -> CHR banks 4/5
        assert_eq!(cart.read_chr(0x0000), 4);
        cart.write_prg(0x8000, 0x80); // invert
        assert_eq!(cart.read_chr(0x1000), 4);
    }

    #[test]
    fn irq_counter_reload_and_assert() {
        let mut cart = mmc3(2, 0x2000);
        cart.write_prg(0xC000, 2); // latch
        cart.write_prg(0xC001, 0); // reload strobe
        cart.write_prg(0xE001, 0); // enable
        cart.clock_irq(); // reload -> 2
        assert!(!cart.irq_pending());
        cart.clock_irq(); // 1
        assert!(!cart.irq_pending());
        cart.clock_irq(); // 0 -> IRQ
        assert!(cart.irq_pending());
        // Disabling acknowledges.
        cart.write_prg(0xE000, 0);
        assert!(!cart.irq_pending());
    }

    #[test]
    fn zero_latch_fires_every_clock() {
        let mut cart = mmc3(2, 0x2000);
        cart.write_prg(0xC000, 0);
        cart.write_prg(0xC001, 0);
        cart.write_prg(0xE001, 0);
        cart.clock_irq();
        assert!(cart.irq_pending());
    }

    #[test]
    fn mirroring_register() {
        let mut cart = mmc3(2, 0x2000);
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        cart.write_prg(0xA000, 1);
        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
    }
}
