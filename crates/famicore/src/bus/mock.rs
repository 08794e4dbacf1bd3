//! Flat-memory bus for CPU unit tests.
//!
//! Stands in for the full machine so instruction tests can count exactly how
//! many bus accesses a sequence performs. No devices, no interrupts - every
//! address is plain RAM.

use crate::bus::Bus;
use crate::cpu::Cpu;

pub(crate) struct MockBus {
    mem: Vec<u8>,
    pub(crate) reads: u64,
    pub(crate) writes: u64,
    pub(crate) idles: u64,
    pub(crate) pending_dma: Option<u8>,
    cycles: u64,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            mem: vec![0; 0x1_0000],
            reads: 0,
            writes: 0,
            idles: 0,
            pending_dma: None,
            cycles: 0,
        }
    }
}

impl MockBus {
    /// Total bus accesses of any kind.
    pub(crate) fn accesses(&self) -> u64 {
        self.reads + self.writes + self.idles
    }

    pub(crate) fn reset_counters(&mut self) {
        self.reads = 0;
        self.writes = 0;
        self.idles = 0;
    }

    /// Untimed backdoor into the flat memory.
    pub(crate) fn load(&mut self, addr: u16, bytes: &[u8]) {
        let addr = addr as usize;
        self.mem[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    pub(crate) fn mem(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }
}

impl Bus for MockBus {
    fn read_cycle(&mut self, addr: u16, _cpu: &mut Cpu) -> u8 {
        self.cycles += 1;
        self.reads += 1;
        self.mem[addr as usize]
    }

    fn write_cycle(&mut self, addr: u16, data: u8, _cpu: &mut Cpu) {
        self.cycles += 1;
        self.writes += 1;
        self.mem[addr as usize] = data;
    }

    fn idle_cycle(&mut self, _cpu: &mut Cpu) {
        self.cycles += 1;
        self.idles += 1;
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }

    fn take_oam_dma(&mut self) -> Option<u8> {
        self.pending_dma.take()
    }
}
