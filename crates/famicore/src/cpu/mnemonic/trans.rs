use crate::bus::Bus;
use crate::cpu::Cpu;

/// TAX - Transfer Accumulator to X. Sets Z/N from the value.
#[inline]
pub fn exec_tax<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.x = cpu.a;
    cpu.p.set_zn(cpu.x);
}

/// TAY - Transfer Accumulator to Y.
#[inline]
pub fn exec_tay<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.y = cpu.a;
    cpu.p.set_zn(cpu.y);
}

/// TSX - Transfer Stack Pointer to X.
#[inline]
pub fn exec_tsx<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.x = cpu.s;
    cpu.p.set_zn(cpu.x);
}

/// TXA - Transfer X to Accumulator.
#[inline]
pub fn exec_txa<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.a = cpu.x;
    cpu.p.set_zn(cpu.a);
}

/// TXS - Transfer X to Stack Pointer. The only transfer that leaves the
/// flags untouched.
#[inline]
pub fn exec_txs<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.s = cpu.x;
}

/// TYA - Transfer Y to Accumulator.
#[inline]
pub fn exec_tya<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.a = cpu.y;
    cpu.p.set_zn(cpu.a);
}

/// SHS (TAS) - Transfer A "AND" X to S, store masked copy (unstable)
/// Operation: A & X → S; S & (hb + 1) → M
#[inline]
pub fn exec_shs<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    cpu.s = cpu.a & cpu.x;
    let value = cpu.s & cpu.base_hi.wrapping_add(1);
    bus.write_cycle(cpu.effective_addr, value, cpu);
}
