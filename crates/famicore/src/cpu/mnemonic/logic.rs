use crate::bus::Bus;
use crate::cpu::status::Status;
use crate::cpu::Cpu;

/// AND - "AND" Memory with Accumulator
/// Operation: A & M → A. Sets Z/N.
#[inline]
pub fn exec_and<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    cpu.a &= value;
    cpu.p.set_zn(cpu.a);
}

/// ORA - "OR" Memory with Accumulator
/// Operation: A | M → A. Sets Z/N.
#[inline]
pub fn exec_ora<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    cpu.a |= value;
    cpu.p.set_zn(cpu.a);
}

/// EOR - "Exclusive OR" Memory with Accumulator
/// Operation: A ^ M → A. Sets Z/N.
#[inline]
pub fn exec_eor<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    cpu.a ^= value;
    cpu.p.set_zn(cpu.a);
}

/// NV-BDIZC
/// ✓✓----✓-
///
/// BIT - Test Bits in Memory with Accumulator
/// Operation: A & M → Z; M7 → N; M6 → V
///
/// Z reflects the AND of accumulator and operand; N and V are copied
/// straight from the operand's top two bits, regardless of A.
#[inline]
pub fn exec_bit<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    cpu.p.set(Status::ZERO, cpu.a & value == 0);
    cpu.p.set(Status::NEGATIVE, value & 0x80 != 0);
    cpu.p.set(Status::OVERFLOW, value & 0x40 != 0);
}
