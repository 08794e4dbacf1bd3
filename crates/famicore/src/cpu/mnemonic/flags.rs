use crate::bus::Bus;
use crate::cpu::status::Status;
use crate::cpu::Cpu;

#[inline]
fn exec_flag<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8, flag: Status, value: bool) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.p.set(flag, value);
}

/// CLC - Clear Carry Flag.
#[inline]
pub fn exec_clc<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    exec_flag(cpu, bus, step, Status::CARRY, false);
}

/// CLD - Clear Decimal Mode. Stored but never consulted on this chip.
#[inline]
pub fn exec_cld<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    exec_flag(cpu, bus, step, Status::DECIMAL, false);
}

/// CLI - Clear Interrupt Disable.
#[inline]
pub fn exec_cli<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    exec_flag(cpu, bus, step, Status::INTERRUPT, false);
}

/// CLV - Clear Overflow Flag.
#[inline]
pub fn exec_clv<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    exec_flag(cpu, bus, step, Status::OVERFLOW, false);
}

/// SEC - Set Carry Flag.
#[inline]
pub fn exec_sec<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    exec_flag(cpu, bus, step, Status::CARRY, true);
}

/// SED - Set Decimal Mode.
#[inline]
pub fn exec_sed<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    exec_flag(cpu, bus, step, Status::DECIMAL, true);
}

/// SEI - Set Interrupt Disable.
#[inline]
pub fn exec_sei<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    exec_flag(cpu, bus, step, Status::INTERRUPT, true);
}
