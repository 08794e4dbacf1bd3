use crate::bus::Bus;
use crate::cpu::addressing::AddrMode;
use crate::cpu::status::Status;
use crate::cpu::Cpu;

#[inline]
pub(crate) fn asl(cpu: &mut Cpu, value: u8) -> u8 {
    cpu.p.set(Status::CARRY, value & 0x80 != 0);
    let result = value << 1;
    cpu.p.set_zn(result);
    result
}

#[inline]
pub(crate) fn lsr(cpu: &mut Cpu, value: u8) -> u8 {
    cpu.p.set(Status::CARRY, value & 0x01 != 0);
    let result = value >> 1;
    cpu.p.set_zn(result);
    result
}

#[inline]
pub(crate) fn rol(cpu: &mut Cpu, value: u8) -> u8 {
    let carry_in = cpu.p.c() as u8;
    cpu.p.set(Status::CARRY, value & 0x80 != 0);
    let result = (value << 1) | carry_in;
    cpu.p.set_zn(result);
    result
}

#[inline]
pub(crate) fn ror(cpu: &mut Cpu, value: u8) -> u8 {
    let carry_in = (cpu.p.c() as u8) << 7;
    cpu.p.set(Status::CARRY, value & 0x01 != 0);
    let result = (value >> 1) | carry_in;
    cpu.p.set_zn(result);
    result
}

/// Shared read-modify-write skeleton: read the operand, write the original
/// back while the ALU works, then write the result.
#[inline]
pub(crate) fn exec_rmw<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8, op: fn(&mut Cpu, u8) -> u8) {
    match step {
        0 => cpu.operand = bus.read_cycle(cpu.effective_addr, cpu),
        1 => {
            bus.write_cycle(cpu.effective_addr, cpu.operand, cpu);
            cpu.operand = op(cpu, cpu.operand);
        }
        2 => bus.write_cycle(cpu.effective_addr, cpu.operand, cpu),
        _ => unreachable!("invalid RMW step {step}"),
    }
}

#[inline]
fn exec_shift<B: Bus>(
    cpu: &mut Cpu,
    bus: &mut B,
    step: u8,
    mode: AddrMode,
    op: fn(&mut Cpu, u8) -> u8,
) {
    if mode == AddrMode::Accumulator {
        debug_assert_eq!(step, 0);
        let _ = bus.read_cycle(cpu.pc, cpu);
        cpu.a = op(cpu, cpu.a);
    } else {
        exec_rmw(cpu, bus, step, op);
    }
}

/// ASL - Arithmetic Shift Left. C takes the shifted-out bit 7.
#[inline]
pub fn exec_asl<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8, mode: AddrMode) {
    exec_shift(cpu, bus, step, mode, asl);
}

/// LSR - Logical Shift Right. C takes the shifted-out bit 0; N is cleared.
#[inline]
pub fn exec_lsr<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8, mode: AddrMode) {
    exec_shift(cpu, bus, step, mode, lsr);
}

/// ROL - Rotate Left through Carry.
#[inline]
pub fn exec_rol<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8, mode: AddrMode) {
    exec_shift(cpu, bus, step, mode, rol);
}

/// ROR - Rotate Right through Carry.
#[inline]
pub fn exec_ror<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8, mode: AddrMode) {
    exec_shift(cpu, bus, step, mode, ror);
}

pub(crate) use exec_rmw as rmw;
