use crate::bus::Bus;
use crate::cpu::mnemonic::shift::rmw;
use crate::cpu::Cpu;

/// INC - Increment Memory by One. Read-modify-write; sets Z/N.
#[inline]
pub fn exec_inc<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    rmw(cpu, bus, step, |cpu, value| {
        let result = value.wrapping_add(1);
        cpu.p.set_zn(result);
        result
    });
}

/// DEC - Decrement Memory by One. Read-modify-write; sets Z/N.
#[inline]
pub fn exec_dec<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    rmw(cpu, bus, step, |cpu, value| {
        let result = value.wrapping_sub(1);
        cpu.p.set_zn(result);
        result
    });
}

/// INX - Increment Index Register X.
#[inline]
pub fn exec_inx<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.x = cpu.x.wrapping_add(1);
    cpu.p.set_zn(cpu.x);
}

/// INY - Increment Index Register Y.
#[inline]
pub fn exec_iny<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.y = cpu.y.wrapping_add(1);
    cpu.p.set_zn(cpu.y);
}

/// DEX - Decrement Index Register X.
#[inline]
pub fn exec_dex<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.x = cpu.x.wrapping_sub(1);
    cpu.p.set_zn(cpu.x);
}

/// DEY - Decrement Index Register Y.
#[inline]
pub fn exec_dey<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let _ = bus.read_cycle(cpu.pc, cpu);
    cpu.y = cpu.y.wrapping_sub(1);
    cpu.p.set_zn(cpu.y);
}
