use crate::bus::Bus;
use crate::cpu::mnemonic::shift::{asl, lsr, rmw, rol, ror};
use crate::cpu::status::Status;
use crate::cpu::Cpu;

/// Shared add core for ADC/SBC/RRA. Decimal mode is ignored - this CPU has
/// no BCD circuitry.
#[inline]
pub(crate) fn add_with_carry(cpu: &mut Cpu, value: u8) {
    let sum = u16::from(cpu.a) + u16::from(value) + u16::from(cpu.p.c());
    let result = sum as u8;
    cpu.p.set(Status::CARRY, sum > 0xFF);
    // Overflow: both operands agree in sign and the result does not.
    cpu.p
        .set(Status::OVERFLOW, (cpu.a ^ result) & (value ^ result) & 0x80 != 0);
    cpu.a = result;
    cpu.p.set_zn(result);
}

#[inline]
fn compare(cpu: &mut Cpu, register: u8, value: u8) {
    let result = register.wrapping_sub(value);
    cpu.p.set(Status::CARRY, register >= value);
    cpu.p.set_zn(result);
}

/// NV-BDIZC
/// ✓✓----✓✓
///
/// ADC - Add Memory to Accumulator with Carry
/// Operation: A + M + C → A, C
///
/// C reflects the unsigned carry out of bit 7, V the signed overflow of the
/// same addition.
///
/// Addressing Mode              | Form          | Opcode | Cycles
/// ---------------------------- | ------------- | ------ | ------
/// Immediate                    | ADC #$nn      | $69    | 2
/// Absolute                     | ADC $nnnn     | $6D    | 4
/// X-Indexed Absolute           | ADC $nnnn,X   | $7D    | 4+p
/// Y-Indexed Absolute           | ADC $nnnn,Y   | $79    | 4+p
/// Zero Page                    | ADC $nn       | $65    | 3
/// X-Indexed Zero Page          | ADC $nn,X     | $75    | 4
/// X-Indexed Zero Page Indirect | ADC ($nn,X)   | $61    | 6
/// Zero Page Indirect Y-Indexed | ADC ($nn),Y   | $71    | 5+p
///
/// p: =1 if page is crossed.
#[inline]
pub fn exec_adc<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    add_with_carry(cpu, value);
}

/// SBC - Subtract Memory from Accumulator with Borrow
/// Operation: A - M - !C → A
///
/// Identical to ADC with the operand complemented; C is the inverted borrow.
#[inline]
pub fn exec_sbc<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    add_with_carry(cpu, !value);
}

/// CMP - Compare Memory and Accumulator. C = A >= M, Z/N from A - M.
#[inline]
pub fn exec_cmp<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    compare(cpu, cpu.a, value);
}

/// CPX - Compare Memory and Index Register X.
#[inline]
pub fn exec_cpx<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    compare(cpu, cpu.x, value);
}

/// CPY - Compare Memory and Index Register Y.
#[inline]
pub fn exec_cpy<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    compare(cpu, cpu.y, value);
}

/// ANC - "AND" Memory with Accumulator, Carry from Sign (undocumented)
/// Operation: A & M → A; N → C
#[inline]
pub fn exec_anc<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    cpu.a &= value;
    cpu.p.set_zn(cpu.a);
    cpu.p.set(Status::CARRY, cpu.a & 0x80 != 0);
}

/// ARR - "AND" then Rotate Right (undocumented)
/// Operation: (A & M) >> 1 | C << 7 → A
///
/// C comes from bit 6 of the result, V from bit 6 xor bit 5 - the adder is
/// involved on the real chip even though no addition happens.
#[inline]
pub fn exec_arr<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    let and = cpu.a & value;
    cpu.a = (and >> 1) | ((cpu.p.c() as u8) << 7);
    cpu.p.set_zn(cpu.a);
    cpu.p.set(Status::CARRY, cpu.a & 0x40 != 0);
    cpu.p.set(
        Status::OVERFLOW,
        ((cpu.a >> 6) ^ (cpu.a >> 5)) & 1 != 0,
    );
}

/// ASR (ALR) - "AND" then Logical Shift Right (undocumented)
/// Operation: (A & M) >> 1 → A; bit 0 → C
#[inline]
pub fn exec_asr<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    let and = cpu.a & value;
    cpu.a = lsr(cpu, and);
}

/// SBX (AXS) - Subtract Memory from A "AND" X into X (undocumented)
/// Operation: (A & X) - M → X; C = no borrow
#[inline]
pub fn exec_sbx<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    let base = cpu.a & cpu.x;
    cpu.x = base.wrapping_sub(value);
    cpu.p.set(Status::CARRY, base >= value);
    cpu.p.set_zn(cpu.x);
}

/// XAA - Non-deterministic on hardware; stubbed as X & M → A.
#[inline]
pub fn exec_xaa<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    debug_assert_eq!(step, 0);
    let value = bus.read_cycle(cpu.effective_addr, cpu);
    cpu.a = cpu.x & value;
    cpu.p.set_zn(cpu.a);
}

/// SLO - Shift Left then "OR" (undocumented read-modify-write)
/// Operation: M << 1 → M; A | M → A
#[inline]
pub fn exec_slo<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    rmw(cpu, bus, step, |cpu, value| {
        let shifted = asl(cpu, value);
        cpu.a |= shifted;
        cpu.p.set_zn(cpu.a);
        shifted
    });
}

/// SRE - Shift Right then "Exclusive OR" (undocumented read-modify-write)
/// Operation: M >> 1 → M; A ^ M → A
#[inline]
pub fn exec_sre<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    rmw(cpu, bus, step, |cpu, value| {
        let shifted = lsr(cpu, value);
        cpu.a ^= shifted;
        cpu.p.set_zn(cpu.a);
        shifted
    });
}

/// RLA - Rotate Left then "AND" (undocumented read-modify-write)
/// Operation: rol(M) → M; A & M → A
#[inline]
pub fn exec_rla<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    rmw(cpu, bus, step, |cpu, value| {
        let rotated = rol(cpu, value);
        cpu.a &= rotated;
        cpu.p.set_zn(cpu.a);
        rotated
    });
}

/// RRA - Rotate Right then Add with Carry (undocumented read-modify-write)
/// Operation: ror(M) → M; A + M + C → A
#[inline]
pub fn exec_rra<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    rmw(cpu, bus, step, |cpu, value| {
        let rotated = ror(cpu, value);
        add_with_carry(cpu, rotated);
        rotated
    });
}

/// DCP - Decrement then Compare (undocumented read-modify-write)
/// Operation: M - 1 → M; compare A with M
#[inline]
pub fn exec_dcp<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    rmw(cpu, bus, step, |cpu, value| {
        let result = value.wrapping_sub(1);
        compare(cpu, cpu.a, result);
        result
    });
}

/// ISC (ISB) - Increment then Subtract with Borrow (undocumented RMW)
/// Operation: M + 1 → M; A - M - !C → A
#[inline]
pub fn exec_isc<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    rmw(cpu, bus, step, |cpu, value| {
        let result = value.wrapping_add(1);
        add_with_carry(cpu, !result);
        result
    });
}
