use crate::bus::Bus;
use crate::cpu::status::Status;
use crate::cpu::Cpu;

/// Shared branch skeleton (2 cycles, +1 taken, +1 on page crossing).
///
/// - Step 0 fetches the offset; an untaken branch ends here.
/// - Step 1 performs the throwaway fetch of the next opcode while the low
///   byte of PC is adjusted; same-page targets commit now.
/// - Step 2 repeats the fetch at the uncorrected address while the high
///   byte is fixed up.
#[inline]
fn exec_branch<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8, taken: bool) {
    match step {
        0 => {
            cpu.operand = bus.read_cycle(cpu.pc, cpu);
            cpu.incr_pc();
            if taken {
                // An IRQ that first appears during this cycle is not
                // recognized at the end of a taken branch.
                if cpu.irq_pending && !cpu.prev_irq_pending {
                    cpu.irq_pending = false;
                }
            } else {
                cpu.step += 2;
            }
        }
        1 => {
            let _ = bus.read_cycle(cpu.pc, cpu);
            let target = cpu.pc.wrapping_add(cpu.operand as i8 as u16);
            if target & 0xFF00 == cpu.pc & 0xFF00 {
                cpu.pc = target;
                cpu.step += 1;
            } else {
                cpu.effective_addr = target;
            }
        }
        2 => {
            let wrong = (cpu.pc & 0xFF00) | (cpu.effective_addr & 0x00FF);
            let _ = bus.read_cycle(wrong, cpu);
            cpu.pc = cpu.effective_addr;
        }
        _ => unreachable!("invalid branch step {step}"),
    }
}

/// BCC - Branch on Carry Clear.
#[inline]
pub fn exec_bcc<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    let taken = !cpu.p.contains(Status::CARRY);
    exec_branch(cpu, bus, step, taken);
}

/// BCS - Branch on Carry Set.
#[inline]
pub fn exec_bcs<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    let taken = cpu.p.contains(Status::CARRY);
    exec_branch(cpu, bus, step, taken);
}

/// BEQ - Branch on Result Zero.
#[inline]
pub fn exec_beq<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    let taken = cpu.p.contains(Status::ZERO);
    exec_branch(cpu, bus, step, taken);
}

/// BNE - Branch on Result Not Zero.
#[inline]
pub fn exec_bne<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    let taken = !cpu.p.contains(Status::ZERO);
    exec_branch(cpu, bus, step, taken);
}

/// BMI - Branch on Result Minus.
#[inline]
pub fn exec_bmi<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    let taken = cpu.p.contains(Status::NEGATIVE);
    exec_branch(cpu, bus, step, taken);
}

/// BPL - Branch on Result Plus.
#[inline]
pub fn exec_bpl<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    let taken = !cpu.p.contains(Status::NEGATIVE);
    exec_branch(cpu, bus, step, taken);
}

/// BVC - Branch on Overflow Clear.
#[inline]
pub fn exec_bvc<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    let taken = !cpu.p.contains(Status::OVERFLOW);
    exec_branch(cpu, bus, step, taken);
}

/// BVS - Branch on Overflow Set.
#[inline]
pub fn exec_bvs<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    let taken = cpu.p.contains(Status::OVERFLOW);
    exec_branch(cpu, bus, step, taken);
}
