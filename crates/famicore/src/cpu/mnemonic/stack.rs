use crate::bus::Bus;
use crate::cpu::status::Status;
use crate::cpu::Cpu;

/// PHA - Push Accumulator on Stack (3 cycles).
#[inline]
pub fn exec_pha<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    match step {
        0 => {
            let _ = bus.read_cycle(cpu.pc, cpu);
        }
        1 => cpu.push(bus, cpu.a),
        _ => unreachable!("invalid PHA step {step}"),
    }
}

/// PHP - Push Processor Status on Stack (3 cycles).
///
/// The pushed copy always carries B and the unused bit set.
#[inline]
pub fn exec_php<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    match step {
        0 => {
            let _ = bus.read_cycle(cpu.pc, cpu);
        }
        1 => {
            let value = (cpu.p | Status::BREAK | Status::UNUSED).bits();
            cpu.push(bus, value);
        }
        _ => unreachable!("invalid PHP step {step}"),
    }
}

/// PLA - Pull Accumulator from Stack (4 cycles). Sets Z/N.
#[inline]
pub fn exec_pla<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    match step {
        0 => {
            let _ = bus.read_cycle(cpu.pc, cpu);
        }
        1 => {
            // The increment of S overlaps a throwaway stack read.
            let _ = bus.read_cycle(cpu.stack_addr(), cpu);
        }
        2 => {
            cpu.a = cpu.pull(bus);
            cpu.p.set_zn(cpu.a);
        }
        _ => unreachable!("invalid PLA step {step}"),
    }
}

/// PLP - Pull Processor Status from Stack (4 cycles).
///
/// B is discarded; the unused bit reads back as set.
#[inline]
pub fn exec_plp<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    match step {
        0 => {
            let _ = bus.read_cycle(cpu.pc, cpu);
        }
        1 => {
            let _ = bus.read_cycle(cpu.stack_addr(), cpu);
        }
        2 => {
            let value = cpu.pull(bus);
            cpu.p = (Status::from_bits_truncate(value) - Status::BREAK) | Status::UNUSED;
        }
        _ => unreachable!("invalid PLP step {step}"),
    }
}
