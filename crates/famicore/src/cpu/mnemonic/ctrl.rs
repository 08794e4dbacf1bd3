use crate::bus::Bus;
use crate::cpu::status::Status;
use crate::cpu::Cpu;
use crate::memory::cpu::{IRQ_VECTOR_LO, NMI_VECTOR_LO};

/// JSR - Jump to Subroutine (6 cycles).
///
/// Reads the target low byte, spends one internal cycle on the stack, pushes
/// the return address (pointing at the last byte of the instruction), then
/// reads the high byte and jumps. Dispatched directly after the opcode
/// fetch; the generic Absolute sequencer is bypassed.
#[inline]
pub fn exec_jsr<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    match step {
        0 => {
            cpu.base_lo = bus.read_cycle(cpu.pc, cpu);
            cpu.incr_pc();
        }
        1 => {
            let _ = bus.read_cycle(cpu.stack_addr(), cpu);
        }
        2 => cpu.push(bus, (cpu.pc >> 8) as u8),
        3 => cpu.push(bus, cpu.pc as u8),
        4 => {
            let hi = bus.read_cycle(cpu.pc, cpu);
            cpu.pc = u16::from_le_bytes([cpu.base_lo, hi]);
        }
        _ => unreachable!("invalid JSR step {step}"),
    }
}

/// RTS - Return from Subroutine (6 cycles).
///
/// Pulls the return address and spends a final cycle incrementing past it.
#[inline]
pub fn exec_rts<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    match step {
        0 => {
            let _ = bus.read_cycle(cpu.pc, cpu);
        }
        1 => {
            let _ = bus.read_cycle(cpu.stack_addr(), cpu);
        }
        2 => cpu.base_lo = cpu.pull(bus),
        3 => {
            let hi = cpu.pull(bus);
            cpu.pc = u16::from_le_bytes([cpu.base_lo, hi]);
        }
        4 => {
            let _ = bus.read_cycle(cpu.pc, cpu);
            cpu.incr_pc();
        }
        _ => unreachable!("invalid RTS step {step}"),
    }
}

/// RTI - Return from Interrupt (6 cycles).
///
/// Pulls P (B discarded, unused bit forced) and then the interrupted PC.
#[inline]
pub fn exec_rti<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
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
        3 => cpu.base_lo = cpu.pull(bus),
        4 => {
            let hi = cpu.pull(bus);
            cpu.pc = u16::from_le_bytes([cpu.base_lo, hi]);
        }
        _ => unreachable!("invalid RTI step {step}"),
    }
}

/// BRK - Break Command (7 cycles).
///
/// Pushes PC past the padding byte and P with B set, sets I, and fetches the
/// IRQ/BRK vector - unless an NMI arrived mid-sequence, which hijacks the
/// vector fetch.
#[inline]
pub fn exec_brk<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8) {
    match step {
        0 => {
            let _ = bus.read_cycle(cpu.pc, cpu);
            cpu.incr_pc();
        }
        1 => cpu.push(bus, (cpu.pc >> 8) as u8),
        2 => cpu.push(bus, cpu.pc as u8),
        3 => {
            let value = (cpu.p | Status::BREAK | Status::UNUSED).bits();
            cpu.push(bus, value);
            cpu.p.insert(Status::INTERRUPT);
            cpu.effective_addr = if cpu.nmi_pending {
                cpu.nmi_pending = false;
                NMI_VECTOR_LO
            } else {
                IRQ_VECTOR_LO
            };
        }
        4 => cpu.base_lo = bus.read_cycle(cpu.effective_addr, cpu),
        5 => {
            let hi = bus.read_cycle(cpu.effective_addr + 1, cpu);
            cpu.pc = u16::from_le_bytes([cpu.base_lo, hi]);
        }
        _ => unreachable!("invalid BRK step {step}"),
    }
}
