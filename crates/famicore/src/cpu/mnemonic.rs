//! Operation tags and their per-cycle executors.
//!
//! Every opcode maps to one [`Mnemonic`]; execution is a `match` on the tag
//! and the current step, so an instruction's identity never has to be
//! reconstructed from function-pointer comparisons. The concrete step
//! functions live in the submodules, grouped the way the data sheet groups
//! the instruction set.

use std::fmt::Display;

use crate::bus::Bus;
use crate::cpu::addressing::AddrMode;
use crate::cpu::Cpu;

pub mod arith;
pub mod bra;
pub mod ctrl;
pub mod flags;
pub mod inc;
pub mod load;
pub mod logic;
pub mod shift;
pub mod stack;
pub mod trans;

/// Bus-access profile of an operation, as used by the addressing sequencer
/// to decide dummy reads, page-cross fix-ups and write-back cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessClass {
    /// Loads/ALU ops: one operand read, crossing costs an extra cycle.
    Read,
    /// Stores: one write, the fix-up cycle is always paid.
    Write,
    /// Shifts/inc/dec on memory: read, write-back of the original, write of
    /// the result; the fix-up cycle is always paid.
    ReadModifyWrite,
    /// Everything that never touches a computed operand address.
    Implicit,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    // Load / store
    LAS, LAX, LDA, LDX, LDY, SAX, SHA, SHX, SHY, STA, STX, STY,
    // Transfer
    SHS, TAX, TAY, TSX, TXA, TXS, TYA,
    // Stack
    PHA, PHP, PLA, PLP,
    // Shift / rotate
    ASL, LSR, ROL, ROR,
    // Logic
    AND, BIT, EOR, ORA,
    // Arithmetic
    ADC, ANC, ARR, ASR, CMP, CPX, CPY, DCP, ISC, RLA, RRA, SBC, SBX, SLO,
    SRE, XAA,
    // Increment / decrement
    DEC, DEX, DEY, INC, INX, INY,
    // Control flow
    BRK, JMP, JSR, RTI, RTS,
    // Branches
    BCC, BCS, BEQ, BMI, BNE, BPL, BVC, BVS,
    // Flag operations
    CLC, CLD, CLI, CLV, SEC, SED, SEI,
    // Halt
    JAM,
    // No operation (official and the timing-only variants)
    NOP,
}

impl Mnemonic {
    pub(crate) const fn access_class(self) -> AccessClass {
        use Mnemonic::*;
        match self {
            STA | STX | STY | SAX | SHA | SHX | SHY | SHS => AccessClass::Write,
            ASL | LSR | ROL | ROR | INC | DEC | SLO | SRE | RLA | RRA | DCP | ISC => {
                AccessClass::ReadModifyWrite
            }
            LDA | LDX | LDY | LAX | LAS | AND | ORA | EOR | BIT | ADC | SBC | CMP | CPX
            | CPY | NOP | ANC | ARR | ASR | SBX | XAA => AccessClass::Read,
            _ => AccessClass::Implicit,
        }
    }

    /// Number of operation cycles after the addressing sequence.
    pub(crate) const fn exec_len(self, mode: AddrMode) -> u8 {
        use Mnemonic::*;
        match self {
            ASL | LSR | ROL | ROR => match mode {
                AddrMode::Accumulator => 1,
                _ => 3,
            },
            DEC | INC | SLO | SRE | RLA | RRA | DCP | ISC => 3,
            PHA | PHP => 2,
            PLA | PLP => 3,
            JMP | JAM => 0,
            JSR | RTS | RTI => 5,
            BRK => 6,
            BCC | BCS | BEQ | BMI | BNE | BPL | BVC | BVS => 3,
            _ => 1,
        }
    }

    /// Executes one operation cycle.
    pub(crate) fn exec<B: Bus>(self, cpu: &mut Cpu, bus: &mut B, step: u8, mode: AddrMode) {
        use Mnemonic::*;
        match self {
            // Load / store
            LAS => load::exec_las(cpu, bus, step),
            LAX => load::exec_lax(cpu, bus, step),
            LDA => load::exec_lda(cpu, bus, step),
            LDX => load::exec_ldx(cpu, bus, step),
            LDY => load::exec_ldy(cpu, bus, step),
            SAX => load::exec_sax(cpu, bus, step),
            SHA => load::exec_sha(cpu, bus, step),
            SHX => load::exec_shx(cpu, bus, step),
            SHY => load::exec_shy(cpu, bus, step),
            STA => load::exec_sta(cpu, bus, step),
            STX => load::exec_stx(cpu, bus, step),
            STY => load::exec_sty(cpu, bus, step),
            // Transfer
            SHS => trans::exec_shs(cpu, bus, step),
            TAX => trans::exec_tax(cpu, bus, step),
            TAY => trans::exec_tay(cpu, bus, step),
            TSX => trans::exec_tsx(cpu, bus, step),
            TXA => trans::exec_txa(cpu, bus, step),
            TXS => trans::exec_txs(cpu, bus, step),
            TYA => trans::exec_tya(cpu, bus, step),
            // Stack
            PHA => stack::exec_pha(cpu, bus, step),
            PHP => stack::exec_php(cpu, bus, step),
            PLA => stack::exec_pla(cpu, bus, step),
            PLP => stack::exec_plp(cpu, bus, step),
            // Shift / rotate
            ASL => shift::exec_asl(cpu, bus, step, mode),
            LSR => shift::exec_lsr(cpu, bus, step, mode),
            ROL => shift::exec_rol(cpu, bus, step, mode),
            ROR => shift::exec_ror(cpu, bus, step, mode),
            // Logic
            AND => logic::exec_and(cpu, bus, step),
            BIT => logic::exec_bit(cpu, bus, step),
            EOR => logic::exec_eor(cpu, bus, step),
            ORA => logic::exec_ora(cpu, bus, step),
            // Arithmetic
            ADC => arith::exec_adc(cpu, bus, step),
            ANC => arith::exec_anc(cpu, bus, step),
            ARR => arith::exec_arr(cpu, bus, step),
            ASR => arith::exec_asr(cpu, bus, step),
            CMP => arith::exec_cmp(cpu, bus, step),
            CPX => arith::exec_cpx(cpu, bus, step),
            CPY => arith::exec_cpy(cpu, bus, step),
            DCP => arith::exec_dcp(cpu, bus, step),
            ISC => arith::exec_isc(cpu, bus, step),
            RLA => arith::exec_rla(cpu, bus, step),
            RRA => arith::exec_rra(cpu, bus, step),
            SBC => arith::exec_sbc(cpu, bus, step),
            SBX => arith::exec_sbx(cpu, bus, step),
            SLO => arith::exec_slo(cpu, bus, step),
            SRE => arith::exec_sre(cpu, bus, step),
            XAA => arith::exec_xaa(cpu, bus, step),
            // Increment / decrement
            DEC => inc::exec_dec(cpu, bus, step),
            DEX => inc::exec_dex(cpu, bus, step),
            DEY => inc::exec_dey(cpu, bus, step),
            INC => inc::exec_inc(cpu, bus, step),
            INX => inc::exec_inx(cpu, bus, step),
            INY => inc::exec_iny(cpu, bus, step),
            // Control flow
            BRK => ctrl::exec_brk(cpu, bus, step),
            JMP => unreachable!("JMP commits during addressing"),
            JSR => ctrl::exec_jsr(cpu, bus, step),
            RTI => ctrl::exec_rti(cpu, bus, step),
            RTS => ctrl::exec_rts(cpu, bus, step),
            // Branches
            BCC => bra::exec_bcc(cpu, bus, step),
            BCS => bra::exec_bcs(cpu, bus, step),
            BEQ => bra::exec_beq(cpu, bus, step),
            BMI => bra::exec_bmi(cpu, bus, step),
            BNE => bra::exec_bne(cpu, bus, step),
            BPL => bra::exec_bpl(cpu, bus, step),
            BVC => bra::exec_bvc(cpu, bus, step),
            BVS => bra::exec_bvs(cpu, bus, step),
            // Flags
            CLC => flags::exec_clc(cpu, bus, step),
            CLD => flags::exec_cld(cpu, bus, step),
            CLI => flags::exec_cli(cpu, bus, step),
            CLV => flags::exec_clv(cpu, bus, step),
            SEC => flags::exec_sec(cpu, bus, step),
            SED => flags::exec_sed(cpu, bus, step),
            SEI => flags::exec_sei(cpu, bus, step),
            // Halt; handled at decode, never dispatched here.
            JAM => unreachable!("JAM halts at decode"),
            NOP => exec_nop(cpu, bus, step, mode),
        }
    }
}

/// NOP and its undocumented cousins: the timing (and thus the reads) of the
/// addressed variant are real, only the result is discarded.
fn exec_nop<B: Bus>(cpu: &mut Cpu, bus: &mut B, step: u8, mode: AddrMode) {
    debug_assert_eq!(step, 0);
    match mode {
        AddrMode::Implied | AddrMode::Accumulator => {
            let _ = bus.read_cycle(cpu.pc, cpu);
        }
        _ => {
            let _ = bus.read_cycle(cpu.effective_addr, cpu);
        }
    }
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("{self:?}").to_lowercase())
    }
}
