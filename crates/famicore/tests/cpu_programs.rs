//! Program-driven CPU checks through the public API: small 6502 routines
//! run on a real console and leave their results in RAM.

mod common;

use anyhow::Result;
use common::{nes_with_program, with_code};
use ctor::ctor;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[test]
fn reset_enters_at_the_vector_with_initialized_stack() -> Result<()> {
    let nes = nes_with_program(|_| {});
    let snapshot = nes.cpu_snapshot();
    assert_eq!(snapshot.pc, 0x8000);
    assert_eq!(snapshot.s, 0xFD);
    assert_ne!(snapshot.p & 0x04, 0);
    Ok(())
}

#[test]
fn adc_sets_overflow_on_like_signed_operands() -> Result<()> {
    let mut nes = nes_with_program(with_code(&[
        0x18, // CLC
        0xA9, 0x50, // LDA #$50
        0x69, 0x50, // ADC #$50
        0x08, // PHP
    ]));

    for _ in 0..4 {
        nes.step_instruction();
    }
    assert_eq!(nes.cpu_snapshot().a, 0xA0);

    // PHP pushed the flags at $01FD: N and V set, Z and C clear.
    let flags = nes.peek_cpu_byte(0x01FD);
    assert_eq!(flags & 0b1100_0011, 0b1100_0000);
    Ok(())
}

#[test]
fn taken_branch_with_page_cross_costs_four_cycles() -> Result<()> {
    let mut nes = nes_with_program(|prg| {
        prg[0] = 0xA9; // LDA #$01 (clears Z)
        prg[1] = 0x01;
        prg[2] = 0x4C; // JMP $80F0
        prg[3] = 0xF0;
        prg[4] = 0x80;
        prg[0xF0] = 0xD0; // BNE +$20
        prg[0xF1] = 0x20;
    });

    nes.step_instruction(); // LDA
    nes.step_instruction(); // JMP
    let before = nes.cpu_cycles();
    nes.step_instruction(); // BNE
    assert_eq!(nes.cpu_cycles() - before, 4);
    assert_eq!(nes.cpu_snapshot().pc, 0x8112);
    Ok(())
}

#[test]
fn jmp_indirect_wraps_within_the_pointer_page() -> Result<()> {
    let mut nes = nes_with_program(|prg| {
        // Pointer page in RAM: $30FF -> $40, $3000 would be RAM mirror...
        // keep the pointer in ROM instead: $B0FF/$B000 are PRG offsets
        // $30FF/$3000.
        prg[0] = 0x6C; // JMP ($B0FF)
        prg[1] = 0xFF;
        prg[2] = 0xB0;
        prg[0x30FF] = 0x40;
        prg[0x3000] = 0x80;
    });

    let before = nes.cpu_cycles();
    nes.step_instruction();
    assert_eq!(nes.cpu_cycles() - before, 5);
    assert_eq!(nes.cpu_snapshot().pc, 0x8040);
    Ok(())
}

#[test]
fn jsr_and_rts_nest_correctly() -> Result<()> {
    let mut nes = nes_with_program(|prg| {
        let main = [
            0x20, 0x00, 0x90, // JSR $9000
            0xA9, 0x11, // LDA #$11
            0x8D, 0x00, 0x02, // STA $0200
        ];
        prg[..main.len()].copy_from_slice(&main);
        let sub = [
            0xA9, 0x22, // LDA #$22
            0x8D, 0x01, 0x02, // STA $0201
            0x60, // RTS
        ];
        prg[0x1000..0x1000 + sub.len()].copy_from_slice(&sub);
    });

    for _ in 0..6 {
        nes.step_instruction();
    }
    assert_eq!(nes.peek_cpu_byte(0x0201), 0x22);
    assert_eq!(nes.peek_cpu_byte(0x0200), 0x11);
    Ok(())
}

#[test]
fn undocumented_lax_and_sax_transfer_both_registers() -> Result<()> {
    let mut nes = nes_with_program(with_code(&[
        0xA9, 0x5A, // LDA #$5A
        0x85, 0x10, // STA $10
        0xA9, 0x00, // LDA #$00
        0xA2, 0x00, // LDX #$00
        0xA7, 0x10, // LAX $10
        0x87, 0x11, // SAX $11
    ]));

    for _ in 0..6 {
        nes.step_instruction();
    }
    let snapshot = nes.cpu_snapshot();
    assert_eq!(snapshot.a, 0x5A);
    assert_eq!(snapshot.x, 0x5A);
    assert_eq!(nes.peek_cpu_byte(0x0011), 0x5A);
    Ok(())
}

#[test]
fn read_modify_write_lands_in_memory() -> Result<()> {
    let mut nes = nes_with_program(with_code(&[
        0xA9, 0x41, // LDA #$41
        0x85, 0x20, // STA $20
        0xE6, 0x20, // INC $20
        0x06, 0x20, // ASL $20
    ]));

    for _ in 0..4 {
        nes.step_instruction();
    }
    assert_eq!(nes.peek_cpu_byte(0x0020), 0x84);
    Ok(())
}
