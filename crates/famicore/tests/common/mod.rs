#![allow(dead_code)]

use famicore::cartridge::Cartridge;
use famicore::Nes;

/// Assembles a minimal iNES image from PRG/CHR payloads.
pub fn ines_image(prg: &[u8], chr: &[u8], mapper: u8, flags6: u8) -> Vec<u8> {
    assert!(prg.len() % (16 * 1024) == 0);
    assert!(chr.len() % (8 * 1024) == 0);
    let mut image = vec![
        b'N',
        b'E',
        b'S',
        0x1A,
        (prg.len() / (16 * 1024)) as u8,
        (chr.len() / (8 * 1024)) as u8,
        (mapper << 4) | flags6,
        0,
        0,
        0,
        0,
        0,
        0,
        0,
        0,
        0,
    ];
    image.extend_from_slice(prg);
    image.extend_from_slice(chr);
    image
}

/// Builds a console around a 32 KiB NROM image whose PRG the caller lays
/// out freely. The reset vector is pre-pointed at `$8000` and the rest of
/// the PRG is a NOP carpet; vectors live at file offsets `$7FFA..$7FFF`.
pub fn nes_with_program(setup: impl FnOnce(&mut [u8])) -> Nes {
    let mut prg = vec![0xEA; 32 * 1024];
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;
    setup(&mut prg);
    let image = ines_image(&prg, &[], 0, 0);
    let cartridge = Cartridge::from_bytes(&image).expect("test image parses");
    let mut nes = Nes::new();
    nes.insert_cartridge(cartridge);
    nes
}

/// Copies `program` to the start of the PRG (i.e. `$8000`).
pub fn with_code(program: &[u8]) -> impl FnOnce(&mut [u8]) + '_ {
    move |prg: &mut [u8]| {
        prg[..program.len()].copy_from_slice(program);
    }
}
