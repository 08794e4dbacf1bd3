//! Battery-backed PRG-RAM persistence through the sidecar file.

mod common;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use common::ines_image;
use famicore::cartridge::Cartridge;

/// Battery flag in header byte 6.
const FLAGS6_BATTERY: u8 = 0b0000_0010;

fn scratch_rom(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("famicore-{name}-{}.nes", std::process::id()))
}

#[test]
fn battery_ram_round_trips_through_the_sidecar() -> Result<()> {
    let rom_path = scratch_rom("battery");
    let sav_path = rom_path.with_extension("sav");
    let image = ines_image(&vec![0; 16 * 1024], &[], 0, FLAGS6_BATTERY);
    fs::write(&rom_path, &image).context("writing scratch ROM")?;

    {
        let mut cartridge = Cartridge::from_file(&rom_path)?;
        cartridge.write_prg(0x6000, 0xAB);
        cartridge.write_prg(0x7FFF, 0xCD);
        cartridge.persist_battery_ram();
    }

    let mut reloaded = Cartridge::from_file(&rom_path)?;
    assert_eq!(reloaded.read_prg(0x6000), Some(0xAB));
    assert_eq!(reloaded.read_prg(0x7FFF), Some(0xCD));

    fs::remove_file(&rom_path).ok();
    fs::remove_file(&sav_path).ok();
    Ok(())
}

#[test]
fn missing_sidecar_is_not_an_error() -> Result<()> {
    let rom_path = scratch_rom("nosave");
    let image = ines_image(&vec![0; 16 * 1024], &[], 0, FLAGS6_BATTERY);
    fs::write(&rom_path, &image)?;

    let mut cartridge = Cartridge::from_file(&rom_path)?;
    assert_eq!(cartridge.read_prg(0x6000), Some(0x00));

    fs::remove_file(&rom_path).ok();
    Ok(())
}

#[test]
fn non_battery_cartridges_write_no_sidecar() -> Result<()> {
    let rom_path = scratch_rom("plain");
    let sav_path = rom_path.with_extension("sav");
    let image = ines_image(&vec![0; 16 * 1024], &[], 0, 0);
    fs::write(&rom_path, &image)?;

    {
        let mut cartridge = Cartridge::from_file(&rom_path)?;
        cartridge.write_prg(0x6000, 0xAB);
        cartridge.persist_battery_ram();
    }
    assert!(!sav_path.exists());

    fs::remove_file(&rom_path).ok();
    Ok(())
}
