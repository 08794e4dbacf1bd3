//! Cartridge loading and the PPU-facing nametable plumbing.
//!
//! A [`Cartridge`] couples a parsed iNES image with its [`Mapper`] and the
//! console-internal nametable RAM (CIRAM). The mapper decides how nametable
//! addresses fold onto CIRAM via one of five mirroring transforms; four-screen
//! boards bring their own extra 2 KiB and use the identity transform.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cartridge::header::{Header, Mirroring, NES_HEADER_LEN};
use crate::cartridge::mapper::Mapper;
use crate::error::Error;
use crate::memory::ppu as ppu_mem;
use crate::reset_kind::ResetKind;

pub mod header;
pub mod mapper;

const TRAINER_LEN: usize = 512;
const SAVE_FILE_EXTENSION: &str = "sav";

/// An inserted cartridge: mapper, nametable RAM and battery bookkeeping.
#[derive(Debug, Clone)]
pub struct Cartridge {
    header: Header,
    mapper: Box<dyn Mapper>,
    /// Console nametable RAM; 4 KiB when the board is four-screen.
    ciram: Vec<u8>,
    /// Sidecar file for battery-backed PRG-RAM, when loaded from disk.
    save_path: Option<PathBuf>,
}

impl Cartridge {
    /// Parses an in-memory iNES image and instantiates its mapper.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let header = Header::parse(bytes)?;

        let mut cursor = NES_HEADER_LEN;
        if header.trainer_present {
            // The trainer predates every mapper this core implements; skip it.
            section(bytes, &mut cursor, TRAINER_LEN, "trainer")?;
        }
        let prg_rom = section(bytes, &mut cursor, header.prg_rom_size, "PRG ROM")?;
        let chr_rom = section(bytes, &mut cursor, header.chr_rom_size, "CHR ROM")?;

        let mapper = mapper::build(&header, prg_rom, chr_rom)?;
        debug!(
            mapper = mapper.id(),
            board = mapper.name(),
            prg = header.prg_rom_size,
            chr = header.chr_rom_size,
            "cartridge parsed"
        );

        let ciram_size = if header.mirroring == Mirroring::FourScreen {
            ppu_mem::CIRAM_FOUR_SCREEN_SIZE
        } else {
            ppu_mem::CIRAM_SIZE
        };

        Ok(Self {
            header,
            mapper,
            ciram: vec![0; ciram_size],
            save_path: None,
        })
    }

    /// Loads an image from disk and restores its battery RAM sidecar, if any.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut cartridge = Self::from_bytes(&bytes)?;
        cartridge.save_path = Some(path.with_extension(SAVE_FILE_EXTENSION));
        cartridge.restore_battery_ram();
        Ok(cartridge)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    /// Resets mapper-independent cartridge state. PRG-RAM survives a soft
    /// reset; a power cycle leaves ROM-backed state alone as well since the
    /// mapper re-derives everything from its registers.
    pub fn reset(&mut self, kind: ResetKind) {
        if kind == ResetKind::PowerOn {
            self.ciram.fill(0);
        }
    }

    // CPU side -------------------------------------------------------------

    pub fn read_prg(&mut self, addr: u16) -> Option<u8> {
        self.mapper.read_prg(addr)
    }

    pub fn write_prg(&mut self, addr: u16, data: u8) {
        self.mapper.write_prg(addr, data);
    }

    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    // PPU side -------------------------------------------------------------

    pub fn read_chr(&mut self, addr: u16) -> u8 {
        self.mapper.read_chr(addr)
    }

    pub fn write_chr(&mut self, addr: u16, data: u8) {
        self.mapper.write_chr(addr, data);
    }

    pub fn read_nt(&self, addr: u16) -> u8 {
        self.ciram[self.nt_index(addr)]
    }

    pub fn write_nt(&mut self, addr: u16, data: u8) {
        let idx = self.nt_index(addr);
        self.ciram[idx] = data;
    }

    pub fn clock_irq(&mut self) {
        self.mapper.clock_irq();
    }

    /// Folds a nametable address onto CIRAM according to the mapper's
    /// current mirroring transform. Operates on the 12-bit nametable offset
    /// whose bit 11 selects the vertical pair and bit 10 the horizontal one.
    fn nt_index(&self, addr: u16) -> usize {
        let a = addr & 0x0FFF;
        let folded = match self.mapper.mirroring() {
            // Clear bit 10: left/right tables alias, bit 11 picks the bank.
            Mirroring::Horizontal => ((a & 0x0800) >> 1) | (a & 0x03FF),
            // Clear bit 11: top/bottom tables alias.
            Mirroring::Vertical => a & 0x07FF,
            // Clear bits 10-11: everything lands in the first bank.
            Mirroring::SingleScreenLower => a & 0x03FF,
            // Clear bit 11, set bit 10: everything lands in the second bank.
            Mirroring::SingleScreenUpper => 0x0400 | (a & 0x03FF),
            // Identity: the board provides all four tables.
            Mirroring::FourScreen => a,
        };
        folded as usize % self.ciram.len()
    }

    // Battery persistence --------------------------------------------------

    /// Writes battery-backed PRG-RAM to the sidecar file. Failures are
    /// recoverable: reported once, emulation continues.
    pub fn persist_battery_ram(&self) {
        let (Some(path), Some(ram)) = (self.save_path.as_ref(), self.mapper.battery_ram())
        else {
            return;
        };
        if let Err(err) = fs::write(path, ram) {
            warn!(path = %path.display(), %err, "failed to write battery RAM");
        }
    }

    fn restore_battery_ram(&mut self) {
        let Some(path) = self.save_path.clone() else {
            return;
        };
        let Some(ram) = self.mapper.battery_ram_mut() else {
            return;
        };
        match fs::read(&path) {
            Ok(bytes) => {
                let len = bytes.len().min(ram.len());
                ram[..len].copy_from_slice(&bytes[..len]);
                if bytes.len() != ram.len() {
                    warn!(path = %path.display(), "battery RAM sidecar is truncated");
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), %err, "failed to read battery RAM"),
        }
    }
}

fn section(
    bytes: &[u8],
    cursor: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<Vec<u8>, Error> {
    if len == 0 {
        return Ok(Vec::new());
    }

    let end = cursor.checked_add(len).ok_or(Error::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    })?;

    let slice = bytes.get(*cursor..end).ok_or(Error::SectionTooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    })?;

    *cursor = end;
    Ok(slice.to_vec())
}

/// Builders for in-memory iNES images used across the test suites.
#[cfg(test)]
pub(crate) mod test_support {
    /// Assembles a minimal iNES image from PRG/CHR payloads.
    pub(crate) fn ines_image(prg: &[u8], chr: &[u8], mapper: u8, flags6: u8) -> Vec<u8> {
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
}

#[cfg(test)]
mod tests {
    use super::test_support::ines_image;
    use super::*;

    #[test]
    fn parses_nrom_image() {
        let image = ines_image(&vec![0xAA; 16 * 1024], &vec![0x55; 8 * 1024], 0, 0);
        let cart = Cartridge::from_bytes(&image).unwrap();
        assert_eq!(cart.mapper().id(), 0);
        assert_eq!(cart.header().prg_rom_size, 16 * 1024);
    }

    #[test]
    fn refuses_unknown_mapper() {
        let image = ines_image(&vec![0; 16 * 1024], &[], 9, 0);
        assert!(matches!(
            Cartridge::from_bytes(&image),
            Err(Error::UnsupportedMapper(9))
        ));
    }

    #[test]
    fn errors_when_prg_truncated() {
        let mut image = ines_image(&vec![0; 16 * 1024], &[], 0, 0);
        image.truncate(NES_HEADER_LEN + 100);
        assert!(matches!(
            Cartridge::from_bytes(&image),
            Err(Error::SectionTooShort {
                section: "PRG ROM",
                ..
            })
        ));
    }

    #[test]
    fn horizontal_mirroring_pairs_tables() {
        let image = ines_image(&vec![0; 16 * 1024], &[], 0, 0);
        let mut cart = Cartridge::from_bytes(&image).unwrap();
        cart.write_nt(0x2005, 0x42);
        // $2000/$2400 alias; $2800 is the other physical table.
        assert_eq!(cart.read_nt(0x2405), 0x42);
        assert_eq!(cart.read_nt(0x2805), 0x00);
    }

    #[test]
    fn vertical_mirroring_pairs_tables() {
        let image = ines_image(&vec![0; 16 * 1024], &[], 0, 0b0000_0001);
        let mut cart = Cartridge::from_bytes(&image).unwrap();
        cart.write_nt(0x2005, 0x42);
        assert_eq!(cart.read_nt(0x2805), 0x42);
        assert_eq!(cart.read_nt(0x2405), 0x00);
    }
}
