//! Abstract cartridge mapper interface.
//!
//! A mapper owns the PRG-ROM/RAM and CHR-ROM/RAM of its cartridge and decides
//! how the CPU and PPU address spaces reach them. Scanline-counter mappers
//! additionally react to the filtered A12 rising edge via [`Mapper::clock_irq`].

use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::cartridge::header::{Header, Mirroring};
use crate::error::Error;

mod mmc3;
mod nrom;

pub use mmc3::Mmc3;
pub use nrom::Nrom;

/// Cartridge-side address decoding.
///
/// PRG reads return `None` for unmapped space; the bus resolves that to open
/// bus, which is how unmapped cartridge accesses stay "silent" instead of
/// becoming errors.
pub trait Mapper: DynClone + Debug {
    /// CPU read in `$4020-$FFFF`.
    fn read_prg(&mut self, addr: u16) -> Option<u8>;

    /// CPU write in `$4020-$FFFF`.
    fn write_prg(&mut self, addr: u16, data: u8);

    /// PPU read in the pattern window (`$0000-$1FFF`).
    fn read_chr(&mut self, addr: u16) -> u8;

    /// PPU write in the pattern window (CHR-RAM carts).
    fn write_chr(&mut self, addr: u16, data: u8);

    /// Active nametable arrangement; mappers with controllable mirroring
    /// report their current selection here.
    fn mirroring(&self) -> Mirroring;

    /// Filtered PPU A12 rising edge, the clock of scanline IRQ counters.
    fn clock_irq(&mut self) {}

    /// Level of the mapper's IRQ output line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Battery-backed PRG-RAM contents, when the cartridge persists them.
    fn battery_ram(&self) -> Option<&[u8]> {
        None
    }

    /// Mutable battery-backed PRG-RAM for restoring a sidecar file.
    fn battery_ram_mut(&mut self) -> Option<&mut [u8]> {
        None
    }

    /// Mapper number, for diagnostics.
    fn id(&self) -> u16;

    /// Human-readable board name, for diagnostics.
    fn name(&self) -> &'static str;
}

dyn_clone::clone_trait_object!(Mapper);

/// Instantiates the mapper named by the header, or refuses the image.
pub fn build(
    header: &Header,
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
) -> Result<Box<dyn Mapper>, Error> {
    match header.mapper {
        0 => Ok(Box::new(Nrom::new(header, prg_rom, chr_rom))),
        4 => Ok(Box::new(Mmc3::new(header, prg_rom, chr_rom))),
        id => Err(Error::UnsupportedMapper(id)),
    }
}

/// CHR backing storage shared by the concrete mappers: either ROM (writes
/// ignored) or RAM (writes land).
#[derive(Debug, Clone)]
pub(crate) enum ChrStorage {
    Rom(Vec<u8>),
    Ram(Vec<u8>),
}

impl ChrStorage {
    pub(crate) fn select(header: &Header, chr_rom: Vec<u8>) -> Self {
        if header.chr_rom_size == 0 {
            ChrStorage::Ram(vec![0; header.chr_ram_size.max(8 * 1024)])
        } else {
            ChrStorage::Rom(chr_rom)
        }
    }

    #[inline]
    pub(crate) fn read(&self, index: usize) -> u8 {
        let bytes = match self {
            ChrStorage::Rom(bytes) | ChrStorage::Ram(bytes) => bytes,
        };
        if bytes.is_empty() {
            return 0;
        }
        bytes[index % bytes.len()]
    }

    #[inline]
    pub(crate) fn write(&mut self, index: usize, data: u8) {
        if let ChrStorage::Ram(bytes) = self {
            if !bytes.is_empty() {
                let len = bytes.len();
                bytes[index % len] = data;
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            ChrStorage::Rom(bytes) | ChrStorage::Ram(bytes) => bytes.len(),
        }
    }
}
