//! CPU-visible PPU register state and the internal VRAM address latches.
//!
//! Mirrors the `$2000-$2007` register set and the internal `v/t/x/w` latches
//! using the NESDev terminology. The concrete bit layouts live in submodules.

mod control;
mod mask;
mod status;
mod vram;

pub(crate) use control::Control;
pub(crate) use mask::Mask;
pub(crate) use status::Status;
pub use vram::VramAddr;
pub(crate) use vram::VramLatches;

use crate::mem::blocks::OamRam;

/// Aggregates the state of all CPU-visible PPU registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Registers {
    /// Mirror of the control register (`$2000`).
    pub(crate) control: Control,
    /// Mirror of the mask register (`$2001`).
    pub(crate) mask: Mask,
    /// Status register (`$2002`).
    pub(crate) status: Status,
    /// Current OAM pointer driven by `$2003`/`$2004`.
    pub(crate) oam_addr: u8,
    /// Primary sprite memory accessible through `$2004`.
    pub(crate) oam: OamRam,
    /// Internal VRAM latches (`v`/`t`/`x`/`w`).
    pub(crate) vram: VramLatches,
    /// Internal buffer implementing the delayed `$2007` read behavior.
    pub(crate) read_buffer: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Power-on register block. OAM comes up with every sprite parked at
    /// Y = $FF so nothing is in range until the guest writes real entries.
    pub(crate) fn new() -> Self {
        Self {
            control: Control::default(),
            mask: Mask::default(),
            status: Status::default(),
            oam_addr: 0,
            oam: OamRam::filled(0xFF),
            vram: VramLatches::default(),
            read_buffer: 0,
        }
    }

    /// Restores all register values to their reset defaults.
    pub(crate) fn reset(&mut self) {
        *self = Registers::new();
    }

    /// Updates control, syncing the nametable bits into `t`.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.vram.t.set_nametable(self.control.nametable_index());
    }
}
