use core::fmt;

use crate::cartridge::header::TvSystem;

/// Runtime region / timing selection used by the CPU, PPU and APU.
///
/// Derived from both user configuration and the ROM header's `TvSystem`
/// hint. Unlike `TvSystem`, this never stays "unknown" or "dual" - it always
/// resolves to a concrete timing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// Let the core pick a region from the ROM header.
    #[default]
    Auto,
    /// North American / Japanese NTSC timing.
    Ntsc,
    /// European PAL timing.
    Pal,
    /// Dendy-style hybrid timing used by some Famiclones.
    Dendy,
}

impl Region {
    /// Resolve the effective region from a user-selected region and the ROM
    /// header's TV system hint. A concrete user choice always wins.
    pub fn resolve(config_region: Region, tv: TvSystem) -> Region {
        match config_region {
            Region::Auto => match tv {
                TvSystem::Ntsc => Region::Ntsc,
                TvSystem::Pal => Region::Pal,
                TvSystem::Dendy => Region::Dendy,
                // NTSC is the sensible default for dual-region or bogus headers.
                TvSystem::Dual | TvSystem::Unknown => Region::Ntsc,
            },
            other => other,
        }
    }

    /// Timing profile for the resolved region. `Auto` defaults to NTSC.
    pub const fn timing(self) -> &'static Timing {
        match self {
            Region::Auto | Region::Ntsc => &Timing::NTSC,
            Region::Pal => &Timing::PAL,
            Region::Dendy => &Timing::DENDY,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::Auto => "auto",
            Region::Ntsc => "ntsc",
            Region::Pal => "pal",
            Region::Dendy => "dendy",
        };
        f.write_str(s)
    }
}

/// PPU/CPU operation details that depend on the video standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Whether OAMDATA writes land while rendering is forced off mid-frame.
    pub oam_writable_in_forced_blank: bool,
    /// Whether the pre-render line drops one dot on every other frame.
    pub short_prerender_on_odd_frames: bool,
    /// Whether a fourth PPU dot runs on every fifth CPU cycle (PAL's 3.2).
    pub extra_dot_every_fifth_cycle: bool,
    /// Scanline on which the vblank flag is raised at dot 1.
    pub nmi_scanline: i16,
    /// Total scanlines per frame, pre-render included.
    pub scanlines_per_frame: u16,
    /// Number of picture scanlines (0-based range `0..visible_scanlines`).
    pub visible_scanlines: i16,
}

impl Timing {
    pub const NTSC: Timing = Timing {
        oam_writable_in_forced_blank: true,
        short_prerender_on_odd_frames: true,
        extra_dot_every_fifth_cycle: false,
        nmi_scanline: 241,
        scanlines_per_frame: 262,
        visible_scanlines: 240,
    };

    pub const PAL: Timing = Timing {
        oam_writable_in_forced_blank: false,
        short_prerender_on_odd_frames: false,
        extra_dot_every_fifth_cycle: true,
        nmi_scanline: 240,
        scanlines_per_frame: 312,
        visible_scanlines: 239,
    };

    pub const DENDY: Timing = Timing {
        oam_writable_in_forced_blank: true,
        short_prerender_on_odd_frames: false,
        extra_dot_every_fifth_cycle: false,
        nmi_scanline: 290,
        scanlines_per_frame: 312,
        visible_scanlines: 239,
    };

    /// Highest scanline number of a frame (the line before wrapping to -1).
    pub const fn last_scanline(&self) -> i16 {
        self.scanlines_per_frame as i16 - 2
    }

    /// Total dots in a full-length frame.
    pub const fn dots_per_frame(&self) -> u32 {
        self.scanlines_per_frame as u32 * 341
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_auto_from_header_hint() {
        assert_eq!(Region::resolve(Region::Auto, TvSystem::Pal), Region::Pal);
        assert_eq!(Region::resolve(Region::Auto, TvSystem::Unknown), Region::Ntsc);
        assert_eq!(Region::resolve(Region::Pal, TvSystem::Ntsc), Region::Pal);
    }

    #[test]
    fn frame_geometry() {
        assert_eq!(Timing::NTSC.last_scanline(), 260);
        assert_eq!(Timing::NTSC.dots_per_frame(), 89_342);
        assert_eq!(Timing::PAL.last_scanline(), 310);
        assert_eq!(Timing::PAL.dots_per_frame(), 106_392);
    }
}
