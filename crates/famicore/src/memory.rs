//! Shared definitions for the console memory map.
//!
//! Keeping every address-related constant in one module keeps the hardware
//! layout in a single place and makes it easy to cross-reference the console
//! documentation while reading the rest of the code base.

/// CPU-side memory map (16-bit address space).
pub mod cpu {
    /// Size of the console-internal work RAM (2 KiB, mirrored four times).
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    /// Mask applied to `$0000-$1FFF` accesses to fold the mirrors.
    pub const INTERNAL_RAM_MASK: u16 = 0x07FF;
    /// First internal-RAM address.
    pub const INTERNAL_RAM_START: u16 = 0x0000;
    /// Last internal-RAM mirror address (inclusive).
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;

    /// First address of the hardware stack page.
    pub const STACK_PAGE_START: u16 = 0x0100;

    /// CPU-visible PPU register window (8 registers mirrored every 8 bytes).
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    pub const PPU_REGISTER_MIRROR_END: u16 = 0x3FFF;

    /// APU channel registers.
    pub const APU_REGISTER_BASE: u16 = 0x4000;
    pub const APU_CHANNEL_END: u16 = 0x4013;
    /// OAM DMA trigger register.
    pub const OAM_DMA: u16 = 0x4014;
    /// APU status register.
    pub const APU_STATUS: u16 = 0x4015;
    /// Controller port 1 (also the strobe register on writes).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 read / APU frame counter write.
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// CPU test-mode registers; reads float, writes are ignored.
    pub const TEST_MODE_BASE: u16 = 0x4018;
    pub const TEST_MODE_END: u16 = 0x401F;

    /// First address decoded to the cartridge.
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    /// Conventional PRG-RAM window.
    pub const PRG_RAM_START: u16 = 0x6000;
    pub const PRG_RAM_END: u16 = 0x7FFF;
    /// Conventional PRG-ROM window.
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Last CPU address.
    pub const CPU_ADDR_END: u16 = 0xFFFF;

    /// NMI vector (`$FFFA/$FFFB`).
    pub const NMI_VECTOR_LO: u16 = 0xFFFA;
    pub const NMI_VECTOR_HI: u16 = 0xFFFB;
    /// Reset vector (`$FFFC/$FFFD`).
    pub const RESET_VECTOR_LO: u16 = 0xFFFC;
    pub const RESET_VECTOR_HI: u16 = 0xFFFD;
    /// IRQ/BRK vector (`$FFFE/$FFFF`).
    pub const IRQ_VECTOR_LO: u16 = 0xFFFE;
    pub const IRQ_VECTOR_HI: u16 = 0xFFFF;
}

/// PPU-side memory map (14-bit address space) and register identifiers.
pub mod ppu {
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Address mask applied to every VRAM access (`$0000-$3FFF`).
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Pattern table 0 / 1 base addresses.
    pub const PATTERN_TABLE_0: u16 = 0x0000;
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// End of the pattern-table window (inclusive).
    pub const PATTERN_TABLE_END: u16 = 0x1FFF;

    /// Base address of nametable 0 and the size of a single table.
    pub const NAMETABLE_BASE: u16 = 0x2000;
    pub const NAMETABLE_SIZE: u16 = 0x0400;

    /// Palette RAM window (`$3F00`, mirrored up to `$3FFF`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// Console-internal nametable RAM (CIRAM); four-screen carts carry 4 KiB.
    pub const CIRAM_SIZE: usize = 0x0800;
    pub const CIRAM_FOUR_SCREEN_SIZE: usize = 0x1000;

    /// Primary OAM (64 sprites x 4 bytes) and secondary OAM sizes.
    pub const OAM_RAM_SIZE: usize = 0x100;
    pub const SECONDARY_OAM_SIZE: usize = 0x20;

    /// Address line 12 of the PPU bus; its filtered rising edge clocks
    /// scanline-counter mappers.
    pub const A12_MASK: u16 = 0x1000;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Raw address backing the register.
        pub const fn addr(self) -> u16 {
            self as u16
        }

        /// Resolves the canonical register for a CPU address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}

/// APU register layout.
pub mod apu {
    /// Start of the CPU-mapped APU register range.
    pub const REGISTER_BASE: u16 = 0x4000;
    /// Final channel register before the status/DMA bridges.
    pub const CHANNEL_REGISTER_END: u16 = 0x4013;
    /// Status register (`$4015`).
    pub const STATUS: u16 = 0x4015;
    /// Frame counter configuration register (`$4017`, write side).
    pub const FRAME_COUNTER: u16 = 0x4017;
    /// Number of plain channel registers backed by storage.
    pub const CHANNEL_REGISTER_SPACE: usize =
        (CHANNEL_REGISTER_END - REGISTER_BASE + 1) as usize;
}
