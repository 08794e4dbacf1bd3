//! Sprite evaluation, sprite tile fetching, and the per-scanline sprite
//! pixel pipeline.
//!
//! Three cooperating mini state machines, each restarting on a defined dot:
//!
//! - [`SpriteEvaluator`] walks primary OAM during dots 65-256, copying up to
//!   eight in-range sprites into secondary OAM for the *next* scanline and
//!   raising sprite overflow (with the hardware's buggy byte-index
//!   increment) when a ninth is found.
//! - The fetch window (dots 257-320, driven from `ppu.rs`) reads secondary
//!   OAM back and latches pattern/attribute/X data into [`SpriteLine`].
//! - [`SpritePipeline`] holds the eight loaded slots for the scanline being
//!   drawn: two pattern shifters, an attribute latch and an X countdown per
//!   slot.

use bitflags::bitflags;

use crate::mem::blocks::SecondaryOam;

bitflags! {
    /// OAM attribute byte (sprite byte 2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct SpriteAttributes: u8 {
        const PALETTE            = 0b0000_0011;
        const PRIORITY_BEHIND_BG = 0b0010_0000;
        const FLIP_HORIZONTAL    = 0b0100_0000;
        const FLIP_VERTICAL      = 0b1000_0000;
    }
}

/// Per-dot state of the dot-65..256 evaluation walk over primary OAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SpriteEvaluator {
    /// Sprite currently being examined (0..63).
    n: u8,
    /// Byte of that sprite (0..3).
    m: u8,
    /// Sprites copied into secondary OAM so far (0..8).
    pub(crate) copied: u8,
    /// Evaluation finished for this scanline.
    idle: bool,
    /// Sprite 0 was copied for the next scanline.
    pub(crate) sprite0_in_range: bool,
    /// OAMADDR as latched on dot 65; offsets the whole scan.
    oam_addr_base: u8,
}

impl SpriteEvaluator {
    /// Restarts the walk; runs on dot 65 of each evaluated scanline.
    pub(crate) fn restart(&mut self, oam_addr: u8) {
        *self = Self {
            oam_addr_base: oam_addr,
            ..Self::default()
        }
    }

    /// One evaluation action (the copy half of the two-dot read/copy pair).
    ///
    /// `target_scanline` is the scanline these sprites will be drawn on.
    pub(crate) fn step(
        &mut self,
        oam: &[u8],
        secondary: &mut SecondaryOam,
        target_scanline: i16,
        sprite_height: i16,
    ) -> bool {
        if self.idle {
            return false;
        }

        let addr = self.oam_addr_base as usize + 4 * self.n as usize + self.m as usize;
        let Some(&entry) = oam.get(addr) else {
            // The scan never wraps past the end of OAM.
            self.idle = true;
            return false;
        };

        let in_range =
            target_scanline >= entry as i16 && target_scanline < entry as i16 + sprite_height;

        if self.copied < 8 {
            // The Y byte is copied even when the sprite turns out not to be
            // in range; the slot is simply overwritten by the next candidate.
            let sec = 4 * self.copied as usize + self.m as usize;
            secondary[sec] = entry;

            if self.m == 0 {
                if in_range {
                    self.m = 1;
                    if self.n == 0 {
                        self.sprite0_in_range = true;
                    }
                } else {
                    self.advance_sprite();
                }
            } else {
                self.m += 1;
                if self.m == 4 {
                    self.m = 0;
                    self.copied += 1;
                    self.advance_sprite();
                }
            }
            false
        } else if in_range {
            // Ninth in-range sprite: overflow. The hardware keeps scanning
            // but nothing after this point is observable.
            self.idle = true;
            true
        } else {
            // Hardware bug: both n and m are incremented during the
            // overflow scan, so the Y test slides through sprite bytes.
            self.m = (self.m + 1) & 0b11;
            self.advance_sprite();
            false
        }
    }

    fn advance_sprite(&mut self) {
        self.n += 1;
        if self.n == 64 {
            self.idle = true;
        }
    }
}

/// Sprite data latched during the dot-257..320 fetch window, waiting to be
/// loaded into the pipeline at the start of the next scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SpriteLine {
    pub(crate) pattern_low: [u8; 8],
    pub(crate) pattern_high: [u8; 8],
    pub(crate) attributes: [u8; 8],
    pub(crate) x: [u8; 8],
    pub(crate) count: u8,
    pub(crate) sprite0_in_range: bool,
}

impl SpriteLine {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One loaded sprite slot for the scanline being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SpriteSlot {
    pub(crate) pattern_low: u8,
    pub(crate) pattern_high: u8,
    pub(crate) attributes: SpriteAttributes,
    pub(crate) x_counter: u8,
    pub(crate) sprite0: bool,
}

/// Sprite pixel produced for a single dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SpritePixel {
    pub(crate) palette: u8,
    /// 0 means transparent.
    pub(crate) color: u8,
    pub(crate) behind_background: bool,
    pub(crate) sprite0: bool,
}

/// The eight sprite slots of the current scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SpritePipeline {
    pub(crate) slots: [SpriteSlot; 8],
    pub(crate) active: u8,
}

impl SpritePipeline {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Loads the fetched line buffers; runs at dot 1 of the target scanline.
    /// Horizontally flipped sprites have their bitplanes reversed here so the
    /// shifters always walk pixels left to right.
    pub(crate) fn load(&mut self, line: &SpriteLine) {
        self.clear();
        self.active = line.count.min(8);
        for i in 0..self.active as usize {
            let attributes = SpriteAttributes::from_bits_retain(line.attributes[i]);
            let (mut low, mut high) = (line.pattern_low[i], line.pattern_high[i]);
            if attributes.contains(SpriteAttributes::FLIP_HORIZONTAL) {
                low = low.reverse_bits();
                high = high.reverse_bits();
            }
            self.slots[i] = SpriteSlot {
                pattern_low: low,
                pattern_high: high,
                attributes,
                x_counter: line.x[i],
                sprite0: line.sprite0_in_range && i == 0,
            };
        }
    }

    /// Samples the winning sprite pixel for this dot and advances every
    /// active slot. X counters delay a slot; once expired the slot shifts
    /// one bit per dot for its eight pixels.
    pub(crate) fn sample_and_shift(&mut self) -> SpritePixel {
        let mut chosen: Option<SpritePixel> = None;

        for slot in self.slots.iter_mut().take(self.active as usize) {
            if slot.x_counter > 0 {
                slot.x_counter -= 1;
                continue;
            }

            let color = ((slot.pattern_high >> 7) << 1) | (slot.pattern_low >> 7);
            if chosen.is_none() && color != 0 {
                chosen = Some(SpritePixel {
                    palette: (slot.attributes & SpriteAttributes::PALETTE).bits(),
                    color,
                    behind_background: slot
                        .attributes
                        .contains(SpriteAttributes::PRIORITY_BEHIND_BG),
                    sprite0: slot.sprite0,
                });
            }

            slot.pattern_low <<= 1;
            slot.pattern_high <<= 1;
        }

        chosen.unwrap_or_default()
    }
}
