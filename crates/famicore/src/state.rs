//! Flat-slot save states.
//!
//! Every component exposes its persistent fields as a fixed-order list of
//! primitive slots through a `persist_with` method; the serializer is a
//! [`SlotVisitor`] walking that list and never needs to know a component's
//! layout. The same walk serves both directions: a [`Writer`] copies slots
//! out, a [`Reader`] copies them back in.
//!
//! Snapshots are taken between instructions at frame boundaries, so
//! mid-instruction CPU micro-state is not part of the slot list.

/// Visitor over a component's persistent primitive slots.
pub trait SlotVisitor {
    fn u8(&mut self, slot: &mut u8);
    fn u16(&mut self, slot: &mut u16);
    fn i16(&mut self, slot: &mut i16);
    fn u64(&mut self, slot: &mut u64);
    fn bool(&mut self, slot: &mut bool);
    fn bytes(&mut self, slots: &mut [u8]);
}

/// Serializing visitor: appends each slot to a byte buffer, little-endian.
#[derive(Debug, Default)]
pub(crate) struct Writer {
    out: Vec<u8>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.out
    }
}

impl SlotVisitor for Writer {
    fn u8(&mut self, slot: &mut u8) {
        self.out.push(*slot);
    }

    fn u16(&mut self, slot: &mut u16) {
        self.out.extend_from_slice(&slot.to_le_bytes());
    }

    fn i16(&mut self, slot: &mut i16) {
        self.out.extend_from_slice(&slot.to_le_bytes());
    }

    fn u64(&mut self, slot: &mut u64) {
        self.out.extend_from_slice(&slot.to_le_bytes());
    }

    fn bool(&mut self, slot: &mut bool) {
        self.out.push(*slot as u8);
    }

    fn bytes(&mut self, slots: &mut [u8]) {
        self.out.extend_from_slice(slots);
    }
}

/// Deserializing visitor: restores each slot from the buffer in the same
/// order. A short buffer leaves the remaining slots untouched and is
/// reported through [`Reader::truncated`].
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    truncated: bool,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            truncated: false,
        }
    }

    pub(crate) fn truncated(&self) -> bool {
        self.truncated || self.pos < self.input.len()
    }

    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos + N;
        let Some(slice) = self.input.get(self.pos..end) else {
            self.truncated = true;
            return None;
        };
        self.pos = end;
        let mut bytes = [0; N];
        bytes.copy_from_slice(slice);
        Some(bytes)
    }
}

impl SlotVisitor for Reader<'_> {
    fn u8(&mut self, slot: &mut u8) {
        if let Some([value]) = self.take::<1>() {
            *slot = value;
        }
    }

    fn u16(&mut self, slot: &mut u16) {
        if let Some(bytes) = self.take::<2>() {
            *slot = u16::from_le_bytes(bytes);
        }
    }

    fn i16(&mut self, slot: &mut i16) {
        if let Some(bytes) = self.take::<2>() {
            *slot = i16::from_le_bytes(bytes);
        }
    }

    fn u64(&mut self, slot: &mut u64) {
        if let Some(bytes) = self.take::<8>() {
            *slot = u64::from_le_bytes(bytes);
        }
    }

    fn bool(&mut self, slot: &mut bool) {
        if let Some([value]) = self.take::<1>() {
            *slot = value != 0;
        }
    }

    fn bytes(&mut self, slots: &mut [u8]) {
        let end = self.pos + slots.len();
        let Some(slice) = self.input.get(self.pos..end) else {
            self.truncated = true;
            return;
        };
        slots.copy_from_slice(slice);
        self.pos = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        a: u8,
        b: u16,
        c: i16,
        d: u64,
        e: bool,
        f: [u8; 4],
    }

    impl Sample {
        fn persist_with<V: SlotVisitor>(&mut self, visitor: &mut V) {
            visitor.u8(&mut self.a);
            visitor.u16(&mut self.b);
            visitor.i16(&mut self.c);
            visitor.u64(&mut self.d);
            visitor.bool(&mut self.e);
            visitor.bytes(&mut self.f);
        }
    }

    #[test]
    fn round_trip_restores_every_slot() {
        let mut sample = Sample {
            a: 0x12,
            b: 0x3456,
            c: -3,
            d: 0x0123_4567_89AB_CDEF,
            e: true,
            f: [1, 2, 3, 4],
        };
        let mut writer = Writer::new();
        sample.persist_with(&mut writer);
        let bytes = writer.finish();

        let mut restored = Sample {
            a: 0,
            b: 0,
            c: 0,
            d: 0,
            e: false,
            f: [0; 4],
        };
        let mut reader = Reader::new(&bytes);
        restored.persist_with(&mut reader);
        assert!(!reader.truncated());
        assert_eq!(restored.a, 0x12);
        assert_eq!(restored.b, 0x3456);
        assert_eq!(restored.c, -3);
        assert_eq!(restored.d, 0x0123_4567_89AB_CDEF);
        assert!(restored.e);
        assert_eq!(restored.f, [1, 2, 3, 4]);
    }

    #[test]
    fn truncated_input_is_detected() {
        let mut sample = Sample {
            a: 1,
            b: 2,
            c: 3,
            d: 4,
            e: false,
            f: [0; 4],
        };
        let mut writer = Writer::new();
        sample.persist_with(&mut writer);
        let bytes = writer.finish();

        let mut reader = Reader::new(&bytes[..bytes.len() - 2]);
        sample.persist_with(&mut reader);
        assert!(reader.truncated());
    }
}
