//! Bit-phase views of a chunk payload
//!
//! Film event records are packed into a bit stream, so a byte pattern
//! can start at any bit within a byte. Rather than matching at the bit
//! level, the payload is re-read under all 8 left-rotations; byte
//! scanners then run unchanged on each view.

/// Number of bit phases a byte pattern can occupy.
pub const SHIFT_COUNT: u8 = 8;

/// One left-rotated rendering of a payload.
///
/// View byte `i` at shift `k` holds payload bits `[i*8+k, i*8+k+8)`,
/// most significant first. Every view is one byte shorter than the
/// payload so the last byte never reads past the end.
#[derive(Debug, Clone)]
pub struct BitShiftedView {
    shift: u8,
    bytes: Vec<u8>,
}

impl BitShiftedView {
    /// Build the view for one bit phase. `shift` must be below 8.
    pub fn new(data: &[u8], shift: u8) -> Self {
        debug_assert!(shift < SHIFT_COUNT);
        if data.len() < 2 {
            return Self {
                shift,
                bytes: Vec::new(),
            };
        }

        let mut bytes = Vec::with_capacity(data.len() - 1);
        if shift == 0 {
            bytes.extend_from_slice(&data[..data.len() - 1]);
        } else {
            for i in 0..data.len() - 1 {
                bytes.push((data[i] << shift) | (data[i + 1] >> (8 - shift)));
            }
        }
        Self { shift, bytes }
    }

    pub fn shift(&self) -> u8 {
        self.shift
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// All 8 bit-phase views of a payload, shift 0 first.
pub fn all_shifts(data: &[u8]) -> Vec<BitShiftedView> {
    (0..SHIFT_COUNT).map(|k| BitShiftedView::new(data, k)).collect()
}
