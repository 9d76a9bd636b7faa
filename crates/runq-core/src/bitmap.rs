//! Run queue status bitmap
//!
//! One bit per queue index, set while that queue is non-empty. Lookups
//! scan whole words and use bit-scan-forward on the first non-zero word,
//! so a sparse priority space costs a handful of word probes rather than
//! one probe per queue.
//!
//! Not internally synchronized: the owning run queue is protected by the
//! caller's scheduler lock.

use crate::geometry::{idx_of, num_words, word_and_bit, StatusWord, BITS_PER_WORD};

/// Index of the lowest set bit of a non-zero word
#[inline]
fn bsf(word: StatusWord) -> usize {
    debug_assert!(word != 0, "bit scan on empty status word");
    word.trailing_zeros() as usize
}

/// Mask of bits `bit..BITS_PER_WORD`
#[inline]
fn mask_from(bit: usize) -> StatusWord {
    StatusWord::MAX << bit
}

/// Mask of bits `0..=bit`
#[inline]
fn mask_through(bit: usize) -> StatusWord {
    if bit + 1 >= BITS_PER_WORD {
        StatusWord::MAX
    } else {
        (1 << (bit + 1)) - 1
    }
}

/// Occupancy bitmap for a run queue
#[derive(Clone)]
pub struct StatusBitmap {
    /// Status words, bit `b` of word `w` is queue `w * BITS_PER_WORD + b`
    words: Box<[StatusWord]>,

    /// Number of meaningful bits (queues)
    num_bits: usize,
}

impl StatusBitmap {
    /// Create a zeroed bitmap for `num_bits` queues
    pub fn new(num_bits: usize) -> Self {
        Self {
            words: vec![0; num_words(num_bits)].into_boxed_slice(),
            num_bits,
        }
    }

    /// Number of queues covered
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of status words
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Raw status words (diagnostics)
    #[inline]
    pub fn words(&self) -> &[StatusWord] {
        &self.words
    }

    /// Mark queue `idx` non-empty
    #[inline]
    pub fn set(&mut self, idx: usize) {
        debug_assert!(idx < self.num_bits, "status bit {} out of range", idx);
        let (w, b) = word_and_bit(idx);
        self.words[w] |= 1 << b;
    }

    /// Mark queue `idx` empty
    #[inline]
    pub fn clear(&mut self, idx: usize) {
        debug_assert!(idx < self.num_bits, "status bit {} out of range", idx);
        let (w, b) = word_and_bit(idx);
        self.words[w] &= !(1 << b);
    }

    /// Check whether queue `idx` is marked non-empty
    #[inline]
    pub fn test(&self, idx: usize) -> bool {
        if idx >= self.num_bits {
            return false;
        }
        let (w, b) = word_and_bit(idx);
        self.words[w] & (1 << b) != 0
    }

    /// Zero every status word
    pub fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Find the lowest set bit in words `word_lo..=word_hi`
    ///
    /// Returns `(word_idx, bit_idx)` of the first non-zero word's lowest
    /// set bit. An empty or inverted range yields `None`.
    pub fn first_set_in_range(&self, word_lo: usize, word_hi: usize) -> Option<(usize, usize)> {
        let word_hi = word_hi.min(self.words.len().checked_sub(1)?);
        if word_lo > word_hi {
            return None;
        }

        self.words[word_lo..=word_hi]
            .iter()
            .position(|&w| w != 0)
            .map(|off| {
                let w = word_lo + off;
                (w, bsf(self.words[w]))
            })
    }

    /// Lowest set queue index within `from..=to`
    ///
    /// Partial words at both ends of the range are masked, the interior is
    /// scanned a word at a time.
    pub fn next_set(&self, from: usize, to: usize) -> Option<usize> {
        if from > to || from >= self.num_bits {
            return None;
        }
        let to = to.min(self.num_bits - 1);
        let (lo_w, lo_b) = word_and_bit(from);
        let (hi_w, hi_b) = word_and_bit(to);

        let mut head = self.words[lo_w] & mask_from(lo_b);
        if lo_w == hi_w {
            head &= mask_through(hi_b);
        }
        if head != 0 {
            return Some(idx_of(lo_w, bsf(head)));
        }
        if lo_w == hi_w {
            return None;
        }

        // Every word before the hit is zero, so a hit past `to` means none
        // in range.
        self.first_set_in_range(lo_w + 1, hi_w)
            .map(|(w, b)| idx_of(w, b))
            .filter(|&idx| idx <= to)
    }

    /// Check if any queue is marked non-empty
    #[inline]
    pub fn any(&self) -> bool {
        self.words.iter().any(|&w| w != 0)
    }

    /// Count non-empty queues (diagnostics)
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl core::fmt::Debug for StatusBitmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StatusBitmap")
            .field("num_bits", &self.num_bits)
            .field("set", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bitmap_set_clear() {
        let mut bitmap = StatusBitmap::new(256);

        assert!(!bitmap.test(42));

        bitmap.set(42);
        assert!(bitmap.test(42));

        // Setting twice is a no-op
        bitmap.set(42);
        assert_eq!(bitmap.count(), 1);

        bitmap.clear(42);
        assert!(!bitmap.test(42));

        bitmap.clear(42);
        assert_eq!(bitmap.count(), 0);
        assert!(!bitmap.any());
    }

    #[test]
    fn test_first_set_in_range() {
        let mut bitmap = StatusBitmap::new(4 * BITS_PER_WORD);
        assert_eq!(bitmap.first_set_in_range(0, 3), None);

        bitmap.set(2 * BITS_PER_WORD + 5);
        bitmap.set(3 * BITS_PER_WORD + 1);

        assert_eq!(bitmap.first_set_in_range(0, 3), Some((2, 5)));
        assert_eq!(bitmap.first_set_in_range(3, 3), Some((3, 1)));
        assert_eq!(bitmap.first_set_in_range(0, 1), None);

        // Inverted and out-of-range bounds
        assert_eq!(bitmap.first_set_in_range(3, 2), None);
        assert_eq!(bitmap.first_set_in_range(0, 99), Some((2, 5)));
    }

    #[test]
    fn test_next_set_masks_partial_words() {
        let mut bitmap = StatusBitmap::new(256);
        bitmap.set(3);
        bitmap.set(10);
        bitmap.set(200);

        assert_eq!(bitmap.next_set(0, 255), Some(3));
        assert_eq!(bitmap.next_set(4, 255), Some(10));
        assert_eq!(bitmap.next_set(4, 9), None);
        assert_eq!(bitmap.next_set(11, 199), None);
        assert_eq!(bitmap.next_set(11, 200), Some(200));
        assert_eq!(bitmap.next_set(201, 255), None);
        assert_eq!(bitmap.next_set(10, 3), None);
        assert_eq!(bitmap.next_set(300, 400), None);
    }

    #[test]
    fn test_partial_last_word() {
        // 100 bits -> the last word is only partly meaningful
        let mut bitmap = StatusBitmap::new(100);
        bitmap.set(99);
        assert_eq!(bitmap.next_set(0, 1000), Some(99));
        assert!(!bitmap.test(100));
    }

    proptest! {
        #[test]
        fn prop_next_set_matches_linear_scan(
            bits in prop::collection::btree_set(0usize..256, 0..40),
            from in 0usize..256,
            to in 0usize..256,
        ) {
            let mut bitmap = StatusBitmap::new(256);
            for &b in &bits {
                bitmap.set(b);
            }
            let expected = bits.iter().copied().find(|&b| b >= from && b <= to);
            prop_assert_eq!(bitmap.next_set(from, to), expected);
        }
    }
}
