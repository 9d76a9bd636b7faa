//! Priority-to-queue geometry
//!
//! A run queue covers priorities `0..=MAX_PRIO`. Consecutive priorities are
//! folded into one queue by a fixed divisor, and queue occupancy is mirrored
//! in machine words of `BITS_PER_WORD` bits each.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        /// One word of the status bitmap
        pub type StatusWord = u64;
    } else {
        /// One word of the status bitmap
        pub type StatusWord = u32;
    }
}

/// Bits per status word
pub const BITS_PER_WORD: usize = StatusWord::BITS as usize;

/// Highest (least favorable) priority of the reference scheduler
pub const MAX_PRIO: usize = 255;

/// Priorities folded into one queue in the reference scheduler
pub const PRIORITIES_PER_QUEUE: usize = 1;

/// Queue count of the reference scheduler
pub const NUM_QUEUES: usize = num_queues(MAX_PRIO, PRIORITIES_PER_QUEUE);

/// Number of queues needed for priorities `0..=max_prio`
///
/// Returns 0 for a zero divisor; callers reject that geometry.
#[inline]
pub const fn num_queues(max_prio: usize, per_queue: usize) -> usize {
    if per_queue == 0 {
        return 0;
    }
    (max_prio + 1 + per_queue - 1) / per_queue
}

/// Number of status words needed to hold `num_queues` bits
#[inline]
pub const fn num_words(num_queues: usize) -> usize {
    (num_queues + BITS_PER_WORD - 1) / BITS_PER_WORD
}

/// Queue index a priority maps to
#[inline]
pub const fn prio_to_idx(prio: usize, per_queue: usize) -> usize {
    prio / per_queue
}

/// Split a queue index into (word, bit)
#[inline]
pub const fn word_and_bit(idx: usize) -> (usize, usize) {
    (idx / BITS_PER_WORD, idx % BITS_PER_WORD)
}

/// Join (word, bit) back into a queue index
#[inline]
pub const fn idx_of(word: usize, bit: usize) -> usize {
    word * BITS_PER_WORD + bit
}
