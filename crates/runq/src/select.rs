//! Selection: which runnable entity runs next
//!
//! All searches go through `findq`, which walks only the non-empty queues
//! of a range using the status bitmap. Lower queue index wins; within a
//! queue the FIFO head wins. `choose_fuzz` relaxes the first rule inside
//! a bounded window.

use runq_core::{ktrace, EntityId};

use crate::link::QueueRef;
use crate::runq::RunQueue;

#[inline]
fn any_queue(_idx: usize, _queue: QueueRef<'_>) -> bool {
    true
}

impl<const MAX_PRIO: usize, const PPQ: usize> RunQueue<MAX_PRIO, PPQ> {
    /// Check if any queue holds an entity
    #[inline]
    pub fn runq_not_empty(&self) -> bool {
        self.bitmap.any()
    }

    /// First non-empty queue in `lvl_min..=lvl_max` accepted by `pred`
    ///
    /// Queues are offered in increasing index order, empty ones are never
    /// offered. An inverted range is empty.
    pub fn findq<P>(&self, lvl_min: usize, lvl_max: usize, mut pred: P) -> Option<usize>
    where
        P: FnMut(usize, QueueRef<'_>) -> bool,
    {
        if lvl_min > lvl_max {
            return None;
        }
        let hi = lvl_max.min(Self::MAX_LEVEL);
        let mut from = lvl_min;

        while let Some(idx) = self.bitmap.next_set(from, hi) {
            if pred(idx, self.links.queue(idx)) {
                return Some(idx);
            }
            from = idx + 1;
        }
        None
    }

    /// Peek the most favorable entity within `lvl_min..=lvl_max`
    pub fn first_thread_range(&self, lvl_min: usize, lvl_max: usize) -> Option<EntityId> {
        let idx = self.findq(lvl_min, lvl_max, any_queue)?;
        self.links.head(idx)
    }

    /// Peek the head of queue `idx`
    pub fn first_thread(&self, idx: usize) -> Option<EntityId> {
        if idx >= Self::NUM_QUEUES {
            return None;
        }
        self.links.head(idx)
    }

    /// Dequeue the most favorable entity
    ///
    /// `None` means the run queue is empty and the caller should idle.
    pub fn choose(&mut self) -> Option<EntityId> {
        let id = self.first_thread_range(0, Self::MAX_LEVEL)?;
        self.remove(id);
        Some(id)
    }

    /// Dequeue from a queue picked at random near the most favorable one
    ///
    /// The window is the non-empty queues with index in
    /// `best..=best + fuzz - 1`, `best` being the most favorable non-empty
    /// queue; each is equally likely. A `fuzz` of 0 or 1 is `choose`.
    pub fn choose_fuzz(&mut self, fuzz: usize) -> Option<EntityId> {
        let best = self.findq(0, Self::MAX_LEVEL, any_queue)?;
        if fuzz <= 1 {
            return self.dequeue_head(best);
        }
        let hi = best.saturating_add(fuzz - 1).min(Self::MAX_LEVEL);

        let mut candidates = 0usize;
        self.findq(best, hi, |_, _| {
            candidates += 1;
            false
        });

        let pick = self.rng.below(candidates);
        let mut seen = 0usize;
        let idx = self
            .findq(best, hi, |_, _| {
                let hit = seen == pick;
                seen += 1;
                hit
            })
            .unwrap_or(best);

        ktrace!("runq: fuzz {} best {} picked {} of {}", fuzz, best, idx, candidates);
        self.dequeue_head(idx)
    }

    /// Dequeue from the most favorable queue, preferring a nearby entity
    ///
    /// Among the first `fuzz` entities of the most favorable queue, the
    /// first one `prefer` accepts is taken (for example one that last ran
    /// on the calling CPU); failing that, the head.
    pub fn choose_fuzz_by<F>(&mut self, fuzz: usize, mut prefer: F) -> Option<EntityId>
    where
        F: FnMut(EntityId) -> bool,
    {
        let best = self.findq(0, Self::MAX_LEVEL, any_queue)?;
        let id = self
            .links
            .queue(best)
            .iter()
            .take(fuzz.max(1))
            .find(|&id| prefer(id))
            .or_else(|| self.links.head(best))?;
        self.remove(id);
        Some(id)
    }

    /// Dequeue the head of the first non-empty queue at or after `start`
    ///
    /// The search wraps around to queue 0. Time-share schedulers use this
    /// with a rotating start index so every band makes progress.
    pub fn choose_from(&mut self, start: usize) -> Option<EntityId> {
        let start = start % Self::NUM_QUEUES;
        let idx = self
            .findq(start, Self::MAX_LEVEL, any_queue)
            .or_else(|| start.checked_sub(1).and_then(|end| self.findq(0, end, any_queue)))?;
        self.dequeue_head(idx)
    }

    /// Dequeue the first entity `pred` accepts
    ///
    /// Queues are searched most favorable first and each in FIFO order.
    pub fn steal<F>(&mut self, pred: F) -> Option<EntityId>
    where
        F: FnMut(EntityId) -> bool,
    {
        self.steal_from(0, pred)
    }

    /// Like `steal`, starting at queue `start` and wrapping around
    pub fn steal_from<F>(&mut self, start: usize, mut pred: F) -> Option<EntityId>
    where
        F: FnMut(EntityId) -> bool,
    {
        let start = start % Self::NUM_QUEUES;
        let wrapped = start.checked_sub(1).map(|end| (0, end));
        let mut found = None;

        for (lo, hi) in core::iter::once((start, Self::MAX_LEVEL)).chain(wrapped) {
            self.findq(lo, hi, |_, q| {
                found = q.iter().find(|&id| pred(id));
                found.is_some()
            });
            if found.is_some() {
                break;
            }
        }

        let id = found?;
        self.remove(id);
        ktrace!("runq: steal {}", id);
        Some(id)
    }
}
