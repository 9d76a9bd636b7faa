//! Priority run queue
//!
//! An array of per-priority FIFO queues of runnable entities, paired with a
//! status bitmap that mirrors which queues are non-empty. Lower queue index
//! is more favorable.
//!
//! Invariant: bit `idx` of the status bitmap is set iff queue `idx` is
//! non-empty. Every mutating operation keeps it.
//!
//! The run queue is not synchronized. The caller holds its scheduler lock
//! around every call, and nothing here blocks or allocates after `new`.

use bitflags::bitflags;

use runq_core::geometry::{num_queues, prio_to_idx};
use runq_core::{kdebug, kerror, ktrace, kwarn};
use runq_core::{EntityId, FuzzRng, RunqError, RunqResult, StatusBitmap};

use crate::config::RunqConfig;
use crate::link::{Links, QueueIter, QueueRef};

bitflags! {
    /// Insertion flags for `add`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AddFlags: u32 {
        /// Entity was preempted: insert at the queue head, ahead of its peers
        const PREEMPTED = 1 << 0;
    }
}

/// Priority run queue over priorities `0..=MAX_PRIO`, `PPQ` priorities per queue
pub struct RunQueue<const MAX_PRIO: usize = 255, const PPQ: usize = 1> {
    /// Occupancy mirror of `links`' queues
    pub(crate) bitmap: StatusBitmap,

    /// Queue heads and per-entity linkage
    pub(crate) links: Links,

    /// Generator for fuzzed selection
    pub(crate) rng: FuzzRng,

    /// Total linked entities
    len: usize,

    /// Panic on contract violations regardless of build profile
    strict: bool,
}

impl<const MAX_PRIO: usize, const PPQ: usize> RunQueue<MAX_PRIO, PPQ> {
    /// Number of queues
    pub const NUM_QUEUES: usize = num_queues(MAX_PRIO, PPQ);

    /// Index of the least favorable queue
    pub const MAX_LEVEL: usize = Self::NUM_QUEUES.saturating_sub(1);

    /// Create an empty run queue covering entity handles `0..max_entities`
    pub fn new(max_entities: usize) -> RunqResult<Self> {
        Self::with_config(&RunqConfig::default().max_entities(max_entities))
    }

    /// Create an empty run queue from configuration
    pub fn with_config(config: &RunqConfig) -> RunqResult<Self> {
        if PPQ == 0 {
            return Err(RunqError::InvalidGeometry("zero priorities per queue"));
        }
        if config.max_entities > EntityId::NONE.as_usize() {
            return Err(RunqError::CapacityTooLarge(config.max_entities));
        }

        let mut rq = Self {
            bitmap: StatusBitmap::new(Self::NUM_QUEUES),
            links: Links::new(config.max_entities, Self::NUM_QUEUES),
            rng: FuzzRng::new(config.seed),
            len: 0,
            strict: config.strict,
        };
        rq.init();
        kdebug!(
            "runq: {} queues ({} prios, {} per queue), {} entities",
            Self::NUM_QUEUES,
            MAX_PRIO + 1,
            PPQ,
            config.max_entities
        );
        Ok(rq)
    }

    /// Empty every queue and clear every status bit
    ///
    /// Expected only on an empty run queue. A non-empty one is reported and
    /// then emptied; its entities are simply forgotten.
    pub fn init(&mut self) {
        if self.len != 0 {
            kwarn!("runq: init with {} entities still linked", self.len);
            debug_assert!(self.len == 0, "init on non-empty run queue");
        }
        self.bitmap.clear_all();
        self.links.reset();
        self.len = 0;
    }

    /// Queue index for a priority
    #[inline]
    pub const fn prio_to_idx(prio: usize) -> usize {
        prio_to_idx(prio, PPQ)
    }

    /// Check whether queue `idx` is empty
    #[inline]
    pub fn is_queue_empty(&self, idx: usize) -> bool {
        !self.bitmap.test(idx)
    }

    /// Link `id` at priority `prio`
    ///
    /// Adding an entity that is already linked, or with an out-of-range
    /// priority or handle, is a contract violation: logged, fatal in debug
    /// or strict builds, otherwise ignored.
    pub fn add(&mut self, id: EntityId, prio: usize, flags: AddFlags) {
        if let Err(e) = self.try_add(id, prio, flags) {
            self.violation(e);
        }
    }

    /// Link `id` on a precomputed queue index
    pub fn add_idx(&mut self, id: EntityId, idx: usize, flags: AddFlags) {
        if let Err(e) = self.try_add_idx(id, idx, flags) {
            self.violation(e);
        }
    }

    /// Checked form of `add`
    pub fn try_add(&mut self, id: EntityId, prio: usize, flags: AddFlags) -> RunqResult<()> {
        if prio > MAX_PRIO {
            return Err(RunqError::PriorityOutOfRange { prio, max: MAX_PRIO });
        }
        self.try_add_idx(id, Self::prio_to_idx(prio), flags)
    }

    /// Checked form of `add_idx`
    pub fn try_add_idx(&mut self, id: EntityId, idx: usize, flags: AddFlags) -> RunqResult<()> {
        if idx >= Self::NUM_QUEUES {
            return Err(RunqError::QueueOutOfRange { idx, num_queues: Self::NUM_QUEUES });
        }
        if id.as_usize() >= self.links.capacity() {
            return Err(RunqError::EntityOutOfRange { id, capacity: self.links.capacity() });
        }
        if let Some(queue) = self.links.queue_of(id) {
            return Err(RunqError::AlreadyLinked { id, queue });
        }

        if flags.contains(AddFlags::PREEMPTED) {
            self.links.push_head(idx, id);
        } else {
            self.links.push_tail(idx, id);
        }
        self.bitmap.set(idx);
        self.len += 1;
        ktrace!("runq: add {} idx {} {:?}", id, idx, flags);
        Ok(())
    }

    /// Unlink `id` from the queue it is on
    ///
    /// The entity's link record carries its queue index, so no queue is
    /// searched. Returns false if `id` was not linked.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(idx) = self.links.unlink(id) else {
            ktrace!("runq: remove {} not linked", id);
            return false;
        };
        debug_assert!(self.bitmap.test(idx), "status bit clear for linked queue {}", idx);

        if self.links.len(idx) == 0 {
            self.bitmap.clear(idx);
        }
        self.len -= 1;
        ktrace!("runq: remove {} idx {}", id, idx);
        true
    }

    /// Queue index `id` is linked on
    #[inline]
    pub fn queue_of(&self, id: EntityId) -> Option<usize> {
        self.links.queue_of(id)
    }

    #[inline]
    pub fn is_linked(&self, id: EntityId) -> bool {
        self.links.queue_of(id).is_some()
    }

    /// Total linked entities
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entities linked on queue `idx`
    pub fn queue_len(&self, idx: usize) -> usize {
        if idx >= Self::NUM_QUEUES {
            return 0;
        }
        self.links.len(idx)
    }

    /// Entity handle capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.links.capacity()
    }

    #[inline]
    pub fn num_queues(&self) -> usize {
        Self::NUM_QUEUES
    }

    /// Status bitmap (diagnostics)
    #[inline]
    pub fn bitmap(&self) -> &StatusBitmap {
        &self.bitmap
    }

    /// Read-only view of queue `idx`
    pub fn queue(&self, idx: usize) -> Option<QueueRef<'_>> {
        (idx < Self::NUM_QUEUES).then(|| self.links.queue(idx))
    }

    /// Entities of queue `idx` in FIFO order
    pub fn iter_queue(&self, idx: usize) -> QueueIter<'_> {
        assert!(idx < Self::NUM_QUEUES, "queue index {} out of range", idx);
        self.links.queue(idx).iter()
    }

    /// Restart the fuzz generator
    pub fn reseed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    /// Verify bitmap/queue consistency and every queue's chain
    pub fn check_invariants(&self) -> RunqResult<()> {
        let mut total = 0;
        for idx in 0..Self::NUM_QUEUES {
            self.links
                .verify(idx)
                .map_err(|what| RunqError::InvariantViolated { queue: idx, what })?;

            let n = self.links.len(idx);
            if self.bitmap.test(idx) != (n != 0) {
                return Err(RunqError::InvariantViolated {
                    queue: idx,
                    what: "status bit disagrees with queue occupancy",
                });
            }
            total += n;
        }
        if total != self.len {
            return Err(RunqError::InvariantViolated {
                queue: Self::NUM_QUEUES,
                what: "total length mismatch",
            });
        }
        Ok(())
    }

    /// Dequeue the head of a queue known to be non-empty
    pub(crate) fn dequeue_head(&mut self, idx: usize) -> Option<EntityId> {
        let id = self.links.head(idx)?;
        let removed = self.remove(id);
        debug_assert!(removed);
        Some(id)
    }

    fn violation(&self, err: RunqError) {
        kerror!("runq: contract violation: {}", err);
        if self.strict || cfg!(debug_assertions) {
            panic!("run queue contract violation: {}", err);
        }
    }
}

impl<const MAX_PRIO: usize, const PPQ: usize> core::fmt::Debug for RunQueue<MAX_PRIO, PPQ> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RunQueue")
            .field("num_queues", &Self::NUM_QUEUES)
            .field("len", &self.len)
            .field("bitmap", &self.bitmap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Rq = RunQueue<255, 1>;

    fn td(n: u32) -> EntityId {
        EntityId::new(n)
    }

    #[test]
    fn test_add_remove_updates_bitmap() {
        let mut rq = Rq::new(16).unwrap();
        rq.add(td(1), 5, AddFlags::empty());
        assert!(!rq.is_queue_empty(5));
        assert_eq!(rq.queue_of(td(1)), Some(5));
        assert_eq!(rq.len(), 1);

        assert!(rq.remove(td(1)));
        assert!(rq.is_queue_empty(5));
        assert!(!rq.remove(td(1)));
        assert!(rq.is_empty());
        assert!(rq.check_invariants().is_ok());
    }

    #[test]
    fn test_bit_stays_set_until_last_removed() {
        let mut rq = Rq::new(16).unwrap();
        rq.add(td(1), 40, AddFlags::empty());
        rq.add(td(2), 40, AddFlags::empty());

        assert!(rq.remove(td(1)));
        assert!(!rq.is_queue_empty(40));
        assert!(rq.remove(td(2)));
        assert!(rq.is_queue_empty(40));
    }

    #[test]
    fn test_preempted_goes_to_head() {
        let mut rq = Rq::new(16).unwrap();
        rq.add(td(1), 20, AddFlags::empty());
        rq.add(td(2), 20, AddFlags::empty());
        rq.add(td(3), 20, AddFlags::PREEMPTED);

        let order: Vec<u32> = rq.iter_queue(20).map(|id| id.as_u32()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_add_idx_matches_add() {
        let mut rq = RunQueue::<255, 4>::new(16).unwrap();
        assert_eq!(RunQueue::<255, 4>::NUM_QUEUES, 64);

        rq.add(td(1), 9, AddFlags::empty());
        rq.add_idx(td(2), 2, AddFlags::empty());
        assert_eq!(rq.queue_of(td(1)), Some(2));
        assert_eq!(rq.queue_len(2), 2);
        assert!(rq.check_invariants().is_ok());
    }

    #[test]
    fn test_try_add_errors() {
        let mut rq = Rq::new(4).unwrap();
        assert_eq!(
            rq.try_add(td(0), 256, AddFlags::empty()),
            Err(RunqError::PriorityOutOfRange { prio: 256, max: 255 })
        );
        assert_eq!(
            rq.try_add_idx(td(0), 256, AddFlags::empty()),
            Err(RunqError::QueueOutOfRange { idx: 256, num_queues: 256 })
        );
        assert_eq!(
            rq.try_add(td(4), 0, AddFlags::empty()),
            Err(RunqError::EntityOutOfRange { id: td(4), capacity: 4 })
        );

        rq.try_add(td(0), 7, AddFlags::empty()).unwrap();
        assert_eq!(
            rq.try_add(td(0), 9, AddFlags::empty()),
            Err(RunqError::AlreadyLinked { id: td(0), queue: 7 })
        );

        // Failed adds leave the structure untouched
        assert_eq!(rq.len(), 1);
        assert!(rq.is_queue_empty(9));
        assert!(rq.check_invariants().is_ok());
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_double_add_panics_when_strict() {
        let config = RunqConfig::new().max_entities(4).strict(true);
        let mut rq = Rq::with_config(&config).unwrap();
        rq.add(td(1), 3, AddFlags::empty());
        rq.add(td(1), 3, AddFlags::empty());
    }

    #[test]
    fn test_geometry_errors() {
        assert_eq!(
            RunQueue::<255, 0>::new(4).err(),
            Some(RunqError::InvalidGeometry("zero priorities per queue"))
        );
    }

    #[test]
    fn test_init_resets() {
        let mut rq = Rq::new(8).unwrap();
        rq.init();
        assert!(rq.is_empty());
        assert!(!rq.bitmap().any());
        assert_eq!(rq.num_queues(), 256);
        assert_eq!(rq.capacity(), 8);
        assert_eq!(Rq::MAX_LEVEL, 255);
    }

    #[test]
    fn test_out_of_range_queries() {
        let mut rq = Rq::new(8).unwrap();
        assert!(rq.is_queue_empty(1000));
        assert_eq!(rq.queue_len(1000), 0);
        assert!(rq.queue(1000).is_none());
        assert!(!rq.is_linked(td(99)));
        assert!(!rq.remove(td(99)));
    }
}
