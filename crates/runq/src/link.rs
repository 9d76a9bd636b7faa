//! Per-entity queue linkage
//!
//! Each queue is a doubly linked FIFO threaded through a fixed arena of
//! link records, one per entity handle. The record also remembers which
//! queue the entity sits on, so unlinking never searches the queues.
//! Storage is sized once at construction; linking and unlinking never
//! allocate.

use runq_core::EntityId;

/// Queue index stored in an unlinked record
const UNLINKED: u32 = u32::MAX;

/// Linkage embedded in each entity slot
#[derive(Debug, Clone, Copy)]
struct Link {
    prev: EntityId,
    next: EntityId,
    queue: u32,
}

impl Link {
    const EMPTY: Link = Link {
        prev: EntityId::NONE,
        next: EntityId::NONE,
        queue: UNLINKED,
    };
}

/// Head of one FIFO
#[derive(Debug, Clone, Copy)]
struct QueueHead {
    head: EntityId,
    tail: EntityId,
    len: usize,
}

impl QueueHead {
    const EMPTY: QueueHead = QueueHead {
        head: EntityId::NONE,
        tail: EntityId::NONE,
        len: 0,
    };
}

/// Linkage arena plus the array of queue heads
pub(crate) struct Links {
    links: Box<[Link]>,
    heads: Box<[QueueHead]>,
}

impl Links {
    pub(crate) fn new(capacity: usize, num_queues: usize) -> Self {
        Self {
            links: vec![Link::EMPTY; capacity].into_boxed_slice(),
            heads: vec![QueueHead::EMPTY; num_queues].into_boxed_slice(),
        }
    }

    /// Unlink everything
    pub(crate) fn reset(&mut self) {
        self.links.iter_mut().for_each(|l| *l = Link::EMPTY);
        self.heads.iter_mut().for_each(|h| *h = QueueHead::EMPTY);
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub(crate) fn num_queues(&self) -> usize {
        self.heads.len()
    }

    /// Queue the entity is linked on, if any
    #[inline]
    pub(crate) fn queue_of(&self, id: EntityId) -> Option<usize> {
        match self.links.get(id.as_usize()) {
            Some(l) if l.queue != UNLINKED => Some(l.queue as usize),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn len(&self, q: usize) -> usize {
        self.heads[q].len
    }

    #[inline]
    pub(crate) fn head(&self, q: usize) -> Option<EntityId> {
        self.heads[q].head.to_option()
    }

    #[inline]
    pub(crate) fn queue(&self, q: usize) -> QueueRef<'_> {
        QueueRef { links: self, idx: q }
    }

    /// Append to the FIFO tail of queue `q`
    pub(crate) fn push_tail(&mut self, q: usize, id: EntityId) {
        debug_assert!(self.queue_of(id).is_none(), "{} linked twice", id);
        let tail = self.heads[q].tail;
        self.links[id.as_usize()] = Link {
            prev: tail,
            next: EntityId::NONE,
            queue: q as u32,
        };
        match tail.to_option() {
            Some(t) => self.links[t.as_usize()].next = id,
            None => self.heads[q].head = id,
        }
        self.heads[q].tail = id;
        self.heads[q].len += 1;
    }

    /// Insert at the FIFO head of queue `q`
    pub(crate) fn push_head(&mut self, q: usize, id: EntityId) {
        debug_assert!(self.queue_of(id).is_none(), "{} linked twice", id);
        let head = self.heads[q].head;
        self.links[id.as_usize()] = Link {
            prev: EntityId::NONE,
            next: head,
            queue: q as u32,
        };
        match head.to_option() {
            Some(h) => self.links[h.as_usize()].prev = id,
            None => self.heads[q].tail = id,
        }
        self.heads[q].head = id;
        self.heads[q].len += 1;
    }

    /// Unlink `id` from whatever queue holds it
    ///
    /// Returns the queue index it was on, or `None` if it was not linked.
    pub(crate) fn unlink(&mut self, id: EntityId) -> Option<usize> {
        let q = self.queue_of(id)?;
        let Link { prev, next, .. } = self.links[id.as_usize()];

        match prev.to_option() {
            Some(p) => self.links[p.as_usize()].next = next,
            None => self.heads[q].head = next,
        }
        match next.to_option() {
            Some(n) => self.links[n.as_usize()].prev = prev,
            None => self.heads[q].tail = prev,
        }
        self.heads[q].len -= 1;
        self.links[id.as_usize()] = Link::EMPTY;
        Some(q)
    }

    /// Walk queue `q` and compare with its head record
    ///
    /// Returns a description of the first inconsistency found.
    pub(crate) fn verify(&self, q: usize) -> Result<(), &'static str> {
        let head = &self.heads[q];
        let mut prev = EntityId::NONE;
        let mut cur = head.head;
        let mut n = 0usize;

        while let Some(id) = cur.to_option() {
            let link = self.links.get(id.as_usize()).ok_or("link out of range")?;
            if link.queue as usize != q {
                return Err("entity records a different queue");
            }
            if link.prev != prev {
                return Err("broken back link");
            }
            n += 1;
            if n > head.len {
                return Err("chain longer than recorded length");
            }
            prev = id;
            cur = link.next;
        }

        if n != head.len {
            return Err("chain shorter than recorded length");
        }
        if head.tail != prev {
            return Err("tail does not match last entity");
        }
        Ok(())
    }
}

/// Read-only view of one queue, handed to search predicates
#[derive(Clone, Copy)]
pub struct QueueRef<'a> {
    links: &'a Links,
    idx: usize,
}

impl<'a> QueueRef<'a> {
    /// Queue index
    #[inline]
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Number of linked entities
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len(self.idx)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entity at the FIFO head
    #[inline]
    pub fn head(&self) -> Option<EntityId> {
        self.links.head(self.idx)
    }

    /// Entities in FIFO order
    pub fn iter(&self) -> QueueIter<'a> {
        QueueIter {
            links: self.links,
            cur: self.links.heads[self.idx].head,
            remaining: self.len(),
        }
    }
}

/// FIFO-order iterator over one queue
pub struct QueueIter<'a> {
    links: &'a Links,
    cur: EntityId,
    remaining: usize,
}

impl<'a> Iterator for QueueIter<'a> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        let id = self.cur.to_option()?;
        self.cur = self.links.links[id.as_usize()].next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
