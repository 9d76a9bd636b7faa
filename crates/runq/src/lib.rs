//! # runq - Priority Run Queue
//!
//! The data structure a preemptive, priority-based thread scheduler keeps
//! its runnable threads in. Answers "which thread runs next" in effectively
//! constant time by mirroring queue occupancy in a word-scanned bitmap.
//!
//! ## Quick Start
//!
//! ```
//! use runq::{AddFlags, EntityId, RunQueue};
//!
//! let mut rq: RunQueue = RunQueue::new(1024).unwrap();
//!
//! rq.add(EntityId::new(1), 50, AddFlags::empty());
//! rq.add(EntityId::new(2), 10, AddFlags::empty());
//! rq.add(EntityId::new(3), 10, AddFlags::empty());
//!
//! assert_eq!(rq.choose(), Some(EntityId::new(2)));
//! assert_eq!(rq.choose(), Some(EntityId::new(3)));
//! assert_eq!(rq.choose(), Some(EntityId::new(1)));
//! assert_eq!(rq.choose(), None);
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   status bitmap   [word 0       ][word 1       ][word 2 ] ...
//!                     bit i set <=> queue i non-empty
//!                          │
//!   queue heads     [q0][q1][q2] ... [qN-1]    (head, tail, len)
//!                          │
//!   link arena      [td0][td1][td2] ...        (prev, next, queue)
//! ```
//!
//! Entities are caller-owned; the run queue keeps only their linkage,
//! indexed by `EntityId`. The run queue is not synchronized: callers hold
//! their scheduler lock around every operation.

mod link;
pub mod config;
pub mod runq;
mod select;

pub use config::RunqConfig;
pub use link::{QueueIter, QueueRef};
pub use runq::{AddFlags, RunQueue};

pub use runq_core::{EntityId, RunqError, RunqResult, MAX_PRIO, NUM_QUEUES, PRIORITIES_PER_QUEUE};
