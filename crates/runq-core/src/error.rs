//! Error types for the run queue
//!
//! Every variant is a structural contract violation by the caller. An
//! empty run queue is not an error; selection returns `None` for that.

use thiserror::Error;

use crate::id::EntityId;

/// Result type for run queue operations
pub type RunqResult<T> = Result<T, RunqError>;

/// Errors that can occur in run queue operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunqError {
    /// Entity is already linked on a queue
    #[error("{id} already linked on queue {queue}")]
    AlreadyLinked { id: EntityId, queue: usize },

    /// Entity is not linked on any queue
    #[error("{0} not linked")]
    NotLinked(EntityId),

    /// Entity handle is beyond the run queue's capacity
    #[error("{id} out of range (capacity {capacity})")]
    EntityOutOfRange { id: EntityId, capacity: usize },

    /// Priority is above the highest level
    #[error("priority {prio} out of range (max {max})")]
    PriorityOutOfRange { prio: usize, max: usize },

    /// Queue index is beyond the queue array
    #[error("queue index {idx} out of range ({num_queues} queues)")]
    QueueOutOfRange { idx: usize, num_queues: usize },

    /// Priorities-per-queue divisor of zero
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),

    /// Requested capacity does not fit the entity handle space
    #[error("capacity {0} exceeds entity handle space")]
    CapacityTooLarge(usize),

    /// Bitmap and queue array disagree
    #[error("invariant violated on queue {queue}: {what}")]
    InvariantViolated { queue: usize, what: &'static str },
}
