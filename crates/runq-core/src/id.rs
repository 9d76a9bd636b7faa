//! Runnable entity handle

use core::fmt;

/// Handle to a runnable entity (thread) owned by the caller
///
/// This is a 32-bit index into the caller's thread table. The run queue
/// never owns the entity; it only keeps linkage keyed by this index.
/// The maximum value (u32::MAX) is reserved as a sentinel for "no entity".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Sentinel value indicating no entity
    pub const NONE: EntityId = EntityId(u32::MAX);

    /// Create a new EntityId from a raw value
    #[inline]
    pub const fn new(id: u32) -> Self {
        EntityId(id)
    }

    /// Get the raw u32 value
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Get as usize for indexing
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Check if this is the NONE sentinel
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Check if this refers to an entity
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    /// Convert to Option, mapping the sentinel to None
    #[inline]
    pub const fn to_option(self) -> Option<EntityId> {
        if self.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<u32> for EntityId {
    #[inline]
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    #[inline]
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "EntityId(NONE)")
        } else {
            write!(f, "EntityId({})", self.0)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "td{}", self.0)
        }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_basics() {
        let id = EntityId::new(42);
        assert_eq!(id.as_u32(), 42);
        assert_eq!(id.as_usize(), 42);
        assert!(id.is_some());
        assert_eq!(id.to_option(), Some(id));
        assert_eq!(format!("{}", id), "td42");
    }

    #[test]
    fn test_entity_id_none() {
        let none = EntityId::default();
        assert!(none.is_none());
        assert_eq!(none.to_option(), None);
        assert_eq!(format!("{:?}", none), "EntityId(NONE)");
    }
}
