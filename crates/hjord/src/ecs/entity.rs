//! # Entity — Monotonic Identifiers
//!
//! An [`EntityId`] is just a number. It doesn't "contain" anything; the
//! [`World`](super::world::World) maps it to a [`Bitset`](super::Bitset) and,
//! through that, to a row in one archetype.
//!
//! ## Design: No Recycling
//!
//! Generational indices (hecs, bevy_ecs) recycle slots and bump a generation
//! counter so stale handles can be detected. We skip all of that: ids come
//! from a counter that only goes up, so a destroyed id can never alias a live
//! entity.
//!
//! ```text
//! create → Entity(0)
//! create → Entity(1)
//! destroy Entity(0)
//! create → Entity(2)     ← 0 is gone for good
//! ```
//!
//! The cost is an id space that grows for the lifetime of the process. With a
//! `u64` counter that is not a practical limit.

use std::fmt;

/// A lightweight handle to an entity in the [`World`](super::world::World).
///
/// Created by [`World::create_entity`](super::world::World::create_entity).
/// Ids are unique for the lifetime of the allocator that produced them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id. Useful for tests and diagnostics.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out [`EntityId`]s in increasing order, starting at 0.
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    /// The next id to hand out. Also the number of ids ever allocated.
    next: u64,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate a fresh [`EntityId`].
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Total number of ids ever allocated.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}
