//! # Bitset — Component Sets as a Single Word
//!
//! Every component type gets a small integer [`ComponentId`] from the
//! [`ComponentRegistry`](super::registry::ComponentRegistry). A [`Bitset`] is a
//! `u64` where bit *i* means "component *i* is present".
//!
//! The same type plays two roles:
//!
//! 1. **Archetype key** — the exact set of components an entity carries.
//! 2. **Disabled mask** — the subset of an entity's components that is hidden
//!    from queries without being removed from storage.
//!
//! ```text
//! ComponentId:   6 5 4 3 2 1 0
//! Bitset:        0 1 0 1 1 0 0   → { 2, 3, 5 }
//!                            ^
//!                            bit 0 is never handed out, so the empty set
//!                            and "no component" share the value 0.
//! ```
//!
//! ## Comparison
//!
//! - **hecs**: archetype keys are sorted `[TypeId]` lists. Flexible, but
//!   every lookup hashes a vector.
//! - **bevy_ecs**: `FixedBitSet` over component ids, unbounded width.
//!
//! A single word caps the registry at 63 component types, which keeps keys
//! `Copy` and subset tests a single AND.

use std::fmt;

/// Identifier of a registered component type.
///
/// Assigned by the registry starting at 1. Id 0 is reserved for "no component".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u8);

impl ComponentId {
    /// Build an id from its raw value.
    ///
    /// Normally ids come from the registry; this is for tests and tooling.
    ///
    /// # Panics
    ///
    /// Panics if `raw` doesn't fit in a [`Bitset`] (`raw >= 64`).
    pub const fn new(raw: u8) -> Self {
        match Self::try_new(raw) {
            Some(id) => id,
            None => panic!("component id out of range: must be below 64"),
        }
    }

    /// Build an id from its raw value, or `None` if `raw >= 64`.
    pub const fn try_new(raw: u8) -> Option<Self> {
        if (raw as u32) < Bitset::CAPACITY {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// The raw bit index.
    pub const fn raw(self) -> u8 {
        self.0
    }

    const fn mask(self) -> u64 {
        1u64 << self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fixed-width set of [`ComponentId`]s.
///
/// Ordered numerically, which gives archetype iteration a stable order.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bitset(u64);

impl Bitset {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Number of addressable bits.
    pub const CAPACITY: u32 = u64::BITS;

    /// Wrap raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether `id` is in the set.
    pub const fn has(self, id: ComponentId) -> bool {
        self.0 & id.mask() != 0
    }

    /// The set with `id` added.
    #[must_use]
    pub const fn with(self, id: ComponentId) -> Self {
        Self(self.0 | id.mask())
    }

    /// The set with `id` removed.
    #[must_use]
    pub const fn without(self, id: ComponentId) -> Self {
        Self(self.0 & !id.mask())
    }

    /// Superset test: every id in `other` is also in `self`.
    pub const fn contains(self, other: Bitset) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the two sets share no id.
    pub const fn is_disjoint(self, other: Bitset) -> bool {
        self.0 & other.0 == 0
    }

    /// Ids in `self` but not in `other`.
    #[must_use]
    pub const fn difference(self, other: Bitset) -> Self {
        Self(self.0 & !other.0)
    }

    #[must_use]
    pub const fn union(self, other: Bitset) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersection(self, other: Bitset) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of ids in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the ids in ascending order.
    pub fn ids(self) -> Ids {
        Ids { remaining: self.0 }
    }
}

impl FromIterator<ComponentId> for Bitset {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        iter.into_iter().fold(Bitset::EMPTY, Bitset::with)
    }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitset({:#b})", self.0)
    }
}

impl fmt::Display for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl fmt::Binary for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

/// Iterator over the ids of a [`Bitset`], lowest first.
///
/// Skips empty runs with `trailing_zeros`, so cost is per set bit.
pub struct Ids {
    remaining: u64,
}

impl Iterator for Ids {
    type Item = ComponentId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.remaining.trailing_zeros();
        // Clear the lowest set bit.
        self.remaining &= self.remaining - 1;
        Some(ComponentId(bit as u8))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Ids {}
