//! # Query Cache — Memoized Query Results
//!
//! Systems tend to run the same handful of queries every frame, and most
//! frames don't change most archetypes. The [`QueryCache`] remembers the last
//! result for each query shape and hands it back until a mutation could have
//! changed it.
//!
//! ## Keys
//!
//! A query shape is its [`QueryKey`]: the pair `(required, forbidden)`. Equal
//! keys share one entry, no matter how the builder was assembled.
//!
//! ## Invalidation
//!
//! Invalidation is deliberately coarse. Touching component `c` evicts every
//! entry whose required *or* forbidden set mentions `c`, not just entries
//! with a particular key:
//!
//! ```text
//! cache: { (A, -): r1, (A|B, -): r2, (B, C): r3, (-, C): r4 }
//!
//! invalidate(B)  → evicts r2 and r3
//! invalidate(C)  → evicts r3 and r4
//! ```
//!
//! Entries with an empty required set also go on every invalidation. Such a
//! query matches on absence alone (`without(C)` matches everything lacking
//! `C`), so adding or removing *any* component can move an entity in or out
//! of it.

use std::collections::HashMap;

use super::bitset::{Bitset, ComponentId};
use super::query::QueryResult;

/// The shape of a query: what must be present and what must be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub required: Bitset,
    pub forbidden: Bitset,
}

impl QueryKey {
    pub const fn new(required: Bitset, forbidden: Bitset) -> Self {
        Self {
            required,
            forbidden,
        }
    }

    /// Whether `id` appears in either half of the key.
    pub const fn mentions(&self, id: ComponentId) -> bool {
        self.required.has(id) || self.forbidden.has(id)
    }

    /// Whether an archetype with `bitset` satisfies this key.
    pub const fn matches(&self, bitset: Bitset) -> bool {
        bitset.contains(self.required) && bitset.is_disjoint(self.forbidden)
    }

    /// Whether a change to any id in `touched` can alter this key's result.
    fn is_affected_by(&self, touched: Bitset) -> bool {
        self.required.is_empty() || touched.ids().any(|id| self.mentions(id))
    }
}

/// Hit/miss counters and current size of a [`QueryCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(serde::Serialize))]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Memoized [`QueryResult`]s keyed by [`QueryKey`].
#[derive(Debug, Default)]
pub(crate) struct QueryCache {
    entries: HashMap<QueryKey, QueryResult>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, counting the hit or miss.
    pub fn get(&mut self, key: &QueryKey) -> Option<QueryResult> {
        match self.entries.get(key) {
            Some(result) => {
                self.hits += 1;
                log::trace!("query cache hit for {key:?}");
                Some(result.clone())
            }
            None => {
                self.misses += 1;
                log::trace!("query cache miss for {key:?}");
                None
            }
        }
    }

    pub fn insert(&mut self, key: QueryKey, result: QueryResult) {
        self.entries.insert(key, result);
    }

    /// Evict every entry that `id` could affect. Returns how many were evicted.
    pub fn invalidate(&mut self, id: ComponentId) -> usize {
        self.invalidate_bitset(Bitset::EMPTY.with(id))
    }

    /// Evict every entry that a change to any id in `touched` could affect.
    pub fn invalidate_bitset(&mut self, touched: Bitset) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.is_affected_by(touched));
        let evicted = before - self.entries.len();
        self.evictions += evicted as u64;
        evicted
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}
