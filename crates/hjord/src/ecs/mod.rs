//! # Archetype-Based ECS
//!
//! Entities are grouped by the exact set of components they carry. Each set
//! is a [`Bitset`] and owns one [`archetype`] table with a column per
//! component. Queries match whole archetypes by bitset and are memoized in a
//! cache that mutations invalidate.
//!
//! ## Module Overview
//!
//! - [`bitset`] — `ComponentId` and the `Bitset` set type
//! - [`entity`] — Monotonic entity ids, never recycled
//! - [`registry`] — Component type → id mapping, one per world
//! - [`component`] — Type-erased, shared component values
//! - [`archetype`] — Columnar storage for one component set
//! - [`world`] — Central container (entities + components + systems)
//! - [`query`] — Required/forbidden query builder and result snapshots
//! - [`query_cache`] — Memoized results and their invalidation
//! - [`system`] — System trait and schedule runner

pub(crate) mod archetype;
pub mod bitset;
pub mod component;
pub mod entity;
pub mod query;
pub mod query_cache;
pub mod registry;
pub mod system;
pub mod world;

pub use bitset::{Bitset, ComponentId};
pub use component::{Component, ComponentValue};
pub use entity::EntityId;
pub use query::{Components, QueryBuilder, QueryEntity, QueryResult};
pub use query_cache::{CacheStats, QueryKey};
pub use registry::ComponentRegistry;
pub use system::{Schedule, System};
pub use world::{ComponentBundle, World};
