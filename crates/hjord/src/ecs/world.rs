//! # World — The Central Container
//!
//! The [`World`] owns all entities, their components, the systems that run
//! each tick and the query cache. It's the single source of truth for the
//! whole simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ World                                                    │
//! │                                                          │
//! │  registry:        type → ComponentId                     │
//! │  allocator:       monotonic EntityId counter             │
//! │                                                          │
//! │  archetypes:      BTreeMap<Bitset, Archetype>            │
//! │    at most one archetype per bitset, dropped when empty  │
//! │                                                          │
//! │  entity_bitsets:  EntityId → Bitset                      │
//! │    always equals the bitset of the archetype holding     │
//! │    the entity                                            │
//! │  alive:           HashSet<EntityId>                      │
//! │                                                          │
//! │  schedule:        ordered systems                        │
//! │  query_cache:     (required, forbidden) → QueryResult    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entity Lifecycle
//!
//! ```text
//! create_entity  → alive, bitset ∅, in no archetype
//! add_components → migrate to archetype {A, B}
//! add_components → migrate to archetype {A, B, C}   ({A, B} dropped if empty)
//! remove_component(C) → migrate back to {A, B}
//! destroy_entity → swap-removed, gone from every index
//! ```
//!
//! Every bitset change is a full migration: the surviving values are copied
//! into the target archetype and the entity is swap-removed from the old one.
//! Adding only types the entity already has overwrites the values in place.
//!
//! Every mutation that can change what a query sees invalidates the cache for
//! the component ids it touched.
//!
//! ## Unknown Entities
//!
//! Operations on an entity that isn't alive (never created, or already
//! destroyed) do nothing. Destroying twice is fine.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::archetype::Archetype;
use super::bitset::{Bitset, ComponentId};
use super::component::{Component, ComponentValue, downcast, erase};
use super::entity::{EntityAllocator, EntityId};
use super::query::{self, QueryBuilder, QueryResult};
use super::query_cache::{CacheStats, QueryCache, QueryKey};
use super::registry::ComponentRegistry;
use super::system::{Schedule, System};
use crate::error::EcsResult;

/// The central container for all entities, components and systems.
pub struct World {
    registry: ComponentRegistry,
    allocator: EntityAllocator,
    /// All non-empty archetypes, ordered by bitset.
    archetypes: BTreeMap<Bitset, Archetype>,
    entity_bitsets: HashMap<EntityId, Bitset>,
    alive: HashSet<EntityId>,
    schedule: Schedule,
    query_cache: QueryCache,
}

impl World {
    pub fn new() -> Self {
        Self::with_registry(ComponentRegistry::new())
    }

    /// Create a world around an existing registry, keeping its ids.
    pub fn with_registry(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            allocator: EntityAllocator::new(),
            archetypes: BTreeMap::new(),
            entity_bitsets: HashMap::new(),
            alive: HashSet::new(),
            schedule: Schedule::new(),
            query_cache: QueryCache::new(),
        }
    }

    // ── Registry ─────────────────────────────────────────────────────

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Register component type `T`. Idempotent.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.registry.register::<T>()
    }

    /// The id of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    pub fn component_id<T: Component>(&self) -> ComponentId {
        self.registry.id_of::<T>()
    }

    // ── Entity Management ────────────────────────────────────────────

    /// Create an entity with no components.
    ///
    /// The entity isn't placed in any archetype until its first component
    /// is attached.
    pub fn create_entity(&mut self) -> EntityId {
        let entity = self.allocator.allocate();
        self.entity_bitsets.insert(entity, Bitset::EMPTY);
        self.alive.insert(entity);
        entity
    }

    /// Destroy an entity and drop its components.
    ///
    /// Returns `false` if the entity wasn't alive.
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        if !self.alive.remove(&entity) {
            log::trace!("destroy_entity: {entity:?} is not alive");
            return false;
        }
        let bitset = self.entity_bitsets.remove(&entity).unwrap_or(Bitset::EMPTY);
        self.take_row(entity, bitset);
        self.query_cache.invalidate_bitset(bitset);
        true
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.alive.len()
    }

    /// Number of entities ever created, destroyed ones included.
    pub fn entities_created(&self) -> u64 {
        self.allocator.allocated()
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// The current component bitset of `entity`.
    pub fn bitset_of(&self, entity: EntityId) -> Option<Bitset> {
        self.entity_bitsets.get(&entity).copied()
    }

    /// Whether `entity` carries component `id`, enabled or not.
    pub fn has_component(&self, entity: EntityId, id: ComponentId) -> bool {
        self.bitset_of(entity).is_some_and(|bits| bits.has(id))
    }

    // ── Component Add/Remove ─────────────────────────────────────────

    /// Attach a bundle of components to `entity`.
    ///
    /// Types the entity already has are overwritten; new types move the
    /// entity to the archetype for its enlarged bitset. If the bundle names a
    /// type twice, the last value wins.
    ///
    /// # Panics
    ///
    /// Panics if any type in the bundle isn't registered. The world is left
    /// untouched in that case.
    ///
    /// # Example
    ///
    /// ```ignore
    /// world.add_components(e, (Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0, dy: 0.0 }));
    /// ```
    pub fn add_components<B: ComponentBundle>(&mut self, entity: EntityId, bundle: B) {
        self.try_add_components(entity, bundle)
            .unwrap_or_else(|err| panic!("{err}"));
    }

    /// Fallible form of [`add_components`](Self::add_components).
    pub fn try_add_components<B: ComponentBundle>(
        &mut self,
        entity: EntityId,
        bundle: B,
    ) -> EcsResult<()> {
        let values = bundle.try_into_values(&self.registry)?;
        let Some(&old) = self.entity_bitsets.get(&entity) else {
            log::trace!("add_components: {entity:?} is not alive");
            return Ok(());
        };

        let added: BTreeMap<ComponentId, ComponentValue> = values.into_iter().collect();
        let touched: Bitset = added.keys().copied().collect();
        let new = old.union(touched);

        let in_place = match self.archetypes.get_mut(&old) {
            Some(archetype) if new == old => archetype.row_of(entity).map(|row| (archetype, row)),
            _ => None,
        };
        match in_place {
            Some((archetype, row)) => {
                for (id, value) in added {
                    archetype.set(row, id, value);
                }
            }
            None => self.migrate(entity, old, new, added),
        }

        self.query_cache.invalidate_bitset(touched);
        Ok(())
    }

    /// Attach a single component. See [`add_components`](Self::add_components).
    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) {
        self.add_components(entity, (component,));
    }

    /// Detach component `id` from `entity`, moving it to the archetype for
    /// its reduced bitset.
    ///
    /// Does nothing if the entity doesn't carry the component. Removing the
    /// last component leaves the entity in the empty-bitset archetype.
    pub fn remove_component(&mut self, entity: EntityId, id: ComponentId) {
        let Some(&old) = self.entity_bitsets.get(&entity) else {
            log::trace!("remove_component: {entity:?} is not alive");
            return;
        };
        if !old.has(id) {
            return;
        }
        self.migrate(entity, old, old.without(id), BTreeMap::new());
        self.query_cache.invalidate(id);
    }

    // ── Enable/Disable ───────────────────────────────────────────────

    /// Hide component `id` of `entity` from queries that require it. The
    /// value stays in storage.
    pub fn disable_component(&mut self, entity: EntityId, id: ComponentId) {
        if let Some(archetype) = self.archetype_of_mut(entity) {
            if archetype.disable(entity, id) {
                self.query_cache.invalidate(id);
            }
        }
    }

    /// Undo [`disable_component`](Self::disable_component).
    pub fn enable_component(&mut self, entity: EntityId, id: ComponentId) {
        if let Some(archetype) = self.archetype_of_mut(entity) {
            if archetype.enable(entity, id) {
                self.query_cache.invalidate(id);
            }
        }
    }

    /// Whether `entity` carries component `id` and it isn't disabled.
    pub fn is_component_enabled(&self, entity: EntityId, id: ComponentId) -> bool {
        self.archetype_of(entity)
            .is_some_and(|a| a.bitset().has(id) && !a.disabled_mask(entity).has(id))
    }

    // ── Per-Entity Component Access ──────────────────────────────────

    /// The stored value of component `T` on `entity`, disabled or not.
    ///
    /// Returns `None` if the entity is dead or doesn't have the component.
    ///
    /// # Panics
    ///
    /// Panics if `T` isn't registered.
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        let id = self.component_id::<T>();
        let archetype = self.archetype_of(entity)?;
        let row = archetype.row_of(entity)?;
        archetype.value(row, id).map(downcast::<T>)
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Start building a query.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let moving = world.query().with(&[pos, vel]).without(&[frozen]).get();
    /// ```
    pub fn query(&mut self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    pub(crate) fn cached_query(&mut self, key: QueryKey) -> QueryResult {
        if let Some(hit) = self.query_cache.get(&key) {
            return hit;
        }
        let result = query::collect(self.archetypes.values(), key);
        self.query_cache.insert(key, result.clone());
        result
    }

    pub fn query_cache_stats(&self) -> CacheStats {
        self.query_cache.stats()
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Append a system. Systems run in the order they were added.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.schedule.add_system(system);
    }

    /// Run every system once with `delta_time`.
    ///
    /// Systems added while the tick is running are queued behind the
    /// existing ones and first run on the next call.
    pub fn update(&mut self, delta_time: f32) {
        let mut schedule = std::mem::take(&mut self.schedule);
        schedule.run(self, delta_time);
        schedule.append(&mut self.schedule);
        self.schedule = schedule;
    }

    pub fn system_count(&self) -> usize {
        self.schedule.len()
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Log every archetype with its component names and entity count at
    /// `debug` level.
    pub fn log_archetypes(&self) {
        for archetype in self.archetypes.values() {
            let names: Vec<&str> = archetype
                .bitset()
                .ids()
                .map(|id| self.registry.name_of(id).unwrap_or("?"))
                .collect();
            log::debug!(
                "archetype {} [{}]: {} entities",
                archetype.bitset(),
                names.join(", "),
                archetype.len()
            );
        }
    }

    /// Capture a serializable summary of the world.
    #[cfg(feature = "diagnostics")]
    pub fn diagnostics_snapshot(&self) -> crate::diag::WorldSnapshot {
        crate::diag::WorldSnapshot::capture(self)
    }

    /// Per-system timings from the latest [`update`](Self::update).
    #[cfg(feature = "diagnostics")]
    pub fn system_timings(&self) -> &[super::system::SystemTiming] {
        self.schedule.timings()
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn archetypes(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.values()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn archetype_of(&self, entity: EntityId) -> Option<&Archetype> {
        self.archetypes.get(self.entity_bitsets.get(&entity)?)
    }

    fn archetype_of_mut(&mut self, entity: EntityId) -> Option<&mut Archetype> {
        let bitset = *self.entity_bitsets.get(&entity)?;
        self.archetypes.get_mut(&bitset)
    }

    /// Move `entity` from archetype `old` to archetype `new`.
    ///
    /// Values whose ids survive into `new` are carried over unless `added`
    /// supplies a replacement. `added` must only hold ids in `new`.
    fn migrate(
        &mut self,
        entity: EntityId,
        old: Bitset,
        new: Bitset,
        mut added: BTreeMap<ComponentId, ComponentValue>,
    ) {
        debug_assert!(new.contains(added.keys().copied().collect()));
        let (carried, mask) = self.take_row(entity, old).unwrap_or_default();
        for (id, value) in carried {
            if new.has(id) {
                added.entry(id).or_insert(value);
            }
        }

        let archetype = self.archetypes.entry(new).or_insert_with(|| {
            log::debug!("created archetype {new}");
            Archetype::new(new)
        });
        archetype.append(entity, added);
        archetype.set_disabled_mask(entity, mask);
        self.entity_bitsets.insert(entity, new);
    }

    /// Swap-remove `entity` from the archetype for `bitset`, returning its
    /// values and disabled mask. Drops the archetype if it ends up empty.
    fn take_row(
        &mut self,
        entity: EntityId,
        bitset: Bitset,
    ) -> Option<(Vec<(ComponentId, ComponentValue)>, Bitset)> {
        let archetype = self.archetypes.get_mut(&bitset)?;
        let row = archetype.row_of(entity)?;
        let values = archetype.row_values(row);
        let mask = archetype.disabled_mask(entity);
        archetype.remove_at(row);
        if archetype.is_empty() {
            self.archetypes.remove(&bitset);
            log::debug!("removed empty archetype {bitset}");
        }
        Some((values, mask))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bundles (tuple support) ──────────────────────────────────────────────

/// A set of components attached in one call.
///
/// Implemented for tuples of up to 8 components.
pub trait ComponentBundle {
    /// Resolve every component's id and erase its value.
    fn try_into_values(self, registry: &ComponentRegistry) -> EcsResult<Vec<(ComponentId, ComponentValue)>>;
}

macro_rules! impl_component_bundle {
    ($($T:ident),+) => {
        impl<$($T: Component),+> ComponentBundle for ($($T,)+) {
            #[allow(non_snake_case)]
            fn try_into_values(
                self,
                registry: &ComponentRegistry,
            ) -> EcsResult<Vec<(ComponentId, ComponentValue)>> {
                let ($($T,)+) = self;
                Ok(vec![$((registry.try_id_of::<$T>()?, erase($T))),+])
            }
        }
    };
}

impl_component_bundle!(A);
impl_component_bundle!(A, B);
impl_component_bundle!(A, B, C);
impl_component_bundle!(A, B, C, D);
impl_component_bundle!(A, B, C, D, E);
impl_component_bundle!(A, B, C, D, E, F);
impl_component_bundle!(A, B, C, D, E, F, G);
impl_component_bundle!(A, B, C, D, E, F, G, H);
