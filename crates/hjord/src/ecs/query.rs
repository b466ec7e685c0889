//! # Query — Selecting Entities by Component Set
//!
//! A query names the components an entity must have (*required*) and the ones
//! it must not have (*forbidden*). The world answers with a snapshot of every
//! matching entity.
//!
//! ## How Queries Work
//!
//! ```text
//! world.query().with(&[pos, vel]).without(&[frozen]).each(|entity, c| {
//!     let p = c.get::<Position>(pos);
//! });
//!
//! 1. Build the key: required = {pos, vel}, forbidden = {frozen}
//! 2. Ask the query cache. A hit returns the stored snapshot as-is.
//! 3. On a miss, for each archetype (ascending bitset):
//!    - bitset ⊇ required and bitset ∩ forbidden = ∅ ?
//!    - if yes, every row whose disabled mask misses `required` is included,
//!      carrying only the required components
//! 4. Store the snapshot under the key and return it.
//! ```
//!
//! ## Snapshots, Not Borrows
//!
//! Results are [`QueryResult`]s: an immutable, shared list of
//! `(EntityId, Components)`. Nothing in a result borrows the world, so a
//! caller can walk the result and mutate the world in the same loop (see
//! [`QueryBuilder::each_mut`]). The flip side is that a result reflects the
//! world at the moment it was built. Mutations made while walking it show up
//! in the *next* query.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: Typed queries (`Query<(&A, &mut B)>`) borrow columns
//!   directly and are rebuilt every time; filters like `Without<C>` are types.
//! - Here queries are runtime id sets, which is what makes them cacheable by a
//!   plain `(Bitset, Bitset)` key.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::archetype::Archetype;
use super::bitset::{Bitset, ComponentId};
use super::component::{Component, ComponentValue};
use super::entity::EntityId;
use super::query_cache::QueryKey;
use super::world::World;

/// Builder for a query against a [`World`].
///
/// Created by [`World::query`]. Consumed by [`get`](Self::get),
/// [`each`](Self::each) or [`each_mut`](Self::each_mut).
pub struct QueryBuilder<'w> {
    world: &'w mut World,
    required: Bitset,
    forbidden: Bitset,
}

impl<'w> QueryBuilder<'w> {
    pub(crate) fn new(world: &'w mut World) -> Self {
        Self {
            world,
            required: Bitset::EMPTY,
            forbidden: Bitset::EMPTY,
        }
    }

    /// Require every id in `ids`.
    pub fn with(mut self, ids: &[ComponentId]) -> Self {
        self.required = ids.iter().copied().fold(self.required, Bitset::with);
        self
    }

    /// Forbid every id in `ids`.
    pub fn without(mut self, ids: &[ComponentId]) -> Self {
        self.forbidden = ids.iter().copied().fold(self.forbidden, Bitset::with);
        self
    }

    /// Require component type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` isn't registered with the world.
    pub fn with_component<T: Component>(self) -> Self {
        let id = self.world.component_id::<T>();
        self.with(&[id])
    }

    /// Forbid component type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` isn't registered with the world.
    pub fn without_component<T: Component>(self) -> Self {
        let id = self.world.component_id::<T>();
        self.without(&[id])
    }

    /// The cache key this query resolves to.
    pub fn key(&self) -> QueryKey {
        QueryKey::new(self.required, self.forbidden)
    }

    /// Run the query, using the cached result if one is still valid.
    pub fn get(self) -> QueryResult {
        let key = self.key();
        self.world.cached_query(key)
    }

    /// Call `f` once per matching entity.
    pub fn each(self, mut f: impl FnMut(EntityId, &Components)) {
        for entity in &self.get() {
            f(entity.id, &entity.components);
        }
    }

    /// Call `f` once per matching entity, with mutable access to the world.
    ///
    /// The result is computed up front, so structural changes made by `f`
    /// don't affect which entities are visited.
    pub fn each_mut(self, mut f: impl FnMut(&mut World, EntityId, &Components)) {
        let key = self.key();
        let world = self.world;
        let result = world.cached_query(key);
        for entity in &result {
            f(world, entity.id, &entity.components);
        }
    }
}

/// The components of one entity in a [`QueryResult`], keyed by id.
///
/// Holds only the components the query required.
#[derive(Clone, Default)]
pub struct Components {
    values: BTreeMap<ComponentId, ComponentValue>,
}

impl Components {
    /// The value of component `id`, downcast to `T`.
    ///
    /// `None` if the query didn't require `id` or `T` is the wrong type.
    pub fn get<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.values.get(&id)?.downcast_ref::<T>()
    }

    /// The type-erased value of component `id`.
    pub fn get_raw(&self, id: ComponentId) -> Option<&ComponentValue> {
        self.values.get(&id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.values.contains_key(&id)
    }

    /// The ids present, ascending.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// One row of a [`QueryResult`].
#[derive(Clone, Debug)]
pub struct QueryEntity {
    pub id: EntityId,
    pub components: Components,
}

/// An immutable, cheaply clonable list of query matches.
///
/// Ordered by archetype bitset, then by storage row within each archetype.
#[derive(Clone, Debug)]
pub struct QueryResult {
    entities: Arc<[QueryEntity]>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryEntity> {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[QueryEntity] {
        &self.entities
    }

    /// Just the entity ids, in result order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.iter().any(|e| e.id == entity)
    }

    /// Whether both results are the same shared snapshot, i.e. one was served
    /// from the cache entry that produced the other.
    pub fn ptr_eq(&self, other: &QueryResult) -> bool {
        Arc::ptr_eq(&self.entities, &other.entities)
    }
}

impl Default for QueryResult {
    fn default() -> Self {
        Self {
            entities: Arc::from(Vec::new()),
        }
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a QueryEntity;
    type IntoIter = std::slice::Iter<'a, QueryEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Scan `archetypes` for matches of `key`.
pub(crate) fn collect<'a>(
    archetypes: impl IntoIterator<Item = &'a Archetype>,
    key: QueryKey,
) -> QueryResult {
    let mut entities = Vec::new();
    for archetype in archetypes {
        if !key.matches(archetype.bitset()) {
            continue;
        }
        for (row, &id) in archetype.entities().iter().enumerate() {
            if !archetype.disabled_mask(id).is_disjoint(key.required) {
                continue;
            }
            let values = key
                .required
                .ids()
                .filter_map(|c| archetype.value(row, c).map(|v| (c, Arc::clone(v))))
                .collect();
            entities.push(QueryEntity {
                id,
                components: Components { values },
            });
        }
    }
    QueryResult {
        entities: entities.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position(i32);
    #[derive(Debug, PartialEq)]
    struct Velocity(i32);
    struct Frozen;

    fn world() -> (World, ComponentId, ComponentId, ComponentId) {
        let mut world = World::new();
        let pos = world.register::<Position>();
        let vel = world.register::<Velocity>();
        let frozen = world.register::<Frozen>();
        (world, pos, vel, frozen)
    }

    #[test]
    fn with_and_without_select_by_bitset() {
        let (mut world, pos, vel, frozen) = world();
        let a = world.create_entity();
        world.add_components(a, (Position(1), Velocity(1)));
        let b = world.create_entity();
        world.add_component(b, Position(2));
        let c = world.create_entity();
        world.add_components(c, (Position(3), Frozen));

        let moving = world.query().with(&[pos, vel]).get();
        assert_eq!(moving.ids(), vec![a]);

        let unfrozen = world.query().with(&[pos]).without(&[frozen]).get();
        assert_eq!(unfrozen.len(), 2);
        assert!(unfrozen.contains(a) && unfrozen.contains(b));
    }

    #[test]
    fn snapshot_holds_only_required_components() {
        let (mut world, pos, vel, _) = world();
        let e = world.create_entity();
        world.add_components(e, (Position(5), Velocity(7)));

        let result = world.query().with(&[pos]).get();
        let components = &result.entities()[0].components;
        assert_eq!(components.get::<Position>(pos), Some(&Position(5)));
        assert!(!components.contains(vel));
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn typed_builder_matches_id_builder() {
        let (mut world, pos, _, frozen) = world();
        let by_type = world.query().with_component::<Position>().without_component::<Frozen>().key();
        let by_id = world.query().with(&[pos]).without(&[frozen]).key();
        assert_eq!(by_type, by_id);
    }

    #[test]
    fn results_are_ordered_by_bitset_then_row() {
        let (mut world, pos, _, _) = world();
        let e0 = world.create_entity();
        let e1 = world.create_entity();
        let e2 = world.create_entity();
        world.add_components(e0, (Position(0), Velocity(0)));
        world.add_component(e1, Position(1));
        world.add_component(e2, Position(2));

        // {pos} sorts before {pos, vel}.
        assert_eq!(world.query().with(&[pos]).get().ids(), vec![e1, e2, e0]);
    }

    #[test]
    fn each_visits_every_match() {
        let (mut world, pos, _, _) = world();
        for i in 0..4 {
            let e = world.create_entity();
            world.add_component(e, Position(i));
        }
        let mut sum = 0;
        world.query().with(&[pos]).each(|_, c| sum += c.get::<Position>(pos).unwrap().0);
        assert_eq!(sum, 6);
    }

    #[test]
    fn each_mut_can_mutate_while_walking() {
        let (mut world, pos, vel, _) = world();
        let a = world.create_entity();
        world.add_component(a, Position(1));
        let b = world.create_entity();
        world.add_component(b, Position(2));

        world.query().with(&[pos]).each_mut(|world, id, c| {
            let p = c.get::<Position>(pos).unwrap().0;
            world.add_component(id, Velocity(p * 10));
        });

        let result = world.query().with(&[vel]).get();
        assert_eq!(result.len(), 2);
        assert_eq!(world.get::<Velocity>(b), Some(&Velocity(20)));
    }

    #[test]
    fn unmatched_query_is_empty() {
        let (mut world, _, vel, _) = world();
        let e = world.create_entity();
        world.add_component(e, Position(0));
        assert!(world.query().with(&[vel]).get().is_empty());
    }

    #[test]
    fn components_get_wrong_type_is_none() {
        let (mut world, pos, _, _) = world();
        let e = world.create_entity();
        world.add_component(e, Position(0));
        let result = world.query().with(&[pos]).get();
        assert!(result.entities()[0].components.get::<Velocity>(pos).is_none());
    }
}
