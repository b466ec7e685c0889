//! # Archetype — Grouping Entities by Component Signature
//!
//! An archetype represents one exact combination of component types, named by
//! its [`Bitset`]. All entities that carry exactly that set are stored
//! together. This is what makes queries fast: a query checks the bitset once
//! per archetype instead of once per entity.
//!
//! ## Memory Layout
//!
//! ```text
//! Archetype { bitset: {Position, Velocity} }
//!
//! columns:
//!   Position: [pos0, pos1, pos2, pos3]
//!   Velocity: [vel0, vel1, vel2, vel3]
//! entities:   [e0,   e1,   e2,   e3  ]    ← parallel array
//! rows:       {e0: 0, e1: 1, e2: 2, e3: 3}
//! disabled:   {e2: {Velocity}}            ← absent entry = nothing disabled
//! ```
//!
//! All arrays have the same length. Index `i` in every column and in the
//! entity array refers to the same entity, and `rows` is its inverse.
//!
//! ## Swap-Remove
//!
//! Removing row `i` moves the last row into slot `i` and truncates. That is
//! O(1) but changes the row of the moved entity, so row numbers must never be
//! cached outside the archetype; look them up with [`Archetype::row_of`]
//! right before use.
//!
//! ## Comparison
//!
//! - **hecs**: Very similar archetype design, columns keyed by `TypeId`.
//! - **bevy_ecs**: Adds table ids, change ticks, and more, but the same idea.
//!   Neither has a per-entity disabled mask; bevy's closest analogue is a
//!   `Disabled` marker component, which moves the entity.

use std::collections::{BTreeMap, HashMap};

use super::bitset::{Bitset, ComponentId};
use super::component::{ComponentColumn, ComponentValue};
use super::entity::EntityId;

/// A table of entities that all share the same component bitset.
#[derive(Debug)]
pub(crate) struct Archetype {
    bitset: Bitset,
    /// One column per id in `bitset`.
    columns: BTreeMap<ComponentId, ComponentColumn>,
    /// Which entities live here, parallel to the column rows.
    entities: Vec<EntityId>,
    /// Inverse of `entities`.
    rows: HashMap<EntityId, usize>,
    disabled: HashMap<EntityId, Bitset>,
}

impl Archetype {
    /// Create an empty archetype with one column per id in `bitset`.
    ///
    /// The empty bitset is allowed: it tracks entities with no columns.
    pub fn new(bitset: Bitset) -> Self {
        Self {
            bitset,
            columns: bitset.ids().map(|id| (id, ComponentColumn::new())).collect(),
            entities: Vec::new(),
            rows: HashMap::new(),
            disabled: HashMap::new(),
        }
    }

    pub fn bitset(&self) -> Bitset {
        self.bitset
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The current row of `entity`, if it lives here.
    pub fn row_of(&self, entity: EntityId) -> Option<usize> {
        self.rows.get(&entity).copied()
    }

    /// Push `entity` and one value per column onto the end of the table.
    ///
    /// The caller supplies exactly the ids in the bitset.
    pub fn append(
        &mut self,
        entity: EntityId,
        values: impl IntoIterator<Item = (ComponentId, ComponentValue)>,
    ) {
        debug_assert!(!self.rows.contains_key(&entity), "{entity:?} appended twice");
        for (id, value) in values {
            let column = self.columns.get_mut(&id).unwrap_or_else(|| {
                panic!("archetype {} has no column for component {id}", self.bitset)
            });
            column.push(value);
        }

        self.rows.insert(entity, self.entities.len());
        self.entities.push(entity);
        debug_assert!(
            self.columns.values().all(|c| c.len() == self.entities.len()),
            "archetype {} columns out of step after append",
            self.bitset
        );
    }

    /// Swap-remove the row at `index` from the entity list and every column.
    ///
    /// Drops the removed entity's disabled mask. Returns the entity that was
    /// moved into the hole, or `None` if the last row was removed.
    pub fn remove_at(&mut self, index: usize) -> Option<EntityId> {
        for column in self.columns.values_mut() {
            column.swap_remove(index);
        }

        let removed = self.entities.swap_remove(index);
        self.rows.remove(&removed);
        self.disabled.remove(&removed);

        // If something was swapped in, fix up its row.
        let moved = self.entities.get(index).copied()?;
        self.rows.insert(moved, index);
        Some(moved)
    }

    /// The value of component `id` at `row`.
    pub fn value(&self, row: usize, id: ComponentId) -> Option<&ComponentValue> {
        let column = self.columns.get(&id)?;
        (row < column.len()).then(|| column.get(row))
    }

    /// Every `(id, value)` pair at `row`, cheaply cloned.
    pub fn row_values(&self, row: usize) -> Vec<(ComponentId, ComponentValue)> {
        self.columns
            .iter()
            .map(|(&id, column)| (id, ComponentValue::clone(column.get(row))))
            .collect()
    }

    /// Overwrite component `id` at `row` in place.
    pub fn set(&mut self, row: usize, id: ComponentId, value: ComponentValue) {
        match self.columns.get_mut(&id) {
            Some(column) => column.set(row, value),
            None => panic!("archetype {} has no column for component {id}", self.bitset),
        }
    }

    /// The disabled mask of `entity`; empty if none is recorded.
    pub fn disabled_mask(&self, entity: EntityId) -> Bitset {
        self.disabled.get(&entity).copied().unwrap_or(Bitset::EMPTY)
    }

    /// Replace the disabled mask of `entity`, clipped to this archetype's bitset.
    pub fn set_disabled_mask(&mut self, entity: EntityId, mask: Bitset) {
        let mask = mask.intersection(self.bitset);
        if mask.is_empty() {
            self.disabled.remove(&entity);
        } else {
            self.disabled.insert(entity, mask);
        }
    }

    /// Mark component `id` of `entity` as disabled.
    ///
    /// Returns `false` (and records nothing) if the entity doesn't live here
    /// or doesn't carry the component.
    pub fn disable(&mut self, entity: EntityId, id: ComponentId) -> bool {
        if !self.bitset.has(id) || !self.rows.contains_key(&entity) {
            return false;
        }
        let mask = self.disabled_mask(entity).with(id);
        self.disabled.insert(entity, mask);
        true
    }

    /// Clear the disabled bit of component `id` for `entity`.
    pub fn enable(&mut self, entity: EntityId, id: ComponentId) -> bool {
        if !self.rows.contains_key(&entity) {
            return false;
        }
        let mask = self.disabled_mask(entity).without(id);
        self.set_disabled_mask(entity, mask);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{downcast, erase};

    const POS: ComponentId = ComponentId::new(1);
    const VEL: ComponentId = ComponentId::new(2);

    fn e(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    fn pos_vel_archetype(n: u64) -> Archetype {
        let mut arch = Archetype::new(Bitset::EMPTY.with(POS).with(VEL));
        for i in 0..n {
            arch.append(e(i), [(POS, erase(i as i32)), (VEL, erase(i as f32 * 10.0))]);
        }
        arch
    }

    fn pos_at(arch: &Archetype, entity: EntityId) -> i32 {
        let row = arch.row_of(entity).unwrap();
        *downcast::<i32>(arch.value(row, POS).unwrap())
    }

    #[test]
    fn append_keeps_columns_parallel() {
        let arch = pos_vel_archetype(3);
        assert_eq!(arch.len(), 3);
        assert_eq!(arch.entities(), &[e(0), e(1), e(2)]);
        assert_eq!(arch.row_of(e(2)), Some(2));
        assert_eq!(pos_at(&arch, e(1)), 1);
    }

    #[test]
    fn remove_at_swaps_last_into_hole() {
        let mut arch = pos_vel_archetype(3);
        let moved = arch.remove_at(0);
        assert_eq!(moved, Some(e(2)));
        assert_eq!(arch.entities(), &[e(2), e(1)]);
        assert_eq!(arch.row_of(e(2)), Some(0));
        assert_eq!(arch.row_of(e(0)), None);

        // Survivors keep their own values.
        assert_eq!(pos_at(&arch, e(2)), 2);
        assert_eq!(pos_at(&arch, e(1)), 1);
        let vel = *downcast::<f32>(arch.value(0, VEL).unwrap());
        assert_eq!(vel, 20.0);
    }

    #[test]
    fn remove_last_row_moves_nothing() {
        let mut arch = pos_vel_archetype(2);
        assert_eq!(arch.remove_at(1), None);
        assert_eq!(arch.remove_at(0), None);
        assert!(arch.is_empty());
    }

    #[test]
    fn empty_bitset_archetype_tracks_entities() {
        let mut arch = Archetype::new(Bitset::EMPTY);
        arch.append(e(4), std::iter::empty());
        arch.append(e(5), std::iter::empty());
        assert_eq!(arch.len(), 2);
        assert!(arch.row_values(0).is_empty());
        assert_eq!(arch.remove_at(0), Some(e(5)));
    }

    #[test]
    fn disable_only_known_components() {
        let mut arch = pos_vel_archetype(1);
        assert!(arch.disable(e(0), VEL));
        assert!(!arch.disable(e(0), ComponentId::new(9)));
        assert!(!arch.disable(e(42), POS));
        assert_eq!(arch.disabled_mask(e(0)), Bitset::EMPTY.with(VEL));

        assert!(arch.enable(e(0), VEL));
        assert_eq!(arch.disabled_mask(e(0)), Bitset::EMPTY);
    }

    #[test]
    fn remove_at_drops_disabled_mask() {
        let mut arch = pos_vel_archetype(2);
        arch.disable(e(0), POS);
        arch.remove_at(0);
        assert_eq!(arch.disabled_mask(e(0)), Bitset::EMPTY);
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut arch = pos_vel_archetype(2);
        arch.set(1, POS, erase(99i32));
        assert_eq!(pos_at(&arch, e(1)), 99);
        assert_eq!(pos_at(&arch, e(0)), 0);
    }

    #[test]
    fn set_disabled_mask_is_clipped() {
        let mut arch = pos_vel_archetype(1);
        arch.set_disabled_mask(e(0), Bitset::EMPTY.with(POS).with(ComponentId::new(7)));
        assert_eq!(arch.disabled_mask(e(0)), Bitset::EMPTY.with(POS));
    }
}
