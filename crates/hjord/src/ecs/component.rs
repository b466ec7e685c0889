//! # Component — Type-Erased Columnar Storage
//!
//! In an ECS, components are plain data: a `Position`, a `Velocity`, a
//! `Health`. The framework needs to store *any* component type without knowing
//! it at compile time, since archetypes are assembled dynamically from
//! whatever bitset an entity ends up with. This module provides
//! [`ComponentColumn`], a type-erased column of components.
//!
//! ## Why `Arc<dyn Any>`?
//!
//! The classic approach (hecs, bevy_ecs) stores raw bytes with a manual
//! `Layout`: fast, but it needs `unsafe`. A `Box<dyn Any>` per value is safe
//! and simple, and is what an archetype table needs at this scale.
//!
//! We go one step further and share values through an `Arc`. Queries hand out
//! snapshots, and the query cache keeps them around between frames. With
//! `Arc` a snapshot is a reference-count bump, not a deep copy, and
//! components don't need to be `Clone`:
//!
//! ```text
//! column:    [Arc(pos0), Arc(pos1), Arc(pos2)]
//!                 │
//! snapshot:  {Position: Arc(pos0)}   ← same allocation
//!
//! world.add_component(e0, Position { .. })  → column slot 0 gets a new Arc;
//!                                             the snapshot keeps the old one.
//! ```
//!
//! Values are therefore immutable once stored; changing a component means
//! writing a new value over it.

use std::any::{Any, type_name};
use std::sync::Arc;

/// Marker trait for types that can be used as components.
///
/// Blanket-implemented: any `'static + Send + Sync` type is a component.
pub trait Component: Any + Send + Sync {}

impl<T: Any + Send + Sync> Component for T {}

/// A type-erased, shared component value.
pub type ComponentValue = Arc<dyn Any + Send + Sync>;

/// Box a typed component into a [`ComponentValue`].
pub(crate) fn erase<T: Component>(value: T) -> ComponentValue {
    Arc::new(value)
}

/// A type-erased column of components.
///
/// Each [`Archetype`](super::archetype::Archetype) has one column per
/// component id in its bitset. Row `i` of every column, plus entry `i` of the
/// archetype's entity list, describe the same entity.
#[derive(Default)]
pub struct ComponentColumn {
    data: Vec<ComponentValue>,
}

impl ComponentColumn {
    /// Create a new empty column.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Push a value onto the end of the column.
    pub fn push(&mut self, value: ComponentValue) {
        self.data.push(value);
    }

    /// The value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, index: usize) -> &ComponentValue {
        &self.data[index]
    }

    /// The value at `index`, downcast to `T`.
    ///
    /// Returns `None` on a type mismatch, which would mean the column was
    /// filled with a value registered under a different id.
    pub fn get_typed<T: 'static>(&self, index: usize) -> Option<&T> {
        self.data.get(index)?.downcast_ref::<T>()
    }

    /// Overwrite the value at `index`.
    pub fn set(&mut self, index: usize, value: ComponentValue) {
        self.data[index] = value;
    }

    /// Swap-remove the value at `index`, returning whether a swap occurred.
    ///
    /// Returns `true` if the removed element wasn't the last one (i.e. the
    /// last element was moved into the removed slot).
    pub fn swap_remove(&mut self, index: usize) -> bool {
        let last = self.data.len() - 1;
        self.data.swap_remove(index);
        index != last
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for ComponentColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentColumn")
            .field("len", &self.data.len())
            .finish()
    }
}

/// Downcast a shared value, panicking with the expected type on mismatch.
pub(crate) fn downcast<T: 'static>(value: &ComponentValue) -> &T {
    value.downcast_ref::<T>().unwrap_or_else(|| {
        panic!(
            "Component type mismatch: expected `{}` in column",
            type_name::<T>()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get() {
        let mut col = ComponentColumn::new();
        col.push(erase(1.0f32));
        col.push(erase(2.0f32));
        col.push(erase(3.0f32));
        assert_eq!(col.get_typed::<f32>(0), Some(&1.0));
        assert_eq!(col.get_typed::<f32>(1), Some(&2.0));
        assert_eq!(*downcast::<f32>(col.get(2)), 3.0);
        assert_eq!(col.len(), 3);
    }

    #[test]
    fn get_typed_mismatch_is_none() {
        let mut col = ComponentColumn::new();
        col.push(erase(7u32));
        assert!(col.get_typed::<i64>(0).is_none());
        assert!(col.get_typed::<u32>(1).is_none());
    }

    #[test]
    fn swap_remove_middle() {
        let mut col = ComponentColumn::new();
        col.push(erase(10u32));
        col.push(erase(20u32));
        col.push(erase(30u32));
        let swapped = col.swap_remove(0);
        assert!(swapped); // last element (30) moved to index 0
        assert_eq!(col.len(), 2);
        assert_eq!(col.get_typed::<u32>(0), Some(&30));
        assert_eq!(col.get_typed::<u32>(1), Some(&20));
    }

    #[test]
    fn swap_remove_last() {
        let mut col = ComponentColumn::new();
        col.push(erase(10u32));
        col.push(erase(20u32));
        let swapped = col.swap_remove(1);
        assert!(!swapped);
        assert_eq!(col.len(), 1);
        assert_eq!(col.get_typed::<u32>(0), Some(&10));
    }

    #[test]
    fn set_leaves_shared_snapshot_untouched() {
        let mut col = ComponentColumn::new();
        col.push(erase(1u8));
        let snapshot = Arc::clone(col.get(0));
        col.set(0, erase(2u8));
        assert_eq!(col.get_typed::<u8>(0), Some(&2));
        assert_eq!(*downcast::<u8>(&snapshot), 1);
    }

    #[test]
    fn drop_called_once_last_reference_goes() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        DROP_COUNT.store(0, Ordering::SeqCst);
        let mut col = ComponentColumn::new();
        col.push(erase(Tracked));
        col.push(erase(Tracked));
        col.swap_remove(0);
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 1);
        drop(col);
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zst_components() {
        struct Marker;
        let mut col = ComponentColumn::new();
        col.push(erase(Marker));
        col.push(erase(Marker));
        assert_eq!(col.len(), 2);
        assert!(col.get_typed::<Marker>(1).is_some());
    }
}
