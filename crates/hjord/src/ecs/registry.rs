//! # Component Registry — Types to Ids
//!
//! Maps a component's Rust type to a small [`ComponentId`], assigned on first
//! registration starting at 1. Everything that turns a typed value into a bit
//! in a [`Bitset`](super::Bitset) goes through here.
//!
//! ## One Registry per World
//!
//! The registry is an ordinary value owned by the
//! [`World`](super::world::World), not process-wide state. Two worlds (or two
//! tests) never see each other's ids:
//!
//! ```ignore
//! let mut world = World::new();
//! let pos = world.register::<Position>();   // #1 in this world only
//! ```
//!
//! Registration must happen before a type is used. Resolving an unregistered
//! type through the panicking entry points ([`ComponentRegistry::id_of`]) is a
//! programmer error and fails loudly at the call site.

use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, HashMap};

use super::bitset::{Bitset, ComponentId};
use super::component::Component;
use crate::error::{EcsError, EcsResult};

/// Highest id the registry will hand out. Id 0 is reserved.
const MAX_ID: u8 = (Bitset::CAPACITY - 1) as u8;

/// Assigns [`ComponentId`]s to component types.
#[derive(Debug)]
pub struct ComponentRegistry {
    next_id: u8,
    ids: HashMap<TypeId, ComponentId>,
    /// Short type names, for debug dumps and diagnostics.
    names: BTreeMap<ComponentId, &'static str>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ids: HashMap::new(),
            names: BTreeMap::new(),
        }
    }

    /// Register `T`, returning its id. Repeated calls return the same id.
    ///
    /// # Panics
    ///
    /// Panics if all 63 ids are already taken.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.try_register::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Register `T`, or report that the registry is full.
    pub fn try_register<T: Component>(&mut self) -> EcsResult<ComponentId> {
        if let Some(&id) = self.ids.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
        if self.next_id > MAX_ID {
            return Err(EcsError::RegistryFull {
                limit: MAX_ID as u32,
            });
        }

        let id = ComponentId::new(self.next_id);
        self.next_id += 1;
        let name = short_type_name(type_name::<T>());
        self.ids.insert(TypeId::of::<T>(), id);
        self.names.insert(id, name);
        log::debug!("registered component `{name}` with id {id}");
        Ok(id)
    }

    /// The id of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    pub fn id_of<T: Component>(&self) -> ComponentId {
        self.try_id_of::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    /// The id of `T`, or [`EcsError::NotRegistered`].
    pub fn try_id_of<T: Component>(&self) -> EcsResult<ComponentId> {
        self.ids
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(EcsError::NotRegistered {
                type_name: type_name::<T>(),
            })
    }

    /// The id of the type of `value`. Same failure semantics as [`id_of`](Self::id_of).
    pub fn id_of_val<T: Component>(&self, _value: &T) -> ComponentId {
        self.id_of::<T>()
    }

    pub fn contains<T: Component>(&self) -> bool {
        self.ids.contains_key(&TypeId::of::<T>())
    }

    /// Short name of a registered id, e.g. `Position`.
    pub fn name_of(&self, id: ComponentId) -> Option<&'static str> {
        self.names.get(&id).copied()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the module path from a fully-qualified type name
/// (e.g. `game::components::Position` → `Position`).
///
/// Only the path before the first `<` is stripped; generic arguments are kept
/// as written.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    let start = base.rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    struct Velocity;
    struct Health;

    #[test]
    fn ids_start_at_one() {
        let mut registry = ComponentRegistry::new();
        assert_eq!(registry.register::<Position>().raw(), 1);
        assert_eq!(registry.register::<Velocity>().raw(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = ComponentRegistry::new();
        let first = registry.register::<Position>();
        let second = registry.register::<Position>();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registries_are_isolated() {
        let mut a = ComponentRegistry::new();
        let mut b = ComponentRegistry::new();
        a.register::<Position>();
        a.register::<Velocity>();
        // `b` starts from scratch.
        assert_eq!(b.register::<Velocity>().raw(), 1);
        assert!(!b.contains::<Position>());
    }

    #[test]
    fn lookup_by_type_and_value() {
        let mut registry = ComponentRegistry::new();
        let id = registry.register::<Health>();
        assert_eq!(registry.id_of::<Health>(), id);
        assert_eq!(registry.id_of_val(&Health), id);
        assert_eq!(registry.name_of(id), Some("Health"));
    }

    #[test]
    fn try_id_of_reports_unregistered() {
        let registry = ComponentRegistry::new();
        let err = registry.try_id_of::<Position>().unwrap_err();
        assert!(matches!(err, EcsError::NotRegistered { .. }));
        assert!(err.to_string().contains("Position"));
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn id_of_unregistered_panics() {
        let registry = ComponentRegistry::new();
        registry.id_of::<Velocity>();
    }

    #[test]
    fn registry_full_after_63_types() {
        struct Slot<const N: usize>;

        let mut registry = ComponentRegistry::new();
        macro_rules! register_slots {
            ($($n:literal)*) => { $( registry.register::<Slot<$n>>(); )* };
        }
        register_slots!(
            0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30
            31 32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47 48 49 50 51 52 53 54 55 56 57 58
            59 60 61 62
        );
        assert_eq!(registry.len(), 63);
        assert_eq!(registry.id_of::<Slot<62>>().raw(), 63);

        let err = registry.try_register::<Position>().unwrap_err();
        assert!(matches!(err, EcsError::RegistryFull { limit: 63 }));
        // Already-registered types still resolve.
        assert_eq!(registry.try_register::<Slot<0>>().unwrap().raw(), 1);
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name("a::b::Position"), "Position");
        assert_eq!(short_type_name("Plain"), "Plain");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper<b::Inner>");
    }
}
