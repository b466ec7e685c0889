//! Diagnostics snapshots.
//!
//! Enabled by the `diagnostics` feature flag. A [`WorldSnapshot`] summarizes
//! the shape of a world (how many entities, which archetypes, how the query
//! cache is doing, what each system cost last tick) as a serializable value.
//! Component values themselves are never captured.

use serde::Serialize;

use crate::ecs::query_cache::CacheStats;
use crate::ecs::system::SystemTiming;
use crate::ecs::world::World;
use crate::error::EcsResult;

/// One archetype in a [`WorldSnapshot`].
#[derive(Clone, Debug, Serialize)]
pub struct ArchetypeSnapshot {
    /// Raw bitset bits.
    pub bitset: u64,
    pub entity_count: usize,
    /// Short type names, in id order.
    pub component_names: Vec<String>,
}

/// A serializable summary of a [`World`].
#[derive(Clone, Debug, Serialize)]
pub struct WorldSnapshot {
    pub entity_count: usize,
    pub entities_created: u64,
    pub archetype_count: usize,
    pub archetypes: Vec<ArchetypeSnapshot>,
    pub query_cache: CacheStats,
    pub system_timings: Vec<SystemTiming>,
}

impl WorldSnapshot {
    pub(crate) fn capture(world: &World) -> Self {
        let registry = world.registry();
        let archetypes = world
            .archetypes()
            .map(|archetype| ArchetypeSnapshot {
                bitset: archetype.bitset().bits(),
                entity_count: archetype.len(),
                component_names: archetype
                    .bitset()
                    .ids()
                    .map(|id| match registry.name_of(id) {
                        Some(name) => name.to_string(),
                        None => id.to_string(),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        Self {
            entity_count: world.entity_count(),
            entities_created: world.entities_created(),
            archetype_count: archetypes.len(),
            archetypes,
            query_cache: world.query_cache_stats(),
            system_timings: world.system_timings().to_vec(),
        }
    }

    /// Encode as a single-line JSON document.
    pub fn to_json(&self) -> EcsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as indented JSON.
    pub fn to_json_pretty(&self) -> EcsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    struct Velocity;

    #[test]
    fn snapshot_lists_archetypes_with_names() {
        let mut world = World::new();
        world.register::<Position>();
        world.register::<Velocity>();
        let a = world.create_entity();
        world.add_components(a, (Position, Velocity));
        let b = world.create_entity();
        world.add_component(b, Position);

        let snapshot = world.diagnostics_snapshot();
        assert_eq!(snapshot.entity_count, 2);
        assert_eq!(snapshot.archetype_count, 2);
        assert_eq!(snapshot.archetypes[0].bitset, 0b10);
        assert_eq!(snapshot.archetypes[1].component_names, ["Position", "Velocity"]);
    }

    #[test]
    fn snapshot_serializes_cache_stats_and_timings() {
        let mut world = World::new();
        let pos = world.register::<Position>();
        world.add_system(|_: &mut World, _: f32| {});
        world.update(0.016);
        world.query().with(&[pos]).get();
        world.query().with(&[pos]).get();

        let json: serde_json::Value =
            serde_json::from_str(&world.diagnostics_snapshot().to_json().unwrap()).unwrap();
        assert_eq!(json["query_cache"]["hits"], 1);
        assert_eq!(json["query_cache"]["misses"], 1);
        assert_eq!(json["system_timings"][0]["name"], "<closure>");
        assert_eq!(json["entity_count"], 0);
    }
}
