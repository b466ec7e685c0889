//! Convenience re-exports — `use hjord::prelude::*` for the common items.

pub use crate::ecs::{
    Bitset, CacheStats, Component, ComponentBundle, ComponentId, ComponentRegistry, Components,
    EntityId, QueryBuilder, QueryEntity, QueryKey, QueryResult, Schedule, System, World,
};
pub use crate::error::{EcsError, EcsResult};
#[cfg(feature = "diagnostics")]
pub use crate::diag::WorldSnapshot;
