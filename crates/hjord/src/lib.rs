//! # Hjord — Archetype ECS with a Query Cache
//!
//! An entity component system that stores entities by the exact set of
//! components they carry and answers `with` / `without` queries from a
//! memoized cache.
//!
//! Start with `use hjord::prelude::*`, register your component types on a
//! [`World`](ecs::World), then drive it with `world.update(delta_time)`.
//!
//! ```ignore
//! let mut world = World::new();
//! let pos = world.register::<Position>();
//! let vel = world.register::<Velocity>();
//!
//! let e = world.create_entity();
//! world.add_components(e, (Position::default(), Velocity::default()));
//!
//! for hit in &world.query().with(&[pos, vel]).get() {
//!     let p = hit.components.get::<Position>(pos);
//! }
//! ```

pub mod ecs;
pub mod error;
pub mod prelude;

#[cfg(feature = "diagnostics")]
pub mod diag;
