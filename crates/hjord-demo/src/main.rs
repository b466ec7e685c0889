//! Headless particle demo.
//!
//! Seeds a small HUD and a particle spawner, then runs a fixed number of
//! ticks. Every burst drops a ring of particles that drift towards an
//! attractor, change color and expire. Progress and query cache stats are
//! reported through `log`.
//!
//! Run with: `RUST_LOG=info cargo run -p hjord-demo -- [config.json]`

mod components;
mod config;
mod systems;

use std::path::PathBuf;

use hjord::prelude::*;
use thiserror::Error;

use components::ComponentIds;
use config::{ConfigError, DemoConfig};

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ecs(#[from] EcsError),
}

fn main() -> Result<(), DemoError> {
    env_logger::init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = DemoConfig::load_or_default(path.as_deref())?;
    log::info!("running {} ticks at {:.4}s per tick", config.ticks, config.delta_time);

    let mut world = build_world(&config);
    for tick in 1..=config.ticks {
        world.update(config.delta_time);
        if config.report_every > 0 && tick % config.report_every == 0 {
            report(&world, tick)?;
        }
    }

    world.log_archetypes();
    let stats = world.query_cache_stats();
    log::info!(
        "done: {} entities, {} archetypes, cache {} hits / {} misses",
        world.entity_count(),
        world.archetype_count(),
        stats.hits,
        stats.misses
    );
    Ok(())
}

/// A world with every demo component, entity and system in place.
fn build_world(config: &DemoConfig) -> World {
    let mut world = World::new();
    let ids = ComponentIds::register(&mut world);
    components::seed(&mut world, config.particle_lifetime, config.attractor);
    systems::add_all(&mut world, ids, config);
    world
}

fn report(world: &World, tick: u32) -> Result<(), EcsError> {
    let stats = world.query_cache_stats();
    log::info!(
        "tick {tick}: {} entities in {} archetypes, cache {} entries, {} hits, {} misses",
        world.entity_count(),
        world.archetype_count(),
        stats.entries,
        stats.hits,
        stats.misses
    );

    #[cfg(feature = "diagnostics")]
    log::debug!("{}", world.diagnostics_snapshot().to_json()?);
    Ok(())
}
