//! Demo systems, in the order they run each tick.
//!
//! Every system walks a query snapshot with `each_mut` and writes new
//! component values back through the world.

use std::f32::consts::TAU;

use glam::Vec2;
use hjord::prelude::*;

use crate::components::{
    Color, ComponentIds, Debounce, Lifetime, Particle, ParticleSpawner, Position, Speed, Text,
    Visible,
};
use crate::config::DemoConfig;

/// Width the particle radius is normalized against.
const VIEW_WIDTH: f32 = 800.0;
const MAX_PARTICLE_SPEED: f32 = 3.0;

/// Register every demo system on `world`.
pub fn add_all(world: &mut World, ids: ComponentIds, config: &DemoConfig) {
    world.add_system(ResetShouldUpdate { ids });
    world.add_system(DebounceTimers { ids });
    world.add_system(ExpireLifetimes { ids });
    world.add_system(FadeParticles { ids });
    world.add_system(SpawnBursts::new(ids, config));
    world.add_system(RefreshHudText { ids });
    world.add_system(AttractParticles {
        ids,
        target: config.attractor,
    });
}

/// Clears every enabled `ShouldUpdate` so HUD text only refreshes on ticks
/// where its debounce timer fires.
pub struct ResetShouldUpdate {
    pub ids: ComponentIds,
}

impl System for ResetShouldUpdate {
    fn update(&mut self, world: &mut World, _delta_time: f32) {
        let should_update = self.ids.should_update;
        world
            .query()
            .with(&[should_update])
            .each_mut(|world, id, _| world.disable_component(id, should_update));
    }
}

/// Advances debounce timers and re-enables `ShouldUpdate` when one fires.
pub struct DebounceTimers {
    pub ids: ComponentIds,
}

impl System for DebounceTimers {
    fn update(&mut self, world: &mut World, delta_time: f32) {
        let ids = self.ids;
        world.query().with(&[ids.debounce]).each_mut(|world, id, c| {
            let Some(mut debounce) = c.get::<Debounce>(ids.debounce).copied() else {
                return;
            };
            debounce.elapsed += delta_time;
            if debounce.elapsed >= debounce.interval {
                debounce.elapsed = 0.0;
                world.enable_component(id, ids.should_update);
            }
            world.add_component(id, debounce);
        });
    }
}

/// Ages every `Lifetime` and destroys the entities that ran out.
pub struct ExpireLifetimes {
    pub ids: ComponentIds,
}

impl System for ExpireLifetimes {
    fn update(&mut self, world: &mut World, delta_time: f32) {
        let ids = self.ids;
        world.query().with(&[ids.lifetime]).each_mut(|world, id, c| {
            let Some(mut lifetime) = c.get::<Lifetime>(ids.lifetime).copied() else {
                return;
            };
            lifetime.elapsed += delta_time;
            if lifetime.elapsed >= lifetime.lifetime {
                world.destroy_entity(id);
            } else {
                world.add_component(id, lifetime);
            }
        });
    }
}

/// Shifts particle color from red towards green and fades it out with age.
pub struct FadeParticles {
    pub ids: ComponentIds,
}

impl System for FadeParticles {
    fn update(&mut self, world: &mut World, _delta_time: f32) {
        let ids = self.ids;
        world
            .query()
            .with(&[ids.lifetime, ids.particle, ids.color])
            .each_mut(|world, id, c| {
                let (Some(lifetime), Some(color)) = (
                    c.get::<Lifetime>(ids.lifetime),
                    c.get::<Color>(ids.color),
                ) else {
                    return;
                };
                let t = lifetime.progress();
                let faded = Color {
                    r: color.r,
                    g: (255.0 * t) as u8,
                    b: (255.0 * (1.0 - t)) as u8,
                    a: (255.0 * (0.7 - t)).max(0.0) as u8,
                };
                world.add_component(id, faded);
            });
    }
}

/// Every `every` ticks, each spawner emits a ring of particles around the
/// attractor.
///
/// Positions and speeds are a pure function of the burst and particle index,
/// so runs are reproducible.
pub struct SpawnBursts {
    ids: ComponentIds,
    every: u32,
    per_burst: u32,
    radius: f32,
    center: Vec2,
    tick: u32,
    bursts: u32,
}

impl SpawnBursts {
    pub fn new(ids: ComponentIds, config: &DemoConfig) -> Self {
        Self {
            ids,
            every: config.spawn_every,
            per_burst: config.particles_per_burst,
            radius: config.spawn_radius,
            center: config.attractor,
            tick: 0,
            bursts: 0,
        }
    }

    /// Where particle `i` of burst `burst` starts, and how fast it moves.
    fn placement(&self, burst: u32, i: u32) -> (Vec2, f32) {
        let phase = burst as f32 * 0.37;
        let angle = TAU * i as f32 / self.per_burst.max(1) as f32 + phase;
        let position = self.center + Vec2::from_angle(angle) * self.radius;
        let speed = MAX_PARTICLE_SPEED * ((i * 7 + burst) % 10) as f32 / 10.0;
        (position, speed)
    }
}

impl System for SpawnBursts {
    fn update(&mut self, world: &mut World, _delta_time: f32) {
        self.tick += 1;
        if self.every == 0 || self.tick % self.every != 0 {
            return;
        }

        let spawners = world.query().with(&[self.ids.spawner]).get();
        for spawner in &spawners {
            let Some(&ParticleSpawner { particle_lifetime }) =
                spawner.components.get::<ParticleSpawner>(self.ids.spawner)
            else {
                continue;
            };
            for i in 0..self.per_burst {
                let (position, speed) = self.placement(self.bursts, i);
                let particle = world.create_entity();
                world.add_components(
                    particle,
                    (
                        Particle::default(),
                        Position(position),
                        Color::RED,
                        Lifetime::new(particle_lifetime),
                        Visible,
                        Speed(speed),
                    ),
                );
            }
            log::debug!(
                "spawner {} emitted {} particles (burst {})",
                spawner.id,
                self.per_burst,
                self.bursts
            );
            self.bursts += 1;
        }
    }
}

/// Rewrites HUD text: FPS and frame time when their debounce fired, the
/// entity counter every tick.
pub struct RefreshHudText {
    pub ids: ComponentIds,
}

impl RefreshHudText {
    fn rewrite(world: &mut World, id: EntityId, c: &Components, text_id: ComponentId, text: String) {
        if let Some(old) = c.get::<Text>(text_id) {
            world.add_component(
                id,
                Text {
                    text,
                    font_size: old.font_size,
                },
            );
        }
    }
}

impl System for RefreshHudText {
    fn update(&mut self, world: &mut World, delta_time: f32) {
        let ids = self.ids;
        let fps = if delta_time > 0.0 {
            (1.0 / delta_time).round() as u32
        } else {
            0
        };

        world
            .query()
            .with(&[ids.fps, ids.text, ids.should_update])
            .each_mut(|world, id, c| {
                Self::rewrite(world, id, c, ids.text, format!("FPS: {fps}"));
            });

        world
            .query()
            .with(&[ids.frame_time, ids.text, ids.should_update])
            .each_mut(|world, id, c| {
                Self::rewrite(world, id, c, ids.text, format!("Frame time: {delta_time:.4}"));
            });

        world
            .query()
            .with(&[ids.entity_counter, ids.text])
            .each_mut(|world, id, c| {
                let count = world.entity_count();
                Self::rewrite(world, id, c, ids.text, format!("Entities: {count}"));
            });
    }
}

/// Moves particles towards `target` and sizes them by their distance to it.
pub struct AttractParticles {
    pub ids: ComponentIds,
    pub target: Vec2,
}

impl System for AttractParticles {
    fn update(&mut self, world: &mut World, delta_time: f32) {
        let ids = self.ids;
        let target = self.target;
        world
            .query()
            .with(&[ids.particle, ids.position, ids.speed])
            .each_mut(|world, id, c| {
                let (Some(Position(position)), Some(Speed(speed))) = (
                    c.get::<Position>(ids.position),
                    c.get::<Speed>(ids.speed),
                ) else {
                    return;
                };
                let moved = position.lerp(target, (speed * delta_time).clamp(0.0, 1.0));
                let radius = 10.0 * target.distance(moved) / VIEW_WIDTH;
                world.add_components(id, (Position(moved), Particle { radius }));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ShouldUpdate;

    fn setup() -> (World, ComponentIds) {
        let mut world = World::new();
        let ids = ComponentIds::register(&mut world);
        (world, ids)
    }

    #[test]
    fn debounce_enables_should_update_after_interval() {
        let (mut world, ids) = setup();
        let e = world.create_entity();
        world.add_components(e, (Debounce::every(0.1), ShouldUpdate));
        world.add_system(ResetShouldUpdate { ids });
        world.add_system(DebounceTimers { ids });

        world.update(0.05);
        assert!(!world.is_component_enabled(e, ids.should_update));
        assert_eq!(world.get::<Debounce>(e).unwrap().elapsed, 0.05);

        world.update(0.06);
        assert!(world.is_component_enabled(e, ids.should_update));
        assert_eq!(world.get::<Debounce>(e).unwrap().elapsed, 0.0);
    }

    #[test]
    fn expired_lifetimes_are_destroyed() {
        let (mut world, ids) = setup();
        let e = world.create_entity();
        world.add_component(e, Lifetime::new(1.0));
        world.add_system(ExpireLifetimes { ids });

        world.update(0.6);
        assert!(world.is_alive(e));
        world.update(0.6);
        assert!(!world.is_alive(e));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn fade_goes_transparent_late_in_life() {
        let (mut world, ids) = setup();
        let young = world.create_entity();
        world.add_components(young, (Lifetime::new(1.0), Particle::default(), Color::RED));
        let old = world.create_entity();
        world.add_components(
            old,
            (
                Lifetime {
                    lifetime: 1.0,
                    elapsed: 0.8,
                },
                Particle::default(),
                Color::RED,
            ),
        );
        world.add_system(FadeParticles { ids });
        world.update(0.0);

        let young = world.get::<Color>(young).unwrap();
        assert_eq!((young.g, young.b), (0, 255));
        assert!(young.a > 0);

        let old = world.get::<Color>(old).unwrap();
        assert_eq!(old.a, 0);
        assert!(old.g > old.b);
    }

    #[test]
    fn spawner_emits_ring_every_n_ticks() {
        let (mut world, ids) = setup();
        let spawner = world.create_entity();
        world.add_component(
            spawner,
            ParticleSpawner {
                particle_lifetime: 10.0,
            },
        );
        let config = DemoConfig {
            spawn_every: 2,
            particles_per_burst: 8,
            spawn_radius: 100.0,
            attractor: Vec2::new(50.0, 50.0),
            ..DemoConfig::default()
        };
        world.add_system(SpawnBursts::new(ids, &config));

        world.update(0.1);
        assert!(world.query().with(&[ids.particle]).get().is_empty());

        world.update(0.1);
        let particles = world.query().with(&[ids.particle, ids.position]).get();
        assert_eq!(particles.len(), 8);
        for p in &particles {
            let Position(at) = p.components.get::<Position>(ids.position).unwrap();
            assert!((at.distance(config.attractor) - 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn attraction_moves_towards_target_and_sizes_by_distance() {
        let (mut world, ids) = setup();
        let e = world.create_entity();
        world.add_components(e, (Particle::default(), Position(Vec2::ZERO), Speed(1.0)));
        world.add_system(AttractParticles {
            ids,
            target: Vec2::new(10.0, 0.0),
        });

        world.update(0.5);
        assert_eq!(world.get::<Position>(e), Some(&Position(Vec2::new(5.0, 0.0))));
        assert_eq!(world.get::<Particle>(e).unwrap().radius, 10.0 * 5.0 / VIEW_WIDTH);
    }

    #[test]
    fn hud_counter_tracks_entity_count() {
        let (mut world, ids) = setup();
        crate::components::seed(&mut world, 1.0, Vec2::ZERO);
        world.add_system(RefreshHudText { ids });
        world.create_entity();

        world.update(0.02);
        let texts = world.query().with(&[ids.entity_counter, ids.text]).get();
        let text = texts.entities()[0].components.get::<Text>(ids.text).unwrap();
        assert_eq!(text.text, "Entities: 5");

        let fps = world.query().with(&[ids.fps, ids.text]).get();
        let text = fps.entities()[0].components.get::<Text>(ids.text).unwrap();
        assert_eq!(text.text, "FPS: 50");
    }
}
