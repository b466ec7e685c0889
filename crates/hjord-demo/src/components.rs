//! Component types for the particle demo.

use glam::Vec2;
use hjord::prelude::*;

/// A line of HUD text.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
    pub font_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

/// RGBA, 0–255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Self = Self {
        r: 255,
        g: 0,
        b: 0,
        a: 255,
    };
}

/// Fires [`ShouldUpdate`] every `interval` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debounce {
    pub interval: f32,
    pub elapsed: f32,
}

impl Debounce {
    pub fn every(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }
}

/// Emits bursts of particles that live for `particle_lifetime` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpawner {
    pub particle_lifetime: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub radius: f32,
}

/// Destroys the entity once `elapsed` reaches `lifetime`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub lifetime: f32,
    pub elapsed: f32,
}

impl Lifetime {
    pub fn new(lifetime: f32) -> Self {
        Self {
            lifetime,
            elapsed: 0.0,
        }
    }

    /// Fraction of the lifetime used up, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.lifetime).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speed(pub f32);

// Markers.
#[derive(Debug, Clone, Copy)]
pub struct Fps;
#[derive(Debug, Clone, Copy)]
pub struct FrameTime;
#[derive(Debug, Clone, Copy)]
pub struct EntityCounter;
#[derive(Debug, Clone, Copy)]
pub struct ShouldUpdate;
#[derive(Debug, Clone, Copy)]
pub struct Visible;

/// The id of every demo component in one world.
#[derive(Debug, Clone, Copy)]
pub struct ComponentIds {
    pub text: ComponentId,
    pub position: ComponentId,
    pub fps: ComponentId,
    pub frame_time: ComponentId,
    pub debounce: ComponentId,
    pub should_update: ComponentId,
    pub color: ComponentId,
    pub spawner: ComponentId,
    pub particle: ComponentId,
    pub lifetime: ComponentId,
    pub entity_counter: ComponentId,
    pub visible: ComponentId,
    pub speed: ComponentId,
}

impl ComponentIds {
    /// Register every demo component with `world`.
    pub fn register(world: &mut World) -> Self {
        Self {
            text: world.register::<Text>(),
            position: world.register::<Position>(),
            fps: world.register::<Fps>(),
            frame_time: world.register::<FrameTime>(),
            debounce: world.register::<Debounce>(),
            should_update: world.register::<ShouldUpdate>(),
            color: world.register::<Color>(),
            spawner: world.register::<ParticleSpawner>(),
            particle: world.register::<Particle>(),
            lifetime: world.register::<Lifetime>(),
            entity_counter: world.register::<EntityCounter>(),
            visible: world.register::<Visible>(),
            speed: world.register::<Speed>(),
        }
    }
}

/// Create the HUD entities and the particle spawner.
pub fn seed(world: &mut World, particle_lifetime: f32, origin: Vec2) {
    let fps = world.create_entity();
    world.add_components(
        fps,
        (
            Text {
                text: "FPS: 0".into(),
                font_size: 20,
            },
            Position(Vec2::new(10.0, 10.0)),
            Fps,
            Debounce::every(0.1),
            ShouldUpdate,
            Visible,
        ),
    );

    let frame_time = world.create_entity();
    world.add_components(
        frame_time,
        (
            Text {
                text: "Frame time: 0".into(),
                font_size: 14,
            },
            Position(Vec2::new(10.0, 30.0)),
            FrameTime,
            Debounce::every(1.0),
            ShouldUpdate,
            Visible,
        ),
    );

    let spawner = world.create_entity();
    world.add_components(
        spawner,
        (
            ParticleSpawner { particle_lifetime },
            Position(origin),
            Color {
                r: 1,
                g: 0,
                b: 0,
                a: 1,
            },
        ),
    );

    let counter = world.create_entity();
    world.add_components(
        counter,
        (
            Text {
                text: "Entities: 0".into(),
                font_size: 14,
            },
            Position(Vec2::new(10.0, 50.0)),
            EntityCounter,
            ShouldUpdate,
            Debounce::every(0.1),
            Visible,
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_creates_hud_and_spawner() {
        let mut world = World::new();
        let ids = ComponentIds::register(&mut world);
        seed(&mut world, 5.0, Vec2::ZERO);

        assert_eq!(world.entity_count(), 4);
        assert_eq!(world.query().with(&[ids.text, ids.visible]).get().len(), 3);
        assert_eq!(world.query().with(&[ids.spawner]).get().len(), 1);
    }

    #[test]
    fn lifetime_progress_is_clamped() {
        let mut life = Lifetime::new(2.0);
        assert_eq!(life.progress(), 0.0);
        life.elapsed = 1.0;
        assert_eq!(life.progress(), 0.5);
        life.elapsed = 3.0;
        assert_eq!(life.progress(), 1.0);
        assert_eq!(Lifetime::new(0.0).progress(), 1.0);
    }
}
