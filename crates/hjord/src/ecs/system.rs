//! # System — Per-Tick Logic That Operates on the World
//!
//! A system is anything with `update(&mut World, delta_time)`. Closures and
//! plain functions with that signature qualify through a blanket impl; a
//! struct implements [`System`] when it needs state of its own (a timer, a
//! counter) between ticks.
//!
//! ## Schedule
//!
//! A [`Schedule`] is a `Vec` of boxed systems. [`World::update`] runs them
//! once each, in the order they were added. There is no dedup, no priority
//! and no parallelism: a system that stalls stalls the whole tick.
//!
//! ## Comparison
//!
//! - **hecs**: No system or schedule concept at all.
//! - **bevy_ecs**: `SystemParam` injection, parallel execution with conflict
//!   detection, run conditions.
//!
//! We stay close to hecs: "systems are just functions", with a small
//! `Schedule` for convenience and optional per-system timings.

use super::world::World;

/// Logic that runs once per [`World::update`].
pub trait System {
    fn update(&mut self, world: &mut World, delta_time: f32);
}

/// Any `FnMut(&mut World, f32)` is a `System`.
impl<F: FnMut(&mut World, f32)> System for F {
    fn update(&mut self, world: &mut World, delta_time: f32) {
        (self)(world, delta_time);
    }
}

/// A boxed system plus the label it reports timings under.
struct Entry {
    #[cfg(any(feature = "diagnostics", test))]
    label: String,
    system: Box<dyn System>,
}

/// Wall-clock time one system took during the latest tick.
#[cfg(feature = "diagnostics")]
#[derive(Clone, Debug, serde::Serialize)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// An ordered list of systems.
#[derive(Default)]
pub struct Schedule {
    entries: Vec<Entry>,
    /// Filled by each `run()`, one per system.
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `system` behind every system already scheduled.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.entries.push(Entry {
            #[cfg(any(feature = "diagnostics", test))]
            label: system_label(std::any::type_name::<S>()),
            system: Box::new(system),
        });
    }

    /// Run every system once, in insertion order.
    pub fn run(&mut self, world: &mut World, delta_time: f32) {
        #[cfg(feature = "diagnostics")]
        self.timings.clear();

        for entry in &mut self.entries {
            #[cfg(feature = "diagnostics")]
            let started = std::time::Instant::now();

            entry.system.update(world, delta_time);

            #[cfg(feature = "diagnostics")]
            self.timings.push(SystemTiming {
                name: entry.label.clone(),
                duration_us: started.elapsed().as_secs_f64() * 1e6,
            });
        }
    }

    /// Move every system from `other` onto the end of this schedule.
    pub fn append(&mut self, other: &mut Schedule) {
        self.entries.append(&mut other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }
}

/// Label a system by the last path segment of its type name
/// (`demo::systems::FadeParticles` → `FadeParticles`). Closures all share the
/// label `<closure>`.
#[cfg(any(feature = "diagnostics", test))]
fn system_label(type_name: &str) -> String {
    let path = type_name.split('<').next().unwrap_or(type_name);
    match path.rsplit("::").next() {
        Some(last) if last.contains("closure") => "<closure>".to_owned(),
        Some(last) => last.to_owned(),
        None => path.to_owned(),
    }
}
