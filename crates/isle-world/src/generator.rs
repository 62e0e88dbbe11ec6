//! Synchronous world generation with explicit listener registration.

use std::sync::Arc;

use isle_terrain::seed::random_world_seed;
use isle_terrain::{PlacementResult, ScatterLayer};

use crate::pipeline::{GeneratedWorld, generate_world};
use crate::settings::WorldSettings;

/// Receives every finished world, after it is complete.
pub trait GenerationListener: Send {
    fn on_generated(&mut self, world: &Arc<GeneratedWorld>);
}

impl<F> GenerationListener for F
where
    F: FnMut(&Arc<GeneratedWorld>) + Send,
{
    fn on_generated(&mut self, world: &Arc<GeneratedWorld>) {
        self(world)
    }
}

/// Owns the settings and the latest world, and fans finished worlds out to
/// registered listeners in registration order.
pub struct WorldGenerator {
    settings: WorldSettings,
    listeners: Vec<Box<dyn GenerationListener>>,
    latest: Option<Arc<GeneratedWorld>>,
    scatter: ScatterLayer,
}

impl WorldGenerator {
    pub fn new(settings: WorldSettings) -> Self {
        Self {
            settings,
            listeners: Vec::new(),
            latest: None,
            scatter: ScatterLayer::new(),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Settings for the next run; a run already finished is unaffected.
    pub fn settings_mut(&mut self) -> &mut WorldSettings {
        &mut self.settings
    }

    pub fn add_listener(&mut self, listener: impl GenerationListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Generate with the configured seed, or a fresh random one.
    pub fn generate(&mut self) -> Arc<GeneratedWorld> {
        let seed = self.settings.seed.unwrap_or_else(random_world_seed);
        self.generate_with_seed(seed)
    }

    /// Generate with an explicit seed, replacing the previous world.
    pub fn generate_with_seed(&mut self, seed: i32) -> Arc<GeneratedWorld> {
        let world = Arc::new(generate_world(&self.settings, seed));
        self.publish(Arc::clone(&world));
        world
    }

    /// Install a world produced elsewhere (for example by a
    /// [`BackgroundGenerator`](crate::BackgroundGenerator)) and notify listeners.
    pub fn publish(&mut self, world: Arc<GeneratedWorld>) {
        for diagnostic in &world.diagnostics {
            tracing::warn!(seed = world.seed, %diagnostic, "generation diagnostic");
        }
        self.scatter.replace(world.placements.clone());
        self.latest = Some(Arc::clone(&world));
        for listener in &mut self.listeners {
            listener.on_generated(&world);
        }
    }

    pub fn latest(&self) -> Option<&Arc<GeneratedWorld>> {
        self.latest.as_ref()
    }

    /// Placements currently in the scene, if any.
    pub fn placements(&self) -> Option<&PlacementResult> {
        self.scatter.current()
    }

    /// Remove the current placements. Does nothing when there are none.
    pub fn clear_placements(&mut self) -> Option<PlacementResult> {
        let cleared = self.scatter.clear();
        if let Some(result) = &cleared {
            tracing::debug!(placements = result.len(), "placements cleared");
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn tiny() -> WorldSettings {
        let mut s = WorldSettings {
            map_size: 33,
            ..Default::default()
        };
        s.island.radius = 14.0;
        s.noise.scale = 10.0;
        s.noise.octaves = 3;
        s.texture.resolution_multiplier = 1;
        s.scatter.placement_step = 3.0;
        s
    }

    #[test]
    fn test_listeners_notified_in_order_with_complete_world() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut generator = WorldGenerator::new(tiny());

        let first = Arc::clone(&log);
        generator.add_listener(move |world: &Arc<GeneratedWorld>| {
            assert!(world.mesh.is_ok());
            first.lock().unwrap().push(("first", world.seed));
        });
        let second = Arc::clone(&log);
        generator.add_listener(move |world: &Arc<GeneratedWorld>| {
            second.lock().unwrap().push(("second", world.seed));
        });

        generator.generate_with_seed(10);
        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", 10), ("second", 10)]
        );
    }

    #[test]
    fn test_configured_seed_used() {
        let mut settings = tiny();
        settings.seed = Some(321);
        let mut generator = WorldGenerator::new(settings);
        assert_eq!(generator.generate().seed, 321);
    }

    #[test]
    fn test_random_seed_in_range() {
        let mut generator = WorldGenerator::new(tiny());
        let seed = generator.generate().seed;
        assert!((0..isle_terrain::seed::MAX_RANDOM_SEED).contains(&seed));
    }

    #[test]
    fn test_regeneration_replaces_latest() {
        let mut generator = WorldGenerator::new(tiny());
        let a = generator.generate_with_seed(1);
        let b = generator.generate_with_seed(2);
        let latest = generator.latest().unwrap();
        assert!(Arc::ptr_eq(latest, &b));
        assert!(!Arc::ptr_eq(latest, &a));
        assert_eq!(a.seed, 1, "earlier world is left untouched");
    }

    #[test]
    fn test_settings_edit_does_not_reach_finished_world() {
        let mut generator = WorldGenerator::new(tiny());
        let world = generator.generate_with_seed(3);
        generator.settings_mut().mesh.height_multiplier = 999.0;
        assert_eq!(world.settings.mesh.height_multiplier, 25.0);
    }

    #[test]
    fn test_clear_placements_idempotent() {
        let mut generator = WorldGenerator::new(tiny());
        assert!(generator.clear_placements().is_none());
        generator.generate_with_seed(4);
        assert!(generator.placements().is_some());
        assert!(generator.clear_placements().is_some());
        assert!(generator.clear_placements().is_none());
        assert!(generator.placements().is_none());
    }
}
