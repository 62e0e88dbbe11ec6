//! Height-banded, density-weighted object scattering over a terrain surface.

use std::f64::consts::TAU;

use glam::{DQuat, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::surface::{Bounds3, TerrainSurface};

/// Smallest sampling step accepted; smaller or non-finite steps are replaced.
const FALLBACK_STEP: f64 = 0.5;

/// A kind of object that can be scattered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceableSpec {
    /// Identifier the instantiation layer resolves to a prefab or model.
    pub name: String,
    /// Lowest normalized height this kind appears at.
    pub min_height: f64,
    /// Highest normalized height this kind appears at.
    pub max_height: f64,
    /// Relative selection weight among kinds whose band contains the height.
    pub density: f64,
    /// Vertical offset added to the surface elevation.
    pub y_offset: f64,
    /// Tilt the object so its up axis follows the surface normal.
    pub align_to_surface: bool,
    /// Spin the object by a random angle about its up axis.
    pub random_yaw: bool,
}

impl PlaceableSpec {
    pub fn new(name: impl Into<String>, min_height: f64, max_height: f64, density: f64) -> Self {
        Self {
            name: name.into(),
            min_height,
            max_height,
            density,
            ..Default::default()
        }
    }

    /// Whether `height` lies in `[min_height, max_height]`.
    pub fn accepts(&self, height: f64) -> bool {
        (self.min_height..=self.max_height).contains(&height)
    }
}

impl Default for PlaceableSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            min_height: 0.0,
            max_height: 1.0,
            density: 1.0,
            y_offset: 0.0,
            align_to_surface: false,
            random_yaw: true,
        }
    }
}

/// One scattered object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: DVec3,
    pub rotation: DQuat,
    /// Index into the placeable list the scatter ran with.
    pub placeable: usize,
}

/// Everything one scatter pass produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementResult {
    pub placements: Vec<Placement>,
}

impl PlacementResult {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of placements per placeable index, for `kinds` kinds.
    pub fn counts(&self, kinds: usize) -> Vec<usize> {
        let mut counts = vec![0; kinds];
        for p in &self.placements {
            if let Some(c) = counts.get_mut(p.placeable) {
                *c += 1;
            }
        }
        counts
    }
}

/// Scatter configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterSettings {
    pub placeables: Vec<PlaceableSpec>,
    /// Spacing of the sampling lattice in world units.
    pub placement_step: f64,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            placeables: vec![
                PlaceableSpec {
                    name: "tree".into(),
                    min_height: 0.35,
                    max_height: 0.7,
                    density: 3.0,
                    ..Default::default()
                },
                PlaceableSpec {
                    name: "rock".into(),
                    min_height: 0.3,
                    max_height: 0.9,
                    density: 1.0,
                    align_to_surface: true,
                    ..Default::default()
                },
            ],
            placement_step: 10.0,
        }
    }
}

/// Scatters placeables over a jittered lattice.
///
/// Each lattice sample is independent: there is no spacing or collision check
/// between placed objects.
pub struct ObjectScatterer<'a> {
    placeables: &'a [PlaceableSpec],
    step: f64,
}

impl<'a> ObjectScatterer<'a> {
    pub fn new(settings: &'a ScatterSettings) -> Self {
        Self::with_step(&settings.placeables, settings.placement_step)
    }

    pub fn with_step(placeables: &'a [PlaceableSpec], step: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            tracing::warn!(step, fallback = FALLBACK_STEP, "invalid placement step; using fallback");
            FALLBACK_STEP
        };
        Self { placeables, step }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Sample `bounds` every `step` units along x and z, jitter each sample by
    /// up to half a step, and place at most one object per sample.
    pub fn scatter<R: Rng>(
        &self,
        surface: &TerrainSurface<'_>,
        bounds: &Bounds3,
        rng: &mut R,
    ) -> PlacementResult {
        let mut result = PlacementResult::default();
        if self.placeables.is_empty() {
            return result;
        }
        let half = self.step / 2.0;

        let mut i = 0u32;
        loop {
            let x = bounds.min.x + f64::from(i) * self.step;
            if x >= bounds.max.x {
                break;
            }
            let mut j = 0u32;
            loop {
                let z = bounds.min.z + f64::from(j) * self.step;
                if z >= bounds.max.z {
                    break;
                }
                let px = x + rng.random_range(-half..half);
                let pz = z + rng.random_range(-half..half);
                if let Some(placement) = self.sample(surface, px, pz, rng) {
                    result.placements.push(placement);
                }
                j += 1;
            }
            i += 1;
        }

        tracing::debug!(
            placements = result.len(),
            step = self.step,
            "scatter pass finished"
        );
        result
    }

    fn sample<R: Rng>(
        &self,
        surface: &TerrainSurface<'_>,
        x: f64,
        z: f64,
        rng: &mut R,
    ) -> Option<Placement> {
        let height = surface.normalized_height(x, z)?;
        let index = self.choose(height, rng)?;
        let spec = &self.placeables[index];

        let mut rotation = DQuat::IDENTITY;
        if spec.align_to_surface {
            let normal = surface.normal(x, z)?;
            rotation = DQuat::from_rotation_arc(DVec3::Y, normal);
        }
        if spec.random_yaw {
            rotation *= DQuat::from_rotation_y(rng.random_range(0.0..TAU));
        }

        Some(Placement {
            position: DVec3::new(x, surface.remap(height) + spec.y_offset, z),
            rotation,
            placeable: index,
        })
    }

    /// Roulette-wheel pick among placeables whose band contains `height`,
    /// weighted by density. Non-finite densities never win.
    pub fn choose<R: Rng>(&self, height: f64, rng: &mut R) -> Option<usize> {
        let weight = |spec: &PlaceableSpec| {
            (spec.accepts(height) && spec.density.is_finite() && spec.density > 0.0)
                .then_some(spec.density)
        };

        let mut total = 0.0;
        let mut last = None;
        for (i, spec) in self.placeables.iter().enumerate() {
            if let Some(density) = weight(spec) {
                total += density;
                last = Some(i);
            }
        }
        let last = last?;
        if !total.is_finite() {
            return Some(last);
        }

        let mut roll = rng.random_range(0.0..total);
        for (i, spec) in self.placeables.iter().enumerate() {
            if let Some(density) = weight(spec) {
                roll -= density;
                if roll < 0.0 {
                    return Some(i);
                }
            }
        }
        // Rounding left the roll at exactly zero.
        Some(last)
    }
}

/// Holds the current scatter result so it can be swapped or removed.
#[derive(Debug, Default)]
pub struct ScatterLayer {
    current: Option<PlacementResult>,
}

impl ScatterLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&PlacementResult> {
        self.current.as_ref()
    }

    /// Install a new result, returning the one it supersedes.
    pub fn replace(&mut self, result: PlacementResult) -> Option<PlacementResult> {
        self.current.replace(result)
    }

    /// Remove the current result. Clearing an empty layer does nothing.
    pub fn clear(&mut self) -> Option<PlacementResult> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::HeightCurve;
    use crate::grid::{Grid, HeightGrid};
    use crate::seed::{SeedStage, stage_rng};

    fn flat_surface_grid(h: f64) -> HeightGrid {
        HeightGrid::from_grid(Grid::filled(33, 33, h))
    }

    #[test]
    fn test_weighted_selection_ratio() {
        let specs = vec![
            PlaceableSpec::new("common", 0.0, 1.0, 3.0),
            PlaceableSpec::new("rare", 0.0, 1.0, 1.0),
        ];
        let scatterer = ObjectScatterer::with_step(&specs, 1.0);
        let mut rng = stage_rng(11, SeedStage::Scatter);

        let mut wins = [0u32; 2];
        for _ in 0..40_000 {
            let i = scatterer.choose(0.5, &mut rng).unwrap();
            wins[i] += 1;
        }
        let ratio = f64::from(wins[0]) / f64::from(wins[1]);
        assert!((2.8..3.2).contains(&ratio), "ratio was {ratio}, wins {wins:?}");
    }

    #[test]
    fn test_choose_respects_height_band() {
        let specs = vec![
            PlaceableSpec::new("low", 0.0, 0.4, 1.0),
            PlaceableSpec::new("high", 0.6, 1.0, 1.0),
        ];
        let scatterer = ObjectScatterer::with_step(&specs, 1.0);
        let mut rng = stage_rng(1, SeedStage::Scatter);
        assert_eq!(scatterer.choose(0.2, &mut rng), Some(0));
        assert_eq!(scatterer.choose(0.8, &mut rng), Some(1));
        assert_eq!(scatterer.choose(0.5, &mut rng), None);
    }

    #[test]
    fn test_zero_density_places_nothing() {
        let specs = vec![PlaceableSpec::new("ghost", 0.0, 1.0, 0.0)];
        let scatterer = ObjectScatterer::with_step(&specs, 1.0);
        let mut rng = stage_rng(1, SeedStage::Scatter);
        assert_eq!(scatterer.choose(0.5, &mut rng), None);
    }

    #[test]
    fn test_infinite_density_is_skipped() {
        let specs = vec![
            PlaceableSpec::new("broken", 0.0, 1.0, f64::INFINITY),
            PlaceableSpec::new("tree", 0.0, 1.0, 1.0),
            PlaceableSpec::new("nan", 0.0, 1.0, f64::NAN),
        ];
        let scatterer = ObjectScatterer::with_step(&specs, 1.0);
        let mut rng = stage_rng(4, SeedStage::Scatter);
        for _ in 0..100 {
            assert_eq!(scatterer.choose(0.5, &mut rng), Some(1));
        }

        let only_broken = &specs[..1];
        let scatterer = ObjectScatterer::with_step(only_broken, 1.0);
        assert_eq!(scatterer.choose(0.5, &mut rng), None);
    }

    #[test]
    fn test_huge_densities_do_not_overflow_the_roll() {
        let specs = vec![
            PlaceableSpec::new("a", 0.0, 1.0, f64::MAX),
            PlaceableSpec::new("b", 0.0, 1.0, f64::MAX),
        ];
        let scatterer = ObjectScatterer::with_step(&specs, 1.0);
        let mut rng = stage_rng(4, SeedStage::Scatter);
        assert!(scatterer.choose(0.5, &mut rng).is_some());
    }

    #[test]
    fn test_scatter_positions_on_surface() {
        let grid = flat_surface_grid(0.5);
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 10.0);
        let bounds = surface.bounds().unwrap();
        let specs = vec![PlaceableSpec {
            y_offset: 0.25,
            random_yaw: false,
            ..PlaceableSpec::new("stone", 0.0, 1.0, 1.0)
        }];
        let scatterer = ObjectScatterer::with_step(&specs, 4.0);
        let result = scatterer.scatter(&surface, &bounds, &mut stage_rng(3, SeedStage::Scatter));

        assert!(!result.is_empty());
        for p in &result.placements {
            assert!((p.position.y - 5.25).abs() < 1e-9, "y was {}", p.position.y);
            assert!(bounds.contains_xz(p.position.x, p.position.z));
            assert_eq!(p.rotation, DQuat::IDENTITY);
        }
        // An 8x8 lattice over a 32x32 surface; edge samples may jitter off it.
        assert!(result.len() <= 64);
    }

    #[test]
    fn test_scatter_deterministic_per_seed() {
        let grid = flat_surface_grid(0.5);
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 10.0);
        let bounds = surface.bounds().unwrap();
        let settings = ScatterSettings::default();
        let scatterer = ObjectScatterer::new(&settings);

        let a = scatterer.scatter(&surface, &bounds, &mut stage_rng(9, SeedStage::Scatter));
        let b = scatterer.scatter(&surface, &bounds, &mut stage_rng(9, SeedStage::Scatter));
        assert_eq!(a, b);
        assert_eq!(a.counts(2).iter().sum::<usize>(), a.len());
    }

    #[test]
    fn test_aligned_rotation_maps_up_to_normal() {
        let grid = HeightGrid::from_grid(Grid::from_fn(17, 17, |x, _| x as f64 / 16.0));
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 8.0);
        let bounds = surface.bounds().unwrap();
        let specs = vec![PlaceableSpec {
            align_to_surface: true,
            random_yaw: false,
            ..PlaceableSpec::new("boulder", 0.0, 1.0, 1.0)
        }];
        let scatterer = ObjectScatterer::with_step(&specs, 4.0);
        let result = scatterer.scatter(&surface, &bounds, &mut stage_rng(4, SeedStage::Scatter));

        for p in &result.placements {
            let normal = surface.normal(p.position.x, p.position.z).unwrap();
            let up = p.rotation * DVec3::Y;
            assert!((up - normal).length() < 1e-6, "up {up:?} normal {normal:?}");
        }
    }

    #[test]
    fn test_invalid_step_falls_back() {
        let specs = vec![PlaceableSpec::default()];
        assert_eq!(ObjectScatterer::with_step(&specs, 0.0).step(), FALLBACK_STEP);
        assert_eq!(ObjectScatterer::with_step(&specs, -3.0).step(), FALLBACK_STEP);
        assert_eq!(ObjectScatterer::with_step(&specs, f64::NAN).step(), FALLBACK_STEP);
    }

    #[test]
    fn test_layer_clear_is_idempotent() {
        let mut layer = ScatterLayer::new();
        assert!(layer.clear().is_none());
        assert!(layer.clear().is_none());

        let result = PlacementResult {
            placements: vec![Placement {
                position: DVec3::ZERO,
                rotation: DQuat::IDENTITY,
                placeable: 0,
            }],
        };
        assert!(layer.replace(result.clone()).is_none());
        assert_eq!(layer.current(), Some(&result));
        assert_eq!(layer.replace(PlacementResult::default()), Some(result));
        assert!(layer.clear().is_some());
        assert!(layer.clear().is_none());
        assert!(layer.current().is_none());
    }
}
