//! Height field orchestration: island placement, noise, falloff and their
//! combination into the canonical [`HeightGrid`].

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::falloff::FalloffMask;
use crate::grid::{Grid, HeightGrid};
use crate::islands::{IslandSpec, SatellitePlacement, place_islands};
use crate::noise_field::{NoiseField, NoiseParameters};
use crate::seed::{SeedStage, stage_rng};

/// Island shape settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandSettings {
    /// Radius in cells at which the falloff reaches 1 (base radius for multiple islands).
    pub radius: f64,
    /// Falloff exponent; higher values give sharper shores.
    pub falloff_power: f64,
    /// Total number of islands including the primary.
    pub count: usize,
    /// Radius multiplier for the primary island when there are satellites.
    pub primary_size_multiplier: f64,
    /// Satellite placement strategy.
    pub placement: SatellitePlacement,
}

impl Default for IslandSettings {
    fn default() -> Self {
        Self {
            radius: 100.0,
            falloff_power: 2.5,
            count: 1,
            primary_size_multiplier: 1.5,
            placement: SatellitePlacement::default(),
        }
    }
}

/// Result of one height field generation.
#[derive(Clone, Debug)]
pub struct HeightFieldOutput {
    /// The combined, normalized height grid.
    pub grid: HeightGrid,
    /// Islands that were actually placed; index 0 is the primary.
    pub islands: Vec<IslandSpec>,
    /// Non-fatal problems encountered along the way.
    pub diagnostics: Vec<TerrainError>,
}

/// Height field generation.
pub struct HeightField;

impl HeightField {
    /// Generate a `map_size x map_size` height grid for `seed`.
    ///
    /// `noise.seed` is ignored in favour of `seed`.
    pub fn generate(
        map_size: usize,
        islands: &IslandSettings,
        noise: &NoiseParameters,
        seed: i32,
    ) -> HeightFieldOutput {
        let mut rng = stage_rng(seed, SeedStage::IslandPlacement);
        let layout = place_islands(map_size, islands.count, &islands.placement, &mut rng);

        let noise = NoiseParameters {
            seed,
            ..noise.clone()
        };
        let noise_grid = NoiseField::generate(map_size, map_size, &noise);

        let single = layout.centers.len() <= 1;
        let falloff = if single {
            FalloffMask::single_island(map_size, islands.radius, islands.falloff_power)
        } else {
            FalloffMask::multi_island(
                map_size,
                &layout.centers,
                islands.radius,
                islands.primary_size_multiplier,
                islands.falloff_power,
            )
        };

        let placed = layout
            .centers
            .iter()
            .enumerate()
            .map(|(i, &center)| IslandSpec {
                center,
                radius: if i == 0 && !single {
                    islands.radius * islands.primary_size_multiplier
                } else {
                    islands.radius
                },
                falloff_power: islands.falloff_power,
            })
            .collect();

        tracing::debug!(
            map_size,
            seed,
            islands = layout.centers.len(),
            failures = layout.failures.len(),
            "height field generated"
        );

        HeightFieldOutput {
            grid: Self::combine(&noise_grid, &falloff),
            islands: placed,
            diagnostics: layout.failures,
        }
    }

    /// `clamp01(noise - falloff)` per cell.
    ///
    /// # Panics
    ///
    /// Panics if the grids differ in size.
    pub fn combine(noise: &Grid, falloff: &Grid) -> HeightGrid {
        assert_eq!(
            (noise.width(), noise.height()),
            (falloff.width(), falloff.height()),
            "noise and falloff grids must match in size"
        );
        let combined = Grid::from_fn(noise.width(), noise.height(), |x, y| {
            noise.get(x, y) - falloff.get(x, y)
        });
        HeightGrid::from_grid(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_noise() -> NoiseParameters {
        NoiseParameters {
            scale: 20.0,
            octaves: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_identical() {
        let islands = IslandSettings {
            radius: 30.0,
            ..Default::default()
        };
        let a = HeightField::generate(65, &islands, &small_noise(), 12345);
        let b = HeightField::generate(65, &islands, &small_noise(), 12345);
        assert_eq!(a.grid, b.grid, "Same seed must produce identical height grids");
    }

    #[test]
    fn test_heights_normalized() {
        let islands = IslandSettings {
            radius: 30.0,
            count: 4,
            placement: SatellitePlacement::FixedAngles { distance: 20.0 },
            ..Default::default()
        };
        let out = HeightField::generate(65, &islands, &small_noise(), 9);
        assert_eq!(out.islands.len(), 4);
        for &v in out.grid.as_grid().values() {
            assert!((0.0..=1.0).contains(&v), "height {v} out of [0,1]");
        }
    }

    #[test]
    fn test_edges_sink_below_water() {
        let islands = IslandSettings {
            radius: 20.0,
            ..Default::default()
        };
        let out = HeightField::generate(65, &islands, &small_noise(), 3);
        assert_eq!(out.grid.get(0, 0), 0.0, "corner lies far outside the island");
        assert_eq!(out.grid.get(64, 64), 0.0);
    }

    #[test]
    fn test_combine_clamps() {
        let noise = Grid::from_fn(2, 1, |x, _| if x == 0 { 0.2 } else { 0.9 });
        let falloff = Grid::from_fn(2, 1, |x, _| if x == 0 { 0.5 } else { 0.1 });
        let h = HeightField::combine(&noise, &falloff);
        assert_eq!(h.get(0, 0), 0.0);
        assert!((h.get(1, 0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_primary_radius_scaled_only_with_satellites() {
        let single = HeightField::generate(33, &IslandSettings::default(), &small_noise(), 1);
        assert_eq!(single.islands[0].radius, 100.0);

        let multi = HeightField::generate(
            129,
            &IslandSettings {
                count: 2,
                placement: SatellitePlacement::FixedAngles { distance: 40.0 },
                ..Default::default()
            },
            &small_noise(),
            1,
        );
        assert_eq!(multi.islands[0].radius, 150.0);
        assert_eq!(multi.islands[1].radius, 100.0);
    }

    #[test]
    fn test_failed_satellites_reported() {
        let islands = IslandSettings {
            count: 3,
            placement: SatellitePlacement::Randomized {
                min_spawn_radius: 5.0,
                max_spawn_radius: 6.0,
                min_separation: 500.0,
                max_attempts: 4,
            },
            ..Default::default()
        };
        let out = HeightField::generate(33, &islands, &small_noise(), 2);
        assert_eq!(out.islands.len(), 1);
        assert_eq!(out.diagnostics.len(), 2);
    }
}
