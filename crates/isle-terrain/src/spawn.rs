//! Spawn point search: probe the terrain along an outward square spiral from
//! the origin until the ground is high enough to stand on.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::surface::TerrainSurface;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Lowest normalized height considered dry land.
    pub min_normalized_height: f64,
    /// Distance between spiral probes in world units.
    pub search_step: f64,
    /// The spiral visits `max_search_radius_steps²` probes at most.
    pub max_search_radius_steps: u32,
    /// Height added above the found ground point.
    pub lift: f64,
    /// Position used when no dry land is found.
    pub fallback: [f64; 3],
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            min_normalized_height: 0.3,
            search_step: 2.0,
            max_search_radius_steps: 100,
            lift: 5.0,
            fallback: [0.0, 50.0, 0.0],
        }
    }
}

/// Where a dependent should be placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    pub position: DVec3,
    /// True when no dry land was found and the fixed fallback is used.
    pub fallback: bool,
}

/// Find the first ground point along the spiral whose elevation exceeds the
/// remapped minimum height. Probes off the surface count as misses.
pub fn find_spawn_point(
    surface: &TerrainSurface<'_>,
    settings: &SpawnSettings,
) -> Result<DVec3, TerrainError> {
    let threshold = surface.remap(settings.min_normalized_height);
    let steps = settings
        .max_search_radius_steps
        .saturating_mul(settings.max_search_radius_steps);

    for (i, j) in SquareSpiral::default().take(steps as usize) {
        let x = f64::from(i) * settings.search_step;
        let z = f64::from(j) * settings.search_step;
        if let Some(y) = surface.elevation(x, z)
            && y > threshold
        {
            return Ok(DVec3::new(x, y, z));
        }
    }

    Err(TerrainError::MissingSpawnSurface { steps })
}

/// Resolve a spawn position, lifted clear of the ground, falling back to
/// `settings.fallback` when the search fails.
pub fn locate_spawn(surface: &TerrainSurface<'_>, settings: &SpawnSettings) -> SpawnPoint {
    match find_spawn_point(surface, settings) {
        Ok(ground) => SpawnPoint {
            position: ground + DVec3::Y * settings.lift,
            fallback: false,
        },
        Err(err) => {
            tracing::error!(%err, fallback = ?settings.fallback, "no spawn surface found");
            SpawnPoint {
                position: DVec3::from_array(settings.fallback),
                fallback: true,
            }
        }
    }
}

/// Lattice points of a square spiral starting at the origin:
/// (0,0), (0,-1)... turning at each corner of the growing square.
#[derive(Debug, Default)]
struct SquareSpiral {
    x: i32,
    z: i32,
    dx: i32,
    dz: i32,
    started: bool,
}

impl Iterator for SquareSpiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            self.dz = -1;
            return Some((0, 0));
        }
        let (x, z) = (self.x, self.z);
        if x == z || (x < 0 && x == -z) || (x > 0 && x == 1 - z) {
            (self.dx, self.dz) = (-self.dz, self.dx);
        }
        self.x += self.dx;
        self.z += self.dz;
        Some((self.x, self.z))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::curve::HeightCurve;
    use crate::grid::{Grid, HeightGrid};

    #[test]
    fn test_spiral_visits_each_point_once() {
        let points: Vec<_> = SquareSpiral::default().take(25).collect();
        assert_eq!(points[0], (0, 0));
        let unique: HashSet<_> = points.iter().copied().collect();
        assert_eq!(unique.len(), 25, "spiral revisited a point: {points:?}");
        // The first 25 points cover exactly the 5x5 square around the origin.
        assert!(points.iter().all(|&(x, z)| x.abs() <= 2 && z.abs() <= 2));
    }

    #[test]
    fn test_spawn_at_center_of_high_island() {
        let grid = HeightGrid::from_grid(Grid::filled(21, 21, 0.8));
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 10.0);
        let spawn = locate_spawn(&surface, &SpawnSettings::default());
        assert!(!spawn.fallback);
        assert!((spawn.position - DVec3::new(0.0, 13.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_spawn_searches_outward() {
        // Only the column at world x = 4 (grid x = 14) is dry land.
        let grid = HeightGrid::from_grid(Grid::from_fn(21, 21, |x, _| {
            if x == 14 { 0.9 } else { 0.1 }
        }));
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 10.0);
        let settings = SpawnSettings {
            search_step: 1.0,
            ..Default::default()
        };
        let ground = find_spawn_point(&surface, &settings).unwrap();
        assert!((ground.x - 4.0).abs() < 1e-9, "found {ground:?}");
        assert!(ground.y > 3.0);
    }

    #[test]
    fn test_underwater_map_falls_back() {
        let grid = HeightGrid::from_grid(Grid::filled(9, 9, 0.1));
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 10.0);
        let settings = SpawnSettings {
            max_search_radius_steps: 6,
            ..Default::default()
        };

        assert_eq!(
            find_spawn_point(&surface, &settings),
            Err(TerrainError::MissingSpawnSurface { steps: 36 })
        );
        let spawn = locate_spawn(&surface, &settings);
        assert!(spawn.fallback);
        assert_eq!(spawn.position, DVec3::new(0.0, 50.0, 0.0));
    }
}
