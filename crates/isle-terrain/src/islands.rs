//! Island center placement: the primary at the grid center plus satellites at
//! fixed compass bearings or at random, separation-checked positions.

use std::f64::consts::{FRAC_1_SQRT_2, TAU};

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// Unit directions in grid space (y grows southward): N, E, S, W, NE, SE, SW, NW.
const COMPASS: [DVec2; 8] = [
    DVec2::new(0.0, -1.0),
    DVec2::new(1.0, 0.0),
    DVec2::new(0.0, 1.0),
    DVec2::new(-1.0, 0.0),
    DVec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    DVec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    DVec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    DVec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// One island: where it sits, how far it reaches and how sharp its shore is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IslandSpec {
    /// Center in grid coordinates.
    pub center: DVec2,
    /// Radius in cells at which the falloff reaches 1.
    pub radius: f64,
    /// Exponent controlling edge sharpness.
    pub falloff_power: f64,
}

/// How satellite islands are positioned around the primary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SatellitePlacement {
    /// Satellites at the compass bearings N, E, S, W, NE, SE, SW, NW, in that
    /// order, at `distance` cells from the primary. Every further eight start
    /// a new ring one `distance` farther out.
    FixedAngles {
        /// Distance from the primary center in cells.
        distance: f64,
    },
    /// Satellites at random bearings and distances, rejected when closer than
    /// `min_separation` to an already placed island.
    Randomized {
        /// Minimum distance from the primary center.
        min_spawn_radius: f64,
        /// Maximum distance from the primary center.
        max_spawn_radius: f64,
        /// Minimum distance between any two island centers.
        min_separation: f64,
        /// Attempts per satellite before it is dropped.
        max_attempts: u32,
    },
}

impl Default for SatellitePlacement {
    fn default() -> Self {
        Self::Randomized {
            min_spawn_radius: 70.0,
            max_spawn_radius: 115.0,
            min_separation: 60.0,
            max_attempts: 30,
        }
    }
}

/// Placed island centers; index 0 is always the primary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IslandLayout {
    /// Centers in grid coordinates.
    pub centers: Vec<DVec2>,
    /// Satellites that could not be placed.
    pub failures: Vec<TerrainError>,
}

/// Place `count` islands (primary included) on a `map_size` square grid.
///
/// A `count` of zero still places the primary.
pub fn place_islands(
    map_size: usize,
    count: usize,
    placement: &SatellitePlacement,
    rng: &mut impl Rng,
) -> IslandLayout {
    let primary = grid_center(map_size);
    let mut layout = IslandLayout {
        centers: vec![primary],
        failures: Vec::new(),
    };
    let satellites = count.saturating_sub(1);

    match *placement {
        SatellitePlacement::FixedAngles { distance } => {
            for i in 0..satellites {
                let ring = (i / COMPASS.len()) as f64;
                let dir = COMPASS[i % COMPASS.len()];
                layout.centers.push(primary + dir * distance * (1.0 + ring));
            }
        }
        SatellitePlacement::Randomized {
            min_spawn_radius,
            max_spawn_radius,
            min_separation,
            max_attempts,
        } => {
            let lo = min_spawn_radius.min(max_spawn_radius).max(0.0);
            let hi = min_spawn_radius.max(max_spawn_radius).max(0.0);
            let limit = map_size.saturating_sub(1) as f64;

            for i in 0..satellites {
                let index = layout.centers.len();
                let mut placed = None;

                for _ in 0..max_attempts {
                    let angle = rng.random_range(0.0..TAU);
                    let distance = rng.random_range(lo..=hi);
                    let candidate = primary + DVec2::from_angle(angle) * distance;

                    let inside = (0.0..=limit).contains(&candidate.x)
                        && (0.0..=limit).contains(&candidate.y);
                    let separated = layout
                        .centers
                        .iter()
                        .all(|c| c.distance(candidate) >= min_separation);

                    if inside && separated {
                        placed = Some(candidate);
                        break;
                    }
                }

                match placed {
                    Some(center) => layout.centers.push(center),
                    None => {
                        tracing::warn!(
                            satellite = i,
                            index,
                            attempts = max_attempts,
                            "satellite island placement failed; continuing with fewer islands"
                        );
                        layout.failures.push(TerrainError::IslandPlacementFailure {
                            index,
                            attempts: max_attempts,
                        });
                    }
                }
            }
        }
    }

    layout
}

/// The exact center of a `size x size` grid: `((size-1)/2, (size-1)/2)`.
pub(crate) fn grid_center(size: usize) -> DVec2 {
    let c = size.saturating_sub(1) as f64 / 2.0;
    DVec2::new(c, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{SeedStage, stage_rng};

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_primary_at_exact_center() {
        let mut rng = stage_rng(1, SeedStage::IslandPlacement);
        let layout = place_islands(257, 1, &SatellitePlacement::default(), &mut rng);
        assert_eq!(layout.centers, vec![DVec2::new(128.0, 128.0)]);
        assert!(layout.failures.is_empty());
    }

    #[test]
    fn test_zero_count_still_places_primary() {
        let mut rng = stage_rng(1, SeedStage::IslandPlacement);
        let layout = place_islands(65, 0, &SatellitePlacement::default(), &mut rng);
        assert_eq!(layout.centers.len(), 1);
    }

    #[test]
    fn test_fixed_angles_compass_order() {
        let mut rng = stage_rng(1, SeedStage::IslandPlacement);
        let placement = SatellitePlacement::FixedAngles { distance: 50.0 };
        let layout = place_islands(201, 5, &placement, &mut rng);
        let c = DVec2::new(100.0, 100.0);
        let expected = [
            c,
            c + DVec2::new(0.0, -50.0),
            c + DVec2::new(50.0, 0.0),
            c + DVec2::new(0.0, 50.0),
            c + DVec2::new(-50.0, 0.0),
        ];
        for (got, want) in layout.centers.iter().zip(expected.iter()) {
            assert!(got.distance(*want) < EPSILON, "{got:?} != {want:?}");
        }
    }

    #[test]
    fn test_fixed_angles_second_ring() {
        let mut rng = stage_rng(1, SeedStage::IslandPlacement);
        let placement = SatellitePlacement::FixedAngles { distance: 10.0 };
        let layout = place_islands(101, 10, &placement, &mut rng);
        assert_eq!(layout.centers.len(), 10);
        let primary = layout.centers[0];
        assert!((layout.centers[9].distance(primary) - 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_randomized_respects_separation_and_radius() {
        let mut rng = stage_rng(5, SeedStage::IslandPlacement);
        let placement = SatellitePlacement::Randomized {
            min_spawn_radius: 60.0,
            max_spawn_radius: 100.0,
            min_separation: 40.0,
            max_attempts: 50,
        };
        let layout = place_islands(257, 5, &placement, &mut rng);
        let primary = layout.centers[0];

        for (i, a) in layout.centers.iter().enumerate() {
            if i > 0 {
                let d = a.distance(primary);
                assert!((60.0 - EPSILON..=100.0 + EPSILON).contains(&d), "distance {d}");
            }
            for b in &layout.centers[i + 1..] {
                assert!(a.distance(*b) >= 40.0, "islands too close: {a:?} {b:?}");
            }
        }
        assert_eq!(layout.centers.len() + layout.failures.len(), 5);
    }

    #[test]
    fn test_impossible_separation_degrades_gracefully() {
        let mut rng = stage_rng(5, SeedStage::IslandPlacement);
        let placement = SatellitePlacement::Randomized {
            min_spawn_radius: 10.0,
            max_spawn_radius: 20.0,
            min_separation: 1000.0,
            max_attempts: 8,
        };
        let layout = place_islands(101, 4, &placement, &mut rng);
        assert_eq!(layout.centers.len(), 1);
        assert_eq!(layout.failures.len(), 3);
        assert_eq!(
            layout.failures[0],
            TerrainError::IslandPlacementFailure {
                index: 1,
                attempts: 8
            }
        );
    }

    #[test]
    fn test_randomized_deterministic_per_seed() {
        let placement = SatellitePlacement::default();
        let a = place_islands(257, 4, &placement, &mut stage_rng(77, SeedStage::IslandPlacement));
        let b = place_islands(257, 4, &placement, &mut stage_rng(77, SeedStage::IslandPlacement));
        assert_eq!(a, b);
    }
}
