//! Radial falloff masks that carve island shapes out of raw noise.
//!
//! The multi-island mask uses a coarse cell index as a broad phase: each cell
//! lists the islands that could possibly be nearest to any pixel inside it,
//! and the per-pixel search only visits that list.

use std::f64::consts::SQRT_2;

use glam::DVec2;

use crate::grid::Grid;
use crate::islands::grid_center;

/// Falloff mask synthesis.
pub struct FalloffMask;

impl FalloffMask {
    /// Radial mask for a single island centered on the grid: 0 at the center,
    /// rising to 1 at `radius` and beyond.
    pub fn single_island(size: usize, radius: f64, power: f64) -> Grid {
        let center = grid_center(size);
        Grid::from_fn(size, size, |x, y| {
            let distance = DVec2::new(x as f64, y as f64).distance(center);
            falloff_value(distance, radius, power)
        })
    }

    /// Mask for several islands. Each pixel uses the distance to its nearest
    /// center; island 0 is the primary and uses `base_radius * primary_multiplier`,
    /// all others use `base_radius`.
    pub fn multi_island(
        size: usize,
        centers: &[DVec2],
        base_radius: f64,
        primary_multiplier: f64,
        power: f64,
    ) -> Grid {
        if centers.is_empty() {
            return Grid::filled(size, size, 1.0);
        }

        let primary_radius = base_radius * primary_multiplier;
        let max_radius = primary_radius.max(base_radius);
        let index = IslandCellIndex::build(size, centers, max_radius);

        Grid::from_fn(size, size, |x, y| {
            let pos = DVec2::new(x as f64, y as f64);
            let mut min_distance = f64::MAX;
            let mut closest = 0;

            for &i in index.candidates_at(x, y) {
                let d = pos.distance(centers[i]);
                if d < min_distance {
                    min_distance = d;
                    closest = i;
                }
            }

            let radius = if closest == 0 {
                primary_radius
            } else {
                base_radius
            };
            falloff_value(min_distance, radius, power)
        })
    }

    /// Reference implementation of [`FalloffMask::multi_island`] that searches
    /// every island for every pixel.
    pub fn multi_island_naive(
        size: usize,
        centers: &[DVec2],
        base_radius: f64,
        primary_multiplier: f64,
        power: f64,
    ) -> Grid {
        if centers.is_empty() {
            return Grid::filled(size, size, 1.0);
        }
        let primary_radius = base_radius * primary_multiplier;

        Grid::from_fn(size, size, |x, y| {
            let pos = DVec2::new(x as f64, y as f64);
            match nearest_island_naive(pos, centers) {
                Some((0, d)) => falloff_value(d, primary_radius, power),
                Some((_, d)) => falloff_value(d, base_radius, power),
                None => 1.0,
            }
        })
    }
}

/// `clamp01((distance / radius) ^ power)`.
#[inline]
pub(crate) fn falloff_value(distance: f64, radius: f64, power: f64) -> f64 {
    let ratio = distance / radius.max(f64::EPSILON);
    let value = ratio.powf(power);
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Index and distance of the nearest center, searching all of them.
pub fn nearest_island_naive(point: DVec2, centers: &[DVec2]) -> Option<(usize, f64)> {
    centers
        .iter()
        .enumerate()
        .map(|(i, c)| (i, point.distance(*c)))
        .fold(None, |best, (i, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((i, d)),
        })
}

/// Broad-phase culling structure for the multi-island mask.
///
/// Partitions the grid into square cells and keeps, per cell, every island
/// whose center lies within half the cell diagonal plus the largest island
/// radius of the cell center. The lists are conservative: they may contain
/// islands that are never nearest, but an island that can influence a pixel
/// (falloff below 1) is never left out.
#[derive(Clone, Debug)]
pub struct IslandCellIndex {
    cell_size: usize,
    cells_per_side: usize,
    candidates: Vec<Vec<usize>>,
}

impl IslandCellIndex {
    /// Build the index for a `size x size` grid.
    pub fn build(size: usize, centers: &[DVec2], max_radius: f64) -> Self {
        let cell_size = (max_radius.max(0.0).ceil() as usize) + 1;
        let cells_per_side = size.div_ceil(cell_size).max(1);
        let threshold = SQRT_2 * cell_size as f64 / 2.0 + max_radius;

        let mut candidates = Vec::with_capacity(cells_per_side * cells_per_side);
        for cy in 0..cells_per_side {
            for cx in 0..cells_per_side {
                let cell_center = DVec2::new(
                    (cx as f64 + 0.5) * cell_size as f64,
                    (cy as f64 + 0.5) * cell_size as f64,
                );
                let list = centers
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.distance(cell_center) < threshold)
                    .map(|(i, _)| i)
                    .collect();
                candidates.push(list);
            }
        }

        Self {
            cell_size,
            cells_per_side,
            candidates,
        }
    }

    /// Side length of one cell in grid units.
    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    /// Number of cells along each axis.
    pub fn cells_per_side(&self) -> usize {
        self.cells_per_side
    }

    /// Candidate island indices for the cell containing pixel `(x, y)`.
    pub fn candidates_at(&self, x: usize, y: usize) -> &[usize] {
        let last = self.cells_per_side - 1;
        let cx = (x / self.cell_size).min(last);
        let cy = (y / self.cell_size).min(last);
        &self.candidates[cy * self.cells_per_side + cx]
    }
}
