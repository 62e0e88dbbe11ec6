//! World-space view of a height grid, laid out exactly like the terrain mesh.

use glam::{DVec2, DVec3};

use crate::curve::HeightCurve;
use crate::grid::HeightGrid;
use crate::sampling::sample_height;

/// Axis-aligned world-space box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3 {
    /// Corner with the smallest coordinate on every axis.
    pub min: DVec3,
    /// Corner with the largest coordinate on every axis.
    pub max: DVec3,
}

impl Bounds3 {
    /// Box spanning two opposite corners, given in any order.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    /// Whether `(x, z)` lies inside the box's horizontal footprint.
    pub fn contains_xz(&self, x: f64, z: f64) -> bool {
        (self.min.x..=self.max.x).contains(&x) && (self.min.z..=self.max.z).contains(&z)
    }
}

/// A height grid placed in world space.
///
/// Grid cell `(gx, gy)` sits at world `x = gx - (w-1)/2`, `z = (h-1)/2 - gy`,
/// one world unit per cell, so the grid is centered on the origin with grid
/// row 0 at the far (+z) edge.
#[derive(Clone, Copy, Debug)]
pub struct TerrainSurface<'a> {
    grid: &'a HeightGrid,
    curve: &'a HeightCurve,
    height_multiplier: f64,
}

impl<'a> TerrainSurface<'a> {
    pub fn new(grid: &'a HeightGrid, curve: &'a HeightCurve, height_multiplier: f64) -> Self {
        Self {
            grid,
            curve,
            height_multiplier,
        }
    }

    pub fn grid(&self) -> &'a HeightGrid {
        self.grid
    }

    pub fn curve(&self) -> &'a HeightCurve {
        self.curve
    }

    pub fn height_multiplier(&self) -> f64 {
        self.height_multiplier
    }

    /// Half the world extent along x and z.
    pub fn half_extent(&self) -> DVec2 {
        DVec2::new(
            self.grid.width().saturating_sub(1) as f64 / 2.0,
            self.grid.height().saturating_sub(1) as f64 / 2.0,
        )
    }

    /// Map a world position onto normalized grid coordinates, or `None` when
    /// it falls outside the surface.
    pub fn world_to_uv(&self, x: f64, z: f64) -> Option<DVec2> {
        if self.grid.is_empty() || !x.is_finite() || !z.is_finite() {
            return None;
        }
        let half = self.half_extent();
        let gx = x + half.x;
        let gy = half.y - z;
        let u = normalize_axis(gx, half.x * 2.0)?;
        let v = normalize_axis(gy, half.y * 2.0)?;
        Some(DVec2::new(u, v))
    }

    /// Normalized height at a world position.
    pub fn normalized_height(&self, x: f64, z: f64) -> Option<f64> {
        let uv = self.world_to_uv(x, z)?;
        Some(sample_height(self.grid, uv.x, uv.y))
    }

    /// World elevation (`curve(h) * multiplier`) at a world position.
    pub fn elevation(&self, x: f64, z: f64) -> Option<f64> {
        self.normalized_height(x, z).map(|h| self.remap(h))
    }

    /// Remap a normalized height to world elevation.
    pub fn remap(&self, normalized: f64) -> f64 {
        self.curve.evaluate(normalized) * self.height_multiplier
    }

    /// Upward unit normal from central differences of world elevation, one
    /// cell either side, clamped at the edges.
    pub fn normal(&self, x: f64, z: f64) -> Option<DVec3> {
        self.world_to_uv(x, z)?;
        let half = self.half_extent();
        let clamp_x = |v: f64| v.clamp(-half.x, half.x);
        let clamp_z = |v: f64| v.clamp(-half.y, half.y);

        let (x0, x1) = (clamp_x(x - 1.0), clamp_x(x + 1.0));
        let (z0, z1) = (clamp_z(z - 1.0), clamp_z(z + 1.0));

        let dx = if x1 > x0 {
            (self.elevation(x1, z)? - self.elevation(x0, z)?) / (x1 - x0)
        } else {
            0.0
        };
        let dz = if z1 > z0 {
            (self.elevation(x, z1)? - self.elevation(x, z0)?) / (z1 - z0)
        } else {
            0.0
        };

        Some(DVec3::new(-dx, 1.0, -dz).normalize())
    }

    /// World-space box spanned by the surface, or `None` for an empty grid.
    pub fn bounds(&self) -> Option<Bounds3> {
        if self.grid.is_empty() {
            return None;
        }
        let (lo, hi) = self
            .grid
            .as_grid()
            .values()
            .iter()
            .map(|&h| self.remap(h))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
                (lo.min(e), hi.max(e))
            });
        let half = self.half_extent();
        Some(Bounds3::new(
            DVec3::new(-half.x, lo, -half.y),
            DVec3::new(half.x, hi, half.y),
        ))
    }
}

/// `coord / span` when `coord` lies in `[0, span]`; a zero span only admits 0.
fn normalize_axis(coord: f64, span: f64) -> Option<f64> {
    const SLACK: f64 = 1e-9;
    if coord < -SLACK || coord > span + SLACK {
        return None;
    }
    if span <= 0.0 {
        return Some(0.0);
    }
    Some((coord / span).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    const EPSILON: f64 = 1e-9;

    fn ramp_x(size: usize) -> HeightGrid {
        HeightGrid::from_grid(Grid::from_fn(size, size, |x, _| {
            x as f64 / (size - 1) as f64
        }))
    }

    #[test]
    fn test_world_layout_matches_mesh() {
        let grid = HeightGrid::from_grid(Grid::from_fn(5, 5, |x, y| (x + 5 * y) as f64 / 24.0));
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 1.0);

        // Grid (0, 0) is at world (-2, +2).
        let h = surface.normalized_height(-2.0, 2.0).unwrap();
        assert!((h - grid.get(0, 0)).abs() < EPSILON);
        // Grid (4, 4) is at world (+2, -2).
        let h = surface.normalized_height(2.0, -2.0).unwrap();
        assert!((h - grid.get(4, 4)).abs() < EPSILON);
        // Grid (3, 1) is at world (1, 1).
        let h = surface.normalized_height(1.0, 1.0).unwrap();
        assert!((h - grid.get(3, 1)).abs() < EPSILON);
    }

    #[test]
    fn test_outside_is_none() {
        let grid = ramp_x(5);
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 1.0);
        assert!(surface.elevation(2.5, 0.0).is_none());
        assert!(surface.elevation(0.0, -2.01).is_none());
        assert!(surface.elevation(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_elevation_applies_curve_and_multiplier() {
        let grid = HeightGrid::from_grid(Grid::filled(3, 3, 0.5));
        let curve = HeightCurve::new([
            crate::curve::CurveKey::new(0.0, 0.0),
            crate::curve::CurveKey::new(1.0, 0.5),
        ]);
        let surface = TerrainSurface::new(&grid, &curve, 10.0);
        let e = surface.elevation(0.0, 0.0).unwrap();
        assert!((e - 2.5).abs() < EPSILON, "elevation was {e}");
    }

    #[test]
    fn test_flat_normal_points_up() {
        let grid = HeightGrid::from_grid(Grid::filled(5, 5, 0.4));
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 20.0);
        let n = surface.normal(0.3, -0.7).unwrap();
        assert!((n - DVec3::Y).length() < EPSILON, "normal was {n:?}");
    }

    #[test]
    fn test_slope_normal_leans_downhill() {
        // Height rises with +x, so the normal leans toward -x.
        let grid = ramp_x(9);
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 8.0);
        let n = surface.normal(0.0, 0.0).unwrap();
        assert!(n.x < 0.0, "normal was {n:?}");
        assert!(n.z.abs() < EPSILON);
        assert!((n.length() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_bounds() {
        let grid = ramp_x(5);
        let curve = HeightCurve::linear();
        let surface = TerrainSurface::new(&grid, &curve, 10.0);
        let b = surface.bounds().unwrap();
        assert_eq!(b.min, DVec3::new(-2.0, 0.0, -2.0));
        assert_eq!(b.max, DVec3::new(2.0, 10.0, 2.0));
        assert!(b.contains_xz(0.0, 0.0));
        assert!(!b.contains_xz(3.0, 0.0));
    }

    #[test]
    fn test_bounds_from_points() {
        assert!(Bounds3::from_points(std::iter::empty()).is_none());
        let b = Bounds3::from_points([DVec3::new(1.0, -2.0, 3.0), DVec3::new(-1.0, 2.0, 0.0)])
            .unwrap();
        assert_eq!(b.min, DVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(Bounds3::new(b.max, b.min), b);
    }
}
