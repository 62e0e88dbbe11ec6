//! Bilinear height lookup shared by texture building, scattering and spawn probing.

use crate::grid::HeightGrid;

/// Sample the height grid at normalized coordinates `u, v` in `[0, 1]`.
///
/// Maps to continuous grid coordinates `x = u * (w - 1)`, `y = v * (h - 1)`,
/// then interpolates the four surrounding cells along x and then along y.
/// Exact at grid points. Inputs outside `[0, 1]` are clamped; an empty grid
/// samples as 0.
pub fn sample_height(grid: &HeightGrid, u: f64, v: f64) -> f64 {
    let (w, h) = (grid.width(), grid.height());
    if w == 0 || h == 0 {
        return 0.0;
    }
    let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
    let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };

    let x = snap(u * (w - 1) as f64);
    let y = snap(v * (h - 1) as f64);
    let x0 = (x.floor() as usize).min(w - 1);
    let y0 = (y.floor() as usize).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = x - x0 as f64;
    let ty = y - y0 as f64;

    let a = lerp(grid.get(x0, y0), grid.get(x1, y0), tx);
    let b = lerp(grid.get(x0, y1), grid.get(x1, y1), tx);
    lerp(a, b, ty)
}

/// Round coordinates within float noise of a grid line onto it, so that
/// `x0 / (w - 1)` maps back to exactly `x0`.
#[inline]
fn snap(c: f64) -> f64 {
    let r = c.round();
    if (c - r).abs() < 1e-9 { r } else { c }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
