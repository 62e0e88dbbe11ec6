//! Row-major scalar grids and the normalized height grid.

/// A dense 2D grid of `f64` values stored row-major (`index = y * width + x`).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Grid {
    /// Create a grid filled with `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    /// Create a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Overwrite the value at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.values[y * self.width + x] = value;
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns `(min, max)` over all cells, or `None` for an empty grid.
    pub fn range(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

/// The canonical output of a generation run: every cell lies in `[0, 1]`.
///
/// A `HeightGrid` is never mutated after construction; regeneration produces a
/// new one.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    grid: Grid,
}

impl HeightGrid {
    /// Wrap a grid, clamping every cell into `[0, 1]`. NaN cells become 0.
    pub fn from_grid(mut grid: Grid) -> Self {
        for v in &mut grid.values {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
        Self { grid }
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.grid.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.grid.height
    }

    /// Normalized height at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.grid.get(x, y)
    }

    /// Read-only view of the underlying grid.
    pub fn as_grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns `true` if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.grid.values.is_empty()
    }
}
