//! Multi-octave fractal noise grids.
//!
//! Layers octaves of coherent 2D noise, each with its own seeded phase offset,
//! and normalizes the sum into `[0, 1]` against the theoretical amplitude sum.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::seed::seeded_rng;

/// Default share of the theoretical amplitude range mapped onto `[0, 1]`.
pub const DEFAULT_NORMALIZATION: f64 = 1.75;

/// Smallest scale accepted; smaller or non-positive scales are raised to this.
pub const MIN_SCALE: f64 = 0.0001;

/// Octave phase offsets are drawn from `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)`.
pub const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Configuration for fractal noise synthesis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Seed for octave phase offsets and the noise basis.
    pub seed: i32,
    /// Spatial scale in cells. Larger values zoom in (broader features).
    pub scale: f64,
    /// Number of octaves to accumulate. Negative counts are treated as zero.
    pub octaves: i32,
    /// Amplitude multiplier between successive octaves, in `[0, 1]`.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Pan applied to every octave's sample position.
    pub offset: [f64; 2],
    /// Divisor applied to the theoretical amplitude sum before normalization.
    /// Higher values use less of the theoretical range and brighten the field.
    pub normalization: f64,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
            normalization: DEFAULT_NORMALIZATION,
        }
    }
}

impl NoiseParameters {
    /// Returns a copy with degenerate values clamped to safe ones.
    pub fn sanitized(&self) -> Self {
        let scale = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            MIN_SCALE
        };
        let normalization = if self.normalization.is_finite() && self.normalization > 0.0 {
            self.normalization
        } else {
            DEFAULT_NORMALIZATION
        };
        let persistence = if self.persistence.is_nan() {
            0.0
        } else {
            self.persistence.clamp(0.0, 1.0)
        };
        Self {
            seed: self.seed,
            scale,
            octaves: self.octaves.max(0),
            persistence,
            lacunarity: self.lacunarity,
            offset: self.offset,
            normalization,
        }
    }

    /// Theoretical maximum of the accumulated amplitude: `sum(persistence^i)`.
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves.max(0) {
            sum += amplitude;
            amplitude *= self.persistence;
        }
        sum
    }
}

/// A deterministic 2D coherent noise basis returning values in `[0, 1]`.
pub trait CoherentNoise {
    /// Sample the noise at a continuous position.
    fn sample(&self, x: f64, y: f64) -> f64;
}

/// Classic Perlin gradient noise, remapped from `[-1, 1]` to `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    /// Create a Perlin basis with the given permutation seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl CoherentNoise for PerlinNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        (self.perlin.get([x, y]) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Fractal noise grid synthesis.
pub struct NoiseField;

impl NoiseField {
    /// Generate a `width x height` fractal noise grid normalized into `[0, 1]`
    /// using the Perlin basis seeded from `params.seed`.
    pub fn generate(width: usize, height: usize, params: &NoiseParameters) -> Grid {
        let basis = PerlinNoise::new(params.seed as u32);
        Self::generate_with(&basis, width, height, params)
    }

    /// Generate a fractal noise grid over an arbitrary basis.
    pub fn generate_with<N: CoherentNoise + ?Sized>(
        basis: &N,
        width: usize,
        height: usize,
        params: &NoiseParameters,
    ) -> Grid {
        let params = params.sanitized();
        let octave_offsets = Self::octave_offsets(&params);
        let max_amplitude = params.max_amplitude();

        if max_amplitude <= 0.0 {
            // The normalization denominator is zero; the field saturates.
            return Grid::filled(width, height, 1.0);
        }

        let half_width = width as f64 / 2.0;
        let half_height = height as f64 / 2.0;
        let inv_scale = 1.0 / params.scale;
        let denominator = 2.0 * max_amplitude / params.normalization;

        Grid::from_fn(width, height, |x, y| {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut total = 0.0;

            for offset in &octave_offsets {
                let sx = (x as f64 - half_width) * inv_scale * frequency + offset[0];
                let sy = (y as f64 - half_height) * inv_scale * frequency + offset[1];
                let value = basis.sample(sx, sy) * 2.0 - 1.0;
                total += value * amplitude;

                amplitude *= params.persistence;
                frequency *= params.lacunarity;
            }

            ((total + 1.0) / denominator).clamp(0.0, 1.0)
        })
    }

    /// Per-octave phase offsets drawn from a generator seeded with `params.seed`,
    /// each shifted by `params.offset`.
    pub fn octave_offsets(params: &NoiseParameters) -> Vec<[f64; 2]> {
        let mut rng = seeded_rng(params.seed);
        (0..params.octaves.max(0))
            .map(|_| {
                let ox = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
                let oy = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
                [ox + params.offset[0], oy + params.offset[1]]
            })
            .collect()
    }
}
