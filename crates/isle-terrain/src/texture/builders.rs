//! Raster builders that color a height grid by elevation band.

use serde::{Deserialize, Serialize};

use super::raster::{Raster, Rgba};
use crate::grid::HeightGrid;
use crate::sampling::sample_height;

/// Number of weight channels in a splat raster.
pub const SPLAT_CHANNELS: usize = 4;

/// One elevation band of the surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainRegion {
    pub name: String,
    /// Upper bound of the band in normalized height.
    pub height: f64,
    pub color: Rgba,
    /// Optional texture the display layer binds to this band's splat channel.
    pub texture: Option<String>,
    /// Half-width of the cross-fade into the next band.
    pub blend_range: f64,
}

impl TerrainRegion {
    pub fn new(name: impl Into<String>, height: f64, color: Rgba) -> Self {
        Self {
            name: name.into(),
            height,
            color,
            texture: None,
            blend_range: 0.0,
        }
    }

    pub fn with_blend_range(mut self, blend_range: f64) -> Self {
        self.blend_range = blend_range;
        self
    }
}

impl Default for TerrainRegion {
    fn default() -> Self {
        Self::new("region", 1.0, Rgba::WHITE)
    }
}

/// Per-pixel blend weights, one channel per region.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SplatWeights(pub [f32; SPLAT_CHANNELS]);

impl SplatWeights {
    /// Quantize to 8-bit RGBA, one channel per weight.
    pub fn to_rgba(self) -> Rgba {
        Rgba(self.0.map(|w| (w.clamp(0.0, 1.0) * 255.0).round() as u8))
    }

    pub fn sum(self) -> f32 {
        self.0.iter().sum()
    }
}

impl Raster<SplatWeights> {
    /// Pack the weights into an RGBA raster (region 0 in red).
    pub fn to_rgba(&self) -> Raster<Rgba> {
        Raster::from_fn(self.width(), self.height(), |x, y| self.get(x, y).to_rgba())
    }
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`; 0 when the
/// bounds coincide.
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Color each pixel of a `width x height` raster with the first region whose
/// threshold is at or above the bilinearly sampled height.
///
/// Heights above every threshold take the last region's color; with no
/// regions every pixel is transparent.
pub fn build_color_raster(
    grid: &HeightGrid,
    regions: &[TerrainRegion],
    width: usize,
    height: usize,
) -> Raster<Rgba> {
    let Some(last) = regions.last() else {
        return Raster::new(width, height, Rgba::TRANSPARENT);
    };

    Raster::from_fn(width, height, |x, y| {
        let h = sample_height(grid, pixel_coord(x, width), pixel_coord(y, height));
        regions
            .iter()
            .find(|region| h <= region.height)
            .unwrap_or(last)
            .color
    })
}

/// Blend weights for up to [`SPLAT_CHANNELS`] regions.
///
/// Every pixel defaults to full weight on the last region. The first region
/// whose `height + blend_range` reaches the sampled height cross-fades into
/// the next one across `height ± blend_range`; at most two channels are ever
/// non-zero.
pub fn build_splat_raster(
    grid: &HeightGrid,
    regions: &[TerrainRegion],
    width: usize,
    height: usize,
) -> Raster<SplatWeights> {
    if regions.len() > SPLAT_CHANNELS {
        tracing::warn!(
            regions = regions.len(),
            channels = SPLAT_CHANNELS,
            "splat raster only blends the first regions; extra regions ignored"
        );
    }
    let regions = &regions[..regions.len().min(SPLAT_CHANNELS)];
    let Some(last) = regions.len().checked_sub(1) else {
        return Raster::new(width, height, SplatWeights::default());
    };

    Raster::from_fn(width, height, |x, y| {
        let h = sample_height(grid, pixel_coord(x, width), pixel_coord(y, height));
        splat_weights(regions, last, h)
    })
}

fn splat_weights(regions: &[TerrainRegion], last: usize, h: f64) -> SplatWeights {
    let mut weights = [0.0f32; SPLAT_CHANNELS];
    weights[last] = 1.0;

    for (i, region) in regions.iter().enumerate() {
        let blend = region.blend_range.max(0.0);
        if region.height + blend >= h {
            weights = [0.0; SPLAT_CHANNELS];
            if i == last {
                weights[i] = 1.0;
            } else {
                let t = inverse_lerp(region.height - blend, region.height + blend, h) as f32;
                weights[i] = 1.0 - t;
                weights[i + 1] = t;
            }
            break;
        }
    }

    SplatWeights(weights)
}

/// Grayscale preview of the grid at its own resolution, black at 0 and white
/// at 1.
pub fn build_height_raster(grid: &HeightGrid) -> Raster<Rgba> {
    Raster::from_fn(grid.width(), grid.height(), |x, y| {
        Rgba::BLACK.lerp(Rgba::WHITE, grid.get(x, y))
    })
}

/// Normalized coordinate of pixel `i` in a dimension of `len` pixels.
fn pixel_coord(i: usize, len: usize) -> f64 {
    if len <= 1 {
        0.0
    } else {
        i as f64 / (len - 1) as f64
    }
}
