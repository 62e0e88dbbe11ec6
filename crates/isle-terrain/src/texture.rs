//! Surface textures derived from a height grid: region-colored rasters,
//! four-channel splat weights and a grayscale height preview.
//!
//! Output is a plain pixel buffer ([`Raster`]); uploading it to a GPU texture
//! or writing it to disk is left to the caller.

mod builders;
mod raster;

pub use builders::{
    SPLAT_CHANNELS, SplatWeights, TerrainRegion, build_color_raster, build_height_raster,
    build_splat_raster, inverse_lerp,
};
pub use raster::{Raster, Rgba};
