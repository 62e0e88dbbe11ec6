//! Procedural island terrain: fractal noise, island falloff masks, height field
//! orchestration, surface textures, object scattering and spawn probing.

mod curve;
mod error;
mod falloff;
mod grid;
mod height_field;
mod islands;
mod noise_field;
mod sampling;
mod scatter;
mod spawn;
mod surface;

pub mod seed;
pub mod texture;

pub use curve::{CurveKey, HeightCurve};
pub use error::TerrainError;
pub use falloff::{FalloffMask, IslandCellIndex, nearest_island_naive};
pub use grid::{Grid, HeightGrid};
pub use height_field::{HeightField, HeightFieldOutput, IslandSettings};
pub use islands::{IslandLayout, IslandSpec, SatellitePlacement, place_islands};
pub use noise_field::{CoherentNoise, NoiseField, NoiseParameters, PerlinNoise};
pub use sampling::sample_height;
pub use scatter::{
    ObjectScatterer, PlaceableSpec, Placement, PlacementResult, ScatterLayer, ScatterSettings,
};
pub use spawn::{SpawnPoint, SpawnSettings, find_spawn_point, locate_spawn};
pub use surface::{Bounds3, TerrainSurface};
