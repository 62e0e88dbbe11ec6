//! The generation pipeline: height field, mesh, textures, scatter, spawn.
//!
//! Every stage is a pure function of the settings snapshot and the seed. The
//! finished [`GeneratedWorld`] is assembled only after the last stage, so an
//! abandoned run leaves nothing behind.

use std::convert::Infallible;

use isle_mesh::{MeshData, MeshError, build_terrain_mesh};
use isle_terrain::seed::{SeedStage, stage_rng};
use isle_terrain::texture::{Raster, Rgba, SplatWeights, build_color_raster, build_splat_raster};
use isle_terrain::{
    HeightField, HeightGrid, IslandSpec, ObjectScatterer, PlacementResult, SpawnPoint,
    TerrainError, TerrainSurface, locate_spawn,
};

use crate::settings::WorldSettings;

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    HeightField,
    Mesh,
    Textures,
    Scatter,
    Spawn,
}

/// Everything one generation run produced, all derived from one height grid.
#[derive(Debug)]
pub struct GeneratedWorld {
    pub seed: i32,
    /// The settings the run used.
    pub settings: WorldSettings,
    pub height_grid: HeightGrid,
    /// Islands actually placed; index 0 is the primary.
    pub islands: Vec<IslandSpec>,
    /// The mesh, or why it could not be built.
    pub mesh: Result<MeshData, MeshError>,
    pub color_raster: Raster<Rgba>,
    /// Blend weights at height grid resolution.
    pub splat_raster: Raster<SplatWeights>,
    pub placements: PlacementResult,
    pub spawn: SpawnPoint,
    /// Recoverable problems met during the run.
    pub diagnostics: Vec<TerrainError>,
}

impl GeneratedWorld {
    /// The height grid in world space, shaped like the mesh.
    pub fn surface(&self) -> TerrainSurface<'_> {
        TerrainSurface::new(
            &self.height_grid,
            &self.settings.mesh.height_curve,
            self.settings.mesh.height_multiplier,
        )
    }

    pub fn mesh(&self) -> Option<&MeshData> {
        self.mesh.as_ref().ok()
    }
}

/// Run every stage to completion.
pub fn generate_world(settings: &WorldSettings, seed: i32) -> GeneratedWorld {
    match generate_world_checked(settings, seed, |_| Ok::<(), Infallible>(())) {
        Ok(world) => world,
        Err(never) => match never {},
    }
}

/// Run the pipeline, calling `checkpoint` before each stage. The first error
/// it returns abandons the run.
pub fn generate_world_checked<E>(
    settings: &WorldSettings,
    seed: i32,
    mut checkpoint: impl FnMut(Stage) -> Result<(), E>,
) -> Result<GeneratedWorld, E> {
    let settings = settings.clone();
    tracing::info!(seed, map_size = settings.map_size, "generating world");

    checkpoint(Stage::HeightField)?;
    let field = HeightField::generate(settings.map_size, &settings.island, &settings.noise, seed);
    let grid = field.grid;

    checkpoint(Stage::Mesh)?;
    let mesh = build_terrain_mesh(
        &grid,
        settings.mesh.height_multiplier,
        &settings.mesh.height_curve,
        settings.mesh.level_of_detail,
        settings.mesh.stride_rule,
    );

    checkpoint(Stage::Textures)?;
    let size = settings.texture.texture_size(settings.map_size);
    let color_raster = build_color_raster(&grid, &settings.texture.regions, size, size);
    let splat_raster =
        build_splat_raster(&grid, &settings.texture.regions, grid.width(), grid.height());

    let surface = TerrainSurface::new(
        &grid,
        &settings.mesh.height_curve,
        settings.mesh.height_multiplier,
    );

    checkpoint(Stage::Scatter)?;
    let bounds = match &mesh {
        Ok(mesh) => mesh.bounds(),
        Err(_) => surface.bounds(),
    };
    let placements = match bounds {
        Some(bounds) => {
            let mut rng = stage_rng(seed, SeedStage::Scatter);
            ObjectScatterer::new(&settings.scatter).scatter(&surface, &bounds, &mut rng)
        }
        None => PlacementResult::default(),
    };

    checkpoint(Stage::Spawn)?;
    let spawn = locate_spawn(&surface, &settings.spawn);

    tracing::info!(
        seed,
        islands = field.islands.len(),
        placements = placements.len(),
        mesh_ok = mesh.is_ok(),
        "world generated"
    );

    Ok(GeneratedWorld {
        seed,
        height_grid: grid,
        islands: field.islands,
        mesh,
        color_raster,
        splat_raster,
        placements,
        spawn,
        diagnostics: field.diagnostics,
        settings,
    })
}
