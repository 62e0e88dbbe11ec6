//! The `isle-gen` application: load configuration, generate one island and
//! export it.

pub mod error;
pub mod export;

use std::sync::Arc;

use isle_config::{CliArgs, Config, ConfigOrigin, default_config_dir};
use isle_world::{GeneratedWorld, WorldGenerator};

pub use error::AppError;
pub use export::{ExportReport, Exporter, export_world};

/// Run one generation with `args` layered over the stored configuration.
pub fn run(args: &CliArgs) -> Result<ExportReport, AppError> {
    let config_dir = match &args.config {
        Some(dir) => dir.clone(),
        None => default_config_dir().ok_or(AppError::NoConfigDir)?,
    };
    let (mut config, origin) = Config::open(&config_dir)?;
    config.apply_cli_overrides(args);

    // The config picks the log level, so its origin is reported afterwards.
    isle_log::init_logging(
        Some(&config.output.directory),
        config.debug.log_to_file,
        Some(&config),
    )?;
    log_config_origin(&origin);

    generate_and_export(&config)
}

/// Generate with `config.world` and export through a listener.
pub fn generate_and_export(config: &Config) -> Result<ExportReport, AppError> {
    let (outcome_tx, outcome_rx) = crossbeam_channel::bounded(1);
    let mut generator = WorldGenerator::new(config.world.clone());
    generator.add_listener(Exporter::new(
        config.output.directory.clone(),
        config.output.draw_mode,
        outcome_tx,
    ));

    let world = generator.generate();
    log_summary(&world);

    let report = outcome_rx
        .try_recv()
        .map_err(|_| AppError::ExportMissing)??;
    tracing::info!(
        files = report.files.len(),
        dir = %config.output.directory.display(),
        "artifacts written"
    );
    Ok(report)
}

fn log_config_origin(origin: &ConfigOrigin) {
    let path = origin.path().display();
    match origin {
        ConfigOrigin::Loaded(_) => tracing::info!(config = %path, "configuration loaded"),
        ConfigOrigin::Created(_) => tracing::info!(config = %path, "default configuration created"),
    }
}

fn log_summary(world: &Arc<GeneratedWorld>) {
    let (vertices, triangles) = world
        .mesh()
        .map_or((0, 0), |m| (m.vertex_count(), m.triangle_count()));
    tracing::info!(
        seed = world.seed,
        islands = world.islands.len(),
        vertices,
        triangles,
        "terrain ready"
    );

    let placeables = &world.settings.scatter.placeables;
    for (spec, count) in placeables
        .iter()
        .zip(world.placements.counts(placeables.len()))
    {
        tracing::info!(kind = %spec.name, count, "placements");
    }

    let spawn = world.spawn.position;
    tracing::info!(
        x = spawn.x,
        y = spawn.y,
        z = spawn.z,
        fallback = world.spawn.fallback,
        "spawn point"
    );
}

#[cfg(test)]
mod tests {
    use isle_config::DrawMode;

    use super::*;

    #[test]
    fn test_generate_and_export_with_fixed_seed() {
        let out = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.seed = Some(5);
        config.world.map_size = 33;
        config.world.island.radius = 14.0;
        config.world.texture.resolution_multiplier = 1;
        config.output.directory = out.path().to_path_buf();
        config.output.draw_mode = DrawMode::ColorMap;

        let report = generate_and_export(&config).unwrap();
        assert_eq!(report.files, vec![out.path().join(export::COLOR_PNG)]);
    }
}
