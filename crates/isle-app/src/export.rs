//! Writing a generated world to disk.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Sender;
use isle_config::DrawMode;
use isle_mesh::{write_obj, write_packed_mesh};
use isle_terrain::texture::{Raster, Rgba, build_height_raster};
use isle_world::{GeneratedWorld, GenerationListener};
use serde::Serialize;

use crate::error::AppError;

pub const HEIGHT_PNG: &str = "height.png";
pub const COLOR_PNG: &str = "color.png";
pub const SPLAT_PNG: &str = "splat.png";
pub const MESH_OBJ: &str = "terrain.obj";
pub const MESH_BIN: &str = "terrain.mesh";
pub const PLACEMENTS_RON: &str = "placements.ron";

/// Files written by one export.
#[derive(Debug, Default, PartialEq)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
}

/// Write the artifacts `mode` asks for into `dir`.
pub fn export_world(
    world: &GeneratedWorld,
    dir: &Path,
    mode: DrawMode,
) -> Result<ExportReport, AppError> {
    std::fs::create_dir_all(dir).map_err(|source| AppError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut report = ExportReport::default();

    match mode {
        DrawMode::NoiseMap => {
            let path = dir.join(HEIGHT_PNG);
            write_png(&build_height_raster(&world.height_grid), &path)?;
            report.files.push(path);
        }
        DrawMode::ColorMap => {
            let path = dir.join(COLOR_PNG);
            write_png(&world.color_raster, &path)?;
            report.files.push(path);
        }
        DrawMode::Mesh => {
            let path = dir.join(COLOR_PNG);
            write_png(&world.color_raster, &path)?;
            report.files.push(path);

            let path = dir.join(SPLAT_PNG);
            write_png(&world.splat_raster.to_rgba(), &path)?;
            report.files.push(path);

            match &world.mesh {
                Ok(mesh) => {
                    let path = dir.join(MESH_OBJ);
                    let file = create(&path)?;
                    write_obj(mesh, BufWriter::new(file))
                        .map_err(|source| AppError::Io {
                            path: path.clone(),
                            source,
                        })?;
                    report.files.push(path);

                    let path = dir.join(MESH_BIN);
                    let file = create(&path)?;
                    write_packed_mesh(mesh, BufWriter::new(file))
                        .map_err(|source| AppError::Io {
                            path: path.clone(),
                            source,
                        })?;
                    report.files.push(path);
                }
                Err(err) => tracing::warn!(%err, "mesh unavailable; mesh export skipped"),
            }

            let path = dir.join(PLACEMENTS_RON);
            write_placements(world, &path)?;
            report.files.push(path);
        }
    }

    tracing::debug!(files = report.files.len(), dir = %dir.display(), "world exported");
    Ok(report)
}

/// Encode an RGBA raster as PNG.
pub fn write_png(raster: &Raster<Rgba>, path: &Path) -> Result<(), AppError> {
    let (width, height) = raster.dimensions();
    let too_big = || AppError::RasterSize { width, height };
    let w = u32::try_from(width).map_err(|_| too_big())?;
    let h = u32::try_from(height).map_err(|_| too_big())?;
    let image = image::RgbaImage::from_raw(w, h, raster.to_rgba_bytes()).ok_or_else(too_big)?;
    image.save(path)?;
    Ok(())
}

#[derive(Serialize)]
struct PlacementFile<'a> {
    seed: i32,
    spawn: [f64; 3],
    placements: Vec<PlacementRecord<'a>>,
}

#[derive(Serialize)]
struct PlacementRecord<'a> {
    kind: &'a str,
    position: [f64; 3],
    /// Quaternion `[x, y, z, w]`.
    rotation: [f64; 4],
}

fn write_placements(world: &GeneratedWorld, path: &Path) -> Result<(), AppError> {
    let kinds = &world.settings.scatter.placeables;
    let file = PlacementFile {
        seed: world.seed,
        spawn: world.spawn.position.to_array(),
        placements: world
            .placements
            .placements
            .iter()
            .map(|p| PlacementRecord {
                kind: kinds.get(p.placeable).map_or("", |k| k.name.as_str()),
                position: p.position.to_array(),
                rotation: p.rotation.to_array(),
            })
            .collect(),
    };
    let text = ron::ser::to_string_pretty(&file, ron::ser::PrettyConfig::new().depth_limit(2))?;
    std::fs::write(path, text).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Listener that exports each finished world and reports the outcome over a
/// channel.
pub struct Exporter {
    dir: PathBuf,
    mode: DrawMode,
    outcomes: Sender<Result<ExportReport, AppError>>,
}

impl Exporter {
    pub fn new(
        dir: PathBuf,
        mode: DrawMode,
        outcomes: Sender<Result<ExportReport, AppError>>,
    ) -> Self {
        Self {
            dir,
            mode,
            outcomes,
        }
    }
}

impl GenerationListener for Exporter {
    fn on_generated(&mut self, world: &Arc<GeneratedWorld>) {
        let outcome = export_world(world, &self.dir, self.mode);
        if self.outcomes.send(outcome).is_err() {
            tracing::warn!("export outcome dropped; receiver gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use isle_world::{WorldSettings, generate_world};

    use super::*;

    fn small_world() -> GeneratedWorld {
        let mut settings = WorldSettings {
            map_size: 33,
            ..Default::default()
        };
        settings.island.radius = 14.0;
        settings.texture.resolution_multiplier = 2;
        settings.scatter.placement_step = 3.0;
        generate_world(&settings, 17)
    }

    #[test]
    fn test_noise_map_writes_height_png() {
        let dir = tempfile::tempdir().unwrap();
        let report = export_world(&small_world(), dir.path(), DrawMode::NoiseMap).unwrap();
        assert_eq!(report.files, vec![dir.path().join(HEIGHT_PNG)]);

        let img = image::open(dir.path().join(HEIGHT_PNG)).unwrap();
        assert_eq!((img.width(), img.height()), (33, 33));
    }

    #[test]
    fn test_color_map_resolution() {
        let dir = tempfile::tempdir().unwrap();
        export_world(&small_world(), dir.path(), DrawMode::ColorMap).unwrap();
        let img = image::open(dir.path().join(COLOR_PNG)).unwrap();
        assert_eq!((img.width(), img.height()), (66, 66));
    }

    #[test]
    fn test_mesh_mode_writes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let world = small_world();
        let report = export_world(&world, dir.path(), DrawMode::Mesh).unwrap();
        for name in [COLOR_PNG, SPLAT_PNG, MESH_OBJ, MESH_BIN, PLACEMENTS_RON] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
        assert_eq!(report.files.len(), 5);

        let packed = std::fs::read(dir.path().join(MESH_BIN)).unwrap();
        assert_eq!(&packed[..4], &isle_mesh::PACKED_MAGIC);
        let mesh = world.mesh().unwrap();
        assert_eq!(
            packed.len(),
            isle_mesh::PACKED_HEADER_LEN + mesh.vertex_count() * 32 + mesh.indices.len() * 2
        );

        let obj = std::fs::read_to_string(dir.path().join(MESH_OBJ)).unwrap();
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 33 * 33);

        let ron_text = std::fs::read_to_string(dir.path().join(PLACEMENTS_RON)).unwrap();
        assert!(ron_text.contains("seed: 17"));
    }

    #[test]
    fn test_exporter_reports_over_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut exporter = Exporter::new(dir.path().to_path_buf(), DrawMode::ColorMap, tx);
        exporter.on_generated(&Arc::new(small_world()));
        let report = rx.try_recv().unwrap().unwrap();
        assert_eq!(report.files.len(), 1);
    }

    #[test]
    fn test_png_roundtrip_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        let raster = Raster::from_fn(2, 1, |x, _| if x == 0 { Rgba::BLACK } else { Rgba::WHITE });
        write_png(&raster, &path).unwrap();
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }
}
