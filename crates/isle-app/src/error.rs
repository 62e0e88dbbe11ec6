//! Application-level errors.

use std::path::PathBuf;

use isle_config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("could not determine a configuration directory; pass --config")]
    NoConfigDir,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialise logging")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode image")]
    Image(#[from] image::ImageError),

    #[error("failed to serialize placements")]
    Ron(#[from] ron::Error),

    #[error("raster of {width}x{height} pixels does not fit an image")]
    RasterSize { width: usize, height: usize },

    #[error("generation finished without an export")]
    ExportMissing,
}
