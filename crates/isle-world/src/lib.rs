//! World generation orchestration: settings, the stage pipeline, listener
//! fan-out and background generation.

mod background;
mod error;
mod generator;
mod pipeline;
mod settings;

pub use background::{BackgroundGenerator, CompletedWorld, JobId};
pub use error::WorldError;
pub use generator::{GenerationListener, WorldGenerator};
pub use pipeline::{GeneratedWorld, Stage, generate_world, generate_world_checked};
pub use settings::{MeshSettings, TextureSettings, WorldSettings, default_regions};
