//! Configuration for the island generator.
//!
//! Settings persist to disk as `config.ron`; command-line flags override
//! individual values for a single run.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, ConfigOrigin, DebugConfig, DrawMode, OutputConfig, default_config_dir,
};
pub use error::ConfigError;
