//! Command-line arguments for `isle-gen`.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::config::DrawMode;

/// Procedural island generator.
///
/// Flags override the values loaded from `config.ron` for this run only.
#[derive(Parser, Debug, Default)]
#[command(name = "isle-gen", about = "Generate a procedural island")]
pub struct CliArgs {
    /// World seed; omit for the configured seed or a random one.
    #[arg(long)]
    pub seed: Option<i32>,

    /// Height grid size per side (2^n + 1 recommended).
    #[arg(long)]
    pub map_size: Option<usize>,

    /// Number of islands, primary included.
    #[arg(long)]
    pub islands: Option<usize>,

    /// Mesh level of detail.
    #[arg(long)]
    pub lod: Option<u32>,

    /// Which artifacts to write.
    #[arg(long, value_enum)]
    pub draw_mode: Option<DrawMode>,

    /// Output directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply the flags that were given; everything else keeps its loaded value.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = Some(seed);
        }
        if let Some(size) = args.map_size {
            self.world.map_size = size;
        }
        if let Some(count) = args.islands {
            self.world.island.count = count;
        }
        if let Some(lod) = args.lod {
            self.world.mesh.level_of_detail = lod;
        }
        if let Some(mode) = args.draw_mode {
            self.output.draw_mode = mode;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
