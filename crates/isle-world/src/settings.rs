//! The full world configuration surface.

use isle_mesh::StrideRule;
use isle_terrain::texture::{Rgba, TerrainRegion};
use isle_terrain::{HeightCurve, IslandSettings, NoiseParameters, ScatterSettings, SpawnSettings};
use serde::{Deserialize, Serialize};

/// Everything a generation run reads.
///
/// Runs clone this before starting, so later edits never reach a run in
/// flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Fixed seed; `None` draws a fresh one for every run.
    pub seed: Option<i32>,
    /// Cells per side of the height grid. `2^n + 1` keeps every detail
    /// level valid.
    pub map_size: usize,
    pub island: IslandSettings,
    /// Noise tuning; its `seed` is replaced by the run's seed.
    pub noise: NoiseParameters,
    pub mesh: MeshSettings,
    pub texture: TextureSettings,
    pub scatter: ScatterSettings,
    pub spawn: SpawnSettings,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            seed: None,
            map_size: 257,
            island: IslandSettings::default(),
            noise: NoiseParameters::default(),
            mesh: MeshSettings::default(),
            texture: TextureSettings::default(),
            scatter: ScatterSettings::default(),
            spawn: SpawnSettings::default(),
        }
    }
}

/// Mesh shaping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// World height of a fully remapped peak.
    pub height_multiplier: f64,
    pub height_curve: HeightCurve,
    /// 0 is full resolution; each level coarsens the stride.
    pub level_of_detail: u32,
    pub stride_rule: StrideRule,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            height_multiplier: 25.0,
            height_curve: HeightCurve::island(),
            level_of_detail: 0,
            stride_rule: StrideRule::default(),
        }
    }
}

/// Surface texture output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSettings {
    /// Color raster pixels per height grid cell along each axis.
    pub resolution_multiplier: usize,
    /// Elevation bands in ascending threshold order.
    pub regions: Vec<TerrainRegion>,
}

impl TextureSettings {
    /// Side length of the color raster for a `map_size` grid.
    pub fn texture_size(&self, map_size: usize) -> usize {
        map_size * self.resolution_multiplier.max(1)
    }
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            resolution_multiplier: 4,
            regions: default_regions(),
        }
    }
}

/// Water, sand, grass, rock, snow.
pub fn default_regions() -> Vec<TerrainRegion> {
    vec![
        TerrainRegion::new("water", 0.3, Rgba::rgb(54, 103, 199)).with_blend_range(0.02),
        TerrainRegion::new("sand", 0.4, Rgba::rgb(210, 208, 125)).with_blend_range(0.03),
        TerrainRegion::new("grass", 0.6, Rgba::rgb(86, 152, 23)).with_blend_range(0.05),
        TerrainRegion::new("rock", 0.8, Rgba::rgb(90, 69, 60)).with_blend_range(0.05),
        TerrainRegion::new("snow", 1.0, Rgba::rgb(250, 250, 250)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = WorldSettings::default();
        assert_eq!(s.map_size, 257);
        assert_eq!(s.island.radius, 100.0);
        assert_eq!(s.island.falloff_power, 2.5);
        assert_eq!(s.island.count, 1);
        assert_eq!(s.noise.scale, 50.0);
        assert_eq!(s.noise.octaves, 6);
        assert_eq!(s.mesh.height_multiplier, 25.0);
        assert_eq!(s.texture.resolution_multiplier, 4);
        assert_eq!(s.texture.regions.len(), 5);
        assert_eq!(s.scatter.placement_step, 10.0);
        assert_eq!(s.scatter.placeables.len(), 2);
    }

    #[test]
    fn test_regions_ascending() {
        let regions = default_regions();
        assert!(regions.windows(2).all(|w| w[0].height < w[1].height));
        assert_eq!(regions.last().map(|r| r.height), Some(1.0));
    }

    #[test]
    fn test_texture_size() {
        let t = TextureSettings::default();
        assert_eq!(t.texture_size(257), 1028);
        let t = TextureSettings {
            resolution_multiplier: 0,
            ..Default::default()
        };
        assert_eq!(t.texture_size(65), 65);
    }

    #[test]
    fn test_ron_round_trip_and_partial() {
        let s = WorldSettings {
            seed: Some(7),
            map_size: 129,
            ..Default::default()
        };
        let text = ron::to_string(&s).unwrap();
        let back: WorldSettings = ron::from_str(&text).unwrap();
        assert_eq!(back, s);

        let partial: WorldSettings = ron::from_str("(map_size: 65)").unwrap();
        assert_eq!(partial.map_size, 65);
        assert_eq!(partial.mesh, MeshSettings::default());
    }
}
