//! Level-of-detail terrain mesh construction.
//!
//! The grid is sampled every `stride` cells along both axes. Vertices are
//! centered on the origin (`x = gx - (w-1)/2`, `z = (h-1)/2 - gy`) with
//! `y = curve(height) * height_multiplier`, and each quad of the sampled
//! lattice emits two triangles wound counter-clockwise seen from above.

use glam::{Vec2, Vec3};
use isle_terrain::{HeightCurve, HeightGrid};
use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::mesh_data::MeshData;

/// Highest detail level accepted; larger values are clamped.
pub const MAX_DETAIL_LEVEL: u32 = 6;

/// How a detail level maps to a sampling stride.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrideRule {
    /// `2^detail`: 1, 2, 4, ... 64. Any `2^n + 1` grid with `n >= 6`
    /// supports every level.
    #[default]
    PowerOfTwo,
    /// `1` at detail 0, otherwise `2 * detail`: 1, 2, 4, 6, ... 12.
    Doubled,
}

impl StrideRule {
    /// Stride for `detail_level`, clamped to [`MAX_DETAIL_LEVEL`].
    pub fn stride(self, detail_level: u32) -> usize {
        let level = detail_level.min(MAX_DETAIL_LEVEL);
        match self {
            Self::PowerOfTwo => 1usize << level,
            Self::Doubled if level == 0 => 1,
            Self::Doubled => 2 * level as usize,
        }
    }
}

/// Build the mesh for `detail_level` under `rule`.
///
/// Fails with [`MeshError::InvalidDetailLevel`] rather than producing a mesh
/// that stops short of the grid edge.
pub fn build_terrain_mesh(
    grid: &HeightGrid,
    height_multiplier: f64,
    curve: &HeightCurve,
    detail_level: u32,
    rule: StrideRule,
) -> Result<MeshData, MeshError> {
    let stride = rule.stride(detail_level);
    build(grid, height_multiplier, curve, stride, Some(detail_level))
}

/// Build the mesh with an explicit sampling stride.
pub fn build_terrain_mesh_with_stride(
    grid: &HeightGrid,
    height_multiplier: f64,
    curve: &HeightCurve,
    stride: usize,
) -> Result<MeshData, MeshError> {
    build(grid, height_multiplier, curve, stride, None)
}

fn build(
    grid: &HeightGrid,
    height_multiplier: f64,
    curve: &HeightCurve,
    stride: usize,
    detail_level: Option<u32>,
) -> Result<MeshData, MeshError> {
    let (width, height) = (grid.width(), grid.height());
    if width == 0 || height == 0 {
        tracing::error!("terrain mesh requested for an empty height grid");
        return Err(MeshError::EmptyGrid);
    }

    let bad_axis = [width, height]
        .into_iter()
        .find(|&size| stride == 0 || (size - 1) % stride != 0);
    if let Some(grid_size) = bad_axis {
        tracing::error!(
            ?detail_level,
            stride,
            grid_size,
            "detail level stride does not divide the grid; mesh not built"
        );
        return Err(MeshError::InvalidDetailLevel {
            detail_level,
            stride,
            grid_size,
        });
    }

    let per_row = (width - 1) / stride + 1;
    let per_column = (height - 1) / stride + 1;
    let vertex_count = per_row * per_column;
    let triangle_count = (per_row - 1) * (per_column - 1) * 2;

    let left = (width - 1) as f32 / -2.0;
    let top = (height - 1) as f32 / 2.0;

    let mut positions = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(triangle_count * 3);

    for gy in (0..height).step_by(stride) {
        for gx in (0..width).step_by(stride) {
            let i = positions.len() as u32;
            let y = curve.evaluate(grid.get(gx, gy)) * height_multiplier;
            positions.push(Vec3::new(left + gx as f32, y as f32, top - gy as f32));
            uvs.push(Vec2::new(
                gx as f32 / width as f32,
                gy as f32 / height as f32,
            ));

            if gx < width - 1 && gy < height - 1 {
                let row = per_row as u32;
                indices.extend_from_slice(&[i, i + row + 1, i + row]);
                indices.extend_from_slice(&[i + row + 1, i, i + 1]);
            }
        }
    }

    debug_assert_eq!(positions.len(), vertex_count);
    debug_assert_eq!(indices.len(), triangle_count * 3);

    let mut mesh = MeshData {
        positions,
        uvs,
        indices,
        normals: Vec::new(),
        vertices_per_row: per_row,
        stride,
    };
    mesh.recalculate_normals();

    tracing::debug!(
        stride,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "terrain mesh built"
    );
    Ok(mesh)
}
