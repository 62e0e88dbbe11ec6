//! Mesh buffers handed to the display layer.

use glam::{Vec2, Vec3};
use isle_terrain::Bounds3;

use crate::vertex::TerrainVertex;

/// Width of the index buffer a mesh needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexFormat {
    U16,
    U32,
}

/// A triangle mesh with parallel per-vertex arrays.
///
/// `positions`, `uvs` and `normals` have the same length; `indices` holds
/// triangle triples, each index below the vertex count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vec3>,
    /// Vertices along one row of the sampled lattice.
    pub vertices_per_row: usize,
    /// Grid cells between adjacent vertices.
    pub stride: usize,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// 16-bit indices when every vertex is addressable by one, else 32-bit.
    pub fn index_format(&self) -> IndexFormat {
        if self.vertex_count() <= usize::from(u16::MAX) {
            IndexFormat::U16
        } else {
            IndexFormat::U32
        }
    }

    /// The index buffer narrowed to `u16`, or `None` if any index would be
    /// truncated.
    pub fn indices_u16(&self) -> Option<Vec<u16>> {
        self.indices
            .iter()
            .map(|&i| u16::try_from(i).ok())
            .collect()
    }

    /// Recompute per-vertex normals as the area-weighted sum of adjacent face
    /// normals. Vertices without faces point straight up.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for n in &mut normals {
            *n = n.try_normalize().unwrap_or(Vec3::Y);
        }
        self.normals = normals;
    }

    /// Axis-aligned bounds of the vertex positions.
    pub fn bounds(&self) -> Option<Bounds3> {
        Bounds3::from_points(self.positions.iter().map(|p| p.as_dvec3()))
    }

    /// Interleave into GPU-ready vertices.
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, p)| TerrainVertex {
                position: p.to_array(),
                normal: self.normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
                uv: self.uvs.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
            })
            .collect()
    }
}
