//! Terrain meshing: height grid to level-of-detail triangle mesh, plus the
//! buffer formats the display layer consumes.

pub mod binary;
mod error;
pub mod mesh_data;
pub mod obj;
pub mod terrain_mesh;
pub mod vertex;

pub use binary::{PACKED_HEADER_LEN, PACKED_MAGIC, write_packed_mesh};
pub use error::MeshError;
pub use mesh_data::{IndexFormat, MeshData};
pub use obj::write_obj;
pub use terrain_mesh::{
    MAX_DETAIL_LEVEL, StrideRule, build_terrain_mesh, build_terrain_mesh_with_stride,
};
pub use vertex::TerrainVertex;
