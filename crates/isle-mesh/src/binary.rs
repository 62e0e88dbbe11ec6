//! Packed binary mesh: interleaved vertices followed by the index buffer, in
//! the layout a GPU upload expects.
//!
//! ```text
//! magic        4 bytes  b"ISLM"
//! vertices     u32 LE
//! indices      u32 LE
//! index width  u32 LE   2 or 4
//! vertex data  vertices * 32 bytes, TerrainVertex layout, native endian
//! index data   indices * index width bytes, native endian
//! ```

use std::io::{self, Write};

use crate::mesh_data::{IndexFormat, MeshData};
use crate::vertex::TerrainVertex;

pub const PACKED_MAGIC: [u8; 4] = *b"ISLM";

/// Size of the fixed header in bytes.
pub const PACKED_HEADER_LEN: usize = 16;

/// Write `mesh` in packed form, narrowing indices to `u16` when they fit.
pub fn write_packed_mesh<W: Write>(mesh: &MeshData, mut out: W) -> io::Result<()> {
    let too_large = || io::Error::new(io::ErrorKind::InvalidInput, "mesh too large to pack");
    let vertex_count = u32::try_from(mesh.vertex_count()).map_err(|_| too_large())?;
    let index_count = u32::try_from(mesh.indices.len()).map_err(|_| too_large())?;

    let narrow = match mesh.index_format() {
        IndexFormat::U16 => mesh.indices_u16(),
        IndexFormat::U32 => None,
    };
    let index_width: u32 = if narrow.is_some() { 2 } else { 4 };

    out.write_all(&PACKED_MAGIC)?;
    out.write_all(&vertex_count.to_le_bytes())?;
    out.write_all(&index_count.to_le_bytes())?;
    out.write_all(&index_width.to_le_bytes())?;

    let vertices = mesh.interleaved();
    out.write_all(TerrainVertex::as_bytes(&vertices))?;
    match &narrow {
        Some(indices) => out.write_all(bytemuck::cast_slice(indices))?,
        None => out.write_all(bytemuck::cast_slice(&mesh.indices))?,
    }
    out.flush()
}
