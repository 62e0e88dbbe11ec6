//! Wavefront OBJ export.

use std::io::{self, Write};

use crate::mesh_data::MeshData;

/// Write `mesh` as a Wavefront OBJ with positions, UVs and normals.
pub fn write_obj(mesh: &MeshData, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "# isle terrain")?;
    writeln!(
        out,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;
    for p in &mesh.positions {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for uv in &mesh.uvs {
        writeln!(out, "vt {} {}", uv.x, uv.y)?;
    }
    for n in &mesh.normals {
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        // OBJ indices are 1-based.
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    out.flush()
}
