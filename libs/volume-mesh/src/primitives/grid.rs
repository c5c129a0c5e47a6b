//! # Grid Primitive
//!
//! Generates a subdivided quad plane in XY, facing +Z.

use crate::error::MeshError;
use crate::mesh::{EditableMesh, Face};
use glam::DVec3;

/// Creates a `columns` x `rows` grid of quads centered at the origin.
///
/// # Example
///
/// ```rust
/// use volume_mesh::primitives::create_grid;
///
/// let mesh = create_grid(4.0, 2.0, 4, 2).unwrap();
/// assert_eq!(mesh.vertex_count(), 15);
/// assert_eq!(mesh.face_count(), 8);
/// ```
pub fn create_grid(
    width: f64,
    depth: f64,
    columns: u32,
    rows: u32,
) -> Result<EditableMesh, MeshError> {
    if width <= 0.0 || depth <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "Grid size must be positive: {width} x {depth}"
        )));
    }
    if columns == 0 || rows == 0 {
        return Err(MeshError::degenerate("Grid needs at least one cell"));
    }

    let stride = columns + 1;
    let mut mesh =
        EditableMesh::with_capacity((stride * (rows + 1)) as usize, (columns * rows) as usize);

    for r in 0..=rows {
        let y = depth * (r as f64 / rows as f64 - 0.5);
        for c in 0..=columns {
            let x = width * (c as f64 / columns as f64 - 0.5);
            mesh.add_vertex(DVec3::new(x, y, 0.0));
        }
    }

    for r in 0..rows {
        for c in 0..columns {
            let i = r * stride + c;
            mesh.add_face(Face::new(vec![i, i + 1, i + 1 + stride, i + stride]));
        }
    }

    Ok(mesh)
}
