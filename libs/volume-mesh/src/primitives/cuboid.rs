//! # Cuboid Primitive
//!
//! Generates a six-quad mesh for axis-aligned boxes.

use crate::error::MeshError;
use crate::mesh::{EditableMesh, Face};
use glam::DVec3;

/// Creates a cuboid mesh with quad faces.
///
/// # Arguments
///
/// * `size` - Size in X, Y, Z dimensions
/// * `center` - If true, center at origin; otherwise corner at origin
///
/// # Example
///
/// ```rust
/// use volume_mesh::primitives::create_cuboid;
/// use glam::DVec3;
///
/// let mesh = create_cuboid(DVec3::new(10.0, 10.0, 10.0), false).unwrap();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.face_count(), 6);
/// ```
pub fn create_cuboid(size: DVec3, center: bool) -> Result<EditableMesh, MeshError> {
    if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "Cuboid size must be positive: {size:?}"
        )));
    }

    let offset = if center { -size / 2.0 } else { DVec3::ZERO };

    let mut mesh = EditableMesh::with_capacity(8, 6);

    // Bottom ring then top ring, counter-clockwise seen from +Z
    let corners = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(size.x, 0.0, 0.0),
        DVec3::new(size.x, size.y, 0.0),
        DVec3::new(0.0, size.y, 0.0),
        DVec3::new(0.0, 0.0, size.z),
        DVec3::new(size.x, 0.0, size.z),
        DVec3::new(size.x, size.y, size.z),
        DVec3::new(0.0, size.y, size.z),
    ];
    for corner in corners {
        mesh.add_vertex(corner + offset);
    }

    let quads: [[u32; 4]; 6] = [
        [0, 3, 2, 1], // -Z
        [4, 5, 6, 7], // +Z
        [0, 1, 5, 4], // -Y
        [2, 3, 7, 6], // +Y
        [3, 0, 4, 7], // -X
        [1, 2, 6, 5], // +X
    ];
    for quad in quads {
        mesh.add_face(Face::new(quad.to_vec()));
    }

    Ok(mesh)
}
