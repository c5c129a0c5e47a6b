//! # Cylinder Primitive
//!
//! Generates a capped cylinder centered at the origin along Z.

use crate::error::MeshError;
use crate::mesh::{EditableMesh, Face};
use glam::DVec3;
use std::f64::consts::PI;

/// Creates a cylinder mesh with n-gon caps and quad sides.
///
/// The cylinder spans `-height / 2 ..= height / 2` along Z.
///
/// # Example
///
/// ```rust
/// use volume_mesh::primitives::create_cylinder;
///
/// let mesh = create_cylinder(1.0, 4.0, 12).unwrap();
/// assert_eq!(mesh.vertex_count(), 24);
/// assert_eq!(mesh.face_count(), 14);
/// ```
pub fn create_cylinder(radius: f64, height: f64, segments: u32) -> Result<EditableMesh, MeshError> {
    if radius <= 0.0 || height <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "Cylinder radius and height must be positive: r={radius}, h={height}"
        )));
    }

    if segments < 3 {
        return Err(MeshError::degenerate(format!(
            "Cylinder segments must be at least 3: {segments}"
        )));
    }

    let seg = segments as usize;
    let half = height / 2.0;
    let mut mesh = EditableMesh::with_capacity(2 * seg, seg + 2);

    let ring = |mesh: &mut EditableMesh, z: f64| -> Vec<u32> {
        (0..segments)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / segments as f64;
                mesh.add_vertex(DVec3::new(radius * theta.cos(), radius * theta.sin(), z))
            })
            .collect()
    };

    let bottom = ring(&mut mesh, -half);
    let top = ring(&mut mesh, half);

    for j in 0..seg {
        let j_next = (j + 1) % seg;
        mesh.add_face(Face::new(vec![bottom[j], bottom[j_next], top[j_next], top[j]]));
    }

    mesh.add_face(Face::new(top));
    mesh.add_face(Face::new(bottom.into_iter().rev().collect()));

    Ok(mesh)
}
