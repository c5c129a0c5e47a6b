//! # Sphere Primitive
//!
//! Generates a polygon sphere using latitude/longitude tessellation.

use crate::error::MeshError;
use crate::mesh::{EditableMesh, Face};
use glam::DVec3;
use std::f64::consts::PI;

/// Creates a sphere mesh centered at the origin.
///
/// # Algorithm
///
/// - num_rings = (segments + 1) / 2
/// - Each ring at polar angle phi = 180° * (i + 0.5) / num_rings
/// - No pole vertices: the first and last rings are closed by n-gon caps
/// - Adjacent rings are joined by quads
///
/// # Example
///
/// ```rust
/// use volume_mesh::primitives::create_sphere;
///
/// let mesh = create_sphere(5.0, 16).unwrap();
/// assert_eq!(mesh.vertex_count(), 8 * 16);
/// ```
pub fn create_sphere(radius: f64, segments: u32) -> Result<EditableMesh, MeshError> {
    if radius <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "Sphere radius must be positive: {radius}"
        )));
    }

    if segments < 3 {
        return Err(MeshError::degenerate(format!(
            "Sphere segments must be at least 3: {segments}"
        )));
    }

    let num_rings = (segments + 1) / 2;
    let seg = segments as usize;
    let mut mesh = EditableMesh::with_capacity(
        (num_rings * segments) as usize,
        ((num_rings - 1) * segments + 2) as usize,
    );

    let mut rings: Vec<Vec<u32>> = Vec::with_capacity(num_rings as usize);

    for i in 0..num_rings {
        // Polar angle (0 = top, PI = bottom)
        let phi = PI * (i as f64 + 0.5) / num_rings as f64;
        let ring_radius = radius * phi.sin();
        let z = radius * phi.cos();

        let ring = (0..segments)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / segments as f64;
                mesh.add_vertex(DVec3::new(
                    ring_radius * theta.cos(),
                    ring_radius * theta.sin(),
                    z,
                ))
            })
            .collect();
        rings.push(ring);
    }

    // Top cap
    mesh.add_face(Face::new(rings[0].clone()));

    for pair in rings.windows(2) {
        let (ring_a, ring_b) = (&pair[0], &pair[1]);
        for j in 0..seg {
            let j_next = (j + 1) % seg;
            mesh.add_face(Face::new(vec![
                ring_a[j],
                ring_b[j],
                ring_b[j_next],
                ring_a[j_next],
            ]));
        }
    }

    // Bottom cap, reversed
    let mut bottom = rings[rings.len() - 1].clone();
    bottom.reverse();
    mesh.add_face(Face::new(bottom));

    Ok(mesh)
}
