//! # Volume Preview
//!
//! World-space meshes of volumes, for checking where a call will act.

use crate::volume::{LocalShape, VolumeIdentifier};
use config::constants::preview_segments;
use volume_mesh::primitives::{create_cuboid, create_cylinder, create_sphere};
use volume_mesh::{EditableMesh, MeshError};

/// Builds a mesh of `volume` placed in world space.
///
/// `segments` controls the tessellation of spheres and cylinders and is
/// clamped to the supported minimum.
///
/// # Example
///
/// ```rust
/// use volume_engine::preview::volume_preview_mesh;
/// use volume_engine::volume::VolumeIdentifier;
/// use glam::DVec3;
///
/// let volume = VolumeIdentifier::Sphere { center: DVec3::new(0.0, 0.0, 5.0), radius: 1.0 };
/// let mesh = volume_preview_mesh(&volume, 16).unwrap();
/// let (min, _) = mesh.bounding_box();
/// assert!((min.z - 4.0).abs() < 1e-9);
/// ```
pub fn volume_preview_mesh(volume: &VolumeIdentifier, segments: u32) -> Result<EditableMesh, MeshError> {
    let resolved = volume.resolve();
    let segments = preview_segments(segments);

    let mut mesh = match resolved.shape() {
        LocalShape::Box { half } => create_cuboid(half * 2.0, true)?,
        LocalShape::Sphere { radius } => create_sphere(radius, segments)?,
        LocalShape::Cylinder {
            radius,
            half_height,
        } => create_cylinder(radius, half_height * 2.0, segments)?,
    };

    mesh.map_positions(|p| resolved.to_world(p));
    Ok(mesh)
}
