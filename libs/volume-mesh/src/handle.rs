//! # Mesh Handle
//!
//! The collaborator interface between the engine and a host mesh.

use crate::error::MeshError;
use crate::mesh::{check_face, EditableMesh, Face};
use crate::mutation::MeshMutation;
use glam::DVec3;

/// Read access and atomic mutation of a host mesh.
///
/// Implementations must report a `version` that changes whenever positions
/// or topology change, and must apply a mutation either completely or not at
/// all.
pub trait MeshHandle {
    /// Current vertex positions.
    fn vertex_positions(&self) -> &[DVec3];

    /// Current faces.
    fn faces(&self) -> &[Face];

    /// Version stamp of the current geometry.
    fn version(&self) -> u64;

    /// Returns true if the host knows the material.
    fn has_material(&self, name: &str) -> bool;

    /// Applies a mutation atomically.
    fn apply_mutation(&mut self, mutation: &MeshMutation) -> Result<(), MeshError>;

    /// Number of vertices.
    fn vertex_count(&self) -> usize {
        self.vertex_positions().len()
    }

    /// Number of faces.
    fn face_count(&self) -> usize {
        self.faces().len()
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let positions = self.vertex_positions();
        let first = *positions.first()?;
        Some(
            positions
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }
}

impl MeshHandle for EditableMesh {
    fn vertex_positions(&self) -> &[DVec3] {
        &self.vertices
    }

    fn faces(&self) -> &[Face] {
        &self.faces
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn has_material(&self, name: &str) -> bool {
        self.materials.contains(name)
    }

    fn apply_mutation(&mut self, mutation: &MeshMutation) -> Result<(), MeshError> {
        if mutation.is_noop() {
            return Ok(());
        }

        self.check_mutation(mutation)?;

        self.vertices.extend_from_slice(&mutation.added_vertices);
        for &(index, position) in &mutation.moved_vertices {
            self.vertices[index as usize] = position;
        }
        for (index, face) in &mutation.replaced_faces {
            self.faces[*index as usize] = face.clone();
        }
        self.faces.extend(mutation.added_faces.iter().cloned());
        for (index, material) in &mutation.material_assignments {
            self.faces[*index as usize].material = Some(material.clone());
        }

        self.touch();
        Ok(())
    }
}

impl EditableMesh {
    /// Checks every index and material a mutation references before any
    /// change is made.
    fn check_mutation(&self, mutation: &MeshMutation) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len() + mutation.added_vertices.len();
        let face_count = self.faces.len() + mutation.added_faces.len();

        for &(index, position) in &mutation.moved_vertices {
            if index as usize >= vertex_count {
                return Err(MeshError::VertexOutOfRange {
                    index,
                    count: vertex_count,
                });
            }
            if !position.is_finite() {
                return Err(MeshError::degenerate(format!(
                    "non-finite position for vertex {index}"
                )));
            }
        }

        if mutation.added_vertices.iter().any(|p| !p.is_finite()) {
            return Err(MeshError::degenerate("non-finite added vertex"));
        }

        let has_material = |name: &str| self.materials.contains(name);
        for (index, face) in &mutation.replaced_faces {
            if *index as usize >= self.faces.len() {
                return Err(MeshError::FaceOutOfRange {
                    index: *index,
                    count: self.faces.len(),
                });
            }
            check_face(face, vertex_count, has_material)?;
        }
        for face in &mutation.added_faces {
            check_face(face, vertex_count, has_material)?;
        }

        for (index, material) in &mutation.material_assignments {
            if *index as usize >= face_count {
                return Err(MeshError::FaceOutOfRange {
                    index: *index,
                    count: face_count,
                });
            }
            if !has_material(material) {
                return Err(MeshError::UnknownMaterial(material.clone()));
            }
        }

        Ok(())
    }
}
