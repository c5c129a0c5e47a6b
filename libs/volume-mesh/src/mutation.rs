//! # Mesh Mutations
//!
//! A [`MeshMutation`] is the complete description of one edit. Handlers
//! build it against a read-only view of the mesh; the host applies it in a
//! single step, so a failing handler never leaves a partial edit behind.
//!
//! ## Application Order
//!
//! 1. `added_vertices` are appended (indices continue from the current count)
//! 2. `moved_vertices` overwrite positions
//! 3. `replaced_faces` overwrite faces in place
//! 4. `added_faces` are appended
//! 5. `material_assignments` set face materials

use crate::mesh::Face;
use glam::DVec3;
use serde::Serialize;

/// A batch of changes to apply to a host mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshMutation {
    /// New positions for existing (or newly added) vertices
    pub moved_vertices: Vec<(u32, DVec3)>,
    /// Vertices appended to the mesh
    pub added_vertices: Vec<DVec3>,
    /// Faces overwritten in place
    pub replaced_faces: Vec<(u32, Face)>,
    /// Faces appended to the mesh
    pub added_faces: Vec<Face>,
    /// Material names assigned to faces
    pub material_assignments: Vec<(u32, String)>,
}

impl MeshMutation {
    /// Returns true if applying the mutation would change nothing.
    pub fn is_noop(&self) -> bool {
        self.moved_vertices.is_empty()
            && self.added_vertices.is_empty()
            && self.replaced_faces.is_empty()
            && self.added_faces.is_empty()
            && self.material_assignments.is_empty()
    }

    /// Returns true if the mutation changes connectivity.
    pub fn changes_topology(&self) -> bool {
        !self.added_vertices.is_empty()
            || !self.replaced_faces.is_empty()
            || !self.added_faces.is_empty()
    }

    /// One-line summary used in logs and reports.
    pub fn describe(&self) -> String {
        if self.is_noop() {
            return "no changes".to_string();
        }

        let parts: Vec<String> = [
            (self.moved_vertices.len(), "moved vertices"),
            (self.added_vertices.len(), "added vertices"),
            (self.replaced_faces.len(), "replaced faces"),
            (self.added_faces.len(), "added faces"),
            (self.material_assignments.len(), "material assignments"),
        ]
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| format!("{n} {label}"))
        .collect();

        parts.join(", ")
    }
}

/// Incrementally assembles a [`MeshMutation`].
///
/// The builder knows the size of the mesh it targets so that newly added
/// vertices and faces can be referenced by their final indices.
///
/// # Example
///
/// ```rust
/// use volume_mesh::{Face, MutationBuilder};
/// use glam::DVec3;
///
/// let mut builder = MutationBuilder::new(4, 1);
/// let v = builder.add_vertex(DVec3::ONE);
/// assert_eq!(v, 4);
/// let f = builder.add_face(Face::new(vec![0, 1, v]));
/// assert_eq!(f, 1);
/// let mutation = builder.finish();
/// assert_eq!(mutation.added_vertices.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MutationBuilder {
    base_vertex_count: u32,
    base_face_count: u32,
    mutation: MeshMutation,
}

impl MutationBuilder {
    /// Creates a builder for a mesh with the given vertex and face counts.
    pub fn new(base_vertex_count: usize, base_face_count: usize) -> Self {
        Self {
            base_vertex_count: base_vertex_count as u32,
            base_face_count: base_face_count as u32,
            mutation: MeshMutation::default(),
        }
    }

    /// Appends a vertex and returns its index in the mutated mesh.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.base_vertex_count + self.mutation.added_vertices.len() as u32;
        self.mutation.added_vertices.push(position);
        index
    }

    /// Appends a face and returns its index in the mutated mesh.
    pub fn add_face(&mut self, face: Face) -> u32 {
        let index = self.base_face_count + self.mutation.added_faces.len() as u32;
        self.mutation.added_faces.push(face);
        index
    }

    /// Overwrites an existing face.
    pub fn replace_face(&mut self, index: u32, face: Face) {
        self.mutation.replaced_faces.push((index, face));
    }

    /// Moves a vertex to a new position.
    pub fn move_vertex(&mut self, index: u32, position: DVec3) {
        self.mutation.moved_vertices.push((index, position));
    }

    /// Assigns a material to a face.
    pub fn assign_material(&mut self, face: u32, material: impl Into<String>) {
        self.mutation
            .material_assignments
            .push((face, material.into()));
    }

    /// Number of vertices added so far.
    pub fn added_vertex_count(&self) -> usize {
        self.mutation.added_vertices.len()
    }

    /// Number of faces added so far.
    pub fn added_face_count(&self) -> usize {
        self.mutation.added_faces.len()
    }

    /// Returns the assembled mutation.
    pub fn finish(self) -> MeshMutation {
        self.mutation
    }
}
