//! # Selection
//!
//! Resolves which vertices and faces of a mesh lie inside a volume.
//!
//! ## Algorithm
//!
//! 1. Compute the volume's conservative world AABB
//! 2. Query the [`SpatialIndex`] for candidate vertices
//! 3. Run the exact local-space containment test on every candidate
//!    (across rayon workers for large candidate sets)
//! 4. Select each face whose vertices are all selected
//!
//! [`select_exhaustive`] tests every vertex and face directly and always
//! agrees with [`select`].


use crate::spatial_index::SpatialIndex;
use crate::volume::ResolvedVolume;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use volume_mesh::MeshHandle;

/// Vertices and faces inside a volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    /// Selected vertex indices, ascending
    pub vertex_indices: BTreeSet<u32>,
    /// Selected face indices, ascending
    pub face_indices: BTreeSet<u32>,
}

impl SelectionResult {
    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.vertex_indices.is_empty() && self.face_indices.is_empty()
    }

    /// Number of selected vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_indices.len()
    }

    /// Number of selected faces.
    pub fn face_count(&self) -> usize {
        self.face_indices.len()
    }

    /// Returns true if the vertex is selected.
    pub fn contains_vertex(&self, index: u32) -> bool {
        self.vertex_indices.contains(&index)
    }

    /// Returns true if the face is selected.
    pub fn contains_face(&self, index: u32) -> bool {
        self.face_indices.contains(&index)
    }
}

/// Selects the vertices and faces of `mesh` inside `volume`.
///
/// `index` must have been built from the current state of `mesh`.
/// Candidate sets of at least `parallel_threshold` vertices are tested in
/// parallel.
pub fn select(
    volume: &ResolvedVolume,
    index: &SpatialIndex,
    mesh: &dyn MeshHandle,
    parallel_threshold: usize,
) -> SelectionResult {
    let positions = mesh.vertex_positions();
    let candidates = index.candidates_in_aabb(&volume.world_aabb());

    let inside = |&v: &u32| {
        positions
            .get(v as usize)
            .is_some_and(|p| volume.contains(*p))
    };

    let vertex_indices: BTreeSet<u32> = if candidates.len() >= parallel_threshold {
        candidates.into_par_iter().filter(inside).collect()
    } else {
        candidates.into_iter().filter(inside).collect()
    };

    let faces = mesh.faces();
    let face_indices = vertex_indices
        .iter()
        .flat_map(|&v| index.incident_faces(v).iter().copied())
        .filter(|&f| {
            faces
                .get(f as usize)
                .is_some_and(|face| all_selected(&face.indices, &vertex_indices))
        })
        .collect();

    SelectionResult {
        vertex_indices,
        face_indices,
    }
}

/// Selects by testing every vertex and face, without an index.
pub fn select_exhaustive(volume: &ResolvedVolume, mesh: &dyn MeshHandle) -> SelectionResult {
    let vertex_indices: BTreeSet<u32> = mesh
        .vertex_positions()
        .iter()
        .enumerate()
        .filter(|(_, p)| volume.contains(**p))
        .map(|(i, _)| i as u32)
        .collect();

    let face_indices = mesh
        .faces()
        .iter()
        .enumerate()
        .filter(|(_, face)| all_selected(&face.indices, &vertex_indices))
        .map(|(i, _)| i as u32)
        .collect();

    SelectionResult {
        vertex_indices,
        face_indices,
    }
}

/// A face with no vertices is never selected.
fn all_selected(indices: &[u32], selected: &BTreeSet<u32>) -> bool {
    !indices.is_empty() && indices.iter().all(|v| selected.contains(v))
}
