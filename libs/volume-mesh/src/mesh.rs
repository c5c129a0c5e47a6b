//! # Mesh Data Structure
//!
//! Polygon mesh with indexed vertices, ordered faces and per-face materials.

use crate::error::MeshError;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide version counter.
///
/// Versions are handed out from one counter so that two different meshes
/// never report the same version after a change.
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// A polygon face: an ordered loop of vertex indices plus an optional material.
///
/// Winding is counter-clockwise when viewed from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// Vertex indices in winding order
    pub indices: Vec<u32>,
    /// Assigned material name, if any
    pub material: Option<String>,
}

impl Face {
    /// Creates a face without a material.
    pub fn new(indices: Vec<u32>) -> Self {
        Self {
            indices,
            material: None,
        }
    }

    /// Sets the material of the face.
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Copies the material of another face.
    pub fn with_material_of(mut self, other: &Face) -> Self {
        self.material = other.material.clone();
        self
    }

    /// Returns the number of vertices in the face.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the face has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates the directed edges of the face loop.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }
}

/// An editable polygon mesh.
///
/// All geometry uses f64. Every structural change bumps the version so that
/// cached acceleration structures keyed by it are invalidated.
///
/// # Example
///
/// ```rust
/// use volume_mesh::EditableMesh;
/// use glam::DVec3;
///
/// let mut mesh = EditableMesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct EditableMesh {
    /// Vertex positions (f64 for precision)
    pub(crate) vertices: Vec<DVec3>,
    /// Polygon faces
    pub(crate) faces: Vec<Face>,
    /// Materials faces may reference
    pub(crate) materials: BTreeSet<String>,
    /// Version stamp, changes on every mutation
    pub(crate) version: u64,
}

impl Default for EditableMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl EditableMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            materials: BTreeSet::new(),
            version: next_version(),
        }
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            materials: BTreeSet::new(),
            version: next_version(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.version = next_version();
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the number of triangles a fan triangulation would produce.
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|f| f.len().saturating_sub(2))
            .sum()
    }

    /// Returns true if the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the current version stamp.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.touch();
        index
    }

    /// Adds a polygon face and returns its index.
    pub fn add_face(&mut self, face: Face) -> u32 {
        let index = self.faces.len() as u32;
        self.faces.push(face);
        self.touch();
        index
    }

    /// Adds a polygon by vertex indices and returns its index.
    pub fn add_polygon(&mut self, indices: Vec<u32>) -> u32 {
        self.add_face(Face::new(indices))
    }

    /// Adds a triangle by vertex indices and returns its index.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) -> u32 {
        self.add_polygon(vec![v0, v1, v2])
    }

    /// Registers a material name faces may be assigned.
    pub fn register_material(&mut self, name: impl Into<String>) {
        if self.materials.insert(name.into()) {
            self.touch();
        }
    }

    /// Returns the registered materials.
    pub fn materials(&self) -> &BTreeSet<String> {
        &self.materials
    }

    /// Returns true if the material is registered.
    pub fn has_material(&self, name: &str) -> bool {
        self.materials.contains(name)
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the faces.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the face at the given index.
    #[inline]
    pub fn face(&self, index: u32) -> &Face {
        &self.faces[index as usize]
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        if self.vertices.is_empty() {
            return (DVec3::ZERO, DVec3::ZERO);
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for v in &self.vertices[1..] {
            min = min.min(*v);
            max = max.max(*v);
        }

        (min, max)
    }

    /// Returns the centroid (vertex average) of a face.
    pub fn face_centroid(&self, index: u32) -> DVec3 {
        face_centroid(&self.vertices, self.face(index))
    }

    /// Maps every vertex position through `f`.
    pub fn map_positions(&mut self, mut f: impl FnMut(DVec3) -> DVec3) {
        for v in &mut self.vertices {
            *v = f(*v);
        }
        self.touch();
    }

    /// Translates the mesh by a vector.
    pub fn translate(&mut self, offset: DVec3) {
        self.map_positions(|v| v + offset);
    }

    /// Merges another mesh into this one.
    pub fn merge(&mut self, other: &EditableMesh) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);

        for face in &other.faces {
            let indices = face.indices.iter().map(|i| i + offset).collect();
            self.faces.push(Face {
                indices,
                material: face.material.clone(),
            });
        }

        self.materials.extend(other.materials.iter().cloned());
        self.touch();
    }

    /// Fan-triangulates every face.
    pub fn triangulate(&self) -> Vec<[u32; 3]> {
        let mut result = Vec::with_capacity(self.triangle_count());
        for face in &self.faces {
            for k in 1..face.len().saturating_sub(1) {
                result.push([face.indices[0], face.indices[k], face.indices[k + 1]]);
            }
        }
        result
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - Every face has at least three vertices
    /// - All face indices are valid
    /// - No face repeats a vertex
    /// - Face materials are registered
    pub fn validate(&self) -> Result<(), MeshError> {
        let count = self.vertices.len();
        for (fi, face) in self.faces.iter().enumerate() {
            check_face(face, count, |name| self.materials.contains(name)).map_err(|err| {
                match err {
                    MeshError::InvalidTopology { message } => {
                        MeshError::invalid_topology(format!("face {fi}: {message}"))
                    }
                    other => other,
                }
            })?;
        }
        Ok(())
    }
}

/// Returns the centroid (vertex average) of a face.
pub fn face_centroid(positions: &[DVec3], face: &Face) -> DVec3 {
    if face.is_empty() {
        return DVec3::ZERO;
    }
    let sum: DVec3 = face.indices.iter().map(|&i| positions[i as usize]).sum();
    sum / face.len() as f64
}

/// Returns the unit normal of a polygon face using Newell's method.
///
/// Degenerate faces yield `DVec3::ZERO`.
pub fn face_normal(positions: &[DVec3], face: &Face) -> DVec3 {
    let mut normal = DVec3::ZERO;
    for (a, b) in face.edges() {
        let p = positions[a as usize];
        let q = positions[b as usize];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal.normalize_or_zero()
}

pub(crate) fn check_face(
    face: &Face,
    vertex_count: usize,
    has_material: impl Fn(&str) -> bool,
) -> Result<(), MeshError> {
    if face.len() < 3 {
        return Err(MeshError::invalid_topology(format!(
            "face needs at least 3 vertices, got {}",
            face.len()
        )));
    }

    for (k, &index) in face.indices.iter().enumerate() {
        if index as usize >= vertex_count {
            return Err(MeshError::VertexOutOfRange {
                index,
                count: vertex_count,
            });
        }
        if face.indices[..k].contains(&index) {
            return Err(MeshError::invalid_topology(format!(
                "vertex {index} repeated in face"
            )));
        }
    }

    if let Some(material) = &face.material {
        if !has_material(material) {
            return Err(MeshError::UnknownMaterial(material.clone()));
        }
    }

    Ok(())
}
