//! # Mesh I/O
//!
//! JSON mesh files and Wavefront OBJ export.
//!
//! ## JSON Format
//!
//! ```json
//! { "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
//!   "faces": [[0, 1, 2], {"indices": [0, 2, 1], "material": "Glass"}],
//!   "materials": ["Glass"] }
//! ```
//!
//! Faces are either a bare index list or an object with an optional
//! material. Materials referenced by faces must be listed.

use crate::error::MeshError;
use crate::mesh::{EditableMesh, Face};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Serialized form of an [`EditableMesh`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshFile {
    /// Vertex positions
    pub vertices: Vec<[f64; 3]>,
    /// Faces
    pub faces: Vec<FaceEntry>,
    /// Registered materials
    #[serde(default)]
    pub materials: Vec<String>,
}

/// One face in a [`MeshFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceEntry {
    /// Bare index loop
    Indices(Vec<u32>),
    /// Index loop with an optional material
    Full {
        /// Vertex indices in winding order
        indices: Vec<u32>,
        /// Material name
        #[serde(default)]
        material: Option<String>,
    },
}

impl From<&Face> for FaceEntry {
    fn from(face: &Face) -> Self {
        match &face.material {
            None => FaceEntry::Indices(face.indices.clone()),
            Some(material) => FaceEntry::Full {
                indices: face.indices.clone(),
                material: Some(material.clone()),
            },
        }
    }
}

impl From<FaceEntry> for Face {
    fn from(entry: FaceEntry) -> Self {
        match entry {
            FaceEntry::Indices(indices) => Face::new(indices),
            FaceEntry::Full { indices, material } => Face { indices, material },
        }
    }
}

impl MeshFile {
    /// Builds an editable mesh, validating indices and materials.
    pub fn into_mesh(self) -> Result<EditableMesh, MeshError> {
        let mut mesh = EditableMesh::with_capacity(self.vertices.len(), self.faces.len());
        for name in self.materials {
            mesh.register_material(name);
        }
        for [x, y, z] in self.vertices {
            let position = DVec3::new(x, y, z);
            if !position.is_finite() {
                return Err(MeshError::Format(format!(
                    "non-finite vertex {}",
                    mesh.vertex_count()
                )));
            }
            mesh.add_vertex(position);
        }
        for entry in self.faces {
            mesh.add_face(entry.into());
        }
        mesh.validate()?;
        Ok(mesh)
    }

    /// Captures the current state of a mesh.
    pub fn from_mesh(mesh: &EditableMesh) -> Self {
        Self {
            vertices: mesh.vertices().iter().map(|v| v.to_array()).collect(),
            faces: mesh.faces().iter().map(FaceEntry::from).collect(),
            materials: mesh.materials().iter().cloned().collect(),
        }
    }
}

/// Parses a mesh from JSON text.
///
/// # Example
///
/// ```rust
/// use volume_mesh::io::mesh_from_json;
///
/// let mesh = mesh_from_json(r#"{"vertices": [[0,0,0],[1,0,0],[0,1,0]], "faces": [[0,1,2]]}"#).unwrap();
/// assert_eq!(mesh.face_count(), 1);
/// ```
pub fn mesh_from_json(text: &str) -> Result<EditableMesh, MeshError> {
    let file: MeshFile = serde_json::from_str(text)?;
    file.into_mesh()
}

/// Serializes a mesh to pretty-printed JSON.
pub fn mesh_to_json(mesh: &EditableMesh) -> Result<String, MeshError> {
    Ok(serde_json::to_string_pretty(&MeshFile::from_mesh(mesh))?)
}

/// Writes a mesh as Wavefront OBJ text.
///
/// Polygon faces are written as-is; consecutive faces sharing a material are
/// grouped under one `usemtl` statement.
pub fn write_obj<W: Write>(mesh: &EditableMesh, mut out: W) -> io::Result<()> {
    writeln!(
        out,
        "# {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    )?;

    for v in mesh.vertices() {
        writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
    }

    let mut current: Option<&str> = None;
    for face in mesh.faces() {
        let material = face.material.as_deref();
        if material != current {
            writeln!(out, "usemtl {}", material.unwrap_or("default"))?;
            current = material;
        }
        out.write_all(b"f")?;
        for index in &face.indices {
            // OBJ indices are 1-based
            write!(out, " {}", index + 1)?;
        }
        out.write_all(b"\n")?;
    }

    out.flush()
}
