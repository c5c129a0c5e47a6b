//! # Mesh Errors
//!
//! Error types for host mesh construction and mutation.

use thiserror::Error;

/// Errors that can occur while building, loading or mutating a mesh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// Invalid mesh topology
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    /// Degenerate geometry
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Vertex index outside the mesh
    #[error("Vertex index {index} out of range (vertex count: {count})")]
    VertexOutOfRange { index: u32, count: usize },

    /// Face index outside the mesh
    #[error("Face index {index} out of range (face count: {count})")]
    FaceOutOfRange { index: u32, count: usize },

    /// Material not registered with the mesh
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    /// Mesh file could not be decoded
    #[error("Mesh format error: {0}")]
    Format(String),
}

impl MeshError {
    /// Creates an invalid topology error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for MeshError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}
