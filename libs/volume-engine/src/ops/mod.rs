//! # Operation Handlers
//!
//! One module per registered function. Every handler reads the mesh through
//! a [`HandlerContext`] and returns a [`HandlerOutput`] describing the edit;
//! nothing here mutates the mesh.

pub mod extrude;
pub mod inset;
pub mod lattice;
pub mod material;
pub mod scale;
pub mod subdivide;
pub mod transform;

use crate::document::Operation;
use crate::error::ExecutionError;
use crate::selection::SelectionResult;
use crate::volume::ResolvedVolume;
use volume_mesh::{MeshHandle, MeshMutation};

/// Read-only inputs shared by every handler.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Vertices and faces inside the volume
    pub selection: &'a SelectionResult,
    /// Volume the call is scoped to
    pub volume: &'a ResolvedVolume,
    /// Current mesh state
    pub mesh: &'a dyn MeshHandle,
}

/// Result of a handler: the edit to apply plus a summary.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutput {
    /// Changes for the host to apply
    pub mutation: MeshMutation,
    /// Human-readable summary
    pub detail: String,
    /// Number of vertices or faces the handler changed
    pub affected: usize,
}

impl HandlerOutput {
    /// An output that changes nothing.
    pub fn noop(detail: impl Into<String>) -> Self {
        Self {
            mutation: MeshMutation::default(),
            detail: detail.into(),
            affected: 0,
        }
    }
}

/// Runs the handler for an operation.
pub fn dispatch(
    operation: &Operation,
    cx: &HandlerContext<'_>,
) -> Result<HandlerOutput, ExecutionError> {
    match operation {
        Operation::ExtrudeFaces(params) => extrude::extrude_faces(cx, params),
        Operation::ScaleVertices(params) => scale::scale_vertices(cx, params),
        Operation::TransformVertices(params) => transform::transform_vertices(cx, params),
        Operation::ApplyMaterial(params) => material::apply_material(cx, params),
        Operation::DeformLattice(params) => lattice::deform_lattice(cx, params),
        Operation::SubdivideFaces(params) => subdivide::subdivide_faces(cx, params),
        Operation::InsetFaces(params) => inset::inset_faces(cx, params),
    }
}

/// Formats a vector for handler details.
pub(crate) fn fmt_vec(v: glam::DVec3) -> String {
    format!("[{}, {}, {}]", v.x, v.y, v.z)
}
