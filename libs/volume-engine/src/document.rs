//! # Tool-Call Documents
//!
//! Typed form of a validated document. Raw JSON becomes a document only
//! through [`SchemaValidator`](crate::schema::SchemaValidator). Documents
//! assembled in code are re-checked with
//! [`SchemaValidator::check`](crate::schema::SchemaValidator::check) before
//! the engine runs them, so handlers only ever see checked parameters.

use crate::error::ValidationError;
use crate::schema::SchemaValidator;
use crate::volume::VolumeIdentifier;
use glam::{DMat3, DMat4, DVec3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An ordered list of tool calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallDocument {
    /// Calls in execution order
    pub tool_calls: Vec<ToolCall>,
}

impl ToolCallDocument {
    /// Creates a document from calls.
    pub fn new(tool_calls: Vec<ToolCall>) -> Self {
        Self { tool_calls }
    }

    /// Parses and validates a document with the default validator.
    ///
    /// # Example
    ///
    /// ```rust
    /// use volume_engine::ToolCallDocument;
    ///
    /// let doc = ToolCallDocument::from_json_str(r#"{"tool_calls": []}"#).unwrap();
    /// assert!(doc.is_empty());
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, ValidationError> {
        SchemaValidator::default().validate_str(text)
    }

    /// Number of calls.
    pub fn len(&self) -> usize {
        self.tool_calls.len()
    }

    /// Returns true if the document has no calls.
    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// A single validated call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Region the operation is scoped to
    pub volume: VolumeIdentifier,
    /// Operation with typed parameters
    pub operation: Operation,
}

impl ToolCall {
    /// Creates a call.
    pub fn new(volume: VolumeIdentifier, operation: Operation) -> Self {
        Self { volume, operation }
    }

    /// Registry name of the call's function.
    pub fn function(&self) -> FunctionName {
        self.operation.function()
    }
}

/// Names of every registered function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FunctionName {
    /// `extrude_faces_in_volume`
    ExtrudeFaces,
    /// `scale_vertices_in_volume`
    ScaleVertices,
    /// `transform_vertices_in_volume`
    TransformVertices,
    /// `apply_material_to_volume`
    ApplyMaterial,
    /// `deform_volume_lattice`
    DeformLattice,
    /// `subdivide_faces_in_volume`
    SubdivideFaces,
    /// `inset_faces_in_volume`
    InsetFaces,
}

impl FunctionName {
    /// Every function, in registry order.
    pub const ALL: [FunctionName; 7] = [
        FunctionName::ExtrudeFaces,
        FunctionName::ScaleVertices,
        FunctionName::TransformVertices,
        FunctionName::ApplyMaterial,
        FunctionName::DeformLattice,
        FunctionName::SubdivideFaces,
        FunctionName::InsetFaces,
    ];

    /// Document name of the function.
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionName::ExtrudeFaces => "extrude_faces_in_volume",
            FunctionName::ScaleVertices => "scale_vertices_in_volume",
            FunctionName::TransformVertices => "transform_vertices_in_volume",
            FunctionName::ApplyMaterial => "apply_material_to_volume",
            FunctionName::DeformLattice => "deform_volume_lattice",
            FunctionName::SubdivideFaces => "subdivide_faces_in_volume",
            FunctionName::InsetFaces => "inset_faces_in_volume",
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unregistered function name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown function '{0}'")]
pub struct UnknownFunctionName(pub String);

impl FromStr for FunctionName {
    type Err = UnknownFunctionName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionName::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFunctionName(s.to_string()))
    }
}

/// An operation with its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Region extrusion of selected faces
    ExtrudeFaces(ExtrudeParams),
    /// Scale of selected vertices in the volume frame
    ScaleVertices(ScaleParams),
    /// Affine transform of selected vertices about the volume center
    TransformVertices(TransformParams),
    /// Material assignment to selected faces
    ApplyMaterial(MaterialParams),
    /// Free-form lattice deformation of selected vertices
    DeformLattice(LatticeParams),
    /// Subdivision of selected faces
    SubdivideFaces(SubdivideParams),
    /// Individual inset of selected faces
    InsetFaces(InsetParams),
}

impl Operation {
    /// Registry name of the operation.
    pub fn function(&self) -> FunctionName {
        match self {
            Operation::ExtrudeFaces(_) => FunctionName::ExtrudeFaces,
            Operation::ScaleVertices(_) => FunctionName::ScaleVertices,
            Operation::TransformVertices(_) => FunctionName::TransformVertices,
            Operation::ApplyMaterial(_) => FunctionName::ApplyMaterial,
            Operation::DeformLattice(_) => FunctionName::DeformLattice,
            Operation::SubdivideFaces(_) => FunctionName::SubdivideFaces,
            Operation::InsetFaces(_) => FunctionName::InsetFaces,
        }
    }
}

/// Parameters of `extrude_faces_in_volume`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeParams {
    /// World-space offset of the extruded cap
    pub vector: DVec3,
}

/// Parameters of `scale_vertices_in_volume`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleParams {
    /// Per-axis factor in the volume's local frame
    pub factor: DVec3,
}

/// Parameters of `transform_vertices_in_volume`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    /// Affine matrix applied relative to the volume center
    pub matrix: DMat4,
}

/// Parameters of `apply_material_to_volume`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParams {
    /// Material to assign
    pub material_name: String,
}

/// Parameters of `deform_volume_lattice`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeParams {
    /// Linear map applied to every lattice corner
    pub matrix: DMat3,
    /// Local-space offset per corner, indexed `x | y << 1 | z << 2`
    pub offsets: [DVec3; 8],
}

/// Parameters of `subdivide_faces_in_volume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdivideParams {
    /// Number of subdivision passes
    pub level: u32,
}

/// Parameters of `inset_faces_in_volume`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsetParams {
    /// Fraction of the way each vertex moves toward its face centroid
    pub depth: f64,
}
