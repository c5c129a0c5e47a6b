//! # Tool Registry
//!
//! Static description of every function a document may call: its parameter
//! shape, what it selects and whether it changes topology.
//!
//! The validator checks parameters against these shapes and the schema
//! exporter renders them. Dispatch itself is a `match` on
//! [`Operation`](crate::document::Operation) in [`crate::ops`].

use crate::document::{
    ExtrudeParams, FunctionName, InsetParams, LatticeParams, MaterialParams, Operation,
    ScaleParams, SubdivideParams, TransformParams,
};
use config::constants::{
    DEFAULT_EXTRUDE_VECTOR, DEFAULT_INSET_DEPTH, DEFAULT_SCALE_FACTOR, DEFAULT_SUBDIVISION_LEVEL,
    MAX_SUBDIVISION_LEVEL,
};
use glam::{DMat3, DMat4, DVec3};
use std::collections::BTreeMap;

/// What a handler operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    /// Selected vertices
    Vertices,
    /// Selected faces
    Faces,
}

/// Accepted shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    /// `[x, y, z]` of finite numbers
    Vector3 {
        /// Reject vectors shorter than the minimum length
        nonzero: bool,
    },
    /// Positive number or `[x, y, z]` of positive numbers
    ScaleFactor,
    /// 4x4 row-major affine matrix with bottom row `[0, 0, 0, 1]`
    Matrix4Affine,
    /// 3x3 row-major invertible matrix
    Matrix3Invertible,
    /// Non-empty string
    Name,
    /// Integer within inclusive bounds
    Integer {
        /// Lowest accepted value
        min: i64,
        /// Highest accepted value
        max: i64,
    },
    /// Number strictly between 0 and 1
    OpenFraction,
    /// Eight `[x, y, z]` offsets
    LatticeOffsets,
}

/// Declared parameter of a function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    /// Field name inside `parameters`
    pub name: &'static str,
    /// Accepted shape
    pub kind: ParameterKind,
    /// Whether the field must be present
    pub required: bool,
    /// One-line description used in the exported schema
    pub description: &'static str,
}

/// Registry entry of a function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSpec {
    /// Function name
    pub name: FunctionName,
    /// One-line description used in the exported schema
    pub description: &'static str,
    /// What the handler consumes from the selection
    pub target: SelectionTarget,
    /// Whether the handler adds or replaces faces
    pub mutates_topology: bool,
    /// Handler-specific parameters (the volume identifier is implicit)
    pub parameters: &'static [ParameterSpec],
}

impl ToolSpec {
    /// Finds a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&'static ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

const EXTRUDE_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "extrude_vector",
    kind: ParameterKind::Vector3 { nonzero: true },
    required: false,
    description: "World-space extrusion offset, default [0, 0, 1]",
}];

const SCALE_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "scale_factor",
    kind: ParameterKind::ScaleFactor,
    required: false,
    description: "Uniform factor or per-axis [x, y, z] in the volume frame, default 1.0",
}];

const TRANSFORM_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "transform_matrix",
    kind: ParameterKind::Matrix4Affine,
    required: false,
    description: "Row-major 4x4 affine matrix applied about the volume center, default identity",
}];

const MATERIAL_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "material_name",
    kind: ParameterKind::Name,
    required: true,
    description: "Name of a material known to the host mesh",
}];

const LATTICE_PARAMS: &[ParameterSpec] = &[
    ParameterSpec {
        name: "deformation_matrix",
        kind: ParameterKind::Matrix3Invertible,
        required: false,
        description: "Row-major 3x3 matrix applied to the lattice corners, default identity",
    },
    ParameterSpec {
        name: "control_point_offsets",
        kind: ParameterKind::LatticeOffsets,
        required: false,
        description: "Eight local-space corner offsets indexed x | y<<1 | z<<2, default zeros",
    },
];

const SUBDIVIDE_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "subdivision_level",
    kind: ParameterKind::Integer {
        min: 1,
        max: MAX_SUBDIVISION_LEVEL as i64,
    },
    required: false,
    description: "Number of subdivision passes, default 1",
}];

const INSET_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "inset_depth",
    kind: ParameterKind::OpenFraction,
    required: false,
    description: "Fraction each vertex moves toward its face centroid, default 0.1",
}];

/// Every registered function.
pub static TOOLS: [ToolSpec; 7] = [
    ToolSpec {
        name: FunctionName::ExtrudeFaces,
        description: "Extrude the faces inside a volume along a vector",
        target: SelectionTarget::Faces,
        mutates_topology: true,
        parameters: EXTRUDE_PARAMS,
    },
    ToolSpec {
        name: FunctionName::ScaleVertices,
        description: "Scale the vertices inside a volume about its center",
        target: SelectionTarget::Vertices,
        mutates_topology: false,
        parameters: SCALE_PARAMS,
    },
    ToolSpec {
        name: FunctionName::TransformVertices,
        description: "Apply an affine transform to the vertices inside a volume",
        target: SelectionTarget::Vertices,
        mutates_topology: false,
        parameters: TRANSFORM_PARAMS,
    },
    ToolSpec {
        name: FunctionName::ApplyMaterial,
        description: "Assign a material to the faces inside a volume",
        target: SelectionTarget::Faces,
        mutates_topology: false,
        parameters: MATERIAL_PARAMS,
    },
    ToolSpec {
        name: FunctionName::DeformLattice,
        description: "Deform the vertices inside a volume with a 2x2x2 lattice",
        target: SelectionTarget::Vertices,
        mutates_topology: false,
        parameters: LATTICE_PARAMS,
    },
    ToolSpec {
        name: FunctionName::SubdivideFaces,
        description: "Subdivide the faces inside a volume into quads",
        target: SelectionTarget::Faces,
        mutates_topology: true,
        parameters: SUBDIVIDE_PARAMS,
    },
    ToolSpec {
        name: FunctionName::InsetFaces,
        description: "Inset the faces inside a volume toward their centroids",
        target: SelectionTarget::Faces,
        mutates_topology: true,
        parameters: INSET_PARAMS,
    },
];

/// Looks up a function by its document name.
pub fn lookup(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name.as_str() == name)
}

impl FunctionName {
    /// Registry entry of the function.
    pub fn spec(self) -> &'static ToolSpec {
        // TOOLS is declared in FunctionName::ALL order
        &TOOLS[self as usize]
    }
}

/// A checked parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Three-component vector (also a per-axis scale)
    Vector(DVec3),
    /// 4x4 matrix
    Matrix4(DMat4),
    /// 3x3 matrix
    Matrix3(DMat3),
    /// String value
    Name(String),
    /// Integer value
    Integer(i64),
    /// Scalar value
    Number(f64),
    /// Eight lattice offsets
    Offsets([DVec3; 8]),
}

/// Checked parameters of one call, keyed by name.
pub type ParamValues = BTreeMap<&'static str, ParamValue>;

/// Builds the typed operation for a function, filling in defaults for
/// omitted optional parameters.
pub fn build_operation(function: FunctionName, mut values: ParamValues) -> Operation {
    let mut take = |name: &str| values.remove(name);

    match function {
        FunctionName::ExtrudeFaces => Operation::ExtrudeFaces(ExtrudeParams {
            vector: match take("extrude_vector") {
                Some(ParamValue::Vector(v)) => v,
                _ => DVec3::from_array(DEFAULT_EXTRUDE_VECTOR),
            },
        }),
        FunctionName::ScaleVertices => Operation::ScaleVertices(ScaleParams {
            factor: match take("scale_factor") {
                Some(ParamValue::Vector(v)) => v,
                Some(ParamValue::Number(s)) => DVec3::splat(s),
                _ => DVec3::splat(DEFAULT_SCALE_FACTOR),
            },
        }),
        FunctionName::TransformVertices => Operation::TransformVertices(TransformParams {
            matrix: match take("transform_matrix") {
                Some(ParamValue::Matrix4(m)) => m,
                _ => DMat4::IDENTITY,
            },
        }),
        FunctionName::ApplyMaterial => Operation::ApplyMaterial(MaterialParams {
            material_name: match take("material_name") {
                Some(ParamValue::Name(name)) => name,
                _ => String::new(),
            },
        }),
        FunctionName::DeformLattice => Operation::DeformLattice(LatticeParams {
            matrix: match take("deformation_matrix") {
                Some(ParamValue::Matrix3(m)) => m,
                _ => DMat3::IDENTITY,
            },
            offsets: match take("control_point_offsets") {
                Some(ParamValue::Offsets(o)) => o,
                _ => [DVec3::ZERO; 8],
            },
        }),
        FunctionName::SubdivideFaces => Operation::SubdivideFaces(SubdivideParams {
            level: match take("subdivision_level") {
                Some(ParamValue::Integer(level)) => level as u32,
                _ => DEFAULT_SUBDIVISION_LEVEL,
            },
        }),
        FunctionName::InsetFaces => Operation::InsetFaces(InsetParams {
            depth: match take("inset_depth") {
                Some(ParamValue::Number(d)) => d,
                _ => DEFAULT_INSET_DEPTH,
            },
        }),
    }
}

/// Parameter values carried by a typed operation, keyed by field name.
///
/// Inverse of [`build_operation`]: every field is present, defaults included.
pub fn operation_values(operation: &Operation) -> ParamValues {
    let mut values = ParamValues::new();
    match operation {
        Operation::ExtrudeFaces(p) => {
            values.insert("extrude_vector", ParamValue::Vector(p.vector));
        }
        Operation::ScaleVertices(p) => {
            values.insert("scale_factor", ParamValue::Vector(p.factor));
        }
        Operation::TransformVertices(p) => {
            values.insert("transform_matrix", ParamValue::Matrix4(p.matrix));
        }
        Operation::ApplyMaterial(p) => {
            values.insert("material_name", ParamValue::Name(p.material_name.clone()));
        }
        Operation::DeformLattice(p) => {
            values.insert("deformation_matrix", ParamValue::Matrix3(p.matrix));
            values.insert("control_point_offsets", ParamValue::Offsets(p.offsets));
        }
        Operation::SubdivideFaces(p) => {
            values.insert("subdivision_level", ParamValue::Integer(i64::from(p.level)));
        }
        Operation::InsetFaces(p) => {
            values.insert("inset_depth", ParamValue::Number(p.depth));
        }
    }
    values
}
