//! # Volume Engine
//!
//! Executes structured tool-call documents against a host mesh, with every
//! operation scoped to a 3D volume.
//!
//! ## Architecture
//!
//! ```text
//! JSON document → SchemaValidator → ToolCallDocument
//!                                         ↓ (per call, in order)
//!            VolumeIdentifier → ResolvedVolume → SpatialIndex → SelectionResult
//!                                         ↓
//!                      handler (ops/*) → MeshMutation → MeshHandle
//!                                         ↓
//!                                  DocumentResult
//! ```
//!
//! ## Functions
//!
//! - **extrude_faces_in_volume**: region extrusion
//! - **scale_vertices_in_volume**: scale in the volume frame
//! - **transform_vertices_in_volume**: affine transform about the volume center
//! - **apply_material_to_volume**: material assignment
//! - **deform_volume_lattice**: 2×2×2 free-form lattice
//! - **subdivide_faces_in_volume**: centroid/midpoint quad subdivision
//! - **inset_faces_in_volume**: individual face inset
//!
//! ## Usage
//!
//! ```rust
//! use volume_engine::run_document_str;
//! use volume_mesh::primitives::create_cuboid;
//! use glam::DVec3;
//!
//! let mut mesh = create_cuboid(DVec3::splat(2.0), true).unwrap();
//! let result = run_document_str(r#"{"tool_calls": [{
//!     "function_name": "scale_vertices_in_volume",
//!     "parameters": {
//!         "volume_identifier": {"type": "sphere", "center_xyz": [0, 0, 0], "radius": 5.0},
//!         "scale_factor": 2.0
//!     }
//! }]}"#, &mut mesh);
//!
//! assert_eq!(result.exit_code(), 0);
//! assert_eq!(mesh.bounding_box().1, DVec3::splat(2.0));
//! ```

pub mod document;
pub mod engine;
pub mod error;
pub mod ops;
pub mod preview;
pub mod registry;
pub mod report;
pub mod schema;
pub mod selection;
pub mod spatial_index;
pub mod volume;

pub use document::{FunctionName, Operation, ToolCall, ToolCallDocument};
pub use engine::{CancellationFlag, EngineConfig, ExecutionEngine, FailurePolicy};
pub use error::{CallError, ErrorKind, ExecutionError, ValidationError, Violation, ViolationKind};
pub use report::{CallOutcome, CallStatus, DocumentResult, DocumentStatus, ResultReporter};
pub use schema::SchemaValidator;
pub use selection::SelectionResult;
pub use volume::{ResolvedVolume, VolumeIdentifier};

use volume_mesh::MeshHandle;

/// Validates and runs a document given as JSON text with default settings.
///
/// This is the main entry point for one-shot use. Keep an
/// [`ExecutionEngine`] around instead when running several documents
/// against the same mesh, so the spatial index is reused.
pub fn run_document_str<M: MeshHandle>(text: &str, mesh: &mut M) -> DocumentResult {
    ExecutionEngine::default().execute_str(text, mesh)
}
