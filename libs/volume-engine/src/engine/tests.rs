use super::*;
use crate::document::{MaterialParams, Operation, ScaleParams, ToolCall};
use crate::report::CallStatus;
use crate::volume::VolumeIdentifier;
use glam::DVec3;
use volume_mesh::primitives::create_cuboid;
use volume_mesh::{EditableMesh, Face, MeshError, MeshMutation};

fn cube() -> EditableMesh {
    let mut mesh = create_cuboid(DVec3::splat(2.0), true).unwrap();
    mesh.register_material("Glass");
    mesh
}

fn everything() -> VolumeIdentifier {
    VolumeIdentifier::Sphere {
        center: DVec3::ZERO,
        radius: 5.0,
    }
}

fn material(name: &str) -> ToolCall {
    ToolCall::new(
        everything(),
        Operation::ApplyMaterial(MaterialParams {
            material_name: name.to_string(),
        }),
    )
}

fn scale(factor: f64) -> ToolCall {
    ToolCall::new(
        everything(),
        Operation::ScaleVertices(ScaleParams {
            factor: DVec3::splat(factor),
        }),
    )
}

/// Host that refuses every mutation.
struct ReadOnlyMesh(EditableMesh);

impl MeshHandle for ReadOnlyMesh {
    fn vertex_positions(&self) -> &[DVec3] {
        self.0.vertex_positions()
    }

    fn faces(&self) -> &[Face] {
        self.0.faces()
    }

    fn version(&self) -> u64 {
        self.0.version()
    }

    fn has_material(&self, name: &str) -> bool {
        self.0.has_material(name)
    }

    fn apply_mutation(&mut self, _mutation: &MeshMutation) -> Result<(), MeshError> {
        Err(MeshError::invalid_topology("read-only mesh"))
    }
}

/// Host whose material lookup panics.
struct PanickingMesh(EditableMesh);

impl MeshHandle for PanickingMesh {
    fn vertex_positions(&self) -> &[DVec3] {
        self.0.vertex_positions()
    }

    fn faces(&self) -> &[Face] {
        self.0.faces()
    }

    fn version(&self) -> u64 {
        self.0.version()
    }

    fn has_material(&self, _name: &str) -> bool {
        panic!("material table corrupted")
    }

    fn apply_mutation(&mut self, mutation: &MeshMutation) -> Result<(), MeshError> {
        self.0.apply_mutation(mutation)
    }
}

#[test]
fn test_config_defaults_come_from_constants() {
    let config = EngineConfig::default();
    assert_eq!(config.failure_policy, FailurePolicy::Abort);
    assert_eq!(config.quaternion_tolerance, QUATERNION_NORM_TOLERANCE);
    assert_eq!(config.parallel_threshold, PARALLEL_SELECTION_THRESHOLD);
    assert_eq!(config.scene_bounds_margin, Some(SCENE_BOUNDS_MARGIN));
}

#[test]
fn test_config_builders() {
    let config = EngineConfig::default()
        .with_failure_policy(FailurePolicy::Continue)
        .with_quaternion_tolerance(1e-3)
        .with_parallel_threshold(1)
        .with_scene_bounds_margin(None);
    assert_eq!(config.failure_policy, FailurePolicy::Continue);
    assert_eq!(config.validator().quaternion_tolerance(), 1e-3);
    assert_eq!(config.parallel_threshold, 1);
    assert_eq!(config.scene_bounds_margin, None);
}

#[test]
fn test_empty_document_completes() {
    let mut mesh = cube();
    let result = ExecutionEngine::default().execute(&ToolCallDocument::default(), &mut mesh);
    assert_eq!(result.status, DocumentStatus::Completed);
    assert!(result.outcomes.is_empty());
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn test_empty_selection_is_completed_noop() {
    let mut mesh = cube();
    let version = mesh.version();
    let call = ToolCall::new(
        VolumeIdentifier::Sphere {
            center: DVec3::splat(3.0),
            radius: 0.5,
        },
        Operation::ApplyMaterial(MaterialParams {
            material_name: "Glass".into(),
        }),
    );
    let result = ExecutionEngine::default().execute(&ToolCallDocument::new(vec![call]), &mut mesh);
    assert_eq!(result.status, DocumentStatus::Completed);
    assert_eq!(result.outcomes[0].selection_size, 0);
    assert_eq!(mesh.version(), version);
}

#[test]
fn test_index_is_reused_until_mesh_changes() {
    let mut mesh = cube();
    let mut engine = ExecutionEngine::default();
    let document = ToolCallDocument::new(vec![material("Glass"), material("Glass"), material("Glass")]);
    let result = engine.execute(&document, &mut mesh);
    assert!(result.is_success());
    // The first assignment bumps the version; the repeats are no-ops
    assert_eq!(engine.index_builds(), 2);
}

#[test]
fn test_abort_stops_at_first_failure() {
    let mut mesh = cube();
    let document = ToolCallDocument::new(vec![scale(2.0), material("Missing"), scale(0.5)]);
    let result = ExecutionEngine::default().execute(&document, &mut mesh);

    assert_eq!(result.status, DocumentStatus::ExecutionFailed);
    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.outcomes[1].status, CallStatus::ExecutionFailed);
    let error = result.outcomes[1].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::ExecutionFailure);
    assert_eq!(error.call_index, 1);
    // Call 0 kept its effect, call 2 never ran
    assert_eq!(mesh.bounding_box().1, DVec3::splat(2.0));
}

#[test]
fn test_continue_runs_remaining_calls() {
    let mut mesh = cube();
    let document = ToolCallDocument::new(vec![scale(2.0), material("Missing"), scale(0.5)]);
    let config = EngineConfig::default().with_failure_policy(FailurePolicy::Continue);
    let result = ExecutionEngine::new(config).execute(&document, &mut mesh);

    assert_eq!(result.status, DocumentStatus::ExecutionFailed);
    assert_eq!(result.outcomes.len(), 3);
    assert_eq!(result.completed_count(), 2);
    assert_eq!(mesh.bounding_box().1, DVec3::ONE);
}

#[test]
fn test_rejected_mutation_is_engine_fault_even_when_continuing() {
    let mut mesh = ReadOnlyMesh(cube());
    let document = ToolCallDocument::new(vec![scale(2.0), scale(3.0)]);
    let config = EngineConfig::default().with_failure_policy(FailurePolicy::Continue);
    let result = ExecutionEngine::new(config).execute(&document, &mut mesh);

    assert_eq!(result.status, DocumentStatus::ExecutionFailed);
    assert_eq!(result.outcomes.len(), 1);
    let error = result.outcomes[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::EngineFault);
    assert!(error.message.contains("read-only mesh"));
}

#[test]
fn test_handler_panic_is_engine_fault() {
    let mut mesh = PanickingMesh(cube());
    let document = ToolCallDocument::new(vec![material("Glass"), scale(2.0)]);
    let config = EngineConfig::default().with_failure_policy(FailurePolicy::Continue);
    let result = ExecutionEngine::new(config).execute(&document, &mut mesh);

    assert_eq!(result.outcomes.len(), 1);
    let error = result.outcomes[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::EngineFault);
    assert!(error.message.contains("material table corrupted"));
}

#[test]
fn test_cancelled_before_start() {
    let mut mesh = cube();
    let flag = CancellationFlag::new();
    flag.cancel();
    let document = ToolCallDocument::new(vec![scale(2.0)]);
    let result = ExecutionEngine::default().execute_with_cancellation(&document, &mut mesh, &flag);

    assert_eq!(result.status, DocumentStatus::Cancelled);
    assert!(result.outcomes.is_empty());
    assert_eq!(result.exit_code(), 3);
    assert_eq!(mesh.bounding_box().1, DVec3::ONE);
}

#[test]
fn test_cancellation_flag_is_shared() {
    let flag = CancellationFlag::new();
    let other = flag.clone();
    assert!(!flag.is_cancelled());
    other.cancel();
    assert!(flag.is_cancelled());
}

#[test]
fn test_far_volume_gets_warning() {
    let mut mesh = cube();
    let call = ToolCall::new(
        VolumeIdentifier::Sphere {
            center: DVec3::new(100.0, 0.0, 0.0),
            radius: 1.0,
        },
        Operation::ScaleVertices(ScaleParams {
            factor: DVec3::splat(2.0),
        }),
    );
    let result = ExecutionEngine::default().execute(&ToolCallDocument::new(vec![call.clone()]), &mut mesh);
    assert_eq!(result.status, DocumentStatus::Completed);
    assert_eq!(result.outcomes[0].warnings.len(), 1);

    let config = EngineConfig::default().with_scene_bounds_margin(None);
    let result = ExecutionEngine::new(config).execute(&ToolCallDocument::new(vec![call]), &mut mesh);
    assert!(result.outcomes[0].warnings.is_empty());
}

#[test]
fn test_hand_built_document_is_checked_before_running() {
    let mut mesh = cube();
    let version = mesh.version();
    let tilted = ToolCall::new(
        VolumeIdentifier::Box {
            center: DVec3::ZERO,
            dimensions: DVec3::splat(4.0),
            rotation: [2.0, 0.0, 0.0, 0.0],
        },
        Operation::ScaleVertices(ScaleParams {
            factor: DVec3::splat(1.5),
        }),
    );
    let inverted = ToolCall::new(
        VolumeIdentifier::Sphere {
            center: DVec3::ZERO,
            radius: -1.0,
        },
        Operation::ScaleVertices(ScaleParams {
            factor: DVec3::splat(-3.0),
        }),
    );
    let document = ToolCallDocument::new(vec![tilted, inverted]);
    let result = ExecutionEngine::default().execute(&document, &mut mesh);

    assert_eq!(result.status, DocumentStatus::ValidationFailed);
    assert_eq!(result.exit_code(), 1);
    assert_eq!(result.violations.len(), 3);
    assert_eq!(result.outcomes.len(), 2);
    assert!(result.outcomes.iter().all(|o| o.function == "scale_vertices_in_volume"));
    assert_eq!(
        result.outcomes[0].error.as_ref().map(|e| e.kind),
        Some(ErrorKind::SchemaViolation)
    );
    assert_eq!(
        result.outcomes[1].error.as_ref().map(|e| e.kind),
        Some(ErrorKind::DegenerateVolume)
    );
    assert_eq!(mesh.version(), version);
    assert_eq!(mesh.bounding_box().1, DVec3::ONE);
}

#[test]
fn test_cancellable_execution_checks_document_too() {
    let mut mesh = cube();
    let flag = CancellationFlag::new();
    let call = ToolCall::new(
        VolumeIdentifier::Cylinder {
            center: DVec3::ZERO,
            radius: 1.0,
            height: 0.0,
            rotation: [1.0, 0.0, 0.0, 0.0],
        },
        Operation::ScaleVertices(ScaleParams {
            factor: DVec3::splat(2.0),
        }),
    );
    let result = ExecutionEngine::default().execute_with_cancellation(
        &ToolCallDocument::new(vec![call]),
        &mut mesh,
        &flag,
    );
    assert_eq!(result.status, DocumentStatus::ValidationFailed);
    assert_eq!(mesh.bounding_box().1, DVec3::ONE);
}

#[test]
fn test_execute_json_reports_violations() {
    let mut mesh = cube();
    let value = serde_json::json!({"tool_calls": [{
        "function_name": "melt_volume",
        "parameters": {
            "volume_identifier": {"type": "sphere", "center_xyz": [0, 0, 0], "radius": 1.0}
        }
    }]});
    let result = ExecutionEngine::default().execute_json(&value, &mut mesh);
    assert_eq!(result.status, DocumentStatus::ValidationFailed);
    assert_eq!(result.exit_code(), 1);
    assert_eq!(result.outcomes[0].function, "melt_volume");
    assert_eq!(result.outcomes[0].status, CallStatus::ValidationFailed);
}

#[test]
fn test_execute_str_rejects_bad_json() {
    let mut mesh = cube();
    let result = ExecutionEngine::default().execute_str("{not json", &mut mesh);
    assert_eq!(result.status, DocumentStatus::ValidationFailed);
    assert_eq!(result.violations[0].kind, ViolationKind::Malformed);
    assert!(result.outcomes.is_empty());
}

#[test]
fn test_execute_json_uses_configured_tolerance() {
    let mut mesh = cube();
    let value = serde_json::json!({"tool_calls": [{
        "function_name": "apply_material_to_volume",
        "parameters": {
            "volume_identifier": {
                "type": "box",
                "center_xyz": [0, 0, 0],
                "dimensions_xyz": [4, 4, 4],
                "rotation_quaternion_wxyz": [0.966, 0.0, 0.259, 0.0]
            },
            "material_name": "Glass"
        }
    }]});

    let strict = ExecutionEngine::default().execute_json(&value, &mut mesh);
    assert_eq!(strict.status, DocumentStatus::ValidationFailed);

    let config = EngineConfig::default().with_quaternion_tolerance(1e-3);
    let lenient = ExecutionEngine::new(config).execute_json(&value, &mut mesh);
    assert_eq!(lenient.status, DocumentStatus::Completed);
}
