use glam::DVec3;
use serde_json::{json, Value};
use volume_engine::{
    run_document_str, CallStatus, DocumentStatus, EngineConfig, ErrorKind, ExecutionEngine,
    FailurePolicy, ViolationKind,
};
use volume_mesh::primitives::{create_cuboid, create_grid};
use volume_mesh::EditableMesh;

fn cube() -> EditableMesh {
    let mut mesh = create_cuboid(DVec3::splat(2.0), true).unwrap();
    mesh.register_material("Red");
    mesh.register_material("Glass");
    mesh
}

fn call(function: &str, volume: Value, extra: Value) -> Value {
    let mut parameters = json!({ "volume_identifier": volume });
    if let (Some(target), Value::Object(fields)) = (parameters.as_object_mut(), extra) {
        target.extend(fields);
    }
    json!({ "function_name": function, "parameters": parameters })
}

fn document(calls: Vec<Value>) -> Value {
    json!({ "tool_calls": calls })
}

fn everything() -> Value {
    json!({"type": "sphere", "center_xyz": [0, 0, 0], "radius": 50.0})
}

fn top_slab(z: f64) -> Value {
    json!({
        "type": "box",
        "center_xyz": [0, 0, z],
        "dimensions_xyz": [2.5, 2.5, 0.5],
        "rotation_quaternion_wxyz": [1, 0, 0, 0]
    })
}

#[test]
fn empty_document_completes_with_no_outcomes() {
    let mut mesh = cube();
    let result = ExecutionEngine::default().execute_json(&document(vec![]), &mut mesh);
    assert_eq!(result.status, DocumentStatus::Completed);
    assert!(result.outcomes.is_empty());
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn unknown_function_rejects_whole_document() {
    let mut mesh = cube();
    let version = mesh.version();
    let doc = document(vec![
        call("scale_vertices_in_volume", everything(), json!({"scale_factor": 2.0})),
        call("explode_volume", everything(), json!({})),
        call("apply_material_to_volume", everything(), json!({"material_name": "Red"})),
    ]);
    let result = ExecutionEngine::default().execute_json(&doc, &mut mesh);

    assert_eq!(result.status, DocumentStatus::ValidationFailed);
    assert_eq!(result.exit_code(), 1);
    assert!(result.violations.iter().any(|v| v.kind == ViolationKind::UnknownFunction));
    assert!(result.outcomes.iter().all(|o| o.status == CallStatus::ValidationFailed));
    assert_eq!(result.completed_count(), 0);
    assert_eq!(mesh.version(), version);
}

#[test]
fn degenerate_volume_is_reported() {
    let mut mesh = cube();
    let doc = document(vec![call(
        "scale_vertices_in_volume",
        json!({"type": "sphere", "center_xyz": [0, 0, 0], "radius": 0.0}),
        json!({}),
    )]);
    let result = ExecutionEngine::default().execute_json(&doc, &mut mesh);
    assert_eq!(result.status, DocumentStatus::ValidationFailed);
    let error = result.outcomes[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::DegenerateVolume);
}

#[test]
fn failing_second_call_aborts_third() {
    let mut mesh = cube();
    let doc = document(vec![
        call("apply_material_to_volume", everything(), json!({"material_name": "Red"})),
        call("apply_material_to_volume", everything(), json!({"material_name": "Chrome"})),
        call("scale_vertices_in_volume", everything(), json!({"scale_factor": 3.0})),
    ]);
    let result = ExecutionEngine::default().execute_json(&doc, &mut mesh);

    assert_eq!(result.status, DocumentStatus::ExecutionFailed);
    assert_eq!(result.exit_code(), 2);
    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.outcomes[0].status, CallStatus::Completed);
    assert_eq!(result.outcomes[1].status, CallStatus::ExecutionFailed);
    assert!(result.outcomes[1].error.as_ref().unwrap().message.contains("Chrome"));

    // Call 0 is kept, call 2 never ran
    assert!(mesh.faces().iter().all(|f| f.material.as_deref() == Some("Red")));
    assert_eq!(mesh.bounding_box().1, DVec3::ONE);
}

#[test]
fn continue_policy_runs_every_call() {
    let mut mesh = cube();
    let doc = document(vec![
        call("apply_material_to_volume", everything(), json!({"material_name": "Chrome"})),
        call("scale_vertices_in_volume", everything(), json!({"scale_factor": 3.0})),
    ]);
    let config = EngineConfig::default().with_failure_policy(FailurePolicy::Continue);
    let result = ExecutionEngine::new(config).execute_json(&doc, &mut mesh);

    assert_eq!(result.status, DocumentStatus::ExecutionFailed);
    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.outcomes[1].status, CallStatus::Completed);
    assert_eq!(mesh.bounding_box().1, DVec3::splat(3.0));
}

#[test]
fn material_application_is_idempotent() {
    let mut mesh = cube();
    let material = call("apply_material_to_volume", top_slab(1.0), json!({"material_name": "Glass"}));
    let mut engine = ExecutionEngine::default();

    let first = engine.execute_json(&document(vec![material.clone()]), &mut mesh);
    let materials: Vec<_> = mesh.faces().iter().map(|f| f.material.clone()).collect();
    let second = engine.execute_json(&document(vec![material]), &mut mesh);

    assert!(first.is_success() && second.is_success());
    assert_eq!(first.outcomes[0].selection_size, second.outcomes[0].selection_size);
    let again: Vec<_> = mesh.faces().iter().map(|f| f.material.clone()).collect();
    assert_eq!(materials, again);
    assert_eq!(materials.iter().filter(|m| m.is_some()).count(), 1);
}

#[test]
fn later_calls_see_earlier_mutations() {
    let mut mesh = cube();
    let doc = document(vec![
        call("extrude_faces_in_volume", top_slab(1.0), json!({"extrude_vector": [0, 0, 2]})),
        call("apply_material_to_volume", top_slab(3.0), json!({"material_name": "Red"})),
    ]);
    let result = ExecutionEngine::default().execute_json(&doc, &mut mesh);

    assert!(result.is_success(), "{result}");
    assert_eq!(result.outcomes[1].selection_size, 4);
    assert_eq!(mesh.face(1).material.as_deref(), Some("Red"));
    mesh.validate().unwrap();
}

#[test]
fn row_major_transform_translates() {
    let mut mesh = cube();
    let doc = document(vec![call(
        "transform_vertices_in_volume",
        top_slab(1.0),
        json!({"transform_matrix": [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 5], [0, 0, 0, 1]]}),
    )]);
    let result = ExecutionEngine::default().execute_json(&doc, &mut mesh);
    assert!(result.is_success(), "{result}");
    assert_eq!(mesh.bounding_box().1.z, 6.0);
    assert_eq!(mesh.bounding_box().0.z, -1.0);
}

#[test]
fn topology_edits_keep_mesh_valid() {
    let mut mesh = create_grid(4.0, 4.0, 4, 4).unwrap();
    let patch = json!({
        "type": "cylinder",
        "center_xyz": [0, 0, 0],
        "radius": 1.5,
        "height": 1.0
    });
    let doc = document(vec![
        call("subdivide_faces_in_volume", patch.clone(), json!({"subdivision_level": 2})),
        call("inset_faces_in_volume", patch.clone(), json!({"inset_depth": 0.25})),
        call("extrude_faces_in_volume", patch, json!({})),
        call(
            "deform_volume_lattice",
            everything(),
            json!({"deformation_matrix": [[1, 0, 0], [0, 1, 0], [0, 0, 2]]}),
        ),
    ]);
    let result = ExecutionEngine::default().execute_json(&doc, &mut mesh);

    assert!(result.is_success(), "{result}");
    assert!(result.outcomes.iter().all(|o| o.selection_size > 0));
    mesh.validate().unwrap();
}

#[test]
fn result_serializes_for_machines() {
    let mut mesh = cube();
    let doc = document(vec![call(
        "apply_material_to_volume",
        everything(),
        json!({"material_name": "Chrome"}),
    )]);
    let result = ExecutionEngine::default().execute_json(&doc, &mut mesh);
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["status"], "execution_failed");
    assert_eq!(value["outcomes"][0]["error"]["kind"], "execution_failure");
    assert_eq!(value["outcomes"][0]["error"]["call_index"], 0);
}

#[test]
fn text_entry_point_handles_bad_json() {
    let mut mesh = cube();
    let result = run_document_str("{\"tool_calls\": [", &mut mesh);
    assert_eq!(result.status, DocumentStatus::ValidationFailed);
    assert_eq!(result.violations[0].kind, ViolationKind::Malformed);
}
