//! JSON Schema export for tool-call documents.
//!
//! Rendered from the registry so the schema given to document producers
//! always matches what the validator accepts.

use super::{AXIS_ROTATION_FIELD, ROTATION_FIELD, VOLUME_FIELD};
use crate::registry::{ParameterKind, ToolSpec, TOOLS};
use serde_json::{json, Map, Value};

fn vec3_schema() -> Value {
    json!({
        "type": "array",
        "items": {"type": "number"},
        "minItems": 3,
        "maxItems": 3
    })
}

fn matrix_schema(n: usize) -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "array",
            "items": {"type": "number"},
            "minItems": n,
            "maxItems": n
        },
        "minItems": n,
        "maxItems": n
    })
}

fn quaternion_schema() -> Value {
    json!({
        "type": "array",
        "items": {"type": "number"},
        "minItems": 4,
        "maxItems": 4,
        "description": "Unit quaternion [w, x, y, z], default identity"
    })
}

fn positive_schema() -> Value {
    json!({"type": "number", "exclusiveMinimum": 0})
}

fn volume_schema() -> Value {
    json!({
        "oneOf": [
            {
                "type": "object",
                "additionalProperties": false,
                "required": ["type", "center_xyz", "dimensions_xyz"],
                "properties": {
                    "type": {"const": "box"},
                    "center_xyz": {"$ref": "#/$defs/vec3"},
                    "dimensions_xyz": {
                        "type": "array",
                        "items": positive_schema(),
                        "minItems": 3,
                        "maxItems": 3
                    },
                    ROTATION_FIELD: {"$ref": "#/$defs/quaternion"}
                }
            },
            {
                "type": "object",
                "additionalProperties": false,
                "required": ["type", "center_xyz", "radius"],
                "properties": {
                    "type": {"const": "sphere"},
                    "center_xyz": {"$ref": "#/$defs/vec3"},
                    "radius": positive_schema()
                }
            },
            {
                "type": "object",
                "additionalProperties": false,
                "required": ["type", "center_xyz", "radius", "height"],
                "properties": {
                    "type": {"const": "cylinder"},
                    "center_xyz": {"$ref": "#/$defs/vec3"},
                    "radius": positive_schema(),
                    "height": positive_schema(),
                    ROTATION_FIELD: {"$ref": "#/$defs/quaternion"},
                    AXIS_ROTATION_FIELD: {"$ref": "#/$defs/quaternion"}
                }
            }
        ]
    })
}

fn kind_schema(kind: ParameterKind) -> Value {
    match kind {
        ParameterKind::Vector3 { .. } => json!({"$ref": "#/$defs/vec3"}),
        ParameterKind::ScaleFactor => json!({
            "oneOf": [
                positive_schema(),
                {"type": "array", "items": positive_schema(), "minItems": 3, "maxItems": 3}
            ]
        }),
        ParameterKind::Matrix4Affine => matrix_schema(4),
        ParameterKind::Matrix3Invertible => matrix_schema(3),
        ParameterKind::Name => json!({"type": "string", "minLength": 1}),
        ParameterKind::Integer { min, max } => {
            json!({"type": "integer", "minimum": min, "maximum": max})
        }
        ParameterKind::OpenFraction => {
            json!({"type": "number", "exclusiveMinimum": 0, "exclusiveMaximum": 1})
        }
        ParameterKind::LatticeOffsets => json!({
            "type": "array",
            "items": {"$ref": "#/$defs/vec3"},
            "minItems": 8,
            "maxItems": 8
        }),
    }
}

fn parameters_schema(tool: &ToolSpec) -> Value {
    let mut properties = Map::new();
    let mut required = vec![json!(VOLUME_FIELD)];

    properties.insert(
        VOLUME_FIELD.to_string(),
        json!({"$ref": "#/$defs/volume_identifier"}),
    );

    for param in tool.parameters {
        let mut prop = kind_schema(param.kind);
        if let Some(map) = prop.as_object_mut() {
            map.insert("description".to_string(), json!(param.description));
        }
        properties.insert(param.name.to_string(), prop);

        if param.required {
            required.push(json!(param.name));
        }
    }

    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
        "required": required,
    })
}

/// Tool definitions in the `{name, description, input_schema}` shape used by
/// tool-calling model APIs, one per registered function.
pub fn tool_schemas() -> Vec<Value> {
    TOOLS
        .iter()
        .map(|tool| {
            let mut schema = parameters_schema(tool);
            if let Some(map) = schema.as_object_mut() {
                map.insert("$defs".to_string(), defs());
            }
            json!({
                "name": tool.name.as_str(),
                "description": tool.description,
                "input_schema": schema,
            })
        })
        .collect()
}

fn defs() -> Value {
    json!({
        "vec3": vec3_schema(),
        "quaternion": quaternion_schema(),
        "volume_identifier": volume_schema(),
    })
}

/// JSON Schema (draft 2020-12) for a whole tool-call document.
pub fn json_schema() -> Value {
    let calls: Vec<Value> = TOOLS
        .iter()
        .map(|tool| {
            json!({
                "type": "object",
                "description": tool.description,
                "additionalProperties": false,
                "required": ["function_name", "parameters"],
                "properties": {
                    "function_name": {"const": tool.name.as_str()},
                    "parameters": parameters_schema(tool),
                }
            })
        })
        .collect();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "ToolCallDocument",
        "type": "object",
        "additionalProperties": false,
        "required": ["tool_calls"],
        "properties": {
            "tool_calls": {
                "type": "array",
                "items": {"oneOf": calls}
            }
        },
        "$defs": defs(),
    })
}
