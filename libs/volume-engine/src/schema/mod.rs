//! # Schema Validation
//!
//! Turns raw JSON into a typed [`ToolCallDocument`] or a list of every
//! violation found.
//!
//! Validation is total and fails closed:
//!
//! - every problem in the document is reported, not just the first
//! - fields the schema does not declare are violations
//! - a document is accepted only if it has no violations at all
//!
//! Handler parameters are checked against the shapes declared in the
//! [registry](crate::registry). The same range checks run again through
//! [`SchemaValidator::check`] on documents that were built in code.
//!
//! Violation paths are rooted at `$`, e.g.
//! `$.tool_calls[1].parameters.volume_identifier.center_xyz[2]`.

mod export;


pub use export::{json_schema, tool_schemas};

use crate::document::{FunctionName, ToolCall, ToolCallDocument};
use crate::error::{ValidationError, Violation, ViolationKind};
use crate::registry::{
    build_operation, operation_values, ParamValue, ParamValues, ParameterKind, ToolSpec,
};
use crate::volume::{VolumeIdentifier, IDENTITY_WXYZ};
use config::constants::{
    is_degenerate_extent, AFFINE_ROW_TOLERANCE, MIN_DEFORMATION_DETERMINANT, MIN_EXTRUDE_LENGTH,
    QUATERNION_NORM_TOLERANCE,
};
use glam::{DMat3, DMat4, DVec3};
use serde_json::{Map, Value};

/// Field holding the volume inside `parameters`.
pub const VOLUME_FIELD: &str = "volume_identifier";

/// Quaternion field of boxes and cylinders.
pub const ROTATION_FIELD: &str = "rotation_quaternion_wxyz";

/// Accepted alias of [`ROTATION_FIELD`] on cylinders.
pub const AXIS_ROTATION_FIELD: &str = "axis_quaternion_wxyz";

const BOX_FIELDS: &[&str] = &["type", "center_xyz", "dimensions_xyz", ROTATION_FIELD];
const SPHERE_FIELDS: &[&str] = &["type", "center_xyz", "radius"];
const CYLINDER_FIELDS: &[&str] = &[
    "type",
    "center_xyz",
    "radius",
    "height",
    ROTATION_FIELD,
    AXIS_ROTATION_FIELD,
];

/// Validates tool-call documents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaValidator {
    quaternion_tolerance: f64,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self {
            quaternion_tolerance: QUATERNION_NORM_TOLERANCE,
        }
    }
}

impl SchemaValidator {
    /// Creates a validator with the default quaternion tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the accepted deviation of quaternion norms from 1.
    pub fn with_quaternion_tolerance(mut self, tolerance: f64) -> Self {
        self.quaternion_tolerance = tolerance;
        self
    }

    /// Accepted deviation of quaternion norms from 1.
    pub fn quaternion_tolerance(&self) -> f64 {
        self.quaternion_tolerance
    }

    /// Parses JSON text and validates it.
    pub fn validate_str(&self, text: &str) -> Result<ToolCallDocument, ValidationError> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.validate(&value),
            Err(err) => Err(ValidationError {
                violations: vec![Violation::new(
                    "$",
                    ViolationKind::Malformed,
                    format!("invalid JSON: {err}"),
                )],
            }),
        }
    }

    /// Validates a JSON document.
    ///
    /// # Example
    ///
    /// ```rust
    /// use volume_engine::schema::SchemaValidator;
    /// use serde_json::json;
    ///
    /// let doc = json!({"tool_calls": [{
    ///     "function_name": "apply_material_to_volume",
    ///     "parameters": {
    ///         "volume_identifier": {"type": "sphere", "center_xyz": [0, 0, 0], "radius": 1.0},
    ///         "material_name": "Glass"
    ///     }
    /// }]});
    /// let document = SchemaValidator::default().validate(&doc).unwrap();
    /// assert_eq!(document.len(), 1);
    /// ```
    pub fn validate(&self, value: &Value) -> Result<ToolCallDocument, ValidationError> {
        let mut cx = Checker {
            tolerance: self.quaternion_tolerance,
            violations: Vec::new(),
        };
        let calls = cx.document(value);

        if cx.violations.is_empty() {
            Ok(ToolCallDocument::new(calls))
        } else {
            Err(ValidationError {
                violations: cx.violations,
            })
        }
    }

    /// Re-checks the invariants of an already typed document.
    ///
    /// Documents from [`validate`](Self::validate) always pass. Documents
    /// assembled in code may not: extents must be positive, quaternions
    /// must be unit length and parameters must be within their ranges.
    pub fn check(&self, document: &ToolCallDocument) -> Result<(), ValidationError> {
        let mut cx = Checker {
            tolerance: self.quaternion_tolerance,
            violations: Vec::new(),
        };

        for (i, call) in document.tool_calls.iter().enumerate() {
            let params_path = format!("$.tool_calls[{i}].parameters");
            cx.check_volume(&format!("{params_path}.{VOLUME_FIELD}"), &call.volume);

            let spec = call.function().spec();
            for (name, value) in operation_values(&call.operation) {
                if let Some(param) = spec.parameter(name) {
                    cx.check_param(&format!("{params_path}.{name}"), param.kind, &value);
                }
            }
        }

        if cx.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: cx.violations,
            })
        }
    }
}

/// Accumulates violations while walking one document.
struct Checker {
    tolerance: f64,
    violations: Vec<Violation>,
}

impl Checker {
    fn push(&mut self, path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) {
        self.violations.push(Violation::new(path, kind, message));
    }

    fn object<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(map) => Some(map),
            None => {
                self.push(
                    path,
                    ViolationKind::WrongType,
                    format!("expected object, found {}", type_name(value)),
                );
                None
            }
        }
    }

    fn reject_unknown(&mut self, path: &str, map: &Map<String, Value>, allowed: &[&str]) {
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.push(
                    format!("{path}.{key}"),
                    ViolationKind::UnknownField,
                    format!("unknown field '{key}'"),
                );
            }
        }
    }

    fn required<'v>(
        &mut self,
        path: &str,
        map: &'v Map<String, Value>,
        key: &str,
    ) -> Option<&'v Value> {
        let value = map.get(key);
        if value.is_none() {
            self.push(
                format!("{path}.{key}"),
                ViolationKind::MissingField,
                format!("missing required field '{key}'"),
            );
        }
        value
    }

    fn document(&mut self, value: &Value) -> Vec<ToolCall> {
        let Some(root) = value.as_object() else {
            self.push(
                "$",
                ViolationKind::Malformed,
                format!("document must be an object, found {}", type_name(value)),
            );
            return Vec::new();
        };

        for key in root.keys().filter(|k| k.as_str() != "tool_calls") {
            self.push(
                format!("$.{key}"),
                ViolationKind::UnknownField,
                format!("unknown field '{key}'"),
            );
        }

        let Some(calls) = root.get("tool_calls") else {
            self.push(
                "$.tool_calls",
                ViolationKind::MissingField,
                "missing required field 'tool_calls'",
            );
            return Vec::new();
        };

        let Some(calls) = calls.as_array() else {
            self.push(
                "$.tool_calls",
                ViolationKind::WrongType,
                format!("expected array, found {}", type_name(calls)),
            );
            return Vec::new();
        };

        calls
            .iter()
            .enumerate()
            .filter_map(|(i, call)| self.call(&format!("$.tool_calls[{i}]"), call))
            .collect()
    }

    fn call(&mut self, path: &str, value: &Value) -> Option<ToolCall> {
        let map = self.object(path, value)?;
        self.reject_unknown(path, map, &["function_name", "parameters"]);

        let function = self
            .required(path, map, "function_name")
            .and_then(|name| self.function_name(&format!("{path}.function_name"), name));

        let params_path = format!("{path}.parameters");
        let params = self
            .required(path, map, "parameters")
            .and_then(|p| self.object(&params_path, p))?;

        let volume = self
            .required(&params_path, params, VOLUME_FIELD)
            .and_then(|v| self.volume(&format!("{params_path}.{VOLUME_FIELD}"), v));

        // Parameter keys can only be judged against a known function
        let function = function?;
        let values = self.parameters(&params_path, params, function.spec());

        Some(ToolCall::new(volume?, build_operation(function, values?)))
    }

    fn function_name(&mut self, path: &str, value: &Value) -> Option<FunctionName> {
        let Some(name) = value.as_str() else {
            self.push(
                path,
                ViolationKind::WrongType,
                format!("expected string, found {}", type_name(value)),
            );
            return None;
        };

        match name.parse::<FunctionName>() {
            Ok(function) => Some(function),
            Err(err) => {
                self.push(path, ViolationKind::UnknownFunction, err.to_string());
                None
            }
        }
    }

    fn parameters(
        &mut self,
        path: &str,
        map: &Map<String, Value>,
        spec: &ToolSpec,
    ) -> Option<ParamValues> {
        let before = self.violations.len();
        let mut values = ParamValues::new();

        for (key, value) in map {
            if key == VOLUME_FIELD {
                continue;
            }
            let field_path = format!("{path}.{key}");
            match spec.parameter(key) {
                Some(param) => {
                    if let Some(v) = self.param_value(&field_path, param.kind, value) {
                        values.insert(param.name, v);
                    }
                }
                None => self.push(
                    field_path,
                    ViolationKind::UnknownField,
                    format!("'{}' does not accept parameter '{key}'", spec.name),
                ),
            }
        }

        for param in spec.parameters.iter().filter(|p| p.required) {
            if !map.contains_key(param.name) {
                self.push(
                    format!("{path}.{}", param.name),
                    ViolationKind::MissingField,
                    format!("'{}' requires parameter '{}'", spec.name, param.name),
                );
            }
        }

        (self.violations.len() == before).then_some(values)
    }

    fn param_value(&mut self, path: &str, kind: ParameterKind, value: &Value) -> Option<ParamValue> {
        let parsed = match kind {
            ParameterKind::Vector3 { .. } => ParamValue::Vector(self.vec3(path, value)?),
            ParameterKind::ScaleFactor => match value {
                Value::Array(_) => ParamValue::Vector(self.vec3(path, value)?),
                _ if value.is_number() => ParamValue::Number(self.number(path, value)?),
                _ => {
                    self.push(
                        path,
                        ViolationKind::WrongType,
                        format!("expected number or [x, y, z], found {}", type_name(value)),
                    );
                    return None;
                }
            },
            ParameterKind::Matrix4Affine => {
                let rows = self.rows::<4>(path, value)?;
                ParamValue::Matrix4(DMat4::from_cols_array_2d(&rows).transpose())
            }
            ParameterKind::Matrix3Invertible => {
                let rows = self.rows::<3>(path, value)?;
                ParamValue::Matrix3(DMat3::from_cols_array_2d(&rows).transpose())
            }
            ParameterKind::Name => {
                let Some(name) = value.as_str() else {
                    self.push(path, ViolationKind::WrongType, format!("expected string, found {}", type_name(value)));
                    return None;
                };
                ParamValue::Name(name.to_string())
            }
            ParameterKind::Integer { .. } => {
                let Some(n) = value.as_i64() else {
                    self.push(path, ViolationKind::WrongType, format!("expected integer, found {}", type_name(value)));
                    return None;
                };
                ParamValue::Integer(n)
            }
            ParameterKind::OpenFraction => ParamValue::Number(self.number(path, value)?),
            ParameterKind::LatticeOffsets => {
                let items = self.array(path, value, 8)?;
                let before = self.violations.len();
                let mut offsets = [DVec3::ZERO; 8];
                for (i, item) in items.iter().enumerate() {
                    if let Some(v) = self.vec3(&format!("{path}[{i}]"), item) {
                        offsets[i] = v;
                    }
                }
                if self.violations.len() != before {
                    return None;
                }
                ParamValue::Offsets(offsets)
            }
        };

        self.check_param(path, kind, &parsed).then_some(parsed)
    }

    /// Range checks shared by raw and typed documents.
    fn check_param(&mut self, path: &str, kind: ParameterKind, value: &ParamValue) -> bool {
        let before = self.violations.len();
        match (kind, value) {
            (ParameterKind::Vector3 { nonzero }, ParamValue::Vector(v)) => {
                if !v.is_finite() {
                    self.push(path, ViolationKind::WrongType, "vector components must be finite");
                } else if nonzero && v.length() <= MIN_EXTRUDE_LENGTH {
                    self.push(path, ViolationKind::OutOfRange, "vector must be non-zero");
                }
            }
            (ParameterKind::ScaleFactor, ParamValue::Number(s)) => {
                if !(s.is_finite() && *s > 0.0) {
                    self.push(path, ViolationKind::OutOfRange, format!("scale factor must be > 0, got {s}"));
                }
            }
            (ParameterKind::ScaleFactor, ParamValue::Vector(v)) => {
                if !(v.is_finite() && v.min_element() > 0.0) {
                    self.push(path, ViolationKind::OutOfRange, "every scale component must be > 0");
                }
            }
            (ParameterKind::Matrix4Affine, ParamValue::Matrix4(m)) => {
                let bottom = m.row(3).to_array();
                if !m.is_finite() {
                    self.push(path, ViolationKind::WrongType, "matrix entries must be finite");
                } else if bottom
                    .iter()
                    .zip([0.0, 0.0, 0.0, 1.0])
                    .any(|(a, b)| (a - b).abs() > AFFINE_ROW_TOLERANCE)
                {
                    self.push(path, ViolationKind::OutOfRange, "bottom row must be [0, 0, 0, 1]");
                }
            }
            (ParameterKind::Matrix3Invertible, ParamValue::Matrix3(m)) => {
                let det = m.determinant();
                if !m.is_finite() {
                    self.push(path, ViolationKind::WrongType, "matrix entries must be finite");
                } else if det.abs() <= MIN_DEFORMATION_DETERMINANT {
                    self.push(
                        path,
                        ViolationKind::OutOfRange,
                        format!("matrix must be invertible, determinant is {det}"),
                    );
                }
            }
            (ParameterKind::Name, ParamValue::Name(name)) => {
                if name.trim().is_empty() {
                    self.push(path, ViolationKind::OutOfRange, "name must not be empty");
                }
            }
            (ParameterKind::Integer { min, max }, ParamValue::Integer(n)) => {
                if *n < min || *n > max {
                    self.push(
                        path,
                        ViolationKind::OutOfRange,
                        format!("must be between {min} and {max}, got {n}"),
                    );
                }
            }
            (ParameterKind::OpenFraction, ParamValue::Number(x)) => {
                if !(*x > 0.0 && *x < 1.0) {
                    self.push(
                        path,
                        ViolationKind::OutOfRange,
                        format!("must be strictly between 0 and 1, got {x}"),
                    );
                }
            }
            (ParameterKind::LatticeOffsets, ParamValue::Offsets(offsets)) => {
                for (i, offset) in offsets.iter().enumerate() {
                    if !offset.is_finite() {
                        self.push(format!("{path}[{i}]"), ViolationKind::WrongType, "offset components must be finite");
                    }
                }
            }
            (kind, _) => self.push(
                path,
                ViolationKind::WrongType,
                format!("value does not match parameter kind {kind:?}"),
            ),
        }
        self.violations.len() == before
    }

    fn volume(&mut self, path: &str, value: &Value) -> Option<VolumeIdentifier> {
        let map = self.object(path, value)?;
        let type_value = self.required(path, map, "type")?;
        let Some(kind) = type_value.as_str() else {
            self.push(
                format!("{path}.type"),
                ViolationKind::WrongType,
                format!("expected string, found {}", type_name(type_value)),
            );
            return None;
        };

        let allowed = match kind {
            "box" => BOX_FIELDS,
            "sphere" => SPHERE_FIELDS,
            "cylinder" => CYLINDER_FIELDS,
            other => {
                self.push(
                    format!("{path}.type"),
                    ViolationKind::WrongType,
                    format!("unknown volume type '{other}', expected box, sphere or cylinder"),
                );
                return None;
            }
        };
        let before = self.violations.len();
        self.reject_unknown(path, map, allowed);

        let center = self
            .required(path, map, "center_xyz")
            .and_then(|v| self.vec3(&format!("{path}.center_xyz"), v));

        let volume = match kind {
            "box" => {
                let dims_path = format!("{path}.dimensions_xyz");
                let dimensions = self
                    .required(path, map, "dimensions_xyz")
                    .and_then(|v| self.vec3(&dims_path, v));
                if let Some(d) = dimensions {
                    self.check_dimensions(&dims_path, d);
                }
                let rotation = self.rotation(path, map, ROTATION_FIELD);
                VolumeIdentifier::Box {
                    center: center?,
                    dimensions: dimensions?,
                    rotation: rotation?,
                }
            }
            "sphere" => {
                let radius = self.extent(path, map, "radius");
                VolumeIdentifier::Sphere {
                    center: center?,
                    radius: radius?,
                }
            }
            _ => {
                let radius = self.extent(path, map, "radius");
                let height = self.extent(path, map, "height");
                let rotation = if map.contains_key(ROTATION_FIELD)
                    && map.contains_key(AXIS_ROTATION_FIELD)
                {
                    self.push(
                        format!("{path}.{AXIS_ROTATION_FIELD}"),
                        ViolationKind::ConflictingFields,
                        format!("give either '{ROTATION_FIELD}' or '{AXIS_ROTATION_FIELD}', not both"),
                    );
                    None
                } else if map.contains_key(AXIS_ROTATION_FIELD) {
                    self.rotation(path, map, AXIS_ROTATION_FIELD)
                } else {
                    self.rotation(path, map, ROTATION_FIELD)
                };
                VolumeIdentifier::Cylinder {
                    center: center?,
                    radius: radius?,
                    height: height?,
                    rotation: rotation?,
                }
            }
        };

        (self.violations.len() == before).then_some(volume)
    }

    fn extent(&mut self, path: &str, map: &Map<String, Value>, key: &str) -> Option<f64> {
        let field_path = format!("{path}.{key}");
        let raw = self.required(path, map, key)?;
        let value = self.number(&field_path, raw)?;
        self.check_extent(&field_path, key, value).then_some(value)
    }

    fn rotation(&mut self, path: &str, map: &Map<String, Value>, key: &str) -> Option<[f64; 4]> {
        let Some(value) = map.get(key) else {
            return Some(IDENTITY_WXYZ);
        };
        let field_path = format!("{path}.{key}");
        let q = self.numbers::<4>(&field_path, value)?;
        self.check_rotation(&field_path, q).then_some(q)
    }

    fn check_volume(&mut self, path: &str, volume: &VolumeIdentifier) {
        if !volume.center().is_finite() {
            self.push(
                format!("{path}.center_xyz"),
                ViolationKind::WrongType,
                "center components must be finite",
            );
        }
        match *volume {
            VolumeIdentifier::Box {
                dimensions,
                rotation,
                ..
            } => {
                self.check_dimensions(&format!("{path}.dimensions_xyz"), dimensions);
                self.check_rotation(&format!("{path}.{ROTATION_FIELD}"), rotation);
            }
            VolumeIdentifier::Sphere { radius, .. } => {
                self.check_extent(&format!("{path}.radius"), "radius", radius);
            }
            VolumeIdentifier::Cylinder {
                radius,
                height,
                rotation,
                ..
            } => {
                self.check_extent(&format!("{path}.radius"), "radius", radius);
                self.check_extent(&format!("{path}.height"), "height", height);
                self.check_rotation(&format!("{path}.{ROTATION_FIELD}"), rotation);
            }
        }
    }

    fn check_dimensions(&mut self, path: &str, dimensions: DVec3) -> bool {
        if dimensions.to_array().into_iter().any(is_degenerate_extent) {
            self.push(
                path,
                ViolationKind::DegenerateVolume,
                format!("box dimensions must all be positive, got {:?}", dimensions.to_array()),
            );
            return false;
        }
        true
    }

    fn check_extent(&mut self, path: &str, key: &str, value: f64) -> bool {
        if is_degenerate_extent(value) {
            self.push(
                path,
                ViolationKind::DegenerateVolume,
                format!("{key} must be positive, got {value}"),
            );
            return false;
        }
        true
    }

    fn check_rotation(&mut self, path: &str, q: [f64; 4]) -> bool {
        let norm = q.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm.is_nan() || (norm - 1.0).abs() > self.tolerance {
            self.push(
                path,
                ViolationKind::NonUnitQuaternion,
                format!(
                    "quaternion norm {norm} is not within {} of 1",
                    self.tolerance
                ),
            );
            return false;
        }
        true
    }

    fn number(&mut self, path: &str, value: &Value) -> Option<f64> {
        match value.as_f64() {
            Some(x) if x.is_finite() => Some(x),
            _ => {
                self.push(
                    path,
                    ViolationKind::WrongType,
                    format!("expected number, found {}", type_name(value)),
                );
                None
            }
        }
    }

    fn array<'v>(&mut self, path: &str, value: &'v Value, len: usize) -> Option<&'v Vec<Value>> {
        match value.as_array() {
            Some(items) if items.len() == len => Some(items),
            Some(items) => {
                self.push(
                    path,
                    ViolationKind::WrongType,
                    format!("expected {len} elements, found {}", items.len()),
                );
                None
            }
            None => {
                self.push(
                    path,
                    ViolationKind::WrongType,
                    format!("expected array of {len}, found {}", type_name(value)),
                );
                None
            }
        }
    }

    fn numbers<const N: usize>(&mut self, path: &str, value: &Value) -> Option<[f64; N]> {
        let items = self.array(path, value, N)?;
        let before = self.violations.len();
        let mut out = [0.0; N];
        for (i, (slot, item)) in out.iter_mut().zip(items).enumerate() {
            match item.as_f64() {
                Some(x) if x.is_finite() => *slot = x,
                _ => self.push(
                    format!("{path}[{i}]"),
                    ViolationKind::WrongType,
                    format!("expected number, found {}", type_name(item)),
                ),
            }
        }
        (self.violations.len() == before).then_some(out)
    }

    fn vec3(&mut self, path: &str, value: &Value) -> Option<DVec3> {
        self.numbers::<3>(path, value).map(DVec3::from_array)
    }

    fn rows<const N: usize>(&mut self, path: &str, value: &Value) -> Option<[[f64; N]; N]> {
        let items = self.array(path, value, N)?;
        let before = self.violations.len();
        let mut rows = [[0.0; N]; N];
        for (i, item) in items.iter().enumerate() {
            if let Some(row) = self.numbers::<N>(&format!("{path}[{i}]"), item) {
                rows[i] = row;
            }
        }
        (self.violations.len() == before).then_some(rows)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
