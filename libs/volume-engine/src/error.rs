//! # Engine Errors
//!
//! Structured error values for validation and execution.
//!
//! Validation produces a [`ValidationError`] carrying every [`Violation`]
//! found in a document. Handlers return [`ExecutionError`]. Both surface in
//! reports as [`CallError`] values tagged with an [`ErrorKind`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Top-level error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Structural, type or range error in the document
    SchemaViolation,
    /// `function_name` not in the registry
    UnknownFunction,
    /// Volume with zero or negative extent
    DegenerateVolume,
    /// Handler-reported domain error
    ExecutionFailure,
    /// Internal inconsistency or handler panic
    EngineFault,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SchemaViolation => "schema violation",
            ErrorKind::UnknownFunction => "unknown function",
            ErrorKind::DegenerateVolume => "degenerate volume",
            ErrorKind::ExecutionFailure => "execution failure",
            ErrorKind::EngineFault => "engine fault",
        };
        f.write_str(name)
    }
}

/// Category of a single validation violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Input is not a JSON object of the expected shape
    Malformed,
    /// Required field absent
    MissingField,
    /// Field not declared by the schema
    UnknownField,
    /// Field has the wrong JSON type or arity
    WrongType,
    /// Numeric value outside its declared bound
    OutOfRange,
    /// `function_name` not in the registry
    UnknownFunction,
    /// Volume extent at or below the minimum
    DegenerateVolume,
    /// Quaternion norm outside tolerance
    NonUnitQuaternion,
    /// Mutually exclusive fields both present
    ConflictingFields,
}

impl ViolationKind {
    /// Maps the violation onto the top-level taxonomy.
    pub fn error_kind(self) -> ErrorKind {
        match self {
            ViolationKind::UnknownFunction => ErrorKind::UnknownFunction,
            ViolationKind::DegenerateVolume => ErrorKind::DegenerateVolume,
            _ => ErrorKind::SchemaViolation,
        }
    }
}

/// One problem found during validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Location in the document, e.g. `$.tool_calls[1].parameters.radius`
    pub path: String,
    /// Violation category
    pub kind: ViolationKind,
    /// Human-readable description
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new(path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Top-level kind of this violation.
    pub fn error_kind(&self) -> ErrorKind {
        self.kind.error_kind()
    }

    /// Index of the tool call this violation belongs to, if any.
    pub fn call_index(&self) -> Option<usize> {
        let rest = self.path.strip_prefix("$.tool_calls[")?;
        let end = rest.find(']')?;
        rest[..end].parse().ok()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A document failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("document failed validation with {} violation(s): {}", .violations.len(), summarize(.violations))]
pub struct ValidationError {
    /// Every violation found, in document order
    pub violations: Vec<Violation>,
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Returns true if any violation has the given kind.
    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}

/// Errors returned by operation handlers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// Domain error, e.g. an unknown material
    #[error("{0}")]
    Failure(String),

    /// Internal inconsistency
    #[error("engine fault: {0}")]
    Fault(String),
}

impl ExecutionError {
    /// Creates a domain failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Creates an engine fault.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }

    /// Top-level kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::Failure(_) => ErrorKind::ExecutionFailure,
            ExecutionError::Fault(_) => ErrorKind::EngineFault,
        }
    }
}

/// A structured error attached to a call outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallError {
    /// Error category
    pub kind: ErrorKind,
    /// Index of the failing call
    pub call_index: usize,
    /// Human-readable description
    pub message: String,
}

impl CallError {
    /// Creates a call error from an execution error.
    pub fn from_execution(call_index: usize, err: &ExecutionError) -> Self {
        let message = match err {
            ExecutionError::Failure(m) | ExecutionError::Fault(m) => m.clone(),
        };
        Self {
            kind: err.kind(),
            call_index,
            message,
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call {} {}: {}", self.call_index, self.kind, self.message)
    }
}
