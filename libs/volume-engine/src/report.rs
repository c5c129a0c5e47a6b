//! # Result Reporting
//!
//! Per-call outcomes and the document-level result the engine returns.
//!
//! [`ResultReporter`] collects [`CallOutcome`] values while a document runs
//! and seals them into a [`DocumentResult`]. A result serializes to JSON for
//! machine consumers and displays as a short text report for humans.

use crate::document::{FunctionName, ToolCallDocument};
use crate::error::{CallError, ValidationError, Violation};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Status of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Handler ran and its mutation was applied
    Completed,
    /// The document was rejected; the call never ran
    ValidationFailed,
    /// Handler or host reported an error
    ExecutionFailed,
}

/// Status of a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Every call completed
    Completed,
    /// Validation rejected the document; nothing ran
    ValidationFailed,
    /// At least one call failed
    ExecutionFailed,
    /// Cancelled between calls
    Cancelled,
}

impl DocumentStatus {
    /// Process exit code for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            DocumentStatus::Completed => 0,
            DocumentStatus::ValidationFailed => 1,
            DocumentStatus::ExecutionFailed => 2,
            DocumentStatus::Cancelled => 3,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentStatus::Completed => "completed",
            DocumentStatus::ValidationFailed => "validation failed",
            DocumentStatus::ExecutionFailed => "execution failed",
            DocumentStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Outcome of one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallOutcome {
    /// Position of the call in the document
    pub index: usize,
    /// Function name as written in the document
    pub function: String,
    /// What happened
    pub status: CallStatus,
    /// Number of selected vertices
    pub selection_size: usize,
    /// Handler summary
    pub detail: String,
    /// Error, when the call did not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CallError>,
    /// Advisory messages
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CallOutcome {
    /// A completed call.
    pub fn completed(
        index: usize,
        function: FunctionName,
        selection_size: usize,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            index,
            function: function.as_str().to_string(),
            status: CallStatus::Completed,
            selection_size,
            detail: detail.into(),
            error: None,
            warnings: Vec::new(),
        }
    }

    /// A call that failed during execution.
    pub fn failed(index: usize, function: FunctionName, selection_size: usize, error: CallError) -> Self {
        Self {
            index,
            function: function.as_str().to_string(),
            status: CallStatus::ExecutionFailed,
            selection_size,
            detail: String::new(),
            error: Some(error),
            warnings: Vec::new(),
        }
    }

    /// Attaches advisory warnings.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Returns true if the call completed.
    pub fn is_completed(&self) -> bool {
        self.status == CallStatus::Completed
    }
}

/// Result of running a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentResult {
    /// Document-level status
    pub status: DocumentStatus,
    /// Outcomes of the calls that were attempted, in order
    pub outcomes: Vec<CallOutcome>,
    /// Validation violations, empty unless validation failed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl DocumentResult {
    /// Process exit code for this result.
    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }

    /// Returns true if every call completed.
    pub fn is_success(&self) -> bool {
        self.status == DocumentStatus::Completed
    }

    /// Number of completed calls.
    pub fn completed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    /// First failing outcome, if any.
    pub fn first_failure(&self) -> Option<&CallOutcome> {
        self.outcomes.iter().find(|o| !o.is_completed())
    }
}

impl fmt::Display for DocumentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document {}", self.status)?;

        for violation in &self.violations {
            writeln!(f, "  ✗ {violation}")?;
        }

        for outcome in &self.outcomes {
            match (&outcome.status, &outcome.error) {
                (CallStatus::Completed, _) => writeln!(
                    f,
                    "  ✓ [{}] {} ({} selected): {}",
                    outcome.index, outcome.function, outcome.selection_size, outcome.detail
                )?,
                (_, Some(error)) => writeln!(
                    f,
                    "  ✗ [{}] {} ({}): {}",
                    outcome.index, outcome.function, error.kind, error.message
                )?,
                (_, None) => writeln!(f, "  ✗ [{}] {}", outcome.index, outcome.function)?,
            }
            for warning in &outcome.warnings {
                writeln!(f, "    ! {warning}")?;
            }
        }

        let total = self.outcomes.len();
        let completed = self.completed_count();
        let rate = if total == 0 {
            100.0
        } else {
            completed as f64 * 100.0 / total as f64
        };
        write!(f, "{completed}/{total} calls completed ({rate:.1}%)")
    }
}

/// Collects outcomes while a document runs.
#[derive(Debug, Default)]
pub struct ResultReporter {
    outcomes: Vec<CallOutcome>,
}

impl ResultReporter {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one call.
    pub fn record(&mut self, outcome: CallOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Seals the outcomes with the given status.
    pub fn finish(self, status: DocumentStatus) -> DocumentResult {
        DocumentResult {
            status,
            outcomes: self.outcomes,
            violations: Vec::new(),
        }
    }

    /// Builds the result of a document that failed validation.
    ///
    /// Every call with at least one violation gets a `ValidationFailed`
    /// outcome. Function names are read from `raw` when it is available.
    pub fn validation_failed(error: ValidationError, raw: Option<&Value>) -> DocumentResult {
        Self::rejected(error, |index| {
            raw.and_then(|doc| doc.get("tool_calls"))
                .and_then(|calls| calls.get(index))
                .and_then(|call| call.get("function_name"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }

    /// Builds the result of a typed document whose invariants do not hold.
    pub fn invalid_document(error: ValidationError, document: &ToolCallDocument) -> DocumentResult {
        Self::rejected(error, |index| {
            document
                .tool_calls
                .get(index)
                .map(|call| call.function().to_string())
        })
    }

    fn rejected(
        error: ValidationError,
        function_of: impl Fn(usize) -> Option<String>,
    ) -> DocumentResult {
        let mut by_call: BTreeMap<usize, Vec<&Violation>> = BTreeMap::new();
        for violation in &error.violations {
            if let Some(index) = violation.call_index() {
                by_call.entry(index).or_default().push(violation);
            }
        }

        let outcomes = by_call
            .into_iter()
            .map(|(index, violations)| {
                let function = function_of(index).unwrap_or_else(|| "<unknown>".to_string());
                let message = violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                CallOutcome {
                    index,
                    function,
                    status: CallStatus::ValidationFailed,
                    selection_size: 0,
                    detail: String::new(),
                    error: Some(CallError {
                        kind: violations[0].error_kind(),
                        call_index: index,
                        message,
                    }),
                    warnings: Vec::new(),
                }
            })
            .collect();

        DocumentResult {
            status: DocumentStatus::ValidationFailed,
            outcomes,
            violations: error.violations,
        }
    }
}
