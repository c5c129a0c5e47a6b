//! # Execution Engine
//!
//! Runs a validated [`ToolCallDocument`] against a host mesh, one call at a
//! time and strictly in document order.
//!
//! ## Per-call pipeline
//!
//! ```text
//! Pending → Validated → VolumeResolved → Selected → Dispatched → Completed
//!                                                              ↘ ExecutionFailed
//! ```
//!
//! The spatial index is cached across calls and rebuilt only when the mesh
//! version changes. Handler panics are caught and reported as engine faults.

use crate::document::ToolCallDocument;
use crate::error::{CallError, ExecutionError, ErrorKind, ValidationError, Violation, ViolationKind};
use crate::ops::{dispatch, HandlerContext, HandlerOutput};
use crate::report::{CallOutcome, DocumentResult, DocumentStatus, ResultReporter};
use crate::schema::SchemaValidator;
use crate::selection::select;
use crate::spatial_index::SpatialIndexCache;
use crate::volume::Aabb;
use config::constants::{PARALLEL_SELECTION_THRESHOLD, QUATERNION_NORM_TOLERANCE, SCENE_BOUNDS_MARGIN};
use serde_json::Value;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};
use volume_mesh::MeshHandle;

#[cfg(test)]
mod tests;

/// What happens after a call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failed call
    #[default]
    Abort,
    /// Record the failure and run the remaining calls
    Continue,
}

/// Runtime settings of the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Behaviour after an execution failure
    pub failure_policy: FailurePolicy,
    /// Accepted deviation of quaternion norms from 1
    pub quaternion_tolerance: f64,
    /// Candidate count at which containment runs in parallel
    pub parallel_threshold: usize,
    /// Margin around the mesh bounds for the volume-center check; `None` disables it
    pub scene_bounds_margin: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            quaternion_tolerance: QUATERNION_NORM_TOLERANCE,
            parallel_threshold: PARALLEL_SELECTION_THRESHOLD,
            scene_bounds_margin: Some(SCENE_BOUNDS_MARGIN),
        }
    }
}

impl EngineConfig {
    /// Sets the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the quaternion norm tolerance.
    pub fn with_quaternion_tolerance(mut self, tolerance: f64) -> Self {
        self.quaternion_tolerance = tolerance;
        self
    }

    /// Sets the parallel selection threshold.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Sets or disables the scene bounds margin.
    pub fn with_scene_bounds_margin(mut self, margin: Option<f64>) -> Self {
        self.scene_bounds_margin = margin;
        self
    }

    /// Validator configured with this tolerance.
    pub fn validator(&self) -> SchemaValidator {
        SchemaValidator::new().with_quaternion_tolerance(self.quaternion_tolerance)
    }
}

/// Shared flag checked between calls.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Pending,
    Validated,
    VolumeResolved,
    Selected,
    Dispatched,
    Completed,
    ExecutionFailed,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn advance(state: &mut CallState, next: CallState) {
    debug!(from = %state, to = %next, "call state");
    *state = next;
}

/// Runs tool-call documents against a mesh.
///
/// # Example
///
/// ```rust
/// use volume_engine::{ExecutionEngine, ToolCallDocument};
/// use volume_mesh::primitives::create_cuboid;
/// use glam::DVec3;
///
/// let mut mesh = create_cuboid(DVec3::splat(2.0), true).unwrap();
/// mesh.register_material("Glass");
/// let document = ToolCallDocument::from_json_str(r#"{"tool_calls": [{
///     "function_name": "apply_material_to_volume",
///     "parameters": {
///         "volume_identifier": {"type": "sphere", "center_xyz": [0, 0, 0], "radius": 5.0},
///         "material_name": "Glass"
///     }
/// }]}"#).unwrap();
///
/// let result = ExecutionEngine::default().execute(&document, &mut mesh);
/// assert_eq!(result.exit_code(), 0);
/// ```
#[derive(Debug, Default)]
pub struct ExecutionEngine {
    config: EngineConfig,
    cache: SpatialIndexCache,
}

impl ExecutionEngine {
    /// Creates an engine with the given settings.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cache: SpatialIndexCache::new(),
        }
    }

    /// Current settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of spatial index builds so far.
    pub fn index_builds(&self) -> usize {
        self.cache.builds()
    }

    /// Runs every call of `document` against `mesh`.
    ///
    /// The document's invariants are checked first. A document built in
    /// code with a degenerate volume or an out-of-range parameter is
    /// rejected as a whole, exactly like invalid JSON.
    pub fn execute<M: MeshHandle>(&mut self, document: &ToolCallDocument, mesh: &mut M) -> DocumentResult {
        self.checked_run(document, mesh, None)
    }

    /// Runs `document`, checking `cancel` before each call.
    pub fn execute_with_cancellation<M: MeshHandle>(
        &mut self,
        document: &ToolCallDocument,
        mesh: &mut M,
        cancel: &CancellationFlag,
    ) -> DocumentResult {
        self.checked_run(document, mesh, Some(cancel))
    }

    /// Validates a raw document and runs it if it is valid.
    pub fn execute_json<M: MeshHandle>(&mut self, value: &Value, mesh: &mut M) -> DocumentResult {
        match self.config.validator().validate(value) {
            Ok(document) => self.run(&document, mesh, None),
            Err(err) => {
                warn!(violations = err.violations.len(), "document failed validation");
                ResultReporter::validation_failed(err, Some(value))
            }
        }
    }

    /// Parses, validates and runs a document given as text.
    pub fn execute_str<M: MeshHandle>(&mut self, text: &str, mesh: &mut M) -> DocumentResult {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.execute_json(&value, mesh),
            Err(err) => {
                warn!(%err, "document is not valid JSON");
                let error = ValidationError {
                    violations: vec![Violation::new(
                        "$",
                        ViolationKind::Malformed,
                        format!("invalid JSON: {err}"),
                    )],
                };
                ResultReporter::validation_failed(error, None)
            }
        }
    }

    fn checked_run(
        &mut self,
        document: &ToolCallDocument,
        mesh: &mut dyn MeshHandle,
        cancel: Option<&CancellationFlag>,
    ) -> DocumentResult {
        match self.config.validator().check(document) {
            Ok(()) => self.run(document, mesh, cancel),
            Err(err) => {
                warn!(violations = err.violations.len(), "typed document failed validation");
                ResultReporter::invalid_document(err, document)
            }
        }
    }

    fn run(
        &mut self,
        document: &ToolCallDocument,
        mesh: &mut dyn MeshHandle,
        cancel: Option<&CancellationFlag>,
    ) -> DocumentResult {
        info!(calls = document.len(), "executing document");
        let mut reporter = ResultReporter::new();
        let mut failed = false;

        for (index, call) in document.tool_calls.iter().enumerate() {
            if cancel.is_some_and(CancellationFlag::is_cancelled) {
                warn!(index, "cancelled before call");
                return reporter.finish(DocumentStatus::Cancelled);
            }

            let span = info_span!("tool_call", index, function = %call.function());
            let _guard = span.enter();

            let mut state = CallState::Pending;
            advance(&mut state, CallState::Validated);

            let volume = call.volume.resolve();
            advance(&mut state, CallState::VolumeResolved);

            let warnings = self.scene_warnings(&*mesh, volume.center());

            let index_ref = self.cache.get_or_build(&*mesh);
            let selection = select(&volume, index_ref, &*mesh, self.config.parallel_threshold);
            advance(&mut state, CallState::Selected);
            debug!(
                vertices = selection.vertex_count(),
                faces = selection.face_count(),
                "selection"
            );

            let cx = HandlerContext {
                selection: &selection,
                volume: &volume,
                mesh: &*mesh,
            };
            let result = run_handler(&call.operation, &cx);
            advance(&mut state, CallState::Dispatched);

            let result = result.and_then(|output| {
                mesh.apply_mutation(&output.mutation)
                    .map(|()| output)
                    .map_err(|err| ExecutionError::fault(format!("mutation rejected by host: {err}")))
            });

            match result {
                Ok(output) => {
                    advance(&mut state, CallState::Completed);
                    info!(affected = output.affected, detail = %output.detail, "call completed");
                    reporter.record(
                        CallOutcome::completed(index, call.function(), selection.vertex_count(), output.detail)
                            .with_warnings(warnings),
                    );
                }
                Err(err) => {
                    advance(&mut state, CallState::ExecutionFailed);
                    warn!(%err, "call failed");
                    let error = CallError::from_execution(index, &err);
                    let fault = error.kind == ErrorKind::EngineFault;
                    reporter.record(
                        CallOutcome::failed(index, call.function(), selection.vertex_count(), error)
                            .with_warnings(warnings),
                    );
                    failed = true;
                    if fault || self.config.failure_policy == FailurePolicy::Abort {
                        return reporter.finish(DocumentStatus::ExecutionFailed);
                    }
                }
            }
        }

        if failed {
            reporter.finish(DocumentStatus::ExecutionFailed)
        } else {
            reporter.finish(DocumentStatus::Completed)
        }
    }

    fn scene_warnings(&self, mesh: &dyn MeshHandle, center: glam::DVec3) -> Vec<String> {
        let (Some(margin), Some((min, max))) = (self.config.scene_bounds_margin, mesh.bounds()) else {
            return Vec::new();
        };
        if Aabb::new(min, max).expanded(margin).contains(center) {
            return Vec::new();
        }
        let message = format!(
            "volume center {} lies more than {margin} outside the mesh bounds",
            crate::ops::fmt_vec(center)
        );
        warn!("{message}");
        vec![message]
    }
}

/// Dispatches a handler, turning a panic into an engine fault.
fn run_handler(
    operation: &crate::document::Operation,
    cx: &HandlerContext<'_>,
) -> Result<HandlerOutput, ExecutionError> {
    match catch_unwind(AssertUnwindSafe(|| dispatch(operation, cx))) {
        Ok(result) => result,
        Err(panic_info) => {
            let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "handler panicked".to_string()
            };
            Err(ExecutionError::fault(format!("panic in handler: {message}")))
        }
    }
}
