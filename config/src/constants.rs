//! # Configuration Constants
//!
//! Centralized constants for the volume tool-call engine. Validation bounds,
//! containment precision, spatial index tuning and handler defaults are
//! defined here.
//!
//! ## Categories
//!
//! - **Precision**: Padding of conservative query boxes
//! - **Validation**: Bounds enforced on tool-call documents
//! - **Spatial Index**: Grid sizing and parallel selection thresholds
//! - **Handler Defaults**: Values used when optional parameters are omitted
//! - **Preview**: Tessellation of volume preview meshes

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Relative padding applied to world-space query boxes.
///
/// The world AABB of a rotated volume is computed through a different
/// sequence of floating-point operations than the exact local-space test.
/// Padding the box by this fraction of its magnitude keeps the spatial
/// pruning conservative: boundary points the exact test accepts are always
/// candidates.
///
/// # Example
///
/// ```rust
/// use config::constants::AABB_PADDING;
///
/// let half_extent = 2.5_f64;
/// let padded = half_extent + AABB_PADDING * (1.0 + half_extent.abs());
/// assert!(padded > half_extent);
/// ```
pub const AABB_PADDING: f64 = 1e-9;

// =============================================================================
// VALIDATION CONSTANTS
// =============================================================================

/// Smallest accepted volume extent (dimension, radius or height).
///
/// Any extent at or below this value is treated as a degenerate volume and
/// rejected during validation. It is never silently treated as empty.
///
/// # Example
///
/// ```rust
/// use config::constants::MIN_VOLUME_EXTENT;
///
/// let radius = 0.0;
/// assert!(radius <= MIN_VOLUME_EXTENT);
/// ```
pub const MIN_VOLUME_EXTENT: f64 = 1e-9;

/// Accepted deviation of a quaternion norm from 1.
///
/// Quaternions outside this tolerance are validation failures. Inputs are
/// never renormalized.
///
/// # Example
///
/// ```rust
/// use config::constants::QUATERNION_NORM_TOLERANCE;
///
/// let q: [f64; 4] = [1.0, 0.0, 0.0, 0.0];
/// let norm = q.iter().map(|c| c * c).sum::<f64>().sqrt();
/// assert!((norm - 1.0).abs() <= QUATERNION_NORM_TOLERANCE);
/// ```
pub const QUATERNION_NORM_TOLERANCE: f64 = 1e-4;

/// Smallest accepted length of an extrusion vector.
pub const MIN_EXTRUDE_LENGTH: f64 = 1e-9;

/// Smallest accepted absolute determinant of a lattice deformation matrix.
///
/// Singular matrices collapse the lattice into a plane and are rejected.
pub const MIN_DEFORMATION_DETERMINANT: f64 = 1e-9;

/// Tolerance on the bottom row `[0, 0, 0, 1]` of an affine transform matrix.
pub const AFFINE_ROW_TOLERANCE: f64 = 1e-9;

/// Highest accepted `subdivision_level`.
///
/// Each level multiplies the face count of an n-gon region by roughly four,
/// so the bound keeps a single call from exploding the mesh.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_SUBDIVISION_LEVEL;
///
/// let requested = 9;
/// assert!(requested > MAX_SUBDIVISION_LEVEL);
/// ```
pub const MAX_SUBDIVISION_LEVEL: u32 = 4;

/// Margin added around the mesh bounds when checking volume centers.
///
/// A volume whose center lies outside the mesh bounding box expanded by this
/// margin produces an advisory warning on its call outcome.
pub const SCENE_BOUNDS_MARGIN: f64 = 10.0;

// =============================================================================
// SPATIAL INDEX CONSTANTS
// =============================================================================

/// Cell size multiplier for spatial hashing.
///
/// Larger values = fewer cells but more vertices per cell.
pub const CELL_SIZE_FACTOR: f64 = 2.0;

/// Minimum cell size of the spatial hash grid.
///
/// Guards against a zero cell size on meshes whose vertices all coincide.
pub const MIN_CELL_SIZE: f64 = 1e-6;

/// Candidate count above which exact containment runs on the rayon pool.
///
/// Below this count the per-task overhead outweighs the parallel speedup.
///
/// # Example
///
/// ```rust
/// use config::constants::PARALLEL_SELECTION_THRESHOLD;
///
/// let candidates = 100;
/// let parallel = candidates >= PARALLEL_SELECTION_THRESHOLD;
/// assert!(!parallel);
/// ```
pub const PARALLEL_SELECTION_THRESHOLD: usize = 4096;

// =============================================================================
// HANDLER DEFAULTS
// =============================================================================

/// Default extrusion vector when `extrude_vector` is omitted.
pub const DEFAULT_EXTRUDE_VECTOR: [f64; 3] = [0.0, 0.0, 1.0];

/// Default uniform scale factor when `scale_factor` is omitted.
pub const DEFAULT_SCALE_FACTOR: f64 = 1.0;

/// Default subdivision level when `subdivision_level` is omitted.
pub const DEFAULT_SUBDIVISION_LEVEL: u32 = 1;

/// Default inset fraction when `inset_depth` is omitted.
///
/// Each face vertex moves this fraction of the way toward the face centroid.
pub const DEFAULT_INSET_DEPTH: f64 = 0.1;

// =============================================================================
// PREVIEW CONSTANTS
// =============================================================================

/// Default segment count for sphere and cylinder preview meshes.
///
/// # Example
///
/// ```rust
/// use config::constants::{DEFAULT_PREVIEW_SEGMENTS, MIN_PREVIEW_SEGMENTS};
///
/// assert!(DEFAULT_PREVIEW_SEGMENTS >= MIN_PREVIEW_SEGMENTS);
/// ```
pub const DEFAULT_PREVIEW_SEGMENTS: u32 = 32;

/// Minimum segment count for any round preview mesh.
pub const MIN_PREVIEW_SEGMENTS: u32 = 3;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if a volume extent is degenerate.
///
/// # Example
///
/// ```rust
/// use config::constants::is_degenerate_extent;
///
/// assert!(is_degenerate_extent(0.0));
/// assert!(is_degenerate_extent(-1.0));
/// assert!(is_degenerate_extent(f64::NAN));
/// assert!(!is_degenerate_extent(0.5));
/// ```
#[inline]
pub fn is_degenerate_extent(value: f64) -> bool {
    !value.is_finite() || value <= MIN_VOLUME_EXTENT
}

/// Clamps a requested preview segment count to the supported minimum.
///
/// # Example
///
/// ```rust
/// use config::constants::{preview_segments, MIN_PREVIEW_SEGMENTS};
///
/// assert_eq!(preview_segments(1), MIN_PREVIEW_SEGMENTS);
/// assert_eq!(preview_segments(48), 48);
/// ```
#[inline]
pub fn preview_segments(requested: u32) -> u32 {
    requested.max(MIN_PREVIEW_SEGMENTS)
}
