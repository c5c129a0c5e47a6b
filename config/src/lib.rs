//! # Config Crate
//!
//! Centralized configuration constants for the volume tool-call engine.
//! All magic numbers and tunable parameters are defined here to ensure
//! consistency across crates and easy configuration management.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{MIN_VOLUME_EXTENT, QUATERNION_NORM_TOLERANCE};
//!
//! // A radius at or below MIN_VOLUME_EXTENT is a degenerate volume
//! let radius: f64 = 1e-12;
//! assert!(radius <= MIN_VOLUME_EXTENT);
//!
//! // Quaternion norms must sit within QUATERNION_NORM_TOLERANCE of 1
//! let norm: f64 = 1.00005;
//! assert!((norm - 1.0).abs() <= QUATERNION_NORM_TOLERANCE);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Fail Closed**: Validation bounds are explicit, never inferred
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
