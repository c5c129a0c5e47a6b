//! # Volume Mesh
//!
//! Host-side polygon mesh model for volume-scoped editing.
//!
//! ## Architecture
//!
//! ```text
//! volume-engine (handlers) → MeshMutation → MeshHandle (host mesh)
//! ```
//!
//! The engine never edits a mesh directly. Handlers read positions and faces
//! through [`MeshHandle`], describe their edit as a [`MeshMutation`], and the
//! host applies it atomically.
//!
//! ## Usage
//!
//! ```rust
//! use volume_mesh::{primitives::create_cuboid, MeshHandle};
//! use glam::DVec3;
//!
//! let mesh = create_cuboid(DVec3::splat(2.0), true).unwrap();
//! assert_eq!(mesh.vertex_count(), 8);
//! assert_eq!(MeshHandle::face_count(&mesh), 6);
//! ```

pub mod error;
pub mod handle;
pub mod io;
pub mod mesh;
pub mod mutation;
pub mod primitives;

pub use error::MeshError;
pub use handle::MeshHandle;
pub use mesh::{face_centroid, face_normal, EditableMesh, Face};
pub use mutation::{MeshMutation, MutationBuilder};
