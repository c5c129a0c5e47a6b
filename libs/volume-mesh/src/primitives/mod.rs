//! # Primitives
//!
//! Polygon mesh generation for cuboids, spheres, cylinders and planar grids.
//!
//! All primitives emit counter-clockwise outward faces and reject
//! non-positive sizes.

pub mod cuboid;
pub mod cylinder;
pub mod grid;
pub mod sphere;

pub use cuboid::create_cuboid;
pub use cylinder::create_cylinder;
pub use grid::create_grid;
pub use sphere::create_sphere;
