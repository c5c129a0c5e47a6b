//! # Volume Geometry
//!
//! Volume identifiers and their resolved containment predicates.
//!
//! A [`VolumeIdentifier`] is the validated, typed description of a region.
//! [`VolumeIdentifier::resolve`] turns it into a [`ResolvedVolume`] that maps
//! world points into the volume's local frame and answers containment there.
//!
//! ## Local Frame
//!
//! `local = R⁻¹ · (world - center)`, where `R` is the rotation given by the
//! identifier's quaternion. Quaternions are used as given and never
//! renormalized. All bounds are inclusive.

use config::constants::AABB_PADDING;
use glam::{DMat3, DQuat, DVec3};
use serde_json::{json, Value};
use std::fmt;

#[cfg(test)]
mod tests;

/// Identity rotation in `[w, x, y, z]` order.
pub const IDENTITY_WXYZ: [f64; 4] = [1.0, 0.0, 0.0, 0.0];

/// A typed spatial region.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeIdentifier {
    /// Oriented box
    Box {
        /// World-space center
        center: DVec3,
        /// Full edge lengths along the local axes
        dimensions: DVec3,
        /// Rotation quaternion `[w, x, y, z]`
        rotation: [f64; 4],
    },
    /// Sphere
    Sphere {
        /// World-space center
        center: DVec3,
        /// Radius
        radius: f64,
    },
    /// Oriented cylinder whose axis is the local Z axis
    Cylinder {
        /// World-space center (midpoint of the axis)
        center: DVec3,
        /// Radius
        radius: f64,
        /// Full height along the axis
        height: f64,
        /// Rotation quaternion `[w, x, y, z]`
        rotation: [f64; 4],
    },
}

impl VolumeIdentifier {
    /// Returns the world-space center.
    pub fn center(&self) -> DVec3 {
        match self {
            VolumeIdentifier::Box { center, .. }
            | VolumeIdentifier::Sphere { center, .. }
            | VolumeIdentifier::Cylinder { center, .. } => *center,
        }
    }

    /// Returns the `type` tag used in documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            VolumeIdentifier::Box { .. } => "box",
            VolumeIdentifier::Sphere { .. } => "sphere",
            VolumeIdentifier::Cylinder { .. } => "cylinder",
        }
    }

    /// Resolves the identifier into a containment predicate.
    pub fn resolve(&self) -> ResolvedVolume {
        let (center, rotation, shape) = match *self {
            VolumeIdentifier::Box {
                center,
                dimensions,
                rotation,
            } => (
                center,
                rotation,
                LocalShape::Box {
                    half: dimensions / 2.0,
                },
            ),
            VolumeIdentifier::Sphere { center, radius } => {
                (center, IDENTITY_WXYZ, LocalShape::Sphere { radius })
            }
            VolumeIdentifier::Cylinder {
                center,
                radius,
                height,
                rotation,
            } => (
                center,
                rotation,
                LocalShape::Cylinder {
                    radius,
                    half_height: height / 2.0,
                },
            ),
        };

        let to_local = DMat3::from_quat(quat_from_wxyz(rotation).conjugate());
        ResolvedVolume {
            center,
            to_local,
            to_world: to_local.inverse(),
            shape,
        }
    }

    /// Serializes the identifier in document form.
    pub fn to_json(&self) -> Value {
        match self {
            VolumeIdentifier::Box {
                center,
                dimensions,
                rotation,
            } => json!({
                "type": "box",
                "center_xyz": center.to_array(),
                "dimensions_xyz": dimensions.to_array(),
                "rotation_quaternion_wxyz": rotation,
            }),
            VolumeIdentifier::Sphere { center, radius } => json!({
                "type": "sphere",
                "center_xyz": center.to_array(),
                "radius": radius,
            }),
            VolumeIdentifier::Cylinder {
                center,
                radius,
                height,
                rotation,
            } => json!({
                "type": "cylinder",
                "center_xyz": center.to_array(),
                "radius": radius,
                "height": height,
                "rotation_quaternion_wxyz": rotation,
            }),
        }
    }
}

impl fmt::Display for VolumeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.center();
        match self {
            VolumeIdentifier::Box { dimensions: d, .. } => write!(
                f,
                "box at ({}, {}, {}) size ({}, {}, {})",
                c.x, c.y, c.z, d.x, d.y, d.z
            ),
            VolumeIdentifier::Sphere { radius, .. } => {
                write!(f, "sphere at ({}, {}, {}) r={}", c.x, c.y, c.z, radius)
            }
            VolumeIdentifier::Cylinder { radius, height, .. } => write!(
                f,
                "cylinder at ({}, {}, {}) r={} h={}",
                c.x, c.y, c.z, radius, height
            ),
        }
    }
}

/// Converts a `[w, x, y, z]` array into a quaternion without normalizing.
pub fn quat_from_wxyz(q: [f64; 4]) -> DQuat {
    DQuat::from_xyzw(q[1], q[2], q[3], q[0])
}

/// Shape of a resolved volume in its local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalShape {
    /// Box with half extents
    Box {
        /// Half edge lengths
        half: DVec3,
    },
    /// Sphere
    Sphere {
        /// Radius
        radius: f64,
    },
    /// Cylinder along local Z
    Cylinder {
        /// Radius
        radius: f64,
        /// Half of the full height
        half_height: f64,
    },
}

impl LocalShape {
    /// Inclusive containment test for a local-space point.
    #[inline]
    pub fn contains(&self, local: DVec3) -> bool {
        match *self {
            LocalShape::Box { half } => {
                local.x.abs() <= half.x && local.y.abs() <= half.y && local.z.abs() <= half.z
            }
            LocalShape::Sphere { radius } => local.length() <= radius,
            LocalShape::Cylinder {
                radius,
                half_height,
            } => local.truncate().length() <= radius && local.z.abs() <= half_height,
        }
    }

    /// Half extents of the shape's local bounding box.
    pub fn half_extents(&self) -> DVec3 {
        match *self {
            LocalShape::Box { half } => half,
            LocalShape::Sphere { radius } => DVec3::splat(radius),
            LocalShape::Cylinder {
                radius,
                half_height,
            } => DVec3::new(radius, radius, half_height),
        }
    }
}

/// A volume ready for containment queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedVolume {
    center: DVec3,
    to_local: DMat3,
    to_world: DMat3,
    shape: LocalShape,
}

impl ResolvedVolume {
    /// World-space center.
    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Local shape.
    pub fn shape(&self) -> LocalShape {
        self.shape
    }

    /// Linear map from local coordinates to world offsets.
    pub fn to_world_matrix(&self) -> DMat3 {
        self.to_world
    }

    /// Maps a world point into the local frame.
    #[inline]
    pub fn to_local(&self, world: DVec3) -> DVec3 {
        self.to_local * (world - self.center)
    }

    /// Maps a local point back to world space.
    #[inline]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.center + self.to_world * local
    }

    /// Inclusive containment test for a world point.
    #[inline]
    pub fn contains(&self, world: DVec3) -> bool {
        self.shape.contains(self.to_local(world))
    }

    /// Half extents of the local bounding box.
    pub fn local_half_extents(&self) -> DVec3 {
        self.shape.half_extents()
    }

    /// Conservative world-space bounding box.
    ///
    /// Every point [`contains`](Self::contains) accepts lies inside it.
    pub fn world_aabb(&self) -> Aabb {
        let m = self.to_world;
        let abs = DMat3::from_cols(m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs());
        let half = abs * self.local_half_extents();
        let pad = (DVec3::ONE + half + self.center.abs()) * AABB_PADDING;
        let extent = half + pad;
        Aabb::new(self.center - extent, self.center + extent)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
}

impl Aabb {
    /// Creates a box from its corners.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Returns true if the point is inside (inclusive).
    #[inline]
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Returns true if the boxes overlap (inclusive).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Overlap of two boxes, or `None` if they are disjoint.
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        if !self.intersects(other) {
            return None;
        }
        Some(Aabb::new(self.min.max(other.min), self.max.min(other.max)))
    }

    /// Grows the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Aabb {
        Aabb::new(self.min - DVec3::splat(margin), self.max + DVec3::splat(margin))
    }
}
