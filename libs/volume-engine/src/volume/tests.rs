//! Tests for volume resolution and containment.

use super::*;
use approx::assert_relative_eq;

fn unit_box(center: DVec3, dimensions: DVec3) -> ResolvedVolume {
    VolumeIdentifier::Box {
        center,
        dimensions,
        rotation: IDENTITY_WXYZ,
    }
    .resolve()
}

/// Quaternion for a rotation of `angle` radians about `axis`, as `[w, x, y, z]`.
fn axis_angle_wxyz(axis: DVec3, angle: f64) -> [f64; 4] {
    let q = DQuat::from_axis_angle(axis.normalize(), angle);
    [q.w, q.x, q.y, q.z]
}

// =============================================================================
// BOX
// =============================================================================

#[test]
fn test_box_boundary_is_inclusive() {
    let volume = unit_box(DVec3::new(1.0, 2.0, 3.0), DVec3::new(2.0, 4.0, 6.0));
    assert!(volume.contains(DVec3::new(2.0, 2.0, 3.0)));
    assert!(volume.contains(DVec3::new(1.0, 0.0, 3.0)));
    assert!(volume.contains(DVec3::new(1.0, 2.0, 6.0)));
    assert!(volume.contains(DVec3::new(0.0, 4.0, 0.0)));
}

#[test]
fn test_box_just_outside_is_rejected() {
    let volume = unit_box(DVec3::new(1.0, 2.0, 3.0), DVec3::new(2.0, 4.0, 6.0));
    let eps = 1e-9;
    assert!(!volume.contains(DVec3::new(2.0 + eps, 2.0, 3.0)));
    assert!(!volume.contains(DVec3::new(1.0, 0.0 - eps, 3.0)));
    assert!(!volume.contains(DVec3::new(1.0, 2.0, 6.0 + eps)));
}

#[test]
fn test_rotated_box_contains_center_not_origin() {
    // Rotation of 30 degrees about Y, close to [0.966, 0, 0.259, 0]
    let volume = VolumeIdentifier::Box {
        center: DVec3::new(15.7, -3.2, 8.5),
        dimensions: DVec3::new(4.5, 2.1, 3.0),
        rotation: [0.966, 0.0, 0.259, 0.0],
    }
    .resolve();
    assert!(volume.contains(DVec3::new(15.7, -3.2, 8.5)));
    assert!(!volume.contains(DVec3::ZERO));
}

#[test]
fn test_rotated_box_uses_local_axes() {
    // 90 degrees about Z swaps the X and Y extents
    let volume = VolumeIdentifier::Box {
        center: DVec3::ZERO,
        dimensions: DVec3::new(10.0, 2.0, 2.0),
        rotation: axis_angle_wxyz(DVec3::Z, std::f64::consts::FRAC_PI_2),
    }
    .resolve();
    assert!(volume.contains(DVec3::new(0.0, 4.5, 0.0)));
    assert!(!volume.contains(DVec3::new(4.5, 0.0, 0.0)));
}

// =============================================================================
// SPHERE
// =============================================================================

#[test]
fn test_sphere_boundary() {
    let volume = VolumeIdentifier::Sphere {
        center: DVec3::ZERO,
        radius: 5.0,
    }
    .resolve();
    assert!(volume.contains(DVec3::new(5.0, 0.0, 0.0)));
    assert!(volume.contains(DVec3::new(0.0, -5.0, 0.0)));
    assert!(volume.contains(DVec3::new(3.0, 4.0, 0.0)));
    assert!(!volume.contains(DVec3::new(5.0001, 0.0, 0.0)));
    assert!(!volume.contains(DVec3::new(0.0, 0.0, -5.0001)));
}

#[test]
fn test_sphere_off_origin() {
    let volume = VolumeIdentifier::Sphere {
        center: DVec3::new(10.0, 10.0, 10.0),
        radius: 1.0,
    }
    .resolve();
    assert!(volume.contains(DVec3::new(10.0, 10.0, 11.0)));
    assert!(!volume.contains(DVec3::ZERO));
}

// =============================================================================
// CYLINDER
// =============================================================================

#[test]
fn test_cylinder_boundaries() {
    let volume = VolumeIdentifier::Cylinder {
        center: DVec3::ZERO,
        radius: 2.0,
        height: 4.0,
        rotation: IDENTITY_WXYZ,
    }
    .resolve();
    assert!(volume.contains(DVec3::new(2.0, 0.0, 2.0)));
    assert!(volume.contains(DVec3::new(0.0, 0.0, -2.0)));
    assert!(!volume.contains(DVec3::new(0.0, 0.0, 2.0001)));
    assert!(!volume.contains(DVec3::new(1.5, 1.5, 0.0)));
}

#[test]
fn test_cylinder_axis_follows_rotation() {
    // Tip the axis from Z onto X
    let volume = VolumeIdentifier::Cylinder {
        center: DVec3::ZERO,
        radius: 0.5,
        height: 10.0,
        rotation: axis_angle_wxyz(DVec3::Y, std::f64::consts::FRAC_PI_2),
    }
    .resolve();
    assert!(volume.contains(DVec3::new(4.9, 0.0, 0.0)));
    assert!(!volume.contains(DVec3::new(0.0, 0.0, 4.9)));
}

// =============================================================================
// FRAMES AND BOUNDS
// =============================================================================

#[test]
fn test_local_world_round_trip() {
    let volume = VolumeIdentifier::Box {
        center: DVec3::new(-3.0, 7.0, 2.0),
        dimensions: DVec3::ONE,
        rotation: axis_angle_wxyz(DVec3::new(1.0, 2.0, 3.0), 0.7),
    }
    .resolve();
    let p = DVec3::new(0.3, -1.2, 9.0);
    let back = volume.to_world(volume.to_local(p));
    assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
    assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
    assert_relative_eq!(back.z, p.z, epsilon = 1e-12);
}

#[test]
fn test_world_aabb_covers_rotated_corners() {
    let volume = VolumeIdentifier::Box {
        center: DVec3::new(1.0, 1.0, 1.0),
        dimensions: DVec3::new(3.0, 1.0, 2.0),
        rotation: axis_angle_wxyz(DVec3::new(1.0, 1.0, 0.0), 1.1),
    }
    .resolve();
    let aabb = volume.world_aabb();
    let half = volume.local_half_extents();
    for i in 0..8 {
        let sign = DVec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        );
        let corner = volume.to_world(sign * half);
        assert!(aabb.contains(corner), "corner {i} outside world AABB");
    }
}

#[test]
fn test_world_aabb_sphere() {
    let volume = VolumeIdentifier::Sphere {
        center: DVec3::new(2.0, 0.0, 0.0),
        radius: 1.0,
    }
    .resolve();
    let aabb = volume.world_aabb();
    assert!(aabb.contains(DVec3::new(3.0, 0.0, 0.0)));
    assert!(aabb.contains(DVec3::new(1.0, 0.0, 0.0)));
    assert!(!aabb.contains(DVec3::new(3.1, 0.0, 0.0)));
}

#[test]
fn test_aabb_intersection() {
    let a = Aabb::new(DVec3::ZERO, DVec3::splat(2.0));
    let b = Aabb::new(DVec3::ONE, DVec3::splat(3.0));
    let c = Aabb::new(DVec3::splat(5.0), DVec3::splat(6.0));
    assert_eq!(a.intersection(&b), Some(Aabb::new(DVec3::ONE, DVec3::splat(2.0))));
    assert_eq!(a.intersection(&c), None);
    assert!(a.expanded(3.0).intersects(&c));
}

#[test]
fn test_to_json_round_trips_through_type_tag() {
    let volume = VolumeIdentifier::Cylinder {
        center: DVec3::ONE,
        radius: 1.0,
        height: 2.0,
        rotation: IDENTITY_WXYZ,
    };
    let json = volume.to_json();
    assert_eq!(json["type"], "cylinder");
    assert_eq!(json["height"], 2.0);
    assert_eq!(volume.type_name(), "cylinder");
    assert!(volume.to_string().starts_with("cylinder"));
}
