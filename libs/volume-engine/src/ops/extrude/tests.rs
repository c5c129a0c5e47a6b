use super::*;
use crate::document::Operation;
use crate::ops::test_support::{apply, run};
use crate::volume::{VolumeIdentifier, IDENTITY_WXYZ};
use glam::DVec3;
use volume_mesh::primitives::{create_cuboid, create_grid};
use volume_mesh::{face_normal, EditableMesh};

fn extrude(vector: DVec3) -> Operation {
    Operation::ExtrudeFaces(ExtrudeParams { vector })
}

fn assert_closed(mesh: &EditableMesh) {
    let edges: HashSet<(u32, u32)> = mesh.faces().iter().flat_map(|f| f.edges()).collect();
    for &(a, b) in &edges {
        assert!(edges.contains(&(b, a)), "edge ({a}, {b}) has no twin");
    }
}

#[test]
fn test_extrude_cube_top() {
    let mut mesh = create_cuboid(DVec3::splat(2.0), true).unwrap();
    let volume = VolumeIdentifier::Box {
        center: DVec3::new(0.0, 0.0, 1.0),
        dimensions: DVec3::new(2.5, 2.5, 0.5),
        rotation: IDENTITY_WXYZ,
    };
    let output = apply(&mut mesh, &volume, &extrude(DVec3::new(0.0, 0.0, 2.0)));
    assert_eq!(output.affected, 1);
    assert_eq!(mesh.vertex_count(), 12);
    assert_eq!(mesh.face_count(), 10);
    let (_, max) = mesh.bounding_box();
    assert_eq!(max.z, 3.0);
    assert_closed(&mesh);
}

#[test]
fn test_side_faces_point_outward() {
    let mut mesh = create_cuboid(DVec3::splat(2.0), true).unwrap();
    let volume = VolumeIdentifier::Box {
        center: DVec3::new(0.0, 0.0, 1.0),
        dimensions: DVec3::new(2.5, 2.5, 0.5),
        rotation: IDENTITY_WXYZ,
    };
    apply(&mut mesh, &volume, &extrude(DVec3::Z));
    for fi in 6..10u32 {
        let face = mesh.face(fi);
        let normal = face_normal(mesh.vertices(), face);
        let centroid = mesh.face_centroid(fi);
        assert!(normal.dot(centroid.truncate().extend(0.0)) > 0.0);
    }
}

#[test]
fn test_interior_vertices_move_instead_of_duplicating() {
    // 3 x 3 grid; select the whole thing
    let mut mesh = create_grid(3.0, 3.0, 3, 3).unwrap();
    let volume = VolumeIdentifier::Sphere {
        center: DVec3::ZERO,
        radius: 5.0,
    };
    apply(&mut mesh, &volume, &extrude(DVec3::Z));
    // 12 border vertices duplicated, 4 interior moved
    assert_eq!(mesh.vertex_count(), 16 + 12);
    // 9 caps + 12 border walls
    assert_eq!(mesh.face_count(), 9 + 12);
    assert_eq!(mesh.vertex(5).z, 1.0);
}

#[test]
fn test_region_shares_internal_edges() {
    let mut mesh = create_grid(4.0, 2.0, 2, 1).unwrap();
    let volume = VolumeIdentifier::Sphere {
        center: DVec3::ZERO,
        radius: 5.0,
    };
    apply(&mut mesh, &volume, &extrude(DVec3::Z));
    // Two caps and six walls; no wall along the shared edge
    assert_eq!(mesh.face_count(), 8);
}

#[test]
fn test_partial_region_on_grid() {
    let mut mesh = create_grid(4.0, 4.0, 4, 4).unwrap();
    let volume = VolumeIdentifier::Box {
        center: DVec3::new(0.5, 0.5, 0.0),
        dimensions: DVec3::new(1.0, 1.0, 1.0),
        rotation: IDENTITY_WXYZ,
    };
    let before = mesh.face_count();
    apply(&mut mesh, &volume, &extrude(DVec3::new(0.0, 0.0, -1.0)));
    assert_eq!(mesh.face_count(), before + 4);
    assert_eq!(mesh.vertex_count(), 25 + 4);
}

#[test]
fn test_empty_region_is_noop() {
    let mesh = create_cuboid(DVec3::splat(2.0), true).unwrap();
    let volume = VolumeIdentifier::Sphere {
        center: DVec3::splat(10.0),
        radius: 1.0,
    };
    let (_, output) = run(&mesh, &volume, &extrude(DVec3::Z));
    assert!(output.unwrap().mutation.is_noop());
}
