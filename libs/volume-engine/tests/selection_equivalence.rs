use glam::{DQuat, DVec3};
use proptest::prelude::*;
use volume_engine::selection::{select, select_exhaustive};
use volume_engine::spatial_index::SpatialIndex;
use volume_engine::VolumeIdentifier;
use volume_mesh::EditableMesh;

fn point(extent: f64) -> impl Strategy<Value = DVec3> {
    (-extent..extent, -extent..extent, -extent..extent).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

fn rotation() -> impl Strategy<Value = [f64; 4]> {
    (-1.0..1.0, -1.0..1.0, -1.0..1.0, 0.1..1.0).prop_map(|(x, y, z, w)| {
        let q = DQuat::from_xyzw(x, y, z, w).normalize();
        [q.w, q.x, q.y, q.z]
    })
}

/// Triangle soup inside a 20-unit cube; degenerate index triples are skipped.
fn mesh(max_vertices: usize, max_faces: usize) -> impl Strategy<Value = EditableMesh> {
    prop::collection::vec(point(10.0), 3..max_vertices)
        .prop_flat_map(move |vertices| {
            let n = vertices.len() as u32;
            let faces = prop::collection::vec((0..n, 0..n, 0..n), 1..max_faces);
            (Just(vertices), faces)
        })
        .prop_map(|(vertices, faces)| {
            let mut mesh = EditableMesh::new();
            for v in vertices {
                mesh.add_vertex(v);
            }
            for (a, b, c) in faces {
                if a != b && b != c && a != c {
                    mesh.add_triangle(a, b, c);
                }
            }
            mesh
        })
}

fn volume() -> impl Strategy<Value = VolumeIdentifier> {
    prop_oneof![
        (point(8.0), (0.5..9.0, 0.5..9.0, 0.5..9.0), rotation()).prop_map(
            |(center, (x, y, z), rotation)| VolumeIdentifier::Box {
                center,
                dimensions: DVec3::new(x, y, z),
                rotation,
            }
        ),
        (point(8.0), 0.5..6.0).prop_map(|(center, radius)| VolumeIdentifier::Sphere { center, radius }),
        (point(8.0), 0.5..5.0, 0.5..9.0, rotation()).prop_map(|(center, radius, height, rotation)| {
            VolumeIdentifier::Cylinder {
                center,
                radius,
                height,
                rotation,
            }
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn indexed_selection_matches_exhaustive(
        mesh in mesh(400, 600),
        volumes in prop::collection::vec(volume(), 1..6)
    ) {
        let index = SpatialIndex::from_mesh(&mesh);
        for volume in volumes {
            let volume = volume.resolve();
            prop_assert_eq!(
                select(&volume, &index, &mesh, usize::MAX),
                select_exhaustive(&volume, &mesh)
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn parallel_selection_matches_sequential(mesh in mesh(3000, 2000), volume in volume()) {
        let index = SpatialIndex::from_mesh(&mesh);
        let volume = volume.resolve();
        prop_assert_eq!(
            select(&volume, &index, &mesh, usize::MAX),
            select(&volume, &index, &mesh, 0)
        );
    }
}

#[test]
fn sphere_boundary_is_inclusive() {
    let mut mesh = EditableMesh::new();
    mesh.add_vertex(DVec3::new(5.0, 0.0, 0.0));
    mesh.add_vertex(DVec3::new(5.0001, 0.0, 0.0));
    mesh.add_vertex(DVec3::new(0.0, -5.0, 0.0));
    let index = SpatialIndex::from_mesh(&mesh);
    let volume = VolumeIdentifier::Sphere {
        center: DVec3::ZERO,
        radius: 5.0,
    }
    .resolve();

    let selection = select(&volume, &index, &mesh, usize::MAX);
    assert!(selection.contains_vertex(0));
    assert!(!selection.contains_vertex(1));
    assert!(selection.contains_vertex(2));
}

#[test]
fn box_face_boundary_is_inclusive() {
    let mut mesh = EditableMesh::new();
    mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
    mesh.add_vertex(DVec3::new(1.0 + 1e-9, 0.0, 0.0));
    let index = SpatialIndex::from_mesh(&mesh);
    let volume = VolumeIdentifier::Box {
        center: DVec3::ZERO,
        dimensions: DVec3::splat(2.0),
        rotation: [1.0, 0.0, 0.0, 0.0],
    }
    .resolve();

    let selection = select(&volume, &index, &mesh, usize::MAX);
    assert_eq!(selection.vertex_indices.into_iter().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn rotated_box_selects_center_not_origin() {
    let center = DVec3::new(15.7, -3.2, 8.5);
    let mut mesh = EditableMesh::new();
    mesh.add_vertex(center);
    mesh.add_vertex(DVec3::ZERO);
    let index = SpatialIndex::from_mesh(&mesh);
    let volume = VolumeIdentifier::Box {
        center,
        dimensions: DVec3::new(4.5, 2.1, 3.0),
        rotation: [0.966, 0.0, 0.259, 0.0],
    }
    .resolve();

    let selection = select(&volume, &index, &mesh, usize::MAX);
    assert!(selection.contains_vertex(0));
    assert!(!selection.contains_vertex(1));
}

#[test]
fn face_needs_every_vertex_inside() {
    let mut mesh = EditableMesh::new();
    let a = mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
    let b = mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
    let c = mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
    let d = mesh.add_vertex(DVec3::new(4.0, 4.0, 0.0));
    mesh.add_triangle(a, b, c);
    mesh.add_triangle(b, d, c);
    let index = SpatialIndex::from_mesh(&mesh);
    let volume = VolumeIdentifier::Sphere {
        center: DVec3::ZERO,
        radius: 1.5,
    }
    .resolve();

    let selection = select(&volume, &index, &mesh, usize::MAX);
    assert_eq!(selection.vertex_count(), 3);
    assert!(selection.contains_face(0));
    assert!(!selection.contains_face(1));
}
