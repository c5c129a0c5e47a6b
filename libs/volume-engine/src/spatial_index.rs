//! # Spatial Index for Vertex Queries
//!
//! Uses spatial hashing to prune vertices that cannot lie in a query box.
//!
//! ## Features
//!
//! - **Spatial hashing**: grid cells map to the vertices inside them
//! - **Box queries**: candidates are every vertex in an overlapping cell,
//!   so a query never misses a vertex inside the box
//! - **Adjacency**: vertex to incident-face lists for face selection
//! - **Caching**: [`SpatialIndexCache`] rebuilds only when the mesh version
//!   changes

use crate::volume::Aabb;
use config::constants::{CELL_SIZE_FACTOR, MIN_CELL_SIZE};
use glam::DVec3;
use std::collections::HashMap;
use tracing::debug;
use volume_mesh::MeshHandle;

/// 3D cell coordinate for spatial hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i32,
    y: i32,
    z: i32,
}

impl CellCoord {
    /// Creates a cell coordinate from 3D position.
    fn from_position(pos: DVec3, cell_size: f64) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i32,
            y: (pos.y / cell_size).floor() as i32,
            z: (pos.z / cell_size).floor() as i32,
        }
    }
}

/// Hash grid over mesh vertices plus vertex/face adjacency.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// Hash grid: cell -> vertex indices
    grid: HashMap<CellCoord, Vec<u32>>,
    /// Cell size for hashing
    cell_size: f64,
    /// Mesh bounds, `None` when the mesh has no vertices
    bounds: Option<Aabb>,
    /// Faces touching each vertex
    incident_faces: Vec<Vec<u32>>,
    /// Copy of the indexed positions for the linear fallback
    positions: Vec<DVec3>,
    /// Mesh version the index was built from
    version: u64,
}

impl SpatialIndex {
    /// Builds an index from a mesh handle.
    pub fn from_mesh(mesh: &dyn MeshHandle) -> Self {
        let mut index = Self::build(mesh.vertex_positions(), mesh.faces());
        index.version = mesh.version();
        index
    }

    /// Builds an index from positions and faces.
    ///
    /// Cell size is derived from the mesh extent and vertex count.
    pub fn build(positions: &[DVec3], faces: &[volume_mesh::Face]) -> Self {
        let bounds = positions.first().map(|&first| {
            let (min, max) = positions
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
            Aabb::new(min, max)
        });

        let cell_size = match bounds {
            Some(b) => {
                let extent = b.max - b.min;
                let avg_extent = (extent.x + extent.y + extent.z) / 3.0;
                (avg_extent / (positions.len() as f64).cbrt() * CELL_SIZE_FACTOR)
                    .max(MIN_CELL_SIZE)
            }
            None => MIN_CELL_SIZE,
        };

        let mut grid: HashMap<CellCoord, Vec<u32>> = HashMap::new();
        for (i, p) in positions.iter().enumerate() {
            grid.entry(CellCoord::from_position(*p, cell_size))
                .or_default()
                .push(i as u32);
        }

        let mut incident_faces = vec![Vec::new(); positions.len()];
        for (fi, face) in faces.iter().enumerate() {
            for (k, &v) in face.indices.iter().enumerate() {
                // A vertex repeated in one face is only recorded once
                if face.indices[..k].contains(&v) {
                    continue;
                }
                if let Some(list) = incident_faces.get_mut(v as usize) {
                    list.push(fi as u32);
                }
            }
        }

        Self {
            grid,
            cell_size,
            bounds,
            incident_faces,
            positions: positions.to_vec(),
            version: 0,
        }
    }

    /// Mesh version the index was built from.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    /// Edge length of a grid cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of indexed vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Bounds of the indexed vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Faces incident to a vertex.
    pub fn incident_faces(&self, vertex: u32) -> &[u32] {
        self.incident_faces
            .get(vertex as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns every vertex that may lie inside `query`.
    ///
    /// No vertex inside the box is ever omitted. Vertices outside it may be
    /// returned.
    pub fn candidates_in_aabb(&self, query: &Aabb) -> Vec<u32> {
        let Some(clipped) = self.bounds.and_then(|b| b.intersection(query)) else {
            return Vec::new();
        };

        let cell_min = CellCoord::from_position(clipped.min, self.cell_size);
        let cell_max = CellCoord::from_position(clipped.max, self.cell_size);

        let span = |lo: i32, hi: i32| (hi as i64 - lo as i64 + 1) as f64;
        let cells = span(cell_min.x, cell_max.x)
            * span(cell_min.y, cell_max.y)
            * span(cell_min.z, cell_max.z);

        if cells > self.positions.len() as f64 {
            debug!(cells, "query spans more cells than vertices, scanning linearly");
            return self
                .positions
                .iter()
                .enumerate()
                .filter(|(_, p)| clipped.contains(**p))
                .map(|(i, _)| i as u32)
                .collect();
        }

        let mut result = Vec::new();
        for cx in cell_min.x..=cell_max.x {
            for cy in cell_min.y..=cell_max.y {
                for cz in cell_min.z..=cell_max.z {
                    let cell = CellCoord { x: cx, y: cy, z: cz };
                    if let Some(vertices) = self.grid.get(&cell) {
                        result.extend_from_slice(vertices);
                    }
                }
            }
        }

        result
    }
}

/// Holds the index of the most recently seen mesh version.
#[derive(Debug, Default)]
pub struct SpatialIndexCache {
    index: Option<SpatialIndex>,
    builds: usize,
}

impl SpatialIndexCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index for the mesh, rebuilding it if the version changed.
    pub fn get_or_build(&mut self, mesh: &dyn MeshHandle) -> &SpatialIndex {
        let stale = match &self.index {
            Some(index) => {
                index.version != mesh.version() || index.vertex_count() != mesh.vertex_count()
            }
            None => true,
        };

        if stale {
            debug!(
                version = mesh.version(),
                vertices = mesh.vertex_count(),
                "rebuilding spatial index"
            );
            self.builds += 1;
            self.index = Some(SpatialIndex::from_mesh(mesh));
        }

        self.index.get_or_insert_with(|| SpatialIndex::from_mesh(mesh))
    }

    /// Number of times an index has been built.
    pub fn builds(&self) -> usize {
        self.builds
    }
}
