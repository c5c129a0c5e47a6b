//! Subdivision of selected faces.
//!
//! Each pass splits every selected n-gon into n quads that meet at the face
//! centroid and at the midpoints of its edges. Midpoints are shared between
//! adjacent selected faces. Unselected faces that border a split edge get
//! the midpoint inserted into their loop, so the mesh stays free of
//! T-junctions. The quads of one pass are the selection of the next.

use super::{HandlerContext, HandlerOutput};
use crate::document::SubdivideParams;
use crate::error::ExecutionError;
use glam::DVec3;
use std::collections::{BTreeMap, HashMap, HashSet};
use volume_mesh::{Face, MeshHandle, MeshMutation};


/// Working copy of the parts of a mesh an edit touches.
///
/// Reads fall through to the host mesh; writes are kept aside until
/// [`EditBuffer::into_mutation`].
struct EditBuffer<'a> {
    mesh: &'a dyn MeshHandle,
    added_positions: Vec<DVec3>,
    replaced: BTreeMap<u32, Face>,
    added_faces: Vec<Face>,
}

impl<'a> EditBuffer<'a> {
    fn new(mesh: &'a dyn MeshHandle) -> Self {
        Self {
            mesh,
            added_positions: Vec::new(),
            replaced: BTreeMap::new(),
            added_faces: Vec::new(),
        }
    }

    fn position(&self, v: u32) -> DVec3 {
        let base = self.mesh.vertex_count();
        let v = v as usize;
        if v < base {
            self.mesh.vertex_positions()[v]
        } else {
            self.added_positions[v - base]
        }
    }

    fn face_count(&self) -> usize {
        self.mesh.face_count() + self.added_faces.len()
    }

    fn face(&self, f: u32) -> &Face {
        let base = self.mesh.face_count();
        let i = f as usize;
        if i >= base {
            &self.added_faces[i - base]
        } else {
            self.replaced
                .get(&f)
                .unwrap_or_else(|| &self.mesh.faces()[i])
        }
    }

    fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.mesh.vertex_count() + self.added_positions.len();
        self.added_positions.push(position);
        index as u32
    }

    fn add_face(&mut self, face: Face) -> u32 {
        let index = self.face_count() as u32;
        self.added_faces.push(face);
        index
    }

    fn set_face(&mut self, f: u32, face: Face) {
        let base = self.mesh.face_count();
        let i = f as usize;
        if i >= base {
            self.added_faces[i - base] = face;
        } else {
            self.replaced.insert(f, face);
        }
    }

    fn centroid(&self, face: &Face) -> DVec3 {
        let sum: DVec3 = face.indices.iter().map(|&v| self.position(v)).sum();
        sum / face.len() as f64
    }

    fn into_mutation(self) -> MeshMutation {
        MeshMutation {
            added_vertices: self.added_positions,
            replaced_faces: self.replaced.into_iter().collect(),
            added_faces: self.added_faces,
            ..MeshMutation::default()
        }
    }
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

/// Runs one subdivision pass and returns the faces it produced.
fn subdivide_pass(buffer: &mut EditBuffer<'_>, selected: &[u32]) -> Vec<u32> {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut produced = Vec::with_capacity(selected.len() * 4);

    for &f in selected {
        let face = buffer.face(f).clone();
        let n = face.len();
        let center = buffer.add_vertex(buffer.centroid(&face));

        let mids: Vec<u32> = face
            .edges()
            .map(|(a, b)| match midpoints.get(&edge_key(a, b)) {
                Some(&m) => m,
                None => {
                    let m = buffer.add_vertex((buffer.position(a) + buffer.position(b)) / 2.0);
                    midpoints.insert(edge_key(a, b), m);
                    m
                }
            })
            .collect();

        for k in 0..n {
            let quad = Face::new(vec![
                face.indices[k],
                mids[k],
                center,
                mids[(k + n - 1) % n],
            ])
            .with_material_of(&face);

            if k == 0 {
                buffer.set_face(f, quad);
                produced.push(f);
            } else {
                produced.push(buffer.add_face(quad));
            }
        }
    }

    let produced_set: HashSet<u32> = produced.iter().copied().collect();
    for f in 0..buffer.face_count() as u32 {
        if produced_set.contains(&f) {
            continue;
        }
        let face = buffer.face(f);
        if !face.edges().any(|(a, b)| midpoints.contains_key(&edge_key(a, b))) {
            continue;
        }

        let mut indices = Vec::with_capacity(face.len() * 2);
        for (a, b) in face.edges() {
            indices.push(a);
            if let Some(&m) = midpoints.get(&edge_key(a, b)) {
                indices.push(m);
            }
        }
        let updated = Face {
            indices,
            material: face.material.clone(),
        };
        buffer.set_face(f, updated);
    }

    produced
}

/// Subdivides the selected faces `level` times.
pub fn subdivide_faces(
    cx: &HandlerContext<'_>,
    params: &SubdivideParams,
) -> Result<HandlerOutput, ExecutionError> {
    if cx.selection.face_indices.is_empty() {
        return Ok(HandlerOutput::noop("no faces selected"));
    }

    let mut buffer = EditBuffer::new(cx.mesh);
    let mut selected: Vec<u32> = cx.selection.face_indices.iter().copied().collect();

    for _ in 0..params.level {
        selected = subdivide_pass(&mut buffer, &selected);
    }

    let affected = cx.selection.face_count();
    let produced = selected.len();
    Ok(HandlerOutput {
        mutation: buffer.into_mutation(),
        detail: format!(
            "subdivided {affected} faces into {produced} at level {}",
            params.level
        ),
        affected,
    })
}
