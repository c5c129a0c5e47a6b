//! Region extrusion of selected faces.
//!
//! ## Algorithm
//!
//! 1. Collect the directed edges of the selected faces. An edge whose
//!    reverse is not among them lies on the region boundary.
//! 2. Vertices on the boundary, or shared with an unselected face, are
//!    duplicated at `p + vector`. Vertices used only inside the region are
//!    moved by `vector` instead.
//! 3. Selected faces are rewired onto the moved or duplicated vertices,
//!    keeping their slots (they become the cap).
//! 4. Each boundary edge `(a, b)` gets a side quad `[a, b, b', a']`.

use super::{fmt_vec, HandlerContext, HandlerOutput};
use crate::document::ExtrudeParams;
use crate::error::ExecutionError;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use volume_mesh::{Face, MutationBuilder};

#[cfg(test)]
mod tests;

/// Extrudes the selected faces as one connected region.
pub fn extrude_faces(
    cx: &HandlerContext<'_>,
    params: &ExtrudeParams,
) -> Result<HandlerOutput, ExecutionError> {
    let selected = &cx.selection.face_indices;
    if selected.is_empty() {
        return Ok(HandlerOutput::noop("no faces selected"));
    }

    let positions = cx.mesh.vertex_positions();
    let faces = cx.mesh.faces();

    let region_edges: HashSet<(u32, u32)> = selected
        .iter()
        .flat_map(|&f| faces[f as usize].edges())
        .collect();

    // Boundary edges in face order, each with the face that owns it
    let boundary: Vec<(u32, u32, u32)> = selected
        .iter()
        .flat_map(|&f| faces[f as usize].edges().map(move |(a, b)| (f, a, b)))
        .filter(|&(_, a, b)| !region_edges.contains(&(b, a)))
        .collect();

    let region_vertices: BTreeSet<u32> = selected
        .iter()
        .flat_map(|&f| faces[f as usize].indices.iter().copied())
        .collect();

    let mut keep_original: BTreeSet<u32> = boundary
        .iter()
        .flat_map(|&(_, a, b)| [a, b])
        .collect();
    for (fi, face) in faces.iter().enumerate() {
        if selected.contains(&(fi as u32)) {
            continue;
        }
        keep_original.extend(
            face.indices
                .iter()
                .copied()
                .filter(|v| region_vertices.contains(v)),
        );
    }

    let mut builder = MutationBuilder::new(positions.len(), faces.len());
    let mut lifted: BTreeMap<u32, u32> = BTreeMap::new();
    for &v in &region_vertices {
        let target = positions[v as usize] + params.vector;
        let index = if keep_original.contains(&v) {
            builder.add_vertex(target)
        } else {
            builder.move_vertex(v, target);
            v
        };
        lifted.insert(v, index);
    }

    let lift = |v: u32| lifted.get(&v).copied().unwrap_or(v);

    for &f in selected {
        let face = &faces[f as usize];
        let indices = face.indices.iter().map(|&v| lift(v)).collect();
        builder.replace_face(
            f,
            Face {
                indices,
                material: face.material.clone(),
            },
        );
    }

    for &(f, a, b) in &boundary {
        builder.add_face(
            Face::new(vec![a, b, lift(b), lift(a)]).with_material_of(&faces[f as usize]),
        );
    }

    let affected = selected.len();
    Ok(HandlerOutput {
        mutation: builder.finish(),
        detail: format!(
            "extruded {affected} faces by {} with {} side faces",
            fmt_vec(params.vector),
            boundary.len()
        ),
        affected,
    })
}
