//! Individual inset of selected faces.

use super::{HandlerContext, HandlerOutput};
use crate::document::InsetParams;
use crate::error::ExecutionError;
use volume_mesh::{face_centroid, Face, MutationBuilder};


/// Insets each selected face toward its own centroid.
///
/// Every face gets a shrunken copy of its loop (`v + depth · (c - v)`) that
/// replaces it in place, and one bridging quad per edge joins the original
/// loop to the inset loop. The outer loop is untouched, so neighbouring
/// faces stay connected.
pub fn inset_faces(
    cx: &HandlerContext<'_>,
    params: &InsetParams,
) -> Result<HandlerOutput, ExecutionError> {
    if cx.selection.face_indices.is_empty() {
        return Ok(HandlerOutput::noop("no faces selected"));
    }

    let positions = cx.mesh.vertex_positions();
    let faces = cx.mesh.faces();
    let mut builder = MutationBuilder::new(positions.len(), faces.len());

    for &f in &cx.selection.face_indices {
        let face = &faces[f as usize];
        let centroid = face_centroid(positions, face);

        let inner: Vec<u32> = face
            .indices
            .iter()
            .map(|&v| {
                let p = positions[v as usize];
                builder.add_vertex(p + (centroid - p) * params.depth)
            })
            .collect();

        let n = face.len();
        for k in 0..n {
            let next = (k + 1) % n;
            builder.add_face(
                Face::new(vec![
                    face.indices[k],
                    face.indices[next],
                    inner[next],
                    inner[k],
                ])
                .with_material_of(face),
            );
        }

        builder.replace_face(f, Face::new(inner).with_material_of(face));
    }

    let affected = cx.selection.face_count();
    Ok(HandlerOutput {
        mutation: builder.finish(),
        detail: format!("inset {affected} faces by {}", params.depth),
        affected,
    })
}
