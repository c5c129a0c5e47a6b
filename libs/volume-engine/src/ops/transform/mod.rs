//! Affine transform of selected vertices.

use super::{HandlerContext, HandlerOutput};
use crate::document::TransformParams;
use crate::error::ExecutionError;
use glam::DMat4;
use volume_mesh::MutationBuilder;


/// Applies the matrix to the selected vertices relative to the volume
/// center: `p' = center + M · (p - center)`.
pub fn transform_vertices(
    cx: &HandlerContext<'_>,
    params: &TransformParams,
) -> Result<HandlerOutput, ExecutionError> {
    if cx.selection.vertex_indices.is_empty() {
        return Ok(HandlerOutput::noop("no vertices selected"));
    }
    if params.matrix == DMat4::IDENTITY {
        return Ok(HandlerOutput::noop("identity transform"));
    }

    let positions = cx.mesh.vertex_positions();
    let center = cx.volume.center();
    let mut builder = MutationBuilder::new(positions.len(), cx.mesh.face_count());

    for &v in &cx.selection.vertex_indices {
        let p = positions[v as usize];
        let moved = center + params.matrix.transform_point3(p - center);
        if !moved.is_finite() {
            return Err(ExecutionError::failure(format!(
                "transform produced a non-finite position for vertex {v}"
            )));
        }
        builder.move_vertex(v, moved);
    }

    let affected = cx.selection.vertex_count();
    Ok(HandlerOutput {
        mutation: builder.finish(),
        detail: format!("transformed {affected} vertices"),
        affected,
    })
}
