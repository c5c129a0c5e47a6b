//! Scale operation for selected vertices.

use super::{fmt_vec, HandlerContext, HandlerOutput};
use crate::document::ScaleParams;
use crate::error::ExecutionError;
use glam::DVec3;
use volume_mesh::MutationBuilder;


/// Scales the selected vertices about the volume center.
///
/// The factor is applied along the volume's local axes, so a rotated box
/// scales along its own edges rather than the world axes.
pub fn scale_vertices(
    cx: &HandlerContext<'_>,
    params: &ScaleParams,
) -> Result<HandlerOutput, ExecutionError> {
    if cx.selection.vertex_indices.is_empty() {
        return Ok(HandlerOutput::noop("no vertices selected"));
    }
    if params.factor == DVec3::ONE {
        return Ok(HandlerOutput::noop("identity scale"));
    }

    let positions = cx.mesh.vertex_positions();
    let mut builder = MutationBuilder::new(positions.len(), cx.mesh.face_count());

    for &v in &cx.selection.vertex_indices {
        let local = cx.volume.to_local(positions[v as usize]);
        builder.move_vertex(v, cx.volume.to_world(local * params.factor));
    }

    let affected = cx.selection.vertex_count();
    Ok(HandlerOutput {
        mutation: builder.finish(),
        detail: format!("scaled {affected} vertices by {}", fmt_vec(params.factor)),
        affected,
    })
}
