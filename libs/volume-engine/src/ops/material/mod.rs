//! Material assignment for selected faces.

use super::{HandlerContext, HandlerOutput};
use crate::document::MaterialParams;
use crate::error::ExecutionError;
use volume_mesh::MutationBuilder;


/// Assigns a material to every selected face.
///
/// The material must be known to the host mesh. Faces that already carry it
/// are left alone, so repeating the call changes nothing.
pub fn apply_material(
    cx: &HandlerContext<'_>,
    params: &MaterialParams,
) -> Result<HandlerOutput, ExecutionError> {
    let name = params.material_name.as_str();
    if !cx.mesh.has_material(name) {
        return Err(ExecutionError::failure(format!("unknown material '{name}'")));
    }

    if cx.selection.face_indices.is_empty() {
        return Ok(HandlerOutput::noop("no faces selected"));
    }

    let faces = cx.mesh.faces();
    let mut builder = MutationBuilder::new(cx.mesh.vertex_count(), faces.len());
    let mut assigned = 0;

    for &f in &cx.selection.face_indices {
        if faces[f as usize].material.as_deref() != Some(name) {
            builder.assign_material(f, name);
            assigned += 1;
        }
    }

    let unchanged = cx.selection.face_count() - assigned;
    Ok(HandlerOutput {
        mutation: builder.finish(),
        detail: format!("assigned '{name}' to {assigned} faces ({unchanged} already set)"),
        affected: assigned,
    })
}
