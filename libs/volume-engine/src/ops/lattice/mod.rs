//! Free-form lattice deformation.
//!
//! A 2x2x2 lattice spans the volume's local bounding box. Corner `i` sits at
//! local `(±hx, ±hy, ±hz)` with the sign of each axis taken from bit
//! `x | y << 1 | z << 2`. Deformed corners are `M · corner + offset[i]`;
//! selected vertices follow the trilinear blend of the deformed corners.

use super::{HandlerContext, HandlerOutput};
use crate::document::LatticeParams;
use crate::error::ExecutionError;
use glam::{DMat3, DVec3};
use volume_mesh::MutationBuilder;


/// Local position of lattice corner `i`.
fn corner(i: usize, half: DVec3) -> DVec3 {
    let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
    DVec3::new(sign(1) * half.x, sign(2) * half.y, sign(4) * half.z)
}

/// Trilinear blend of eight corners at normalized coordinates `t`.
fn trilinear(corners: &[DVec3; 8], t: DVec3) -> DVec3 {
    corners
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let wx = if i & 1 == 0 { 1.0 - t.x } else { t.x };
            let wy = if i & 2 == 0 { 1.0 - t.y } else { t.y };
            let wz = if i & 4 == 0 { 1.0 - t.z } else { t.z };
            *c * (wx * wy * wz)
        })
        .sum()
}

/// Deforms the selected vertices through the lattice.
pub fn deform_lattice(
    cx: &HandlerContext<'_>,
    params: &LatticeParams,
) -> Result<HandlerOutput, ExecutionError> {
    if cx.selection.vertex_indices.is_empty() {
        return Ok(HandlerOutput::noop("no vertices selected"));
    }
    if params.matrix == DMat3::IDENTITY && params.offsets.iter().all(|o| *o == DVec3::ZERO) {
        return Ok(HandlerOutput::noop("identity lattice"));
    }

    let half = cx.volume.local_half_extents();
    let deformed: [DVec3; 8] =
        std::array::from_fn(|i| params.matrix * corner(i, half) + params.offsets[i]);

    let positions = cx.mesh.vertex_positions();
    let mut builder = MutationBuilder::new(positions.len(), cx.mesh.face_count());

    for &v in &cx.selection.vertex_indices {
        let local = cx.volume.to_local(positions[v as usize]);
        let t = ((local + half) / (2.0 * half)).clamp(DVec3::ZERO, DVec3::ONE);
        builder.move_vertex(v, cx.volume.to_world(trilinear(&deformed, t)));
    }

    let affected = cx.selection.vertex_count();
    Ok(HandlerOutput {
        mutation: builder.finish(),
        detail: format!("deformed {affected} vertices through a 2x2x2 lattice"),
        affected,
    })
}
