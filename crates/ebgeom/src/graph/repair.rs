//! Consistency repairs of the classification map and node list.
//!
//! A regular cell must never share an open face with a covered cell, and no
//! arc may lead into a cell that the threshold turned covered. Both repairs
//! turn the offending regular neighbors into degenerate irregular nodes.

use std::collections::HashMap;

use super::build::{face_target, full_face_centroid};
use super::types::{CellFlags, CellKind, FaceArc, IrregNode};
use crate::error::GeometryError;
use crate::index::{GridPatch, IntVect, RealVect, Side};

/// Node for a full cell next to at least one covered neighbor: volume fraction
/// 1, every face open except those toward covered cells, boundary on the
/// covered faces.
pub fn degenerate_node<const D: usize>(
    flags: &CellFlags<D>,
    patch: &GridPatch<D>,
    iv: IntVect<D>,
) -> IrregNode<D> {
    let mut closed = RealVect::<D>::zeros();
    let mut n_closed = 0usize;
    let faces = std::array::from_fn(|axis| {
        std::array::from_fn(|s| {
            let side = Side::ALL[s];
            match face_target(flags, patch, &iv, axis, side) {
                Some(target) => Some(FaceArc {
                    target,
                    area_frac: 1.0,
                    centroid: full_face_centroid(axis, side),
                }),
                None => {
                    closed += full_face_centroid::<D>(axis, side);
                    n_closed += 1;
                    None
                }
            }
        })
    });
    let mut node = IrregNode {
        cell: iv,
        vol_frac: 1.0,
        vol_centroid: RealVect::<D>::zeros(),
        bndry_centroid: RealVect::<D>::zeros(),
        bndry_area: 0.0,
        normal: RealVect::<D>::zeros(),
        faces,
    };
    if n_closed > 0 {
        node.bndry_centroid = closed / n_closed as f64;
    }
    let area_vec = node.face_area_vector();
    node.bndry_area = area_vec.norm();
    if node.bndry_area > 0.0 {
        node.normal = area_vec / node.bndry_area;
    }
    node
}

/// Promote every regular ghost-region cell that shares a face with a covered
/// cell to irregular; valid-region promotions get a degenerate node.
///
/// Corner sampling alone cannot produce such a pair (neighbors share their
/// face corners), but a caller-modified map can.
pub fn promote_regular_next_to_covered<const D: usize>(
    flags: &mut CellFlags<D>,
    patch: &GridPatch<D>,
) -> Vec<IrregNode<D>> {
    let covered: Vec<IntVect<D>> = flags
        .iter()
        .filter(|&(_, k)| k == CellKind::Covered)
        .map(|(iv, _)| iv)
        .collect();
    let mut nodes = Vec::new();
    for iv in covered {
        for axis in 0..D {
            for side in Side::ALL {
                let nb = iv.shifted(axis, side.sign());
                if flags.get(&nb) != Some(CellKind::Regular) {
                    continue;
                }
                flags.set(&nb, CellKind::Irregular);
                if patch.valid.contains(&nb) {
                    nodes.push(degenerate_node(flags, patch, nb));
                }
            }
        }
    }
    nodes
}

/// Close every face of the valid region leading into a pruned cell.
///
/// Irregular neighbors lose the arc toward the pruned cell; regular neighbors
/// become degenerate nodes. A neighbor flagged irregular without a node is a
/// logic error.
pub fn repair_pruned<const D: usize>(
    flags: &mut CellFlags<D>,
    nodes: &mut Vec<IrregNode<D>>,
    patch: &GridPatch<D>,
    pruned: &[IntVect<D>],
) -> Result<(), GeometryError> {
    if pruned.is_empty() {
        return Ok(());
    }
    let mut index: HashMap<IntVect<D>, usize> =
        nodes.iter().enumerate().map(|(k, n)| (n.cell, k)).collect();
    for iv in pruned {
        for axis in 0..D {
            for side in Side::ALL {
                let nb = iv.shifted(axis, side.sign());
                if !patch.valid.contains(&nb) {
                    continue;
                }
                match flags.get(&nb) {
                    Some(CellKind::Irregular) => {
                        let k = *index.get(&nb).ok_or_else(|| GeometryError::MissingNode {
                            cell: nb.to_string(),
                        })?;
                        nodes[k].clear_face(axis, side.flip());
                    }
                    Some(CellKind::Regular) => {
                        flags.set(&nb, CellKind::Irregular);
                        index.insert(nb, nodes.len());
                        nodes.push(degenerate_node(flags, patch, nb));
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}
