//! Graph construction for one patch.
//!
//! Steps
//! 1. Classify every ghost-region cell from its corner samples.
//! 2. Promote regular cells touching a covered cell to degenerate irregular nodes.
//! 3. Compute, validate and threshold the moments of each irregular cell of
//!    the ghost region; valid cells that survive become nodes.
//! 4. Repair the valid neighbors of pruned cells.

use tracing::debug;

use super::repair::{promote_regular_next_to_covered, repair_pruned};
use super::types::{ArcTarget, CellFlags, CellKind, EbGraphPatch, FaceArc, IrregNode, PatchStats};
use crate::cutcell::{compute_vof_moments, CellFrame, VofMoments};
use crate::error::GeometryError;
use crate::implicit::ImplicitFunction;
use crate::index::{GridPatch, IndexBox, IntVect, RealVect, Side};
use crate::validate::Validator;

/// Pruning policy and diagnostics level for one build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildParams {
    /// Irregular cells with a volume fraction below this are dropped (`<= 0` disables).
    pub vof_threshold: f64,
    pub verbosity: i32,
}

/// Classify a box of cells at once: `Regular` if the function is negative at
/// every grid node touching the box, `Covered` if non-negative at every node,
/// `Irregular` otherwise.
pub fn classify_region<const D: usize>(
    func: &dyn ImplicitFunction<D>,
    patch: &GridPatch<D>,
    region: &IndexBox<D>,
) -> CellKind {
    let mut nodes = region.surrounding_nodes().iter();
    let Some(first) = nodes.next() else {
        return CellKind::Covered;
    };
    let first_fluid = func.is_fluid(&patch.node_position(&first));
    if nodes.any(|n| func.is_fluid(&patch.node_position(&n)) != first_fluid) {
        return CellKind::Irregular;
    }
    if first_fluid {
        CellKind::Regular
    } else {
        CellKind::Covered
    }
}

/// Corner-sample classification of every cell of the ghost region.
pub fn classify_cells<const D: usize>(
    func: &dyn ImplicitFunction<D>,
    patch: &GridPatch<D>,
) -> CellFlags<D> {
    let mut flags = CellFlags::new(patch.ghost, CellKind::Covered);
    for iv in patch.ghost.iter() {
        let cell = IndexBox::new(iv, iv);
        flags.set(&iv, classify_region(func, patch, &cell));
    }
    flags
}

/// Build the embedded-boundary graph of `patch`.
///
/// The volume-fraction threshold is also evaluated on the ghost cells, so
/// neighboring patches agree on which cells end up covered. Only valid cells
/// get nodes, and only valid-cell clamps are reported.
pub fn fill_graph<const D: usize>(
    func: &dyn ImplicitFunction<D>,
    patch: &GridPatch<D>,
    params: &BuildParams,
    validator: &Validator<'_>,
) -> Result<EbGraphPatch<D>, GeometryError> {
    patch.check()?;

    let mut flags = classify_cells(func, patch);
    let mut stats = PatchStats {
        covered: flags.count(CellKind::Covered),
        regular: flags.count(CellKind::Regular),
        irregular: flags.count(CellKind::Irregular),
        pruned: 0,
    };
    let irregular: Vec<IntVect<D>> = patch
        .ghost
        .iter()
        .filter(|iv| flags.get(iv) == Some(CellKind::Irregular))
        .collect();

    let mut nodes = promote_regular_next_to_covered(&mut flags, patch);

    let ghost_validator = validator.quiet();
    let mut kept = Vec::new();
    let mut pruned = Vec::new();
    for iv in irregular {
        let in_valid = patch.valid.contains(&iv);
        let frame = CellFrame::new(func, patch, iv);
        let mut m = compute_vof_moments(&frame)?;
        if in_valid {
            validator.validate_moments(&mut m, &iv);
        } else {
            ghost_validator.validate_moments(&mut m, &iv);
        }
        let below = params.vof_threshold > 0.0 && m.vol_frac < params.vof_threshold;
        if m.vol_frac <= 0.0 || below {
            if in_valid {
                stats.pruned += 1;
                if params.verbosity > 2 {
                    debug!(
                        cell = %iv,
                        vol_frac = m.vol_frac,
                        "removing cell below the volume threshold"
                    );
                }
            }
            flags.set(&iv, CellKind::Covered);
            pruned.push(iv);
        } else if in_valid {
            kept.push((iv, m));
        }
    }
    // Arcs are built against the pruned map.
    for (iv, m) in kept {
        nodes.push(node_from_moments(m, &flags, patch, iv));
    }

    repair_pruned(&mut flags, &mut nodes, patch, &pruned)?;

    debug!(
        covered = stats.covered,
        regular = stats.regular,
        irregular = stats.irregular,
        pruned = stats.pruned,
        nodes = nodes.len(),
        "patch graph built"
    );
    Ok(EbGraphPatch::new(flags, nodes, stats))
}

/// Face centroid of a full face: `±0.5` on `axis`, zero elsewhere.
pub(crate) fn full_face_centroid<const D: usize>(axis: usize, side: Side) -> RealVect<D> {
    let mut c = RealVect::<D>::zeros();
    c[axis] = side.offset();
    c
}

/// Arc through face `(axis, side)` of `iv`, or `None` when the face is closed
/// because the neighbor inside the domain is covered.
pub(crate) fn face_target<const D: usize>(
    flags: &CellFlags<D>,
    patch: &GridPatch<D>,
    iv: &IntVect<D>,
    axis: usize,
    side: Side,
) -> Option<ArcTarget> {
    let nb = iv.shifted(axis, side.sign());
    if !patch.domain.contains(&nb) {
        return Some(ArcTarget::DomainBoundary);
    }
    match flags.get(&nb) {
        Some(CellKind::Covered) => None,
        _ => Some(ArcTarget::Interior),
    }
}

fn node_from_moments<const D: usize>(
    m: VofMoments<D>,
    flags: &CellFlags<D>,
    patch: &GridPatch<D>,
    iv: IntVect<D>,
) -> IrregNode<D> {
    let faces = std::array::from_fn(|axis| {
        std::array::from_fn(|s| {
            let side = Side::ALL[s];
            let fm = &m.faces[axis][s];
            if fm.covered {
                return None;
            }
            face_target(flags, patch, &iv, axis, side).map(|target| FaceArc {
                target,
                area_frac: fm.area,
                centroid: fm.centroid,
            })
        })
    });
    IrregNode {
        cell: iv,
        vol_frac: m.vol_frac,
        vol_centroid: m.vol_centroid,
        bndry_centroid: m.bndry_centroid,
        bndry_area: m.bndry_area,
        normal: m.normal,
        faces,
    }
}
