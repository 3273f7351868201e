//! Edge classification and per-cell edge resolution.
//!
//! Every one of the `D · 2^(D-1)` edges of a cell is classified from its end
//! samples and, when the sign changes along it, cut at the crossing. The
//! resolved edge stores the fluid part of the segment in cell-local
//! coordinates; covered edges collapse to their midpoint.

use super::frame::{corner_local, CellFrame};
use crate::error::GeometryError;
use crate::index::RealVect;

/// Classification shared by edges and faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CutKind {
    /// Entirely outside the domain.
    Covered,
    /// Entirely inside the domain.
    Regular,
    /// The boundary crosses it.
    Ambiguous,
}

/// Classify a segment from its end values. `f < 0` is fluid; everything else
/// (zero and `-0.0` included) is covered.
#[inline]
pub fn classify_edge(f_lo: f64, f_hi: f64) -> CutKind {
    let lo_fluid = f_lo < 0.0;
    let hi_fluid = f_hi < 0.0;
    match (lo_fluid, hi_fluid) {
        (true, true) => CutKind::Regular,
        (false, false) => CutKind::Covered,
        _ => CutKind::Ambiguous,
    }
}

/// A cell edge reduced to its fluid part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellEdge<const D: usize> {
    pub axis: usize,
    pub kind: CutKind,
    /// Low end of the fluid part (cell-local).
    pub lo: RealVect<D>,
    /// High end of the fluid part (cell-local).
    pub hi: RealVect<D>,
    /// For ambiguous edges: the crossing replaced the low end.
    pub intersect_lo: bool,
}

impl<const D: usize> CellEdge<D> {
    /// Fluid length in cell units.
    #[inline]
    pub fn length(&self) -> f64 {
        self.hi[self.axis] - self.lo[self.axis]
    }

    #[inline]
    pub fn centroid(&self) -> RealVect<D> {
        (self.lo + self.hi) * 0.5
    }

    /// Boundary crossing, present on ambiguous edges only.
    pub fn crossing(&self) -> Option<RealVect<D>> {
        match self.kind {
            CutKind::Ambiguous if self.intersect_lo => Some(self.lo),
            CutKind::Ambiguous => Some(self.hi),
            _ => None,
        }
    }
}

/// All edges of one cell.
///
/// An edge is addressed by its `axis` and the corner mask `base` of its low
/// end (bit `axis` clear).
#[derive(Clone, Debug)]
pub struct CellEdges<const D: usize> {
    edges: Vec<CellEdge<D>>,
}

impl<const D: usize> CellEdges<D> {
    pub fn resolve(frame: &CellFrame<'_, D>) -> Result<Self, GeometryError> {
        let mut edges = Vec::with_capacity(D << (D - 1));
        for axis in 0..D {
            for base in (0..1usize << D).filter(|m| m & (1 << axis) == 0) {
                edges.push(resolve_edge(frame, axis, base)?);
            }
        }
        Ok(Self { edges })
    }

    #[inline]
    pub fn get(&self, axis: usize, base: usize) -> &CellEdge<D> {
        let low = base & ((1 << axis) - 1);
        let high = (base >> (axis + 1)) << axis;
        &self.edges[(axis << (D - 1)) + (high | low)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellEdge<D>> {
        self.edges.iter()
    }
}

fn resolve_edge<const D: usize>(
    frame: &CellFrame<'_, D>,
    axis: usize,
    base: usize,
) -> Result<CellEdge<D>, GeometryError> {
    let top = base | (1 << axis);
    let (f_lo, f_hi) = (frame.corner_value(base), frame.corner_value(top));
    let mut lo = corner_local::<D>(base);
    let mut hi = corner_local::<D>(top);
    let kind = classify_edge(f_lo, f_hi);
    let mut intersect_lo = false;
    match kind {
        CutKind::Regular => {}
        CutKind::Covered => {
            lo[axis] = 0.0;
            hi[axis] = 0.0;
        }
        CutKind::Ambiguous => {
            let x = frame.crossing_along(&lo, axis)?;
            if f_hi >= 0.0 {
                hi[axis] = x;
            } else {
                lo[axis] = x;
                intersect_lo = true;
            }
        }
    }
    Ok(CellEdge {
        axis,
        kind,
        lo,
        hi,
        intersect_lo,
    })
}
