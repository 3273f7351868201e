//! Graph data: cell classification map, irregular nodes, and the per-patch result.

use std::collections::HashMap;

use crate::index::{IndexBox, IntVect, RealVect, Side};

/// Classification of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Covered,
    Irregular,
    Regular,
}

impl CellKind {
    /// Integer flag: `1` regular, `-1` covered, `0` irregular.
    pub fn flag(self) -> i8 {
        match self {
            CellKind::Regular => 1,
            CellKind::Covered => -1,
            CellKind::Irregular => 0,
        }
    }
}

/// Dense classification over a box (the patch's ghost region).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellFlags<const D: usize> {
    region: IndexBox<D>,
    kinds: Vec<CellKind>,
}

impl<const D: usize> CellFlags<D> {
    pub fn new(region: IndexBox<D>, fill: CellKind) -> Self {
        Self {
            region,
            kinds: vec![fill; region.num_cells()],
        }
    }

    pub fn region(&self) -> &IndexBox<D> {
        &self.region
    }

    /// Kind of `iv`, or `None` outside the region.
    pub fn get(&self, iv: &IntVect<D>) -> Option<CellKind> {
        self.region.offset(iv).map(|k| self.kinds[k])
    }

    /// Set the kind of `iv`; cells outside the region are ignored.
    pub fn set(&mut self, iv: &IntVect<D>, kind: CellKind) {
        if let Some(k) = self.region.offset(iv) {
            self.kinds[k] = kind;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (IntVect<D>, CellKind)> + '_ {
        self.region.iter().zip(self.kinds.iter().copied())
    }

    pub fn count(&self, kind: CellKind) -> usize {
        self.kinds.iter().filter(|&&k| k == kind).count()
    }

    /// Integer flags in box order (see `CellKind::flag`).
    pub fn flags(&self) -> Vec<i8> {
        self.kinds.iter().map(|k| k.flag()).collect()
    }
}

/// Where a face leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArcTarget {
    /// The neighboring cell inside the domain.
    Interior,
    /// Outside the domain.
    DomainBoundary,
}

impl ArcTarget {
    /// Integer arc id: `0` interior, `-1` domain boundary.
    pub fn id(self) -> i32 {
        match self {
            ArcTarget::Interior => 0,
            ArcTarget::DomainBoundary => -1,
        }
    }
}

/// One open face of an irregular node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceArc<const D: usize> {
    pub target: ArcTarget,
    pub area_frac: f64,
    /// Cell-local; the normal component is `±0.5`.
    pub centroid: RealVect<D>,
}

/// Geometry record of one irregular cell.
#[derive(Clone, Debug, PartialEq)]
pub struct IrregNode<const D: usize> {
    pub cell: IntVect<D>,
    pub vol_frac: f64,
    pub vol_centroid: RealVect<D>,
    pub bndry_centroid: RealVect<D>,
    pub bndry_area: f64,
    /// Unit boundary normal pointing out of the fluid (zero when `bndry_area == 0`).
    pub normal: RealVect<D>,
    /// Indexed `[axis][side]`; `None` means no connection through that face.
    pub faces: [[Option<FaceArc<D>>; 2]; D],
}

impl<const D: usize> IrregNode<D> {
    #[inline]
    pub fn face(&self, axis: usize, side: Side) -> Option<&FaceArc<D>> {
        self.faces[axis][side.index()].as_ref()
    }

    #[inline]
    pub fn clear_face(&mut self, axis: usize, side: Side) {
        self.faces[axis][side.index()] = None;
    }

    /// Area fraction of a face, `0` when absent.
    pub fn area_frac(&self, axis: usize, side: Side) -> f64 {
        self.face(axis, side).map_or(0.0, |f| f.area_frac)
    }

    /// `Σ_d (A_lo − A_hi) e_d`, the boundary area vector implied by the faces.
    pub fn face_area_vector(&self) -> RealVect<D> {
        RealVect::<D>::from_fn(|d, _| self.area_frac(d, Side::Lo) - self.area_frac(d, Side::Hi))
    }
}

/// Classification counts of one patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Counts over the ghost region as first classified.
    pub covered: usize,
    pub regular: usize,
    pub irregular: usize,
    /// Irregular valid cells removed by the volume-fraction threshold.
    pub pruned: usize,
}

/// Embedded-boundary graph of one patch.
#[derive(Clone, Debug, PartialEq)]
pub struct EbGraphPatch<const D: usize> {
    pub flags: CellFlags<D>,
    /// Irregular nodes in construction order.
    nodes: Vec<IrregNode<D>>,
    /// Cell to position in `nodes`.
    lookup: HashMap<IntVect<D>, usize>,
    pub stats: PatchStats,
}

impl<const D: usize> EbGraphPatch<D> {
    pub fn new(flags: CellFlags<D>, nodes: Vec<IrregNode<D>>, stats: PatchStats) -> Self {
        let lookup = nodes.iter().enumerate().map(|(k, n)| (n.cell, k)).collect();
        Self {
            flags,
            nodes,
            lookup,
            stats,
        }
    }

    pub fn nodes(&self) -> &[IrregNode<D>] {
        &self.nodes
    }

    pub fn node(&self, cell: &IntVect<D>) -> Option<&IrregNode<D>> {
        self.lookup.get(cell).map(|&k| &self.nodes[k])
    }

    /// Fluid volume in cell units over the valid region: regular cells count 1,
    /// irregular cells their volume fraction.
    pub fn fluid_cells(&self, valid: &IndexBox<D>) -> f64 {
        let regular = valid
            .iter()
            .filter(|iv| self.flags.get(iv) == Some(CellKind::Regular))
            .count() as f64;
        regular + self.nodes.iter().map(|n| n.vol_frac).sum::<f64>()
    }
}
