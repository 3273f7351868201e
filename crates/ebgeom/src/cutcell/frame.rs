//! Per-cell evaluation context: corner samples, local ↔ physical mapping and
//! the crossing search along axis-aligned segments.

use tracing::warn;

use super::root::brent_root;
use crate::error::GeometryError;
use crate::implicit::ImplicitFunction;
use crate::index::{GridPatch, IntVect, RealVect};

/// One cell of a patch together with the implicit function sampled at its corners.
///
/// Corner `mask` bit `d` set means the corner sits on the high side along axis `d`.
pub struct CellFrame<'a, const D: usize> {
    func: &'a dyn ImplicitFunction<D>,
    patch: &'a GridPatch<D>,
    iv: IntVect<D>,
    corners: Vec<f64>,
}

impl<'a, const D: usize> CellFrame<'a, D> {
    pub fn new(
        func: &'a dyn ImplicitFunction<D>,
        patch: &'a GridPatch<D>,
        iv: IntVect<D>,
    ) -> Self {
        let corners = (0..1usize << D)
            .map(|mask| func.value(&patch.node_position(&corner_node(&iv, mask))))
            .collect();
        Self {
            func,
            patch,
            iv,
            corners,
        }
    }

    #[inline]
    pub fn cell(&self) -> IntVect<D> {
        self.iv
    }

    #[inline]
    pub fn corner_value(&self, mask: usize) -> f64 {
        self.corners[mask]
    }

    pub fn corner_values(&self) -> &[f64] {
        &self.corners
    }

    #[inline]
    pub fn physical(&self, local: &RealVect<D>) -> RealVect<D> {
        self.patch.physical(&self.iv, local)
    }

    #[inline]
    pub fn value_local(&self, local: &RealVect<D>) -> f64 {
        self.func.value(&self.physical(local))
    }

    /// Crossing along `axis` on the cell-spanning segment through `through`
    /// (its `axis` component is ignored). Returns the crossing's local coordinate.
    ///
    /// The endpoints must bracket a sign change. They are mapped exactly like
    /// the corner samples, so an edge classified as cut stays bracketed.
    pub fn crossing_along(
        &self,
        through: &RealVect<D>,
        axis: usize,
    ) -> Result<f64, GeometryError> {
        let mut start = *through;
        start[axis] = -0.5;
        let mut end = *through;
        end[axis] = 0.5;
        let base = self.physical(&start);
        let (x_lo, x_hi) = (base[axis], self.physical(&end)[axis]);
        let eval = |t: f64| {
            let mut p = base;
            p[axis] = t;
            self.func.value(&p)
        };
        let est = brent_root(eval, x_lo, x_hi).map_err(|source| GeometryError::Root {
            cell: self.iv.to_string(),
            source,
        })?;
        if !est.converged {
            warn!(
                cell = %self.iv,
                axis,
                iterations = est.iterations,
                "crossing search hit the iteration cap"
            );
        }
        Ok(self.root_to_local(est.root, (x_lo, x_hi), axis))
    }

    /// Local coordinate of a root found on `[x_lo, x_hi]`. A root outside the
    /// segment (ill-conditioned data) is replaced by the segment midpoint.
    pub(crate) fn root_to_local(&self, root: f64, (x_lo, x_hi): (f64, f64), axis: usize) -> f64 {
        if !(x_lo..=x_hi).contains(&root) {
            warn!(
                cell = %self.iv,
                axis,
                root,
                "ill-conditioned edge data; using the segment midpoint"
            );
            return 0.0;
        }
        self.patch.local_coord(&self.iv, axis, root)
    }
}

/// Cell-local position of corner `mask`.
#[inline]
pub(crate) fn corner_local<const D: usize>(mask: usize) -> RealVect<D> {
    RealVect::<D>::from_fn(|d, _| if mask & (1 << d) != 0 { 0.5 } else { -0.5 })
}

/// Grid node at corner `mask` of cell `iv`.
#[inline]
pub(crate) fn corner_node<const D: usize>(iv: &IntVect<D>, mask: usize) -> IntVect<D> {
    IntVect(std::array::from_fn(|d| iv[d] + ((mask >> d) & 1) as i64))
}
