//! Index space: integer cell indices, face sides, inclusive cell boxes, and the
//! patch description that ties index space to physical space.
//!
//! Purpose
//! - Give every other module one vocabulary for "which cell" and "which face".
//! - Keep the local ↔ physical mapping in exactly one place (`GridPatch`).
//!
//! Conventions
//! - Boxes are inclusive on both ends and iterate with axis 0 fastest.
//! - Cell-local coordinates span `[-0.5, 0.5]` per axis with 0 at the cell center;
//!   `physical = origin + dx * (iv + 0.5 + local)`.

use std::fmt;
use std::ops::{Index, IndexMut};

use nalgebra::SVector;

use crate::error::GeometryError;

/// Point or vector in `D`-dimensional real space.
pub type RealVect<const D: usize> = SVector<f64, D>;

/// Integer cell index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVect<const D: usize>(pub [i64; D]);

impl<const D: usize> IntVect<D> {
    #[inline]
    pub fn new(components: [i64; D]) -> Self {
        Self(components)
    }

    #[inline]
    pub fn splat(value: i64) -> Self {
        Self([value; D])
    }

    /// Copy of `self` moved by `offset` along `axis`.
    #[inline]
    pub fn shifted(&self, axis: usize, offset: i64) -> Self {
        let mut out = *self;
        out.0[axis] += offset;
        out
    }

    /// Componentwise conversion to reals (used for node and center positions).
    #[inline]
    pub fn to_real(&self) -> RealVect<D> {
        RealVect::<D>::from_fn(|i, _| self.0[i] as f64)
    }
}

impl<const D: usize> Index<usize> for IntVect<D> {
    type Output = i64;
    #[inline]
    fn index(&self, axis: usize) -> &i64 {
        &self.0[axis]
    }
}

impl<const D: usize> IndexMut<usize> for IntVect<D> {
    #[inline]
    fn index_mut(&mut self, axis: usize) -> &mut i64 {
        &mut self.0[axis]
    }
}

impl<const D: usize> fmt::Display for IntVect<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

/// Low or high side of a cell along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Lo,
    Hi,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Lo, Side::Hi];

    /// `-1` for `Lo`, `+1` for `Hi`.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Side::Lo => -1,
            Side::Hi => 1,
        }
    }

    /// Slot index in `[lo, hi]` arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Lo => 0,
            Side::Hi => 1,
        }
    }

    /// Local coordinate of this side's face plane.
    #[inline]
    pub fn offset(self) -> f64 {
        0.5 * self.sign() as f64
    }

    #[inline]
    pub fn flip(self) -> Side {
        match self {
            Side::Lo => Side::Hi,
            Side::Hi => Side::Lo,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Lo => "lo",
            Side::Hi => "hi",
        })
    }
}

/// Inclusive box of cell indices `lo..=hi`; empty when any `hi[d] < lo[d]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox<const D: usize> {
    pub lo: IntVect<D>,
    pub hi: IntVect<D>,
}

impl<const D: usize> IndexBox<D> {
    #[inline]
    pub fn new(lo: IntVect<D>, hi: IntVect<D>) -> Self {
        Self { lo, hi }
    }

    /// Box `[0, n-1]` along every axis.
    pub fn cube(n: i64) -> Self {
        Self::new(IntVect::splat(0), IntVect::splat(n - 1))
    }

    pub fn is_empty(&self) -> bool {
        (0..D).any(|d| self.hi[d] < self.lo[d])
    }

    pub fn contains(&self, iv: &IntVect<D>) -> bool {
        (0..D).all(|d| self.lo[d] <= iv[d] && iv[d] <= self.hi[d])
    }

    /// True when every cell of `other` lies in `self` (empty boxes are contained everywhere).
    pub fn contains_box(&self, other: &IndexBox<D>) -> bool {
        other.is_empty() || (self.contains(&other.lo) && self.contains(&other.hi))
    }

    /// Box grown by `n` cells on every side (shrunk for negative `n`).
    pub fn grow(&self, n: i64) -> Self {
        Self::new(
            IntVect(std::array::from_fn(|d| self.lo[d] - n)),
            IntVect(std::array::from_fn(|d| self.hi[d] + n)),
        )
    }

    pub fn intersect(&self, other: &IndexBox<D>) -> Self {
        Self::new(
            IntVect(std::array::from_fn(|d| self.lo[d].max(other.lo[d]))),
            IntVect(std::array::from_fn(|d| self.hi[d].min(other.hi[d]))),
        )
    }

    /// Box of grid nodes touching the cells of `self` (one more per axis).
    pub fn surrounding_nodes(&self) -> Self {
        Self::new(self.lo, IntVect(std::array::from_fn(|d| self.hi[d] + 1)))
    }

    pub fn num_cells(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (0..D)
            .map(|d| (self.hi[d] - self.lo[d] + 1) as usize)
            .product()
    }

    /// Linear offset of `iv` with axis 0 fastest; `None` outside the box.
    pub fn offset(&self, iv: &IntVect<D>) -> Option<usize> {
        if !self.contains(iv) {
            return None;
        }
        let mut off = 0usize;
        let mut stride = 1usize;
        for d in 0..D {
            off += (iv[d] - self.lo[d]) as usize * stride;
            stride *= (self.hi[d] - self.lo[d] + 1) as usize;
        }
        Some(off)
    }

    /// Cells in deterministic order (axis 0 fastest).
    pub fn iter(&self) -> BoxIter<D> {
        BoxIter {
            bx: *self,
            next: if self.is_empty() { None } else { Some(self.lo) },
        }
    }
}

/// Iterator over the cells of an `IndexBox`.
#[derive(Clone, Debug)]
pub struct BoxIter<const D: usize> {
    bx: IndexBox<D>,
    next: Option<IntVect<D>>,
}

impl<const D: usize> Iterator for BoxIter<D> {
    type Item = IntVect<D>;

    fn next(&mut self) -> Option<IntVect<D>> {
        let current = self.next?;
        let mut succ = current;
        let mut advanced = false;
        for d in 0..D {
            if succ[d] < self.bx.hi[d] {
                succ[d] += 1;
                advanced = true;
                break;
            }
            succ[d] = self.bx.lo[d];
        }
        self.next = advanced.then_some(succ);
        Some(current)
    }
}

/// One patch of a structured grid: the cells to report on (`valid`), the
/// surrounding cells to classify (`ghost`), the global `domain`, and the
/// physical placement (`origin` of the domain's low corner node, uniform `dx`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPatch<const D: usize> {
    pub valid: IndexBox<D>,
    pub ghost: IndexBox<D>,
    pub domain: IndexBox<D>,
    pub origin: RealVect<D>,
    pub dx: f64,
}

impl<const D: usize> GridPatch<D> {
    pub fn new(
        valid: IndexBox<D>,
        ghost: IndexBox<D>,
        domain: IndexBox<D>,
        origin: RealVect<D>,
        dx: f64,
    ) -> Self {
        Self {
            valid,
            ghost,
            domain,
            origin,
            dx,
        }
    }

    /// Patch whose ghost region is `valid` grown by `nghost`, clipped to `domain`.
    pub fn with_ghost(
        valid: IndexBox<D>,
        domain: IndexBox<D>,
        nghost: i64,
        origin: RealVect<D>,
        dx: f64,
    ) -> Self {
        let ghost = valid.grow(nghost).intersect(&domain);
        Self::new(valid, ghost, domain, origin, dx)
    }

    /// Structural checks required before graph construction.
    ///
    /// - `D` is 2 or 3, `dx` is finite and positive.
    /// - `ghost ⊆ domain` and `ghost ⊇ (valid grown by 1) ∩ domain`.
    pub fn check(&self) -> Result<(), GeometryError> {
        if D != 2 && D != 3 {
            return Err(GeometryError::UnsupportedDimension(D));
        }
        if !(self.dx.is_finite() && self.dx > 0.0) {
            return Err(GeometryError::InvalidPatch(format!(
                "cell size must be positive and finite, got {}",
                self.dx
            )));
        }
        if self.valid.is_empty() {
            return Err(GeometryError::InvalidPatch("valid region is empty".into()));
        }
        if !self.domain.contains_box(&self.valid) {
            return Err(GeometryError::InvalidPatch(format!(
                "valid region {:?}..{:?} leaves the domain",
                self.valid.lo, self.valid.hi
            )));
        }
        if !self.domain.contains_box(&self.ghost) {
            return Err(GeometryError::InvalidPatch(format!(
                "ghost region {:?}..{:?} leaves the domain",
                self.ghost.lo, self.ghost.hi
            )));
        }
        let needed = self.valid.grow(1).intersect(&self.domain);
        if !self.ghost.contains_box(&needed) {
            return Err(GeometryError::InvalidPatch(
                "ghost region must cover the valid region plus one cell (clipped to the domain)"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Physical position of cell-local point `local` in cell `iv`.
    #[inline]
    pub fn physical(&self, iv: &IntVect<D>, local: &RealVect<D>) -> RealVect<D> {
        RealVect::<D>::from_fn(|d, _| self.origin[d] + self.dx * (iv[d] as f64 + 0.5 + local[d]))
    }

    /// Physical position of grid node `node` (the low corner of cell `node`).
    #[inline]
    pub fn node_position(&self, node: &IntVect<D>) -> RealVect<D> {
        self.origin + node.to_real() * self.dx
    }

    /// Cell-local coordinate along `axis` of physical coordinate `x`.
    #[inline]
    pub fn local_coord(&self, iv: &IntVect<D>, axis: usize, x: f64) -> f64 {
        (x - self.origin[axis]) / self.dx - (iv[axis] as f64 + 0.5)
    }
}
