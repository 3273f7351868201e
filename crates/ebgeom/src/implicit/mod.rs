//! Implicit functions describing the fluid region.
//!
//! Purpose
//! - A scalar field `f` over physical space: `f(x) < 0` is fluid, `f(x) >= 0`
//!   (including `-0.0`) is covered, and `f = 0` is the boundary.
//! - Functions are immutable and shared read-only across patches; the shop
//!   owns an independent copy made through `clone_boxed`.
//!
//! Provided shapes
//! - `PlaneIf`, `SphereIf`, `AnisotropicDxPlaneIf`, `PolynomialIf`, and the
//!   closure adapter `FnIf`. Every shape carries an `inside` flag selecting
//!   which side of its zero set is fluid.

mod polynomial;
mod shapes;

pub use polynomial::{PolyTerm, PolynomialIf};
pub use shapes::{AnisotropicDxPlaneIf, FnIf, PlaneIf, SphereIf};

use crate::index::RealVect;

/// Scalar field over `D`-dimensional physical space.
pub trait ImplicitFunction<const D: usize>: Send + Sync {
    /// Field value at physical point `x`.
    fn value(&self, x: &RealVect<D>) -> f64;

    /// Independent boxed copy.
    fn clone_boxed(&self) -> Box<dyn ImplicitFunction<D>>;

    /// Fluid test consistent with cell and edge classification.
    #[inline]
    fn is_fluid(&self, x: &RealVect<D>) -> bool {
        self.value(x) < 0.0
    }
}

impl<const D: usize> Clone for Box<dyn ImplicitFunction<D>> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Apply an `inside` flag to a raw field whose negative side is "inside".
#[inline]
pub(crate) fn oriented(raw: f64, inside: bool) -> f64 {
    if inside {
        raw
    } else {
        -raw
    }
}
