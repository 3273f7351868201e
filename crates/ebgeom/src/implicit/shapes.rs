//! Elementary shapes: planes, spheres, and a closure adapter.

use std::fmt;
use std::sync::Arc;

use super::{oriented, ImplicitFunction};
use crate::index::RealVect;

/// Half-space bounded by the plane through `point` with normal `normal`.
///
/// With `inside = true` the fluid lies on the side `normal` points to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneIf<const D: usize> {
    pub normal: RealVect<D>,
    pub point: RealVect<D>,
    pub inside: bool,
}

impl<const D: usize> PlaneIf<D> {
    pub fn new(normal: RealVect<D>, point: RealVect<D>, inside: bool) -> Self {
        Self {
            normal,
            point,
            inside,
        }
    }
}

impl<const D: usize> ImplicitFunction<D> for PlaneIf<D> {
    #[inline]
    fn value(&self, x: &RealVect<D>) -> f64 {
        // Negative on the side the normal points to.
        let raw = -(x - self.point).dot(&self.normal);
        oriented(raw, self.inside)
    }

    fn clone_boxed(&self) -> Box<dyn ImplicitFunction<D>> {
        Box::new(*self)
    }
}

/// Ball of `radius` around `center`: `|x - c|² - r²`.
///
/// With `inside = true` the fluid is the interior of the ball.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereIf<const D: usize> {
    pub radius: f64,
    pub center: RealVect<D>,
    pub inside: bool,
}

impl<const D: usize> SphereIf<D> {
    pub fn new(radius: f64, center: RealVect<D>, inside: bool) -> Self {
        Self {
            radius,
            center,
            inside,
        }
    }
}

impl<const D: usize> ImplicitFunction<D> for SphereIf<D> {
    #[inline]
    fn value(&self, x: &RealVect<D>) -> f64 {
        let raw = (x - self.center).norm_squared() - self.radius * self.radius;
        oriented(raw, self.inside)
    }

    fn clone_boxed(&self) -> Box<dyn ImplicitFunction<D>> {
        Box::new(*self)
    }
}

/// Plane evaluated on coordinates scaled by `dx[d] / dx[0]`, which turns a
/// plane in index space into the matching plane on an anisotropic grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnisotropicDxPlaneIf<const D: usize> {
    pub plane: PlaneIf<D>,
    pub dx: RealVect<D>,
}

impl<const D: usize> AnisotropicDxPlaneIf<D> {
    pub fn new(normal: RealVect<D>, point: RealVect<D>, inside: bool, dx: RealVect<D>) -> Self {
        Self {
            plane: PlaneIf::new(normal, point, inside),
            dx,
        }
    }
}

impl<const D: usize> ImplicitFunction<D> for AnisotropicDxPlaneIf<D> {
    fn value(&self, x: &RealVect<D>) -> f64 {
        let scaled = RealVect::<D>::from_fn(|d, _| x[d] * self.dx[d] / self.dx[0]);
        self.plane.value(&scaled)
    }

    fn clone_boxed(&self) -> Box<dyn ImplicitFunction<D>> {
        Box::new(*self)
    }
}

/// Adapter turning a closure into an implicit function (used by tests and
/// callers with analytic fields that have no dedicated shape).
#[derive(Clone)]
pub struct FnIf<const D: usize> {
    f: Arc<dyn Fn(&RealVect<D>) -> f64 + Send + Sync>,
}

impl<const D: usize> FnIf<D> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RealVect<D>) -> f64 + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }
}

impl<const D: usize> fmt::Debug for FnIf<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnIf(..)")
    }
}

impl<const D: usize> ImplicitFunction<D> for FnIf<D> {
    #[inline]
    fn value(&self, x: &RealVect<D>) -> f64 {
        (self.f)(x)
    }

    fn clone_boxed(&self) -> Box<dyn ImplicitFunction<D>> {
        Box::new(self.clone())
    }
}
