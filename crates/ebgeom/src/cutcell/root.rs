//! Bracketed 1-D root finding (Brent's method).
//!
//! Inverse quadratic interpolation with bisection fallback, following the
//! classic formulation in Numerical Recipes (`zbrent`). Pure: the caller decides
//! what to log when the iteration cap is reached.

use super::cfg::{ROOT_EPS, ROOT_MAX_ITER, ROOT_TOL};
use crate::error::RootError;

/// Result of a crossing search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootEstimate {
    pub root: f64,
    /// Function evaluations after the two bracket endpoints.
    pub iterations: usize,
    /// False when the iteration cap was hit; `root` is then the best iterate.
    pub converged: bool,
}

/// Find `x ∈ [a, b]` with `f(x) = 0`, given `f(a)` and `f(b)` of opposite sign
/// (a zero endpoint counts as a bracket).
pub fn brent_root<F>(f: F, a: f64, b: f64) -> Result<RootEstimate, RootError>
where
    F: Fn(f64) -> f64,
{
    brent_root_capped(f, a, b, ROOT_MAX_ITER)
}

/// `brent_root` with an explicit iteration cap.
pub(crate) fn brent_root_capped<F>(
    f: F,
    a: f64,
    b: f64,
    max_iter: usize,
) -> Result<RootEstimate, RootError>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (a, b);
    let (mut fa, mut fb) = (f(a), f(b));
    if fa * fb > 0.0 {
        return Err(RootError::NotBracketed { fa, fb });
    }
    let (mut c, mut fc) = (b, fb);
    let (mut d, mut e) = (0.0_f64, 0.0_f64);
    let mut iterations = 0;
    loop {
        if fb * fc > 0.0 {
            // Keep the root between b and c.
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol1 = 2.0 * ROOT_EPS * b.abs() + 0.5 * ROOT_TOL;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(RootEstimate {
                root: b,
                iterations,
                converged: true,
            });
        }
        if iterations >= max_iter {
            return Ok(RootEstimate {
                root: b,
                iterations,
                converged: false,
            });
        }
        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q);
            if a == c {
                // Secant step.
                p = 2.0 * xm * s;
                q = 1.0 - s;
            } else {
                // Inverse quadratic interpolation.
                let qa = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0));
                q = (qa - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += tol1.copysign(xm);
        }
        fb = f(b);
        iterations += 1;
    }
}
