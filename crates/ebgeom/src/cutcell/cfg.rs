//! Numerical tolerances for cut-cell geometry (internal).
//!
//! Policy
//! - Fixed constants; callers never pass tolerances around. The only tunables
//!   exposed to users live in `ShopCfg` (pruning threshold, report verbosity).

/// Absolute tolerance of the crossing search (cell-size units are not applied;
/// the search runs in physical coordinates).
pub(crate) const ROOT_TOL: f64 = 1e-12;
/// Machine-precision term of the Brent convergence test.
pub(crate) const ROOT_EPS: f64 = 3e-15;
/// Iteration cap of the crossing search; hitting it is a warning, not an error.
pub(crate) const ROOT_MAX_ITER: usize = 100;
/// Two cell-local points closer than this are the same polygon vertex.
pub(crate) const POINT_EPS: f64 = 1e-12;
