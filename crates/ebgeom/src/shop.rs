//! `GeometryShop`: the context object owning the implicit function and the
//! build configuration.
//!
//! The shop is read-only after construction, so one shop serves any number of
//! patches, concurrently with the `parallel` feature.

use std::sync::Arc;

use crate::error::GeometryError;
use crate::graph::{self, BuildParams, CellKind, EbGraphPatch};
use crate::implicit::ImplicitFunction;
use crate::index::{GridPatch, IndexBox};
use crate::validate::{ClampReporter, TracingReporter, Validator};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Conditionally parallel iterator over a slice.
macro_rules! maybe_par_iter {
    ($slice:expr) => {{
        #[cfg(feature = "parallel")]
        {
            $slice.par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter()
        }
    }};
}

/// Build configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShopCfg {
    /// Diagnostics level: larger values report smaller clamp corrections and
    /// log pruned cells (above 2).
    pub verbosity: i32,
    /// Irregular cells with a volume fraction below this are dropped (`<= 0` disables).
    pub vof_threshold: f64,
}

impl Default for ShopCfg {
    fn default() -> Self {
        Self {
            verbosity: 0,
            vof_threshold: 0.0,
        }
    }
}

impl ShopCfg {
    /// Smallest clamp correction worth reporting: `1e-15 · 10^(-verbosity)`.
    pub fn discrepancy_threshold(&self) -> f64 {
        1e-15 * 10f64.powi(-self.verbosity)
    }
}

/// Generates embedded-boundary graphs from an implicit function.
#[derive(Clone)]
pub struct GeometryShop<const D: usize> {
    func: Box<dyn ImplicitFunction<D>>,
    cfg: ShopCfg,
    reporter: Arc<dyn ClampReporter>,
}

impl<const D: usize> GeometryShop<D> {
    /// Shop holding its own copy of `func`; clamp reports go to `tracing`.
    pub fn new(func: &dyn ImplicitFunction<D>, cfg: ShopCfg) -> Self {
        Self {
            func: func.clone_boxed(),
            cfg,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Replace the clamp-report sink.
    pub fn with_reporter(mut self, reporter: Arc<dyn ClampReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn implicit_function(&self) -> &dyn ImplicitFunction<D> {
        self.func.as_ref()
    }

    pub fn cfg(&self) -> &ShopCfg {
        &self.cfg
    }

    /// Classify a whole box of cells from the nodes touching it.
    pub fn inside_outside(&self, patch: &GridPatch<D>, region: &IndexBox<D>) -> CellKind {
        graph::classify_region(self.func.as_ref(), patch, region)
    }

    /// Build the graph of one patch.
    pub fn fill_graph(&self, patch: &GridPatch<D>) -> Result<EbGraphPatch<D>, GeometryError> {
        let params = BuildParams {
            vof_threshold: self.cfg.vof_threshold,
            verbosity: self.cfg.verbosity,
        };
        let validator = Validator::new(self.cfg.discrepancy_threshold(), self.reporter.as_ref());
        graph::fill_graph(self.func.as_ref(), patch, &params, &validator)
    }

    /// Build the graphs of independent patches; results keep the input order.
    pub fn fill_patches(
        &self,
        patches: &[GridPatch<D>],
    ) -> Result<Vec<EbGraphPatch<D>>, GeometryError> {
        maybe_par_iter!(patches)
            .map(|p| self.fill_graph(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implicit::SphereIf;
    use crate::index::{IntVect, RealVect};

    #[test]
    fn threshold_scales_with_verbosity() {
        let base = ShopCfg::default();
        assert!((base.discrepancy_threshold() - 1e-15).abs() < 1e-30);
        let loud = ShopCfg {
            verbosity: 3,
            ..base
        };
        assert!((loud.discrepancy_threshold() - 1e-18).abs() < 1e-32);
    }

    #[test]
    fn shop_owns_an_independent_function_copy() {
        let shop = {
            let sphere = SphereIf::new(1.0, RealVect::<2>::zeros(), true);
            GeometryShop::new(&sphere, ShopCfg::default())
        };
        assert!(shop.implicit_function().is_fluid(&RealVect::<2>::zeros()));
        let copy = shop.clone();
        assert!(!copy.implicit_function().is_fluid(&RealVect::<2>::new(2.0, 0.0)));
    }

    #[test]
    fn inside_outside_over_boxes() {
        let sphere = SphereIf::new(1.0, RealVect::<2>::zeros(), true);
        let shop = GeometryShop::new(&sphere, ShopCfg::default());
        let domain = IndexBox::<2>::cube(8);
        let patch = GridPatch::with_ghost(domain, domain, 1, RealVect::<2>::repeat(-2.0), 0.5);
        let center = IndexBox::new(IntVect([3, 3]), IntVect([4, 4]));
        assert_eq!(shop.inside_outside(&patch, &center), CellKind::Regular);
        let corner = IndexBox::new(IntVect([0, 0]), IntVect([1, 1]));
        assert_eq!(shop.inside_outside(&patch, &corner), CellKind::Covered);
        assert_eq!(shop.inside_outside(&patch, &domain), CellKind::Irregular);
    }
}
