//! General polynomial fields `Σ coef · Π x_d^{p_d}`.

use super::{oriented, ImplicitFunction};
use crate::index::RealVect;

/// One monomial: `coef · Π x_d^{powers[d]}`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolyTerm<const D: usize> {
    pub coef: f64,
    pub powers: [u32; D],
}

impl<const D: usize> PolyTerm<D> {
    pub fn new(coef: f64, powers: [u32; D]) -> Self {
        Self { coef, powers }
    }

    #[inline]
    pub fn eval(&self, x: &RealVect<D>) -> f64 {
        self.powers
            .iter()
            .enumerate()
            .fold(self.coef, |acc, (d, &p)| acc * x[d].powi(p as i32))
    }
}

/// Sum of `PolyTerm`s. With `inside = true` the fluid is where the sum is negative.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialIf<const D: usize> {
    pub terms: Vec<PolyTerm<D>>,
    pub inside: bool,
}

impl<const D: usize> PolynomialIf<D> {
    pub fn new(terms: Vec<PolyTerm<D>>, inside: bool) -> Self {
        Self { terms, inside }
    }

    /// Raw polynomial value, ignoring the `inside` flag.
    pub fn raw_value(&self, x: &RealVect<D>) -> f64 {
        self.terms.iter().map(|t| t.eval(x)).sum()
    }
}

impl<const D: usize> ImplicitFunction<D> for PolynomialIf<D> {
    fn value(&self, x: &RealVect<D>) -> f64 {
        oriented(self.raw_value(x), self.inside)
    }

    fn clone_boxed(&self) -> Box<dyn ImplicitFunction<D>> {
        Box::new(self.clone())
    }
}
