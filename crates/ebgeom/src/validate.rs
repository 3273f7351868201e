//! Range enforcement for computed geometric quantities.
//!
//! Every fraction and centroid leaving the moment integrator passes through
//! `Validator::clamp_and_report`: the value is clamped to its admissible range
//! and, if the correction exceeds the discrepancy threshold, a `ClampReport`
//! goes to the injected `ClampReporter`. Numerical drift is never fatal.

use std::fmt;

use parking_lot::Mutex;
use tracing::warn;

use crate::cutcell::VofMoments;
use crate::index::{IntVect, Side};

/// Which quantity was clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    VolFrac,
    BndryArea,
    VolCentroid(usize),
    BndryCentroid(usize),
    AreaFrac { axis: usize, side: Side },
    FaceCentroid { axis: usize, side: Side, comp: usize },
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::VolFrac => f.write_str("volume fraction"),
            Field::BndryArea => f.write_str("boundary area"),
            Field::VolCentroid(d) => write!(f, "volume centroid[{d}]"),
            Field::BndryCentroid(d) => write!(f, "boundary centroid[{d}]"),
            Field::AreaFrac { axis, side } => write!(f, "area fraction ({axis}, {side})"),
            Field::FaceCentroid { axis, side, comp } => {
                write!(f, "face centroid ({axis}, {side})[{comp}]")
            }
        }
    }
}

/// One clamp whose correction exceeded the discrepancy threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct ClampReport {
    pub cell: String,
    pub field: Field,
    pub value: f64,
    pub clamped: f64,
    pub discrepancy: f64,
}

/// Sink for clamp diagnostics.
pub trait ClampReporter: Send + Sync {
    fn report(&self, report: ClampReport);
}

/// Default sink: one `tracing` warning per report.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ClampReporter for TracingReporter {
    fn report(&self, r: ClampReport) {
        warn!(
            cell = %r.cell,
            field = %r.field,
            value = r.value,
            clamped = r.clamped,
            discrepancy = r.discrepancy,
            "clamped out-of-range geometric quantity"
        );
    }
}

/// Sink that keeps every report (tests, diagnostics tooling).
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<ClampReport>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<ClampReport> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClampReporter for CollectingReporter {
    fn report(&self, report: ClampReport) {
        self.reports.lock().push(report);
    }
}

/// Clamps values into range and reports significant corrections.
#[derive(Clone, Copy)]
pub struct Validator<'r> {
    threshold: f64,
    reporter: &'r dyn ClampReporter,
}

impl<'r> Validator<'r> {
    pub fn new(threshold: f64, reporter: &'r dyn ClampReporter) -> Self {
        Self {
            threshold,
            reporter,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Same clamping, without reports.
    pub fn quiet(&self) -> Self {
        Self {
            threshold: f64::INFINITY,
            reporter: self.reporter,
        }
    }

    /// Clamp `value` to `[lo, hi]`; report if the correction exceeds the threshold.
    /// NaN is replaced by `lo` and always reported.
    pub fn clamp_and_report<const D: usize>(
        &self,
        value: f64,
        lo: f64,
        hi: f64,
        field: Field,
        cell: &IntVect<D>,
    ) -> f64 {
        let (clamped, discrepancy) = if value.is_nan() {
            (lo, f64::INFINITY)
        } else if value < lo {
            (lo, lo - value)
        } else if value > hi {
            (hi, value - hi)
        } else {
            return value;
        };
        if discrepancy > self.threshold {
            self.reporter.report(ClampReport {
                cell: cell.to_string(),
                field,
                value,
                clamped,
                discrepancy,
            });
        }
        clamped
    }

    /// Bring all fractions and centroids of `m` into their ranges: fractions
    /// in `[0, 1]`, boundary area in `[0, √D]`, centroid components in
    /// `[-0.5, 0.5]`. Covered face slots are left alone.
    pub fn validate_moments<const D: usize>(&self, m: &mut VofMoments<D>, cell: &IntVect<D>) {
        m.vol_frac = self.clamp_and_report(m.vol_frac, 0.0, 1.0, Field::VolFrac, cell);
        let max_bndry = (D as f64).sqrt();
        m.bndry_area = self.clamp_and_report(m.bndry_area, 0.0, max_bndry, Field::BndryArea, cell);
        for d in 0..D {
            m.vol_centroid[d] =
                self.clamp_and_report(m.vol_centroid[d], -0.5, 0.5, Field::VolCentroid(d), cell);
            m.bndry_centroid[d] = self.clamp_and_report(
                m.bndry_centroid[d],
                -0.5,
                0.5,
                Field::BndryCentroid(d),
                cell,
            );
        }
        for (axis, pair) in m.faces.iter_mut().enumerate() {
            for (face, side) in pair.iter_mut().zip(Side::ALL) {
                if face.covered {
                    continue;
                }
                let field = Field::AreaFrac { axis, side };
                face.area = self.clamp_and_report(face.area, 0.0, 1.0, field, cell);
                for comp in 0..D {
                    face.centroid[comp] = self.clamp_and_report(
                        face.centroid[comp],
                        -0.5,
                        0.5,
                        Field::FaceCentroid { axis, side, comp },
                        cell,
                    );
                }
            }
        }
    }
}
