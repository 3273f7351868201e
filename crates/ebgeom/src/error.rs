//! Error types for geometry generation.
//!
//! Only conditions that make the produced graph untrustworthy are errors.
//! Numerical slop (fractions slightly outside their range, a root finder that
//! hits its iteration cap) is repaired in place and reported through tracing.

use thiserror::Error;

use crate::index::Side;

/// Failure of the 1-D root finder.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RootError {
    /// The interval endpoints do not bracket a sign change.
    #[error("root must be bracketed: f(a) = {fa:e} and f(b) = {fb:e} have the same sign")]
    NotBracketed { fa: f64, fb: f64 },
}

/// Fatal errors raised while building an embedded-boundary graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// A crossing search on a cell edge or face segment failed.
    #[error("crossing search failed in cell {cell}: {source}")]
    Root {
        cell: String,
        #[source]
        source: RootError,
    },
    /// A cut face does not have exactly two sign-changing edges, i.e. the
    /// boundary crosses it more than once (multi-valued cell).
    #[error(
        "cell {cell}: face ({axis}, {side}) has {count} sign-changing edges; \
         exactly 2 are required (multi-valued cells are not supported)"
    )]
    AmbiguousEdgeCount {
        cell: String,
        axis: usize,
        side: Side,
        count: usize,
    },
    /// Graph repair needed the node of an irregular cell that was never built.
    #[error("graph repair expected an irregular node at cell {cell} but none exists")]
    MissingNode { cell: String },
    /// The patch description is inconsistent (boxes, cell size).
    #[error("invalid patch: {0}")]
    InvalidPatch(String),
    #[error("unsupported dimension {0}; only 2 and 3 are implemented")]
    UnsupportedDimension(usize),
}
