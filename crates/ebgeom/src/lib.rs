//! Embedded-boundary geometry generation.
//!
//! Given an implicit function (`f < 0` is fluid) and a structured grid patch,
//! build the embedded-boundary graph: which cells are covered, regular or cut,
//! and for every cut cell its volume fraction, centroids, boundary area and
//! normal, and per-face area fractions with their connectivity.
//!
//! Layout
//! - `index`: cell indices, boxes, patches.
//! - `implicit`: the implicit-function trait and built-in shapes.
//! - `cutcell`: single-cell geometry (edges, faces, moments, root finding).
//! - `validate`: range clamping with pluggable reporting.
//! - `graph`: classification, node construction and consistency repairs.
//! - `shop`: `GeometryShop`, the entry point.
//!
//! Dimensions 2 and 3 are supported through the const generic `D`.

pub mod cutcell;
pub mod error;
pub mod graph;
pub mod implicit;
pub mod index;
pub mod shop;
pub mod validate;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{GeometryError, RootError};
pub use shop::{GeometryShop, ShopCfg};

/// Common exports for callers.
pub mod prelude {
    pub use crate::error::GeometryError;
    pub use crate::graph::{ArcTarget, CellFlags, CellKind, EbGraphPatch, FaceArc, IrregNode};
    pub use crate::implicit::{
        AnisotropicDxPlaneIf, FnIf, ImplicitFunction, PlaneIf, PolyTerm, PolynomialIf, SphereIf,
    };
    pub use crate::index::{GridPatch, IndexBox, IntVect, RealVect, Side};
    pub use crate::shop::{GeometryShop, ShopCfg};
    pub use crate::validate::{ClampReporter, CollectingReporter, TracingReporter};
}
