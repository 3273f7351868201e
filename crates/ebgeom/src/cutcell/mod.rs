//! Cut-cell geometry of a single cell.
//!
//! Purpose
//! - From samples of the implicit function, compute everything one irregular
//!   cell contributes to the graph: volume fraction and centroid, boundary area,
//!   centroid and normal, and per-face area fractions and centroids.
//!
//! Pipeline (per cell)
//! - `frame`: sample corners, map local ↔ physical, search crossings.
//! - `edge`: classify and cut all edges.
//! - `face`: planar fluid polygons and (3-D) prismoidal refinement.
//! - `moments`: assemble cell moments.
//!
//! References
//! - Code cross-refs: `graph::fill_graph`, `validate::Validator`

mod cfg;
pub mod edge;
pub mod face;
pub mod frame;
pub mod moments;
pub mod root;

pub use edge::{classify_edge, CellEdge, CellEdges, CutKind};
pub use face::{build_face, planar_moments, prismoidal_area, CellFace, FaceArea, PlanarMoments};
pub use frame::CellFrame;
pub use moments::{compute_vof_moments, FaceMoment, VofMoments};
pub use root::{brent_root, RootEstimate};
