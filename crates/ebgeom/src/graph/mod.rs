//! Embedded-boundary graph of a patch.
//!
//! Purpose
//! - Classify every cell as covered, regular or irregular, and give each
//!   irregular valid cell a node with its geometric moments and face arcs.
//! - Keep the result self-consistent: no open face between a regular and a
//!   covered cell, no arc into a cell removed by the volume threshold.
//!
//! References
//! - Code cross-refs: `cutcell::compute_vof_moments`, `shop::GeometryShop`

mod build;
mod repair;
mod types;

pub use build::{classify_cells, classify_region, fill_graph, BuildParams};
pub use repair::{degenerate_node, promote_regular_next_to_covered, repair_pruned};
pub use types::{ArcTarget, CellFlags, CellKind, EbGraphPatch, FaceArc, IrregNode, PatchStats};

#[cfg(test)]
mod tests;
