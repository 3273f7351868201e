//! Cut faces: planar fluid polygons and the prismoidal area refinement.
//!
//! Purpose
//! - Turn the four resolved edges bounding a square (a 2-D cell, or one face of
//!   a 3-D cell) into the moments of its fluid polygon: area, first moments,
//!   and the chords where the boundary crosses the square.
//! - For 3-D faces cut by the boundary, refine the polygon area with a
//!   parabola through the two edge crossings and one interior crossing.
//!
//! Conventions
//! - A square is walked counterclockwise in its in-plane axes `(u, v)`, `u < v`:
//!   bottom (`v = lo`), right (`u = hi`), top (`v = hi`), left (`u = lo`).
//!   Each non-covered side contributes its fluid run; a gap between the end of
//!   one run and the start of the next is a boundary chord.
//! - Face centroids are cell-local with the normal component at `±0.5`.

use nalgebra::Vector2;
use tracing::warn;

use super::cfg::POINT_EPS;
use super::edge::{CellEdge, CellEdges, CutKind};
use super::frame::CellFrame;
use crate::error::GeometryError;
use crate::index::{IntVect, RealVect, Side};

/// One fluid run along a side of the square, in walk order.
pub type Run = (Vector2<f64>, Vector2<f64>);

/// Moments of the fluid part of a unit square (cell-local units).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarMoments {
    pub area: f64,
    /// `∫ (u, v) dA` over the fluid part.
    pub first: Vector2<f64>,
    /// Total chord length.
    pub boundary_length: f64,
    /// `Σ length · midpoint` over chords.
    pub boundary_first: Vector2<f64>,
    /// `Σ` outward chord normals scaled by chord length.
    pub boundary_normal: Vector2<f64>,
}

impl PlanarMoments {
    pub fn centroid(&self) -> Vector2<f64> {
        if self.area > 0.0 {
            self.first / self.area
        } else {
            Vector2::zeros()
        }
    }

    pub fn boundary_centroid(&self) -> Vector2<f64> {
        if self.boundary_length > 0.0 {
            self.boundary_first / self.boundary_length
        } else {
            Vector2::zeros()
        }
    }

    pub fn unit_normal(&self) -> Vector2<f64> {
        let n = self.boundary_normal.norm();
        if n > 0.0 {
            self.boundary_normal / n
        } else {
            Vector2::zeros()
        }
    }
}

/// Moments of the polygon traced by the fluid runs of a square walked
/// counterclockwise (`None` marks a covered side).
pub fn planar_moments(runs: &[Option<Run>; 4]) -> PlanarMoments {
    let runs: Vec<Run> = runs.iter().flatten().copied().collect();
    let mut out = PlanarMoments {
        area: 0.0,
        first: Vector2::zeros(),
        boundary_length: 0.0,
        boundary_first: Vector2::zeros(),
        boundary_normal: Vector2::zeros(),
    };
    if runs.is_empty() {
        return out;
    }

    // Vertex loop: run endpoints in order, chords close the gaps implicitly.
    let mut verts: Vec<Vector2<f64>> = Vec::with_capacity(2 * runs.len());
    for &(a, b) in &runs {
        if verts.last().map_or(true, |p| (p - a).norm() > POINT_EPS) {
            verts.push(a);
        }
        if (b - a).norm() > POINT_EPS {
            verts.push(b);
        }
    }
    let (mut area2, mut first6) = (0.0, Vector2::zeros());
    for i in 0..verts.len() {
        let p = verts[i];
        let q = verts[(i + 1) % verts.len()];
        let cross = p.x * q.y - q.x * p.y;
        area2 += cross;
        first6 += (p + q) * cross;
    }
    out.area = 0.5 * area2;
    out.first = first6 / 6.0;

    for k in 0..runs.len() {
        let from = runs[k].1;
        let to = runs[(k + 1) % runs.len()].0;
        let chord = to - from;
        let len = chord.norm();
        if len > POINT_EPS {
            out.boundary_length += len;
            out.boundary_first += (from + to) * (0.5 * len);
            // Walk is counterclockwise, so the right-hand normal points out of the fluid.
            out.boundary_normal += Vector2::new(chord.y, -chord.x);
        }
    }
    out
}

/// The four sides of the square spanned by axes `u < v` at fixed corner bits
/// `fixed`, in walk order: bottom, right, top, left.
pub(crate) fn square_sides<'e, const D: usize>(
    edges: &'e CellEdges<D>,
    u: usize,
    v: usize,
    fixed: usize,
) -> [&'e CellEdge<D>; 4] {
    [
        edges.get(u, fixed),
        edges.get(v, fixed | (1 << u)),
        edges.get(u, fixed | (1 << v)),
        edges.get(v, fixed),
    ]
}

/// Fluid runs of `sides` (as returned by `square_sides`) projected to `(u, v)`.
pub(crate) fn square_runs<const D: usize>(
    sides: &[&CellEdge<D>; 4],
    u: usize,
    v: usize,
) -> [Option<Run>; 4] {
    let proj = |p: &RealVect<D>| Vector2::new(p[u], p[v]);
    std::array::from_fn(|k| {
        let e = sides[k];
        if e.kind == CutKind::Covered {
            return None;
        }
        let (a, b) = (proj(&e.lo), proj(&e.hi));
        // Top and left sides run against their axis.
        Some(if k < 2 { (a, b) } else { (b, a) })
    })
}

/// Area below a parabola through three points with equally spaced `x`, over
/// the unit square `[-0.5, 0.5]²` (below = toward `y = -0.5`).
///
/// Outside the parabola's span the curve is extended horizontally. Returns
/// `None` when the parabola leaves the square between the end points.
pub fn prismoidal_area(x: [f64; 3], y: [f64; 3]) -> Option<f64> {
    let a = y[2] - 2.0 * y[1] + y[0];
    let b = y[2] - y[0];
    let c = y[1];
    if !(b.abs() > 2.0 * a.abs() || (8.0 * a * c - b * b).abs() <= (4.0 * a).abs()) {
        return None;
    }
    let (small, large) = if x[0] <= x[2] { (0, 2) } else { (2, 0) };
    let h = 0.5 * (x[large] - x[small]);
    let area = (h / 3.0) * (y[0] + 4.0 * y[1] + y[2])
        + h
        + (0.5 - x[large]) * (y[large] + 0.5)
        + (x[small] + 0.5) * (y[small] + 0.5);
    Some(area)
}

/// How a face's area was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceArea {
    /// Polygon of the resolved edges.
    Linear,
    /// Parabolic refinement of the boundary trace.
    Prismoidal,
    /// Refinement produced an area outside `[0, 1]`; the face counts as covered.
    Rejected,
}

/// One face of a 3-D cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellFace<const D: usize> {
    pub axis: usize,
    pub side: Side,
    pub kind: CutKind,
    pub area: f64,
    pub centroid: RealVect<D>,
    pub method: FaceArea,
}

impl<const D: usize> CellFace<D> {
    /// No fluid crosses this face.
    pub fn is_covered(&self) -> bool {
        self.kind == CutKind::Covered || self.method == FaceArea::Rejected
    }

    /// Take a prismoidal area, or reject the face when the area leaves `[0, 1]`.
    pub(crate) fn apply_refined_area(&mut self, area: f64, cell: &IntVect<D>) {
        // Rounding-level excursions are left to the validator's clamp.
        if (-POINT_EPS..=1.0 + POINT_EPS).contains(&area) {
            self.area = area;
            self.method = FaceArea::Prismoidal;
        } else {
            warn!(
                cell = %cell,
                axis = self.axis,
                side = %self.side,
                area,
                "refined face area outside [0, 1]; treating the face as covered"
            );
            self.area = 0.0;
            self.method = FaceArea::Rejected;
        }
    }
}

/// The two axes spanning the face normal to `axis` (3-D only), ascending.
pub(crate) fn in_face_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

/// Build the face of the cell normal to `axis` on `side`.
pub fn build_face<const D: usize>(
    frame: &CellFrame<'_, D>,
    edges: &CellEdges<D>,
    axis: usize,
    side: Side,
) -> Result<CellFace<D>, GeometryError> {
    if D != 3 {
        return Err(GeometryError::UnsupportedDimension(D));
    }
    let (u, v) = in_face_axes(axis);
    let fixed = side.index() << axis;
    let sides = square_sides(edges, u, v, fixed);
    let kind = if sides.iter().all(|e| e.kind == CutKind::Regular) {
        CutKind::Regular
    } else if sides.iter().all(|e| e.kind == CutKind::Covered) {
        CutKind::Covered
    } else {
        CutKind::Ambiguous
    };

    let mut face = CellFace {
        axis,
        side,
        kind,
        area: 0.0,
        centroid: RealVect::<D>::zeros(),
        method: FaceArea::Linear,
    };
    if kind == CutKind::Covered {
        return Ok(face);
    }
    let pm = planar_moments(&square_runs(&sides, u, v));
    let c = pm.centroid();
    face.centroid[axis] = side.offset();
    face.centroid[u] = c.x;
    face.centroid[v] = c.y;
    face.area = pm.area;
    if kind == CutKind::Regular {
        return Ok(face);
    }

    let crossings: Vec<RealVect<D>> = sides.iter().filter_map(|e| e.crossing()).collect();
    if crossings.len() != 2 {
        return Err(GeometryError::AmbiguousEdgeCount {
            cell: frame.cell().to_string(),
            axis,
            side,
            count: crossings.len(),
        });
    }
    if let Some(area) = refine_area(frame, &crossings[0], &crossings[1], axis, side, (u, v))? {
        face.apply_refined_area(area, &frame.cell());
    }
    Ok(face)
}

/// Prismoidal fluid area of a cut face, or `None` to keep the polygon area.
fn refine_area<const D: usize>(
    frame: &CellFrame<'_, D>,
    c0: &RealVect<D>,
    c1: &RealVect<D>,
    axis: usize,
    side: Side,
    (u, v): (usize, usize),
) -> Result<Option<f64>, GeometryError> {
    if (c0 - c1).norm() <= POINT_EPS {
        return Ok(None);
    }
    // The boundary trace is taken as a graph over the axis it spans most.
    let (max_dir, min_dir) = if (c0[u] - c1[u]).abs() > (c0[v] - c1[v]).abs() {
        (u, v)
    } else {
        (v, u)
    };
    let mid = (c0 + c1) * 0.5;
    let mut seg_lo = mid;
    seg_lo[min_dir] = -0.5;
    let mut seg_hi = mid;
    seg_hi[min_dir] = 0.5;
    if frame.value_local(&seg_lo) * frame.value_local(&seg_hi) > 0.0 {
        return Ok(None);
    }
    let third = frame.crossing_along(&mid, min_dir)?;

    let x = [c0[max_dir], mid[max_dir], c1[max_dir]];
    let y = [c0[min_dir], third, c1[min_dir]];
    let Some(below) = prismoidal_area(x, y) else {
        return Ok(None);
    };

    // The region "below" always contains the low-min_dir corner at the end
    // where the extended trace is highest; its sign tells which side is fluid.
    let (y_small, y_large) = if x[0] <= x[2] { (y[0], y[2]) } else { (y[2], y[0]) };
    let (at_hi, height) = if y_small >= y_large {
        (false, y_small)
    } else {
        (true, y_large)
    };
    if height <= -0.5 + POINT_EPS {
        return Ok(None);
    }
    let corner = (side.index() << axis) | (usize::from(at_hi) << max_dir);
    let fluid_below = frame.corner_value(corner) < 0.0;
    Ok(Some(if fluid_below { below } else { 1.0 - below }))
}
