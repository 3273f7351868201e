//! Volume and boundary moments of one irregular cell.
//!
//! Purpose
//! - 2-D: the cell is a single square; all moments come from its fluid polygon.
//! - 3-D: faces are built first, then the divergence theorem turns face areas,
//!   face centroids and the boundary trace into volume and volume centroid.
//!
//! Why this design
//! - Everything is in cell-local units (`[-0.5, 0.5]^D`), so fractions need no
//!   rescaling and results are independent of `dx`.
//! - With `∇·x = D` and `∇·(x x_i) = (D+1) x_i`, closing the fluid region by
//!   its faces and a planar boundary patch gives (3-D)
//!   `V = (1/3)[½ ΣA_f + bA (n·x_b)]` and
//!   `∫x_i = (1/4)[½ ΣA_f c_f,i + bA (n·x_b) x_b,i]`,
//!   where face normals are `±e_d` at distance ½ and the boundary area vector
//!   `bA·n = Σ_d (A_lo − A_hi) e_d` closes the surface.

use nalgebra::{Vector2, Vector3};

use super::edge::{CellEdges, CutKind};
use super::face::{build_face, planar_moments, square_runs, square_sides};
use super::frame::CellFrame;
use crate::error::GeometryError;
use crate::index::{RealVect, Side};

/// Fluid data of one cell face (cell-local units).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceMoment<const D: usize> {
    pub area: f64,
    pub centroid: RealVect<D>,
    /// No fluid passes through this face.
    pub covered: bool,
}

/// Geometric moments of one cut cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VofMoments<const D: usize> {
    pub vol_frac: f64,
    pub vol_centroid: RealVect<D>,
    pub bndry_area: f64,
    pub bndry_centroid: RealVect<D>,
    /// Unit normal of the boundary, pointing out of the fluid; zero if `bndry_area == 0`.
    pub normal: RealVect<D>,
    /// Indexed `[axis][side]`.
    pub faces: [[FaceMoment<D>; 2]; D],
}

/// Compute the moments of the cell in `frame`.
pub fn compute_vof_moments<const D: usize>(
    frame: &CellFrame<'_, D>,
) -> Result<VofMoments<D>, GeometryError> {
    let edges = CellEdges::resolve(frame)?;
    match D {
        2 => Ok(moments_2d(&edges)),
        3 => moments_3d(frame, &edges),
        _ => Err(GeometryError::UnsupportedDimension(D)),
    }
}

fn lift<const D: usize>(p: Vector2<f64>) -> RealVect<D> {
    let mut out = RealVect::<D>::zeros();
    out[0] = p.x;
    out[1] = p.y;
    out
}

fn moments_2d<const D: usize>(edges: &CellEdges<D>) -> VofMoments<D> {
    let pm = planar_moments(&square_runs(&square_sides(edges, 0, 1, 0), 0, 1));
    let faces = std::array::from_fn(|axis| {
        std::array::from_fn(|s| {
            // The face normal to `axis` is the edge running along the other axis.
            let e = edges.get(1 - axis, Side::ALL[s].index() << axis);
            FaceMoment {
                area: e.length(),
                centroid: e.centroid(),
                covered: e.kind == CutKind::Covered,
            }
        })
    });
    VofMoments {
        vol_frac: pm.area,
        vol_centroid: lift(pm.centroid()),
        bndry_area: pm.boundary_length,
        bndry_centroid: lift(pm.boundary_centroid()),
        normal: lift(pm.unit_normal()),
        faces,
    }
}

fn moments_3d<const D: usize>(
    frame: &CellFrame<'_, D>,
    edges: &CellEdges<D>,
) -> Result<VofMoments<D>, GeometryError> {
    let mut built = Vec::with_capacity(2 * D);
    for axis in 0..D {
        for side in Side::ALL {
            built.push(build_face(frame, edges, axis, side)?);
        }
    }
    let faces: [[FaceMoment<D>; 2]; D] = std::array::from_fn(|axis| {
        std::array::from_fn(|s| {
            let f = &built[2 * axis + s];
            FaceMoment {
                area: f.area,
                centroid: f.centroid,
                covered: f.is_covered(),
            }
        })
    });

    let area_vec = RealVect::<D>::from_fn(|d, _| faces[d][0].area - faces[d][1].area);
    let bndry_area = area_vec.norm();
    let normal = if bndry_area > 0.0 {
        area_vec / bndry_area
    } else {
        RealVect::<D>::zeros()
    };

    let crossings: Vec<Vector3<f64>> = edges
        .iter()
        .filter_map(|e| e.crossing())
        .map(|p| Vector3::new(p[0], p[1], p[2]))
        .collect();
    let n3 = Vector3::new(normal[0], normal[1], normal[2]);
    let xb3 = trace_centroid(&crossings, &n3);
    let bndry_centroid = RealVect::<D>::from_fn(|d, _| xb3[d]);

    let mut face_sum = 0.0;
    let mut face_first = RealVect::<D>::zeros();
    for pair in &faces {
        for f in pair {
            face_sum += f.area;
            face_first += f.centroid * f.area;
        }
    }
    let support = bndry_area * n3.dot(&xb3);
    let vol_frac = (0.5 * face_sum + support) / 3.0;
    let first = (face_first * 0.5 + bndry_centroid * support) / 4.0;
    let vol_centroid = if vol_frac > 0.0 {
        first / vol_frac
    } else {
        RealVect::<D>::zeros()
    };

    Ok(VofMoments {
        vol_frac,
        vol_centroid,
        bndry_area,
        bndry_centroid,
        normal,
        faces,
    })
}

/// Area centroid of the polygon through the edge crossings, which all lie
/// (approximately) in one plane with normal `n`. Falls back to the vertex mean
/// when the polygon is degenerate, and to the origin when there are no points.
fn trace_centroid(points: &[Vector3<f64>], n: &Vector3<f64>) -> Vector3<f64> {
    if points.is_empty() {
        return Vector3::zeros();
    }
    let mean = points.iter().sum::<Vector3<f64>>() / points.len() as f64;
    if points.len() < 3 || n.norm() == 0.0 {
        return mean;
    }
    // In-plane basis: cross n with the axis it is least aligned with.
    let k = n.iamin();
    let t1 = n.cross(&Vector3::ith(k, 1.0)).normalize();
    let t2 = n.cross(&t1);
    let mut ring: Vec<(f64, Vector3<f64>)> = points
        .iter()
        .map(|p| {
            let r = p - mean;
            (r.dot(&t2).atan2(r.dot(&t1)), *p)
        })
        .collect();
    ring.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut area = 0.0;
    let mut first = Vector3::zeros();
    for i in 0..ring.len() {
        let p = ring[i].1;
        let q = ring[(i + 1) % ring.len()].1;
        let a = 0.5 * (p - mean).cross(&(q - mean)).norm();
        area += a;
        first += (mean + p + q) * (a / 3.0);
    }
    if area > 0.0 {
        first / area
    } else {
        mean
    }
}
