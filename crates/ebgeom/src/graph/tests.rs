use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::error::GeometryError;
use crate::implicit::{FnIf, ImplicitFunction, PlaneIf, SphereIf};
use crate::index::{GridPatch, IndexBox, IntVect, RealVect, Side};
use crate::validate::{CollectingReporter, Validator};

fn patch<const D: usize>(n: i64, origin: RealVect<D>, dx: f64) -> GridPatch<D> {
    let domain = IndexBox::<D>::cube(n);
    GridPatch::with_ghost(domain, domain, 1, origin, dx)
}

fn build<const D: usize>(
    func: &dyn ImplicitFunction<D>,
    patch: &GridPatch<D>,
    vof_threshold: f64,
) -> Result<EbGraphPatch<D>, GeometryError> {
    let sink = CollectingReporter::new();
    let params = BuildParams {
        vof_threshold,
        verbosity: 0,
    };
    fill_graph(func, patch, &params, &Validator::new(1e-15, &sink))
}

fn assert_in_ranges<const D: usize>(g: &EbGraphPatch<D>) {
    let tol = 1e-12;
    for n in g.nodes() {
        assert!(n.vol_frac > 0.0 && n.vol_frac <= 1.0, "vf {} at {}", n.vol_frac, n.cell);
        assert!(n.bndry_area >= 0.0 && n.bndry_area <= (D as f64).sqrt() + tol);
        for d in 0..D {
            assert!(n.vol_centroid[d].abs() <= 0.5 + tol, "centroid at {}", n.cell);
            assert!(n.bndry_centroid[d].abs() <= 0.5 + tol, "bndry centroid at {}", n.cell);
        }
        for axis in 0..D {
            for side in Side::ALL {
                if let Some(f) = n.face(axis, side) {
                    assert!((0.0..=1.0).contains(&f.area_frac));
                    assert!((f.centroid[axis] - side.offset()).abs() < tol);
                    for d in 0..D {
                        assert!(f.centroid[d].abs() <= 0.5 + tol);
                    }
                }
            }
        }
    }
}

/// Every open face leads to a cell that is not covered (or out of the domain).
fn assert_arcs_consistent<const D: usize>(g: &EbGraphPatch<D>, p: &GridPatch<D>) {
    for n in g.nodes() {
        for axis in 0..D {
            for side in Side::ALL {
                let Some(f) = n.face(axis, side) else { continue };
                let nb = n.cell.shifted(axis, side.sign());
                match f.target {
                    ArcTarget::DomainBoundary => assert!(!p.domain.contains(&nb)),
                    ArcTarget::Interior => {
                        assert!(p.domain.contains(&nb));
                        let kind = g.flags.get(&nb);
                        assert_ne!(kind, Some(CellKind::Covered), "{} -> {}", n.cell, nb);
                    }
                }
            }
        }
    }
}

#[test]
fn far_plane_leaves_everything_regular() {
    let f = PlaneIf::new(RealVect::<2>::new(1.0, 0.0), RealVect::<2>::new(-10.0, 0.0), true);
    let p = patch(4, RealVect::<2>::zeros(), 1.0);
    let g = build(&f, &p, 0.0).unwrap();
    assert!(g.nodes().is_empty());
    assert_eq!(g.flags.count(CellKind::Regular), 16);
    assert_eq!(g.stats.regular, 16);
}

#[test]
fn far_plane_leaves_everything_covered_3d() {
    let up = RealVect::<3>::new(0.0, 0.0, 1.0);
    let f = PlaneIf::new(up, up * 10.0, true);
    let p = patch(3, RealVect::<3>::zeros(), 1.0);
    let g = build(&f, &p, 0.0).unwrap();
    assert!(g.nodes().is_empty());
    assert_eq!(g.flags.count(CellKind::Covered), 27);
    assert!(g.flags.flags().iter().all(|&k| k == -1));
}

#[test]
fn half_cell_plane_patch_2d() {
    let f = FnIf::new(|x: &RealVect<2>| x[1] - 1.5);
    let p = patch(4, RealVect::<2>::zeros(), 1.0);
    let g = build(&f, &p, 0.0).unwrap();
    assert_eq!(g.nodes().len(), 4);
    assert_eq!(g.stats.irregular, 4);
    assert_eq!(g.stats.covered, 8);
    for n in g.nodes() {
        assert_eq!(n.cell[1], 1);
        assert!((n.vol_frac - 0.5).abs() < 1e-10, "vf {}", n.vol_frac);
        assert!(n.face(1, Side::Hi).is_none());
        let below = n.face(1, Side::Lo).unwrap();
        assert_eq!(below.target, ArcTarget::Interior);
        assert!((below.area_frac - 1.0).abs() < 1e-15);
    }
    let first = g.node(&IntVect([0, 1])).unwrap();
    let wall = first.face(0, Side::Lo).unwrap();
    assert_eq!(wall.target, ArcTarget::DomainBoundary);
    assert_eq!(wall.target.id(), -1);
    assert!((wall.area_frac - 0.5).abs() < 1e-10);
    assert_arcs_consistent(&g, &p);
}

#[test]
fn half_cell_plane_patch_3d() {
    let f = FnIf::new(|x: &RealVect<3>| x[2] - 1.5);
    let p = patch(3, RealVect::<3>::zeros(), 1.0);
    let g = build(&f, &p, 0.0).unwrap();
    assert_eq!(g.nodes().len(), 9);
    for n in g.nodes() {
        assert!((n.vol_frac - 0.5).abs() < 1e-10, "vf {}", n.vol_frac);
        assert!((n.normal - RealVect::<3>::new(0.0, 0.0, 1.0)).norm() < 1e-10);
    }
    assert_in_ranges(&g);
    assert_arcs_consistent(&g, &p);
}

#[test]
fn circle_on_four_by_four_grid() {
    // Unit circle on unit cells over [-2, 2]²: only the four cells meeting at the
    // origin see a sign change; every other cell has all corners at f >= 0.
    let f = SphereIf::new(1.0, RealVect::<2>::zeros(), true);
    let p = patch(4, RealVect::<2>::repeat(-2.0), 1.0);
    let g = build(&f, &p, 0.0).unwrap();
    assert_eq!(g.stats.irregular, 4);
    assert_eq!(g.stats.covered, 12);
    assert_eq!(g.stats.regular, 0);
    assert_eq!(g.nodes().len(), 4);
    for n in g.nodes() {
        assert!((n.vol_frac - 0.5).abs() < 1e-10, "vf {} at {}", n.vol_frac, n.cell);
        assert!((n.bndry_area - 2f64.sqrt()).abs() < 1e-10);
    }
    let ne = g.node(&IntVect([2, 2])).unwrap();
    assert!(ne.face(0, Side::Hi).is_none());
    let west = ne.face(0, Side::Lo).unwrap();
    assert_eq!(west.target, ArcTarget::Interior);
    assert!((west.area_frac - 1.0).abs() < 1e-10);
    assert_arcs_consistent(&g, &p);
}

#[test]
fn sphere_volume_converges_2d() {
    let f = SphereIf::new(1.0, RealVect::<2>::new(0.013, -0.021), true);
    let p = patch(16, RealVect::<2>::repeat(-2.0), 0.25);
    let g = build(&f, &p, 0.0).unwrap();
    let area = g.fluid_cells(&p.valid) * 0.25 * 0.25;
    let exact = std::f64::consts::PI;
    assert!((area - exact).abs() / exact < 0.03, "area {}", area);
    assert_in_ranges(&g);
    assert_arcs_consistent(&g, &p);
}

#[test]
fn sphere_volume_converges_3d() {
    let f = SphereIf::new(1.0, RealVect::<3>::new(0.013, -0.021, 0.008), true);
    let p = patch(16, RealVect::<3>::repeat(-2.0), 0.25);
    let g = build(&f, &p, 0.0).unwrap();
    let vol = g.fluid_cells(&p.valid) * 0.25f64.powi(3);
    let exact = 4.0 / 3.0 * std::f64::consts::PI;
    assert!((vol - exact).abs() / exact < 0.05, "volume {}", vol);
    assert_in_ranges(&g);
    assert_arcs_consistent(&g, &p);
}

#[test]
fn rebuild_is_identical() {
    let f = SphereIf::new(0.7, RealVect::<3>::new(0.1, 0.05, -0.02), true);
    let p = patch(6, RealVect::<3>::repeat(-1.0), 1.0 / 3.0);
    let a = build(&f, &p, 0.05).unwrap();
    let b = build(&f, &p, 0.05).unwrap();
    assert_eq!(a, b);
}

#[test]
fn threshold_prunes_and_repairs_neighbors() {
    // Boundary y = 1.02 + 0.2 x: row 1 volume fractions 0.12, 0.32, 0.52, 0.72.
    let f = FnIf::new(|x: &RealVect<2>| x[1] - 1.02 - 0.2 * x[0]);
    let p = patch(4, RealVect::<2>::zeros(), 1.0);
    let g = build(&f, &p, 0.2).unwrap();

    let pruned = IntVect([0, 1]);
    assert_eq!(g.stats.pruned, 1);
    assert_eq!(g.flags.get(&pruned), Some(CellKind::Covered));
    assert!(g.node(&pruned).is_none());

    let right = g.node(&IntVect([1, 1])).unwrap();
    assert!((right.vol_frac - 0.32).abs() < 1e-10);
    assert!(right.face(0, Side::Lo).is_none());

    // The regular cell below the pruned one became a full irregular node.
    let below = IntVect([0, 0]);
    assert_eq!(g.flags.get(&below), Some(CellKind::Irregular));
    let n = g.node(&below).unwrap();
    assert_eq!(n.vol_frac, 1.0);
    assert!(n.face(1, Side::Hi).is_none());
    assert_eq!(n.face(0, Side::Lo).map(|f| f.target), Some(ArcTarget::DomainBoundary));
    assert_eq!(n.face(0, Side::Hi).map(|f| f.target), Some(ArcTarget::Interior));
    assert!((n.normal - RealVect::<2>::new(0.0, 1.0)).norm() < 1e-15);

    for node in g.nodes() {
        for axis in 0..2 {
            for side in Side::ALL {
                if node.face(axis, side).is_some() {
                    assert_ne!(node.cell.shifted(axis, side.sign()), pruned);
                }
            }
        }
    }
    assert_arcs_consistent(&g, &p);
}

#[test]
fn regular_cells_next_to_covered_become_degenerate_nodes() {
    let p = patch::<2>(3, RealVect::<2>::zeros(), 1.0);
    let mut flags = CellFlags::new(p.ghost, CellKind::Regular);
    flags.set(&IntVect([1, 1]), CellKind::Covered);
    let nodes = promote_regular_next_to_covered(&mut flags, &p);

    assert_eq!(nodes.len(), 4);
    assert_eq!(flags.count(CellKind::Irregular), 4);
    assert_eq!(flags.get(&IntVect([0, 0])), Some(CellKind::Regular));

    let east = nodes.iter().find(|n| n.cell == IntVect([2, 1])).unwrap();
    assert_eq!(east.vol_frac, 1.0);
    assert_eq!(east.vol_centroid, RealVect::<2>::zeros());
    assert!(east.face(0, Side::Lo).is_none());
    assert_eq!(east.face(0, Side::Hi).map(|f| f.target), Some(ArcTarget::DomainBoundary));
    assert_eq!(east.bndry_area, 1.0);
    assert_eq!(east.normal, RealVect::<2>::new(-1.0, 0.0));
    assert_eq!(east.bndry_centroid, RealVect::<2>::new(-0.5, 0.0));
}

#[test]
fn missing_node_during_repair_is_an_error() {
    let p = patch::<2>(3, RealVect::<2>::zeros(), 1.0);
    let mut flags = CellFlags::new(p.ghost, CellKind::Regular);
    flags.set(&IntVect([0, 1]), CellKind::Covered);
    flags.set(&IntVect([1, 1]), CellKind::Irregular);
    let mut nodes = Vec::new();
    let err = repair_pruned(&mut flags, &mut nodes, &p, &[IntVect([0, 1])]).unwrap_err();
    assert_eq!(
        err,
        GeometryError::MissingNode {
            cell: "(1,1)".into()
        }
    );
}

#[test]
fn split_patches_agree_with_the_whole_on_pruning() {
    // Boundary y = 1 + 0.1 x: row 1 volume fractions 0.05, 0.15, 0.25, 0.35.
    let f = FnIf::new(|x: &RealVect<2>| x[1] - 1.0 - 0.1 * x[0]);
    let whole_patch = patch(4, RealVect::<2>::zeros(), 1.0);
    let whole = build(&f, &whole_patch, 0.2).unwrap();
    assert_eq!(whole.flags.get(&IntVect([1, 1])), Some(CellKind::Covered));

    let domain = whole_patch.domain;
    let mut pruned = 0;
    for (lo, hi) in [(0, 1), (2, 3)] {
        let valid = IndexBox::new(IntVect([lo, 0]), IntVect([hi, 3]));
        let part_patch = GridPatch::with_ghost(valid, domain, 1, RealVect::<2>::zeros(), 1.0);
        let part = build(&f, &part_patch, 0.2).unwrap();
        pruned += part.stats.pruned;
        for iv in valid.iter() {
            assert_eq!(part.flags.get(&iv), whole.flags.get(&iv), "flag at {iv}");
            assert_eq!(part.node(&iv), whole.node(&iv), "node at {iv}");
        }
    }
    assert_eq!(pruned, whole.stats.pruned);

    let right = IndexBox::new(IntVect([2, 0]), IntVect([3, 3]));
    let right_patch = GridPatch::with_ghost(right, domain, 1, RealVect::<2>::zeros(), 1.0);
    let part = build(&f, &right_patch, 0.2).unwrap();
    assert_eq!(part.flags.get(&IntVect([1, 1])), Some(CellKind::Covered));
    assert!(part.node(&IntVect([2, 1])).unwrap().face(0, Side::Lo).is_none());
}

#[test]
fn boundary_on_a_grid_line_builds() {
    let f = FnIf::new(|x: &RealVect<2>| x[0] - 6.0 * 0.1);
    let p = patch(8, RealVect::<2>::zeros(), 0.1);
    let g = build(&f, &p, 0.0).unwrap();
    for j in 0..8 {
        let n = g.node(&IntVect([5, j])).unwrap();
        assert!((n.vol_frac - 1.0).abs() < 1e-9, "vf {} at row {j}", n.vol_frac);
        assert_eq!(g.flags.get(&IntVect([6, j])), Some(CellKind::Covered));
    }
    assert_in_ranges(&g);
    assert_arcs_consistent(&g, &p);
}

#[test]
fn invalid_patch_is_rejected_before_work() {
    let f = SphereIf::new(1.0, RealVect::<2>::zeros(), true);
    let mut p = patch(4, RealVect::<2>::repeat(-2.0), 1.0);
    p.ghost = p.valid;
    p.valid = IndexBox::new(IntVect([1, 1]), IntVect([3, 3]));
    assert!(build(&f, &p, 0.0).is_ok());
    p.dx = -1.0;
    assert!(matches!(build(&f, &p, 0.0), Err(GeometryError::InvalidPatch(_))));
}

#[test]
fn seeded_random_spheres_stay_consistent() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..8 {
        let c = RealVect::<3>::from_fn(|_, _| rng.gen_range(-0.3..0.3));
        let r = rng.gen_range(0.4..1.2);
        let f = SphereIf::new(r, c, rng.gen_bool(0.5));
        let p = patch(6, RealVect::<3>::repeat(-1.5), 0.5);
        let g = build(&f, &p, 0.0).unwrap();
        assert_in_ranges(&g);
        assert_arcs_consistent(&g, &p);
        let cells: HashSet<_> = g.nodes().iter().map(|n| n.cell).collect();
        assert_eq!(cells.len(), g.nodes().len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_planes_close_and_stay_in_range_2d(
        theta in 0.0f64..std::f64::consts::TAU,
        offset in -1.2f64..1.2,
    ) {
        let normal = RealVect::<2>::new(theta.cos(), theta.sin());
        let f = PlaneIf::new(normal, normal * offset, true);
        let p = patch(3, RealVect::<2>::repeat(-1.5), 1.0);
        let g = build(&f, &p, 0.0).unwrap();
        assert_in_ranges(&g);
        for n in g.nodes() {
            let closure = n.normal * n.bndry_area - n.face_area_vector();
            prop_assert!(closure.norm() < 1e-9, "closure {} at {}", closure.norm(), n.cell);
        }
    }

    #[test]
    fn random_planes_close_and_stay_in_range_3d(
        theta in 0.0f64..std::f64::consts::PI,
        phi in 0.0f64..std::f64::consts::TAU,
        offset in -1.0f64..1.0,
    ) {
        let (st, ct) = theta.sin_cos();
        let normal = RealVect::<3>::new(st * phi.cos(), st * phi.sin(), ct);
        let f = PlaneIf::new(normal, normal * offset, false);
        let p = patch(3, RealVect::<3>::repeat(-1.5), 1.0);
        let g = build(&f, &p, 0.0).unwrap();
        assert_in_ranges(&g);
        for n in g.nodes() {
            let closure = n.normal * n.bndry_area - n.face_area_vector();
            prop_assert!(closure.norm() < 1e-9, "closure {} at {}", closure.norm(), n.cell);
        }
    }
}
