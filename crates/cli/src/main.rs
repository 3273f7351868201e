use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ebgeom::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod summary;

use summary::{write_sidecar, write_summary, Summary};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Embedded-boundary geometry generation driver")]
struct Cmd {
    /// Diagnostics level passed to the geometry shop (higher reports smaller clamps)
    #[arg(long, default_value_t = 0)]
    verbosity: i32,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Shape {
    Sphere,
    Plane,
}

#[derive(Subcommand)]
enum Action {
    /// Build the graph of a shape on a cube grid and print (or write) a JSON summary
    Run {
        #[arg(long, default_value_t = 3)]
        dim: usize,
        #[arg(long, value_enum, default_value_t = Shape::Sphere)]
        shape: Shape,
        /// Sphere radius
        #[arg(long, default_value_t = 1.0)]
        radius: f64,
        /// Plane normal (comma separated, one entry per dimension)
        #[arg(long, value_delimiter = ',', default_value = "0,0,1")]
        normal: Vec<f64>,
        /// Signed distance of the plane from the origin along its normal
        #[arg(long, default_value_t = 0.0)]
        offset: f64,
        /// Fluid on the outside of the sphere / behind the plane normal
        #[arg(long)]
        outside: bool,
        /// Cells per axis
        #[arg(long, default_value_t = 32)]
        cells: i64,
        /// Half-width of the cube domain centered at the origin
        #[arg(long, default_value_t = 2.0)]
        half_width: f64,
        /// Number of patches along the first axis
        #[arg(long, default_value_t = 1)]
        patches: i64,
        /// Volume-fraction threshold below which cut cells are dropped
        #[arg(long, default_value_t = 0.0)]
        threshold: f64,
        /// Write the summary here (plus a `.run.json` sidecar) instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the library version and default configuration
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            dim,
            shape,
            radius,
            normal,
            offset,
            outside,
            cells,
            half_width,
            patches,
            threshold,
            out,
        } => {
            let params = RunParams {
                shape,
                radius,
                normal,
                offset,
                inside: !outside,
                cells,
                half_width,
                patches,
                cfg: ShopCfg {
                    verbosity: cmd.verbosity,
                    vof_threshold: threshold,
                },
            };
            run(dim, &params, out)
        }
        Action::Report => report(),
    }
}

struct RunParams {
    shape: Shape,
    radius: f64,
    normal: Vec<f64>,
    offset: f64,
    inside: bool,
    cells: i64,
    half_width: f64,
    patches: i64,
    cfg: ShopCfg,
}

impl RunParams {
    fn to_json(&self, dim: usize) -> serde_json::Value {
        serde_json::json!({
            "dim": dim,
            "shape": format!("{:?}", self.shape),
            "radius": self.radius,
            "normal": self.normal,
            "offset": self.offset,
            "inside": self.inside,
            "cells": self.cells,
            "half_width": self.half_width,
            "patches": self.patches,
            "verbosity": self.cfg.verbosity,
            "threshold": self.cfg.vof_threshold,
        })
    }
}

fn run(dim: usize, params: &RunParams, out: Option<PathBuf>) -> Result<()> {
    tracing::info!(dim, shape = ?params.shape, cells = params.cells, "run");
    let summary = match dim {
        2 => build::<2>(params)?,
        3 => build::<3>(params)?,
        _ => bail!("--dim must be 2 or 3, got {dim}"),
    };
    match out {
        Some(path) => {
            write_summary(&path, &summary)?;
            let sidecar = write_sidecar(&path, params.to_json(dim))?;
            tracing::info!(out = %path.display(), sidecar = %sidecar.display(), "wrote summary");
        }
        None => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn shape<const D: usize>(params: &RunParams) -> Result<Box<dyn ImplicitFunction<D>>> {
    Ok(match params.shape {
        Shape::Sphere => Box::new(SphereIf::new(
            params.radius,
            RealVect::<D>::zeros(),
            params.inside,
        )),
        Shape::Plane => {
            if params.normal.len() != D {
                bail!("--normal needs {D} components, got {}", params.normal.len());
            }
            let n = RealVect::<D>::from_fn(|d, _| params.normal[d]);
            let norm = n.norm();
            if norm == 0.0 {
                bail!("--normal must be non-zero");
            }
            let n = n / norm;
            Box::new(PlaneIf::new(n, n * params.offset, params.inside))
        }
    })
}

/// Split `domain` into `count` slabs along axis 0.
fn slabs<const D: usize>(domain: &IndexBox<D>, count: i64) -> Vec<IndexBox<D>> {
    let n = domain.hi[0] - domain.lo[0] + 1;
    let count = count.clamp(1, n);
    (0..count)
        .map(|k| {
            let mut bx = *domain;
            bx.lo[0] = domain.lo[0] + k * n / count;
            bx.hi[0] = domain.lo[0] + (k + 1) * n / count - 1;
            bx
        })
        .collect()
}

fn build<const D: usize>(params: &RunParams) -> Result<Summary> {
    if params.cells < 1 || !(params.half_width > 0.0) {
        bail!("need at least one cell and a positive half width");
    }
    let func = shape::<D>(params)?;
    let shop = GeometryShop::new(func.as_ref(), params.cfg);
    let domain = IndexBox::<D>::cube(params.cells);
    let dx = 2.0 * params.half_width / params.cells as f64;
    let origin = RealVect::<D>::repeat(-params.half_width);
    let patches: Vec<GridPatch<D>> = slabs(&domain, params.patches)
        .into_iter()
        .map(|valid| GridPatch::with_ghost(valid, domain, 1, origin, dx))
        .collect();
    let graphs = shop.fill_patches(&patches)?;
    Ok(Summary::from_graphs(&patches, &graphs))
}

fn report() -> Result<()> {
    let cfg = ShopCfg::default();
    let obj = serde_json::json!({
        "version": ebgeom::VERSION,
        "defaults": {
            "verbosity": cfg.verbosity,
            "vof_threshold": cfg.vof_threshold,
            "discrepancy_threshold": cfg.discrepancy_threshold(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
