use anyhow::{Context, Result};
use ebgeom::graph::EbGraphPatch;
use ebgeom::index::GridPatch;
use serde::Serialize;
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Aggregate numbers of one geometry build over all patches.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Summary {
    pub dim: usize,
    pub patches: usize,
    pub covered: usize,
    pub regular: usize,
    pub irregular: usize,
    pub pruned: usize,
    pub nodes: usize,
    /// Physical fluid volume (area in 2-D) over all valid regions.
    pub fluid_volume: f64,
    /// Physical boundary measure (length in 2-D).
    pub boundary_area: f64,
    pub min_vol_frac: Option<f64>,
}

impl Summary {
    pub fn from_graphs<const D: usize>(
        patches: &[GridPatch<D>],
        graphs: &[EbGraphPatch<D>],
    ) -> Self {
        let mut s = Summary {
            dim: D,
            patches: graphs.len(),
            covered: 0,
            regular: 0,
            irregular: 0,
            pruned: 0,
            nodes: 0,
            fluid_volume: 0.0,
            boundary_area: 0.0,
            min_vol_frac: None,
        };
        for (patch, g) in patches.iter().zip(graphs) {
            let cell_volume = patch.dx.powi(D as i32);
            s.covered += g.stats.covered;
            s.regular += g.stats.regular;
            s.irregular += g.stats.irregular;
            s.pruned += g.stats.pruned;
            s.nodes += g.nodes().len();
            s.fluid_volume += g.fluid_cells(&patch.valid) * cell_volume;
            s.boundary_area += g.nodes().iter().map(|n| n.bndry_area).sum::<f64>()
                * patch.dx.powi(D as i32 - 1);
            for n in g.nodes() {
                s.min_vol_frac = Some(s.min_vol_frac.map_or(n.vol_frac, |m| m.min(n.vol_frac)));
            }
        }
        s
    }
}

/// Write `summary` as pretty JSON to `path`, creating parent directories.
pub fn write_summary(path: &Path, summary: &Summary) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_vec_pretty(summary)?)
        .with_context(|| format!("writing {}", path.display()))
}

/// Write `<artifact stem>.run.json` with the library version and run parameters.
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, params: Value) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    ensure_parent(&path)?;
    let doc = json!({
        "version": ebgeom::VERSION,
        "params": params,
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    Ok(())
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("summary"));
    name.push(".run.json");
    artifact.with_file_name(name)
}
