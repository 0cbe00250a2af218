//! File output for curves and sweeps: pretty JSON reports and plain CSV.

use crate::error::{Result, WindowError};
use crate::optimize::CurveSample;
use crate::sweep::SweepResult;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .map_err(|e| WindowError::io(format!("creating directory {}", dir.display()), e))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| WindowError::io(format!("creating {}", path.display()), e))
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, value)?;
    out.flush()
        .map_err(|e| WindowError::io(format!("writing {}", path.display()), e))
}

/// `beta,alpha_max,status`, one row per sweep point. Missing values are
/// written as `NaN`.
pub fn write_sweep_csv(result: &SweepResult, path: &Path) -> Result<()> {
    let ctx = |e: std::io::Error| WindowError::io(format!("writing {}", path.display()), e);
    let mut out = create(path)?;
    writeln!(out, "beta,alpha_max,status").map_err(ctx)?;
    for point in &result.points {
        writeln!(out, "{},{},{}", point.beta, point.alpha_max, point.status).map_err(ctx)?;
    }
    out.flush().map_err(ctx)
}

/// `p,delta`, one row per curve sample.
pub fn write_curve_csv(curve: &[CurveSample], path: &Path) -> Result<()> {
    let ctx = |e: std::io::Error| WindowError::io(format!("writing {}", path.display()), e);
    let mut out = create(path)?;
    writeln!(out, "p,delta").map_err(ctx)?;
    for s in curve {
        writeln!(out, "{},{}", s.p, s.delta).map_err(ctx)?;
    }
    out.flush().map_err(ctx)
}

/// File name used for one sweep curve, e.g.
/// `alpha_max_window_theta0.33_gamma0.16.csv`.
pub fn sweep_csv_path(dir: &Path, theta: f64, gamma: f64) -> PathBuf {
    dir.join(format!("alpha_max_window_theta{theta:.2}_gamma{gamma:.2}.csv"))
}
