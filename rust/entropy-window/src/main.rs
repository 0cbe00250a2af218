/// RD9-weighted entropy window: CLI
///
/// Usage:
///   entropy-window [--theta 0.33] [--gamma 0.16] [--beta 0.34]
///   entropy-window --theta 0.44 --gamma 0.16 --beta 0.34 --grid
///   entropy-window --config run.toml --grid --outdir data/
///
/// Prints p_max and the single-configuration α_max. Writes the Δ(p) curve
/// and an evaluation report to --outdir; with --grid also sweeps β and
/// writes one CSV plus a JSON report per (θ, γ).

use anyhow::{Context, Result};
use clap::Parser;
use entropy_window::export::{ensure_dir, sweep_csv_path, write_curve_csv, write_json, write_sweep_csv};
use entropy_window::{
    evaluate, sweep_family, GridSpec, SearchMethod, SweepResult, WindowConfig, ALPHA_STAR,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "entropy-window")]
#[command(version)]
#[command(about = "Δ(p) peak, window minimum and α_max sweeps for the RD9-weighted entropy method")]
struct Cli {
    /// Base configuration file (TOML); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// θ, weight on the RD-favourable class
    #[arg(long)]
    theta: Option<f64>,

    /// γ, floor of the window
    #[arg(long)]
    gamma: Option<f64>,

    /// β, ceiling of the window
    #[arg(long)]
    beta: Option<f64>,

    /// Also sweep β and save CSV/JSON
    #[arg(long)]
    grid: bool,

    /// Extra θ values for the sweep family (comma separated)
    #[arg(long, value_delimiter = ',')]
    thetas: Vec<f64>,

    /// Extra γ values for the sweep family (comma separated)
    #[arg(long, value_delimiter = ',')]
    gammas: Vec<f64>,

    #[arg(long)]
    beta_min: Option<f64>,

    #[arg(long)]
    beta_max: Option<f64>,

    #[arg(long)]
    beta_points: Option<usize>,

    /// Samples of Δ(p) on [0, 1/2]
    #[arg(long)]
    curve_samples: Option<usize>,

    /// Refine p_max with golden-section search
    #[arg(long)]
    golden: bool,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn build_config(cli: &Cli) -> Result<WindowConfig> {
    let mut cfg = match &cli.config {
        Some(path) => WindowConfig::from_file(path)?,
        None => WindowConfig::default(),
    };
    if let Some(theta) = cli.theta {
        cfg.theta = theta;
    }
    if let Some(gamma) = cli.gamma {
        cfg.gamma = gamma;
    }
    if let Some(beta) = cli.beta {
        cfg.beta = beta;
    }
    if let Some(samples) = cli.curve_samples {
        cfg.curve.samples = samples;
    }
    if cli.golden {
        cfg.search = SearchMethod::GoldenSection;
    }
    cfg.grid = GridSpec {
        beta_min: cli.beta_min.unwrap_or(cfg.grid.beta_min),
        beta_max: cli.beta_max.unwrap_or(cfg.grid.beta_max),
        points: cli.beta_points.unwrap_or(cfg.grid.points),
    };
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let cfg = build_config(&cli)?;
    ensure_dir(&cli.outdir)?;

    // Shape of Δ and p_max
    let eval = evaluate(&cfg).context("Evaluating configuration")?;
    println!(
        "p_max ≈ {:.6},  Delta(p_max) ≈ {:.6}",
        eval.peak.p_max, eval.peak.delta_max
    );
    write_curve_csv(&eval.curve, &cli.outdir.join("delta_curve.csv"))?;

    // Single evaluation
    println!(
        "[theta={:.2}, gamma={:.2}, beta={:.2}]  m(gamma,beta)={:.6}   alpha_max={:.6} ({})   (alpha*={:.6})",
        cfg.theta,
        cfg.gamma,
        cfg.beta,
        eval.window_min,
        eval.threshold.alpha_max,
        eval.threshold.status,
        ALPHA_STAR
    );
    write_json(&eval, &cli.outdir.join("evaluation.json"))?;

    if cli.grid {
        let thetas = family_axis(cfg.theta, &cli.thetas);
        let gammas = family_axis(cfg.gamma, &cli.gammas);

        let family = sweep_family(&thetas, &gammas, &cfg.grid, &cfg).context("Sweeping beta")?;
        for curve in &family {
            write_sweep(curve, &cli.outdir)?;
        }
    }
    Ok(())
}

/// Base value first, then the extra values, each value once.
fn family_axis(base: f64, extra: &[f64]) -> Vec<f64> {
    let mut axis = vec![base];
    for &value in extra {
        if !axis.iter().any(|v| v.to_bits() == value.to_bits()) {
            axis.push(value);
        }
    }
    axis
}

fn write_sweep(curve: &SweepResult, outdir: &std::path::Path) -> Result<()> {
    let csv = sweep_csv_path(outdir, curve.theta, curve.gamma);
    write_sweep_csv(curve, &csv)?;
    write_json(curve, &csv.with_extension("json"))?;

    let s = curve.summary();
    println!(
        "[theta={:.2}, gamma={:.2}]  {} points: {} converged, {} saturated, {} infeasible, {} empty window, {} low confidence",
        curve.theta,
        curve.gamma,
        curve.points.len(),
        s.converged,
        s.saturated,
        s.infeasible,
        s.empty_window,
        s.low_confidence
    );
    info!(path = %csv.display(), "Results written");
    Ok(())
}
