/// Single-configuration evaluation and β sweeps.
///
/// p_max does not depend on β, so a sweep computes the Δ peak once and then
/// runs one window minimum plus one threshold search per β. β points are
/// independent; Rayon's indexed collect keeps them in grid order, so the
/// output matches a sequential loop bit for bit.

use crate::config::{GridSpec, WindowConfig};
use crate::entropy::{feasibility, window_minimum, EntropyModel, Params, ALPHA_STAR};
use crate::error::{check_unit_open, Result, WindowError};
use crate::optimize::{argmax_delta, sample_curve, CurveSample, PeakEstimate};
use crate::threshold::{find_threshold, ThresholdSearch, ThresholdStatus};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One row of the α_max-vs-β relationship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub beta: f64,
    pub p_max: f64,
    pub delta_max: f64,
    /// m(γ, β); NaN when the window is empty.
    pub window_min: f64,
    pub alpha_max: f64,
    pub status: ThresholdStatus,
    pub iterations: u32,
}

/// Count of sweep points per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub converged: usize,
    pub saturated: usize,
    pub infeasible: usize,
    pub low_confidence: usize,
    pub empty_window: usize,
}

/// One α_max curve: fixed (θ, γ), β over the grid.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub theta: f64,
    pub gamma: f64,
    pub grid: GridSpec,
    pub alpha_star: f64,
    pub peak: PeakEstimate,
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn summary(&self) -> SweepSummary {
        let mut s = SweepSummary::default();
        for point in &self.points {
            match point.status {
                ThresholdStatus::Converged => s.converged += 1,
                ThresholdStatus::Saturated => s.saturated += 1,
                ThresholdStatus::Infeasible => s.infeasible += 1,
                ThresholdStatus::LowConfidence => s.low_confidence += 1,
                ThresholdStatus::EmptyWindow => s.empty_window += 1,
            }
        }
        s
    }

    /// (β, α_max) pairs in grid order.
    pub fn alpha_curve(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.beta, p.alpha_max)).collect()
    }
}

/// Everything reported for one (θ, γ, β).
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub params: Params,
    pub alpha_star: f64,
    pub peak: PeakEstimate,
    pub window_min: f64,
    pub threshold: ThresholdSearch,
    pub curve: Vec<CurveSample>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Evaluate the configured (θ, γ, β): Δ curve, p_max, m(γ, β) and α_max.
pub fn evaluate(config: &WindowConfig) -> Result<Evaluation> {
    config.validate()?;
    let params = config.params()?;
    let peak = argmax_delta(&config.curve, config.search)?;
    let curve = sample_curve(&config.curve)?;
    let model = EntropyModel::new(params, config.window_samples)?;
    let threshold = find_threshold(|a| model.feasibility(a), &config.bracket());

    info!(
        theta = params.theta,
        gamma = params.gamma,
        beta = params.beta,
        p_max = peak.p_max,
        window_min = model.window_minimum(),
        alpha_max = threshold.alpha_max,
        status = %threshold.status,
        "Evaluated configuration"
    );

    Ok(Evaluation {
        params,
        alpha_star: ALPHA_STAR,
        peak,
        window_min: model.window_minimum(),
        threshold,
        curve,
    })
}

/// Evaluate one β of a sweep. An empty window is reported as a flagged
/// point rather than an error so the sweep can continue.
pub fn evaluate_beta(
    theta: f64,
    gamma: f64,
    beta: f64,
    peak: &PeakEstimate,
    config: &WindowConfig,
) -> Result<SweepPoint> {
    check_unit_open("theta", theta)?;
    check_unit_open("gamma", gamma)?;
    check_unit_open("beta", beta)?;
    let (window_min, search) = match window_minimum(gamma, beta, config.window_samples) {
        Ok(m) => (m, find_threshold(|a| feasibility(a, theta, m), &config.bracket())),
        Err(WindowError::EmptyWindow { .. }) => (f64::NAN, ThresholdSearch::empty_window()),
        Err(e) => return Err(e),
    };

    debug!(
        beta,
        window_min,
        alpha_max = search.alpha_max,
        status = %search.status,
        iterations = search.iterations,
        "Sweep point"
    );

    Ok(SweepPoint {
        beta,
        p_max: peak.p_max,
        delta_max: peak.delta_max,
        window_min,
        alpha_max: search.alpha_max,
        status: search.status,
        iterations: search.iterations,
    })
}

/// Sweep β over `grid` for fixed (θ, γ).
pub fn sweep_beta(theta: f64, gamma: f64, grid: &GridSpec, config: &WindowConfig) -> Result<SweepResult> {
    config.validate()?;
    check_unit_open("theta", theta)?;
    check_unit_open("gamma", gamma)?;
    grid.validate()?;

    let peak = argmax_delta(&config.curve, config.search)?;
    sweep_with_peak(theta, gamma, grid, &peak, config)
}

fn sweep_with_peak(
    theta: f64,
    gamma: f64,
    grid: &GridSpec,
    peak: &PeakEstimate,
    config: &WindowConfig,
) -> Result<SweepResult> {
    info!(
        theta,
        gamma,
        beta_min = grid.beta_min,
        beta_max = grid.beta_max,
        points = grid.points,
        "Sweeping beta"
    );

    let points: Vec<SweepPoint> = grid
        .betas()
        .into_par_iter()
        .map(|beta| evaluate_beta(theta, gamma, beta, peak, config))
        .collect::<Result<_>>()?;

    let result = SweepResult {
        theta,
        gamma,
        grid: *grid,
        alpha_star: ALPHA_STAR,
        peak: *peak,
        points,
    };

    let summary = result.summary();
    if summary.low_confidence > 0 {
        warn!(
            count = summary.low_confidence,
            theta, gamma, "Some sweep points did not meet the bisection tolerance"
        );
    }
    if summary.infeasible + summary.empty_window > 0 {
        debug!(
            infeasible = summary.infeasible,
            empty_window = summary.empty_window,
            "Sweep points without an alpha_max"
        );
    }
    Ok(result)
}

/// One β sweep per (θ, γ) pair, θ-major.
pub fn sweep_family(
    thetas: &[f64],
    gammas: &[f64],
    grid: &GridSpec,
    config: &WindowConfig,
) -> Result<Vec<SweepResult>> {
    config.validate()?;
    grid.validate()?;
    for &theta in thetas {
        check_unit_open("theta", theta)?;
    }
    for &gamma in gammas {
        check_unit_open("gamma", gamma)?;
    }

    let peak = argmax_delta(&config.curve, config.search)?;
    let pairs: Vec<(f64, f64)> = thetas
        .iter()
        .flat_map(|&t| gammas.iter().map(move |&g| (t, g)))
        .collect();

    pairs
        .into_par_iter()
        .map(|(theta, gamma)| sweep_with_peak(theta, gamma, grid, &peak, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> WindowConfig {
        WindowConfig {
            curve: crate::optimize::CurveSpec { samples: 2001, ..Default::default() },
            window_samples: 2001,
            ..Default::default()
        }
    }

    #[test]
    fn test_evaluate_reference_configuration() {
        let eval = evaluate(&WindowConfig::default()).unwrap();
        assert_eq!(eval.threshold.status, ThresholdStatus::Converged);
        assert!((eval.threshold.alpha_max - 0.401_802_313_089_032_9).abs() < 1e-8);
        assert!((eval.window_min - 0.063_181_235_137_438_78).abs() < 1e-9);
        assert!((eval.peak.p_max - 0.13785).abs() < 1e-9);
        assert_eq!(eval.curve.len(), 20_000);
    }

    #[test]
    fn test_evaluate_higher_theta() {
        let cfg = WindowConfig { theta: 0.44, ..Default::default() };
        let eval = evaluate(&cfg).unwrap();
        assert!((eval.threshold.alpha_max - 0.413_449_380_053_406_15).abs() < 1e-8);
    }

    #[test]
    fn test_evaluate_rejects_boundary_beta() {
        for beta in [0.0, 1.0] {
            let cfg = WindowConfig { beta, ..small_config() };
            let err = evaluate(&cfg).unwrap_err();
            assert!(err.is_domain(), "beta = {beta}: {err}");
        }
    }

    #[test]
    fn test_saturated_with_heavy_theta() {
        // θ·m dominates (1−θ)·Δ(α_upper): no threshold below the cap.
        let cfg = WindowConfig { theta: 0.9, ..small_config() };
        let eval = evaluate(&cfg).unwrap();
        assert_eq!(eval.threshold.status, ThresholdStatus::Saturated);
        assert_eq!(eval.threshold.alpha_max, cfg.alpha_upper);
    }

    #[test]
    fn test_sweep_flags_each_regime() {
        let cfg = small_config();
        let grid = GridSpec::new(0.1, 0.5, 5).unwrap();
        let result = sweep_beta(0.33, 0.16, &grid, &cfg).unwrap();
        let statuses: Vec<ThresholdStatus> = result.points.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                ThresholdStatus::EmptyWindow,
                ThresholdStatus::Converged,
                ThresholdStatus::Converged,
                ThresholdStatus::Infeasible,
                ThresholdStatus::Infeasible,
            ]
        );
        let s = result.summary();
        assert_eq!((s.converged, s.infeasible, s.empty_window), (2, 2, 1));
        assert!(result.points[0].window_min.is_nan());
    }

    #[test]
    fn test_sweep_matches_sequential_loop() {
        let cfg = small_config();
        let grid = GridSpec::new(0.17, 0.35, 7).unwrap();
        let result = sweep_beta(0.33, 0.16, &grid, &cfg).unwrap();
        for (point, beta) in result.points.iter().zip(grid.betas()) {
            let expected = evaluate_beta(0.33, 0.16, beta, &result.peak, &cfg).unwrap();
            assert_eq!(point.beta.to_bits(), expected.beta.to_bits());
            assert_eq!(point.alpha_max.to_bits(), expected.alpha_max.to_bits());
            assert_eq!(point.status, expected.status);
        }
    }

    #[test]
    fn test_sweep_rejects_bad_theta() {
        let grid = GridSpec::new(0.2, 0.3, 3).unwrap();
        assert!(sweep_beta(1.0, 0.16, &grid, &small_config()).unwrap_err().is_domain());
        assert!(sweep_beta(0.33, 0.0, &grid, &small_config()).unwrap_err().is_domain());
    }

    #[test]
    fn test_evaluate_beta_rejects_out_of_domain_theta_and_gamma() {
        let cfg = small_config();
        let peak = argmax_delta(&cfg.curve, cfg.search).unwrap();
        for (theta, gamma) in [(1.5, 0.16), (0.0, 0.16), (0.33, -0.2), (0.33, 1.0)] {
            let err = evaluate_beta(theta, gamma, 0.34, &peak, &cfg).unwrap_err();
            assert!(err.is_domain(), "theta = {theta}, gamma = {gamma}: {err}");
        }
        assert!(evaluate_beta(0.33, 0.16, 0.34, &peak, &cfg).is_ok());
    }

    #[test]
    fn test_family_is_theta_major() {
        let grid = GridSpec::new(0.2, 0.3, 3).unwrap();
        let family = sweep_family(&[0.3, 0.4], &[0.12, 0.16], &grid, &small_config()).unwrap();
        let keys: Vec<(f64, f64)> = family.iter().map(|c| (c.theta, c.gamma)).collect();
        assert_eq!(keys, vec![(0.3, 0.12), (0.3, 0.16), (0.4, 0.12), (0.4, 0.16)]);
        assert!(family.iter().all(|c| c.points.len() == 3));
    }

    #[test]
    fn test_alpha_max_grows_with_theta() {
        // Larger θ puts more weight on the positive window minimum.
        let grid = GridSpec::new(0.25, 0.25, 1).unwrap();
        let family = sweep_family(&[0.2, 0.33, 0.44], &[0.16], &grid, &small_config()).unwrap();
        let alphas: Vec<f64> = family.iter().map(|c| c.points[0].alpha_max).collect();
        assert!(alphas.windows(2).all(|w| w[0] < w[1]), "{alphas:?}");
    }
}
