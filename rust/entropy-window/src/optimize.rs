/// Scalar search over p for Δ(p).
///
/// The reference method is a dense grid: evaluate on N evenly spaced points,
/// keep the running extremum, first hit wins on ties. Grid points that land
/// exactly on 0 or 1 are dropped, and NaN evaluations are skipped.
///
/// Golden-section refinement is available on top of the grid: the grid
/// maximum and its two neighbours form the bracket, so the refined answer
/// never leaves the cell the grid already picked.

use crate::entropy::delta;
use crate::error::{Result, WindowError};
use serde::{Deserialize, Serialize};

/// Golden ratio conjugate (√5 − 1)/2.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Default tolerance for golden-section refinement.
pub const GOLDEN_TOLERANCE: f64 = 1e-10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One point of the Δ(p) curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    pub p: f64,
    pub delta: f64,
}

/// How p_max is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// Dense grid only.
    #[default]
    Grid,
    /// Grid, then golden-section inside the winning cell.
    GoldenSection,
}

/// Sampling of p: `samples` evenly spaced points on [p_lo, p_hi], both ends
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSpec {
    pub p_lo: f64,
    pub p_hi: f64,
    pub samples: usize,
}

impl Default for CurveSpec {
    /// [0, 1/2] with 20001 points: spacing 2.5e-5. Δ < 0 on (1/2, 1), so the
    /// maximizer over (0, 1) is always found in this half.
    fn default() -> Self {
        Self {
            p_lo: 0.0,
            p_hi: 0.5,
            samples: 20_001,
        }
    }
}

impl CurveSpec {
    pub fn validate(&self) -> Result<()> {
        if !(self.p_lo >= 0.0 && self.p_hi <= 1.0 && self.p_lo < self.p_hi) {
            return Err(WindowError::InvalidConfig(format!(
                "p interval [{}, {}] must satisfy 0 ≤ p_lo < p_hi ≤ 1",
                self.p_lo, self.p_hi
            )));
        }
        if self.samples < 3 {
            return Err(WindowError::InvalidConfig(format!(
                "curve needs at least 3 samples, got {}",
                self.samples
            )));
        }
        Ok(())
    }

    /// Grid spacing. Fewer than two samples count as one interval.
    pub fn resolution(&self) -> f64 {
        (self.p_hi - self.p_lo) / self.samples.saturating_sub(1).max(1) as f64
    }
}

/// Location and height of the Δ peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakEstimate {
    pub p_max: f64,
    pub delta_max: f64,
    /// Number of finite interior samples that took part in the search.
    pub evaluated: usize,
    /// Upper bound on |p_max − true argmax| for the grid method.
    pub resolution: f64,
    pub method: SearchMethod,
}

// ---------------------------------------------------------------------------
// Grid primitives
// ---------------------------------------------------------------------------

/// `n` evenly spaced points on [lo, hi], both ends included.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let span = hi - lo;
            let last = (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| lo + span * (i as f64) / last).collect();
            out[n - 1] = hi;
            out
        }
    }
}

#[inline]
fn on_boundary(p: f64) -> bool {
    p <= 0.0 || p >= 1.0
}

/// Grid extremum of `f` on [lo, hi]. `better(candidate, incumbent)` must be
/// strict so the first hit survives ties.
fn grid_extremum<F, B>(f: F, lo: f64, hi: f64, samples: usize, better: B) -> Option<(f64, f64, usize)>
where
    F: Fn(f64) -> f64,
    B: Fn(f64, f64) -> bool,
{
    let mut best: Option<(f64, f64)> = None;
    let mut evaluated = 0;
    for p in linspace(lo, hi, samples) {
        if on_boundary(p) {
            continue;
        }
        let v = f(p);
        if v.is_nan() {
            continue;
        }
        evaluated += 1;
        match best {
            Some((_, bv)) if !better(v, bv) => {}
            _ => best = Some((p, v)),
        }
    }
    best.map(|(p, v)| (p, v, evaluated))
}

/// (argmax, max) of `f` over the interior grid points of [lo, hi].
pub fn argmax_on<F: Fn(f64) -> f64>(f: F, lo: f64, hi: f64, samples: usize) -> Option<(f64, f64)> {
    grid_extremum(f, lo, hi, samples, |v, best| v > best).map(|(p, v, _)| (p, v))
}

/// (argmin, min) of `f` over the interior grid points of [lo, hi].
pub fn argmin_on<F: Fn(f64) -> f64>(f: F, lo: f64, hi: f64, samples: usize) -> Option<(f64, f64)> {
    grid_extremum(f, lo, hi, samples, |v, best| v < best).map(|(p, v, _)| (p, v))
}

/// Golden-section search for the maximum of a unimodal `f` on [a, b].
pub fn golden_section_max<F: Fn(f64) -> f64>(f: F, mut a: f64, mut b: f64, tol: f64) -> (f64, f64) {
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    while (b - a).abs() > tol {
        if fc >= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
        }
    }
    let x = 0.5 * (a + b);
    (x, f(x))
}

// ---------------------------------------------------------------------------
// Δ(p) specific
// ---------------------------------------------------------------------------

/// Locate p_max = argmax Δ(p) on the sampled interval.
///
/// A validated spec has at least one grid point strictly inside (0, 1), where
/// Δ is finite, so `NoFiniteSamples` cannot come out of a spec that passed
/// `validate`.
pub fn argmax_delta(spec: &CurveSpec, method: SearchMethod) -> Result<PeakEstimate> {
    spec.validate()?;
    let (p_grid, d_grid, evaluated) =
        grid_extremum(delta, spec.p_lo, spec.p_hi, spec.samples, |v, best| v > best)
            .ok_or(WindowError::NoFiniteSamples { what: "p grid" })?;

    let step = spec.resolution();
    let (p_max, delta_max) = match method {
        SearchMethod::Grid => (p_grid, d_grid),
        SearchMethod::GoldenSection => {
            let a = (p_grid - step).max(spec.p_lo);
            let b = (p_grid + step).min(spec.p_hi);
            // Keep the bracket off the endpoints where Δ is undefined.
            let a = if on_boundary(a) { p_grid.min(a + 0.5 * step) } else { a };
            let b = if on_boundary(b) { p_grid.max(b - 0.5 * step) } else { b };
            let (p, d) = golden_section_max(delta, a, b, GOLDEN_TOLERANCE);
            // The refined point can only tie or beat the grid point.
            if d >= d_grid {
                (p, d)
            } else {
                (p_grid, d_grid)
            }
        }
    };

    Ok(PeakEstimate {
        p_max,
        delta_max,
        evaluated,
        resolution: step,
        method,
    })
}

/// Δ(p) on the sampled interval, boundary and NaN samples removed.
pub fn sample_curve(spec: &CurveSpec) -> Result<Vec<CurveSample>> {
    spec.validate()?;
    let curve: Vec<CurveSample> = linspace(spec.p_lo, spec.p_hi, spec.samples)
        .into_iter()
        .filter(|&p| !on_boundary(p))
        .map(|p| CurveSample { p, delta: delta(p) })
        .filter(|s| !s.delta.is_nan())
        .collect();
    if curve.is_empty() {
        return Err(WindowError::NoFiniteSamples { what: "p grid" });
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints_and_spacing() {
        let xs = linspace(0.1, 0.5, 5);
        assert_eq!(xs.len(), 5);
        assert_eq!(xs[0], 0.1);
        assert_eq!(xs[4], 0.5);
        for w in xs.windows(2) {
            assert!(((w[1] - w[0]) - 0.1).abs() < 1e-12);
        }
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 0.7, 1), vec![0.3]);
    }

    #[test]
    fn test_argmax_delta_reference() {
        let peak = argmax_delta(&CurveSpec::default(), SearchMethod::Grid).unwrap();
        assert!((peak.p_max - 0.13785).abs() < 1e-9, "p_max = {}", peak.p_max);
        assert!((peak.delta_max - 0.243_141_321_840_279_15).abs() < 1e-9);
        // p = 0 is excluded, everything else is finite.
        assert_eq!(peak.evaluated, 20_000);
        assert!((peak.resolution - 2.5e-5).abs() < 1e-15);
    }

    #[test]
    fn test_argmax_over_full_unit_interval_agrees() {
        let half = argmax_delta(&CurveSpec::default(), SearchMethod::Grid).unwrap();
        let full = CurveSpec { p_lo: 0.0, p_hi: 1.0, samples: 40_001 };
        let whole = argmax_delta(&full, SearchMethod::Grid).unwrap();
        assert!((whole.p_max - half.p_max).abs() < 1e-9);
        // p = 0 and p = 1 both dropped.
        assert_eq!(whole.evaluated, 39_999);
    }

    #[test]
    fn test_golden_section_within_one_step_of_grid() {
        let spec = CurveSpec { samples: 201, ..CurveSpec::default() };
        let grid = argmax_delta(&spec, SearchMethod::Grid).unwrap();
        let golden = argmax_delta(&spec, SearchMethod::GoldenSection).unwrap();
        assert!((golden.p_max - grid.p_max).abs() <= spec.resolution());
        assert!(golden.delta_max >= grid.delta_max);
        // A dense grid lands on the same peak.
        let dense = argmax_delta(&CurveSpec::default(), SearchMethod::Grid).unwrap();
        assert!((golden.p_max - dense.p_max).abs() < 5e-5);
    }

    #[test]
    fn test_golden_section_on_parabola() {
        let (x, fx) = golden_section_max(|x| -(x - 0.3) * (x - 0.3), 0.0, 1.0, 1e-10);
        assert!((x - 0.3).abs() < 1e-8);
        assert!(fx.abs() < 1e-15);
    }

    #[test]
    fn test_ties_keep_first_sample() {
        let (p, v) = argmax_on(|_| 1.0, 0.0, 1.0, 11).unwrap();
        assert!((p - 0.1).abs() < 1e-15);
        assert_eq!(v, 1.0);
        let (p, _) = argmin_on(|_| 1.0, 0.2, 0.8, 4).unwrap();
        assert_eq!(p, 0.2);
    }

    #[test]
    fn test_all_nan_has_no_extremum() {
        assert!(argmax_on(|_| f64::NAN, 0.1, 0.9, 10).is_none());
        // Only boundary points: nothing left to evaluate.
        assert!(argmax_on(|x| x, 0.0, 1.0, 2).is_none());
    }

    #[test]
    fn test_invalid_curve_spec() {
        assert!(CurveSpec { p_lo: 0.5, p_hi: 0.2, samples: 10 }.validate().is_err());
        assert!(CurveSpec { p_lo: 0.0, p_hi: 1.5, samples: 10 }.validate().is_err());
        assert!(CurveSpec { samples: 2, ..CurveSpec::default() }.validate().is_err());
    }

    #[test]
    fn test_resolution_without_samples_does_not_underflow() {
        for samples in [0, 1] {
            let spec = CurveSpec { samples, ..CurveSpec::default() };
            assert_eq!(spec.resolution(), 0.5);
            assert!(spec.validate().is_err());
        }
    }

    #[test]
    fn test_smallest_valid_spec_keeps_one_interior_sample() {
        // [0, 1] with 3 points: both ends drop, p = 1/2 is always left.
        let spec = CurveSpec { p_lo: 0.0, p_hi: 1.0, samples: 3 };
        let peak = argmax_delta(&spec, SearchMethod::Grid).unwrap();
        assert_eq!(peak.evaluated, 1);
        assert_eq!(peak.p_max, 0.5);
        assert_eq!(sample_curve(&spec).unwrap().len(), 1);
    }

    #[test]
    fn test_spec_that_fails_validation_never_reaches_grid() {
        let spec = CurveSpec { p_lo: 0.0, p_hi: 1.0, samples: 2 };
        let err = argmax_delta(&spec, SearchMethod::Grid).unwrap_err();
        assert!(matches!(err, WindowError::InvalidConfig(_)));
        assert!(matches!(sample_curve(&spec).unwrap_err(), WindowError::InvalidConfig(_)));
    }

    #[test]
    fn test_sample_curve_drops_boundary() {
        let spec = CurveSpec { p_lo: 0.0, p_hi: 1.0, samples: 11 };
        let curve = sample_curve(&spec).unwrap();
        assert_eq!(curve.len(), 9);
        assert!(curve.iter().all(|s| s.p > 0.0 && s.p < 1.0 && s.delta.is_finite()));
        assert!(curve.windows(2).all(|w| w[0].p < w[1].p));
    }
}
