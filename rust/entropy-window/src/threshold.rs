//! Bracketed bisection for the largest α satisfying F(α) ≥ 0.
//!
//! The bracket is [α_lower, α_upper], by default [α*, 1/2 − 1e-6]. Δ is
//! strictly decreasing there, so F is non-increasing and the feasible set is
//! an initial segment of the bracket. Outcomes:
//!
//! - `Infeasible`: F(α_lower) < 0 (or NaN). α_max is NaN.
//! - `Saturated`: F(α_upper) ≥ 0. α_max is α_upper; no threshold in range.
//! - `Converged`: interval shrank below tolerance. α_max is its midpoint.
//! - `LowConfidence`: iteration budget ran out first. Midpoint returned.
//!
//! `EmptyWindow` is assigned by the sweep, never by the search itself.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Classification of a threshold search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStatus {
    Converged,
    Saturated,
    Infeasible,
    LowConfidence,
    /// The window [γ, β] was empty, so F is undefined.
    EmptyWindow,
}

impl ThresholdStatus {
    /// Whether α_max is a usable number.
    pub fn has_value(self) -> bool {
        !matches!(self, Self::Infeasible | Self::EmptyWindow)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::Saturated => "saturated",
            Self::Infeasible => "infeasible",
            Self::LowConfidence => "low_confidence",
            Self::EmptyWindow => "empty_window",
        }
    }
}

impl std::fmt::Display for ThresholdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one threshold search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSearch {
    pub alpha_max: f64,
    pub status: ThresholdStatus,
    pub iterations: u32,
    /// Width of the final bracket (0 when no bisection ran).
    pub width: f64,
}

impl ThresholdSearch {
    fn unbracketed(alpha_max: f64, status: ThresholdStatus) -> Self {
        Self {
            alpha_max,
            status,
            iterations: 0,
            width: 0.0,
        }
    }

    pub(crate) fn empty_window() -> Self {
        Self::unbracketed(f64::NAN, ThresholdStatus::EmptyWindow)
    }
}

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub lo: f64,
    pub hi: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

/// Find sup{α ∈ [lo, hi] : f(α) ≥ 0} for f non-increasing on the bracket.
pub fn find_threshold<F: Fn(f64) -> f64>(f: F, bracket: &Bracket) -> ThresholdSearch {
    let Bracket { lo, hi, tolerance, max_iterations } = *bracket;

    let f_lo = f(lo);
    if !(f_lo >= 0.0) {
        return ThresholdSearch::unbracketed(f64::NAN, ThresholdStatus::Infeasible);
    }
    if f(hi) >= 0.0 {
        return ThresholdSearch::unbracketed(hi, ThresholdStatus::Saturated);
    }

    // Invariant: f(lo) ≥ 0 > f(hi) (or f(hi) is NaN).
    let (mut lo, mut hi) = (lo, hi);
    for iteration in 1..=max_iterations {
        let mid = 0.5 * (lo + hi);
        let fm = f(mid);
        if fm == 0.0 || hi - lo < tolerance {
            return ThresholdSearch {
                alpha_max: mid,
                status: ThresholdStatus::Converged,
                iterations: iteration,
                width: hi - lo,
            };
        }
        if fm > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let width = hi - lo;
    warn!(
        width,
        tolerance,
        max_iterations,
        "Bisection exhausted its iteration budget; returning best estimate"
    );
    ThresholdSearch {
        alpha_max: 0.5 * (lo + hi),
        status: ThresholdStatus::LowConfidence,
        iterations: max_iterations,
        width,
    }
}
