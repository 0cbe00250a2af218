/// Closed-form pieces of the RD9-weighted entropy method.
///
///   H2(p)   = −p·log2 p − (1−p)·log2(1−p)        binary entropy
///   T(p)    = 2p − p²                              union map for one coordinate
///   Δ(p)    = H2(T(p)) − H2(p)
///   m(γ, β) = min_{p ∈ [γ, β] ∩ [0, 1/2]} Δ(p)
///   F(α)    = θ·m(γ, β) + (1−θ)·Δ(α)              feasible iff F(α) ≥ 0
///
/// Δ vanishes at α* = (3 − √5)/2, where T(α*) = 1 − α* and the two entropies
/// coincide by symmetry. Δ > 0 on (0, α*) and Δ < 0 on (α*, 1).

use crate::error::{check_unit_open, Result, WindowError};
use crate::optimize::argmin_on;
use serde::{Deserialize, Serialize};

/// α* = (3 − √5)/2 ≈ 0.3819660112501051.
pub const ALPHA_STAR: f64 = 0.381_966_011_250_105_1;

/// Default number of samples used for the window minimum.
pub const DEFAULT_WINDOW_SAMPLES: usize = 20_001;

/// Binary entropy in bits. Returns 0 at or beyond the endpoints.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
}

/// Union map p ↦ 2p − p².
#[inline]
pub fn union_map(p: f64) -> f64 {
    2.0 * p - p * p
}

/// Δ(p) = H2(T(p)) − H2(p).
///
/// Defined on the open interval only: returns NaN for p ∉ (0, 1) so callers
/// can tell a boundary sample from a genuine zero.
pub fn delta(p: f64) -> f64 {
    if !(p > 0.0 && p < 1.0) {
        return f64::NAN;
    }
    binary_entropy(union_map(p)) - binary_entropy(p)
}

/// Minimum of Δ over the window [γ, β], clamped to [0, 1/2].
pub fn window_minimum(gamma: f64, beta: f64, samples: usize) -> Result<f64> {
    let lo = gamma.max(0.0);
    let hi = beta.min(0.5);
    if !(hi >= lo) {
        return Err(WindowError::EmptyWindow { gamma, beta });
    }
    argmin_on(delta, lo, hi, samples)
        .map(|(_, value)| value)
        .ok_or(WindowError::NoFiniteSamples { what: "window [γ, β]" })
}

/// F(α) = θ·m + (1−θ)·Δ(α) for a precomputed window minimum m.
#[inline]
pub fn feasibility(alpha: f64, theta: f64, window_min: f64) -> f64 {
    theta * window_min + (1.0 - theta) * delta(alpha)
}

/// Whether the feasibility inequality holds at `alpha`.
///
/// Recomputes the window minimum on every call; loops should go through
/// [`EntropyModel::feasible`] instead.
pub fn feasible(alpha: f64, beta: f64, theta: f64, gamma: f64) -> Result<bool> {
    let model = EntropyModel::new(Params::new(theta, gamma, beta)?, DEFAULT_WINDOW_SAMPLES)?;
    Ok(model.feasible(alpha))
}

/// The parameter triple (θ, γ, β). Construction validates the domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Weight on the RD-favourable class.
    pub theta: f64,
    /// Floor of the window.
    pub gamma: f64,
    /// Ceiling of the window.
    pub beta: f64,
}

impl Params {
    pub fn new(theta: f64, gamma: f64, beta: f64) -> Result<Self> {
        let params = Self { theta, gamma, beta };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_open("theta", self.theta)?;
        check_unit_open("gamma", self.gamma)?;
        check_unit_open("beta", self.beta)?;
        Ok(())
    }
}

/// Validated parameters with the window minimum cached.
#[derive(Debug, Clone, Copy)]
pub struct EntropyModel {
    params: Params,
    window_min: f64,
}

impl EntropyModel {
    pub fn new(params: Params, window_samples: usize) -> Result<Self> {
        params.validate()?;
        let window_min = window_minimum(params.gamma, params.beta, window_samples)?;
        Ok(Self { params, window_min })
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Δ(p). Independent of the parameters.
    pub fn delta(&self, p: f64) -> f64 {
        delta(p)
    }

    /// Cached m(γ, β).
    pub fn window_minimum(&self) -> f64 {
        self.window_min
    }

    pub fn feasibility(&self, alpha: f64) -> f64 {
        feasibility(alpha, self.params.theta, self.window_min)
    }

    /// F(α) ≥ 0. NaN counts as infeasible.
    pub fn feasible(&self, alpha: f64) -> bool {
        self.feasibility(alpha) >= 0.0
    }
}
