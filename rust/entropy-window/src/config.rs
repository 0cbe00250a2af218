//! Run configuration.
//!
//! Every tunable of a run lives here and is passed explicitly; nothing is
//! read from globals. Missing TOML keys fall back to [`Default`].

use crate::entropy::{Params, ALPHA_STAR, DEFAULT_WINDOW_SAMPLES};
use crate::error::{check_unit_open, Result, WindowError};
use crate::optimize::{CurveSpec, SearchMethod};
use crate::threshold::Bracket;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// β values to sweep: `points` evenly spaced values on [beta_min, beta_max].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub beta_min: f64,
    pub beta_max: f64,
    pub points: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            beta_min: 0.14,
            beta_max: 0.40,
            points: 41,
        }
    }
}

impl GridSpec {
    pub fn new(beta_min: f64, beta_max: f64, points: usize) -> Result<Self> {
        let grid = Self { beta_min, beta_max, points };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_open("beta_min", self.beta_min)?;
        check_unit_open("beta_max", self.beta_max)?;
        if self.beta_min > self.beta_max {
            return Err(WindowError::InvalidConfig(format!(
                "beta_min {} exceeds beta_max {}",
                self.beta_min, self.beta_max
            )));
        }
        if self.points == 0 {
            return Err(WindowError::InvalidConfig("grid needs at least one point".into()));
        }
        if self.points == 1 && self.beta_min != self.beta_max {
            return Err(WindowError::InvalidConfig(format!(
                "a single grid point cannot span [{}, {}]",
                self.beta_min, self.beta_max
            )));
        }
        Ok(())
    }

    /// The β values, ascending, both ends included.
    pub fn betas(&self) -> Vec<f64> {
        crate::optimize::linspace(self.beta_min, self.beta_max, self.points)
    }
}

/// Configuration for a single evaluation and the β sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Weight on the RD-favourable class.
    pub theta: f64,
    /// Window floor.
    pub gamma: f64,
    /// Window ceiling for the single evaluation.
    pub beta: f64,

    /// Sampling of Δ(p) for p_max and the exported curve.
    pub curve: CurveSpec,
    pub search: SearchMethod,

    /// Samples for m(γ, β).
    pub window_samples: usize,

    /// α bracket for the threshold search.
    pub alpha_lower: f64,
    pub alpha_upper: f64,
    pub tolerance: f64,
    pub max_iterations: u32,

    pub grid: GridSpec,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            theta: 0.33,
            gamma: 0.16,
            beta: 0.34,
            curve: CurveSpec::default(),
            search: SearchMethod::Grid,
            window_samples: DEFAULT_WINDOW_SAMPLES,
            alpha_lower: ALPHA_STAR,
            alpha_upper: 0.499_999,
            tolerance: 1e-12,
            max_iterations: 200,
            grid: GridSpec::default(),
        }
    }
}

impl WindowConfig {
    /// Load from a TOML file. Absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| WindowError::ConfigRead {
            path: path.to_owned(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| WindowError::ConfigParse {
            path: path.to_owned(),
            source: e,
        })
    }

    pub fn params(&self) -> Result<Params> {
        Params::new(self.theta, self.gamma, self.beta)
    }

    pub fn bracket(&self) -> Bracket {
        Bracket {
            lo: self.alpha_lower,
            hi: self.alpha_upper,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }

    /// Checks the numeric knobs. θ, γ, β are checked where they are used so a
    /// sweep can reuse a config whose single-point β is irrelevant.
    pub fn validate(&self) -> Result<()> {
        self.curve.validate()?;
        if self.window_samples == 0 {
            return Err(WindowError::InvalidConfig("window_samples must be positive".into()));
        }
        if !(self.alpha_lower > 0.0 && self.alpha_lower < self.alpha_upper && self.alpha_upper < 1.0)
        {
            return Err(WindowError::InvalidConfig(format!(
                "alpha bracket [{}, {}] must satisfy 0 < lower < upper < 1",
                self.alpha_lower, self.alpha_upper
            )));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(WindowError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(WindowError::InvalidConfig("max_iterations must be positive".into()));
        }
        self.grid.validate()
    }
}
