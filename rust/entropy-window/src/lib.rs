/// RD9-weighted entropy window
///
/// Evaluates Δ(p) = H2(2p − p²) − H2(p), locates its maximizer p_max, and for
/// each β of a grid finds the largest α with
///
///   θ·m(γ, β) + (1−θ)·Δ(α) ≥ 0,   m(γ, β) = min_{p ∈ [γ, β]} Δ(p).
///
/// The α search runs on [α*, 1/2) where α* = (3 − √5)/2 is the interior zero
/// of Δ. Points without a threshold are flagged rather than dropped.

pub mod config;
pub mod entropy;
pub mod error;
pub mod export;
pub mod optimize;
pub mod sweep;
pub mod threshold;

pub use config::{GridSpec, WindowConfig};
pub use entropy::{delta, feasible, EntropyModel, Params, ALPHA_STAR};
pub use error::{Result, WindowError};
pub use optimize::{argmax_delta, CurveSample, CurveSpec, PeakEstimate, SearchMethod};
pub use sweep::{evaluate, sweep_beta, sweep_family, Evaluation, SweepPoint, SweepResult};
pub use threshold::{ThresholdSearch, ThresholdStatus};
