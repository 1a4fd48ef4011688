//! Step parameters: the knobs the driver can turn between ticks.

use crate::error::{EcoError, Result};
use crate::input::InputSource;
use serde::{Deserialize, Serialize};

/// Node activation function applied after the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activation {
    Tanh,
    Relu,
    /// `max(0, z - theta)`.
    ThresholdRelu { theta: f64 },
    Identity,
    /// Pick the single incoming contribution with the largest magnitude.
    MaxMagnitude,
}

impl Default for Activation {
    fn default() -> Self {
        Activation::Tanh
    }
}

impl Activation {
    /// Apply to a pre-activation sum. `MaxMagnitude` is resolved by the
    /// propagation loop, which sees the individual contributions; here it
    /// passes the value through.
    #[inline]
    pub fn apply(self, z: f64) -> f64 {
        match self {
            Activation::Tanh => z.tanh(),
            Activation::Relu => z.max(0.0),
            Activation::ThresholdRelu { theta } => (z - theta).max(0.0),
            Activation::Identity | Activation::MaxMagnitude => z,
        }
    }
}

/// How edge weights are squashed before they scale a source activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightTransform {
    Identity,
    Tanh,
}

impl Default for WeightTransform {
    fn default() -> Self {
        WeightTransform::Identity
    }
}

impl WeightTransform {
    #[inline]
    pub fn apply(self, w: f64) -> f64 {
        match self {
            WeightTransform::Identity => w,
            WeightTransform::Tanh => w.tanh(),
        }
    }
}

/// Per-tick stochastic weight update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightUpdate {
    /// `w += sigma·N(0,1) + mu·sign(w)`.
    Drift,
    /// Discretized Ornstein–Uhlenbeck pull towards `±|target|`, keeping
    /// each edge's current sign. `gamma` is the mean-reversion rate.
    MeanReverting {
        target: f64,
        #[serde(default = "default_gamma")]
        gamma: f64,
    },
}

impl Default for WeightUpdate {
    fn default() -> Self {
        WeightUpdate::Drift
    }
}

fn default_gamma() -> f64 {
    0.1
}

/// Parameter bundle consumed by every simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepParams {
    /// Signed drift magnitude in the default weight update.
    pub mu: f64,
    /// Noise magnitude for both weight-update modes.
    pub sigma: f64,
    /// Probability that a near-zero edge flips sign instead of being deleted.
    pub p_flip: f64,
    /// Activation magnitude an internal node must exceed to bridge.
    pub bridge_threshold: f64,
    /// Minimum ticks between two bridging events on the same node.
    pub cooldown_ticks: u64,
    /// Magnitude of the stabilizing feedback edges added by bridging.
    pub omega: f64,
    /// Edges with `|w|` below this are near-zero.
    pub epsilon_zero: f64,
    /// Number of driven input channels; must equal the graph's input count.
    pub input_channel_count: usize,
    pub input_source: InputSource,
    pub activation: Activation,
    pub weight_transform: WeightTransform,
    pub weight_update: WeightUpdate,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            mu: 0.0,
            sigma: 0.02,
            p_flip: 0.5,
            bridge_threshold: 0.9,
            cooldown_ticks: 10,
            omega: 0.05,
            epsilon_zero: 1e-3,
            input_channel_count: 3,
            input_source: InputSource::default(),
            activation: Activation::default(),
            weight_transform: WeightTransform::default(),
            weight_update: WeightUpdate::default(),
        }
    }
}

impl StepParams {
    /// Reject values that would make a step ill-defined.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.p_flip) {
            return Err(EcoError::out_of_range("p_flip", 0.0, 1.0, self.p_flip));
        }
        if !(self.epsilon_zero > 0.0) {
            return Err(EcoError::invalid_config(
                "epsilon_zero",
                self.epsilon_zero,
                "must be positive",
            ));
        }
        if !(self.sigma >= 0.0) {
            return Err(EcoError::invalid_config("sigma", self.sigma, "must be non-negative"));
        }
        if !(self.omega >= 0.0) {
            return Err(EcoError::invalid_config("omega", self.omega, "must be non-negative"));
        }
        if !self.mu.is_finite() {
            return Err(EcoError::invalid_config("mu", self.mu, "must be finite"));
        }
        if self.bridge_threshold.is_nan() {
            return Err(EcoError::invalid_config(
                "bridge_threshold",
                self.bridge_threshold,
                "must be a number",
            ));
        }
        if self.input_channel_count < 1 {
            return Err(EcoError::invalid_config(
                "input_channel_count",
                self.input_channel_count,
                "must be at least 1",
            ));
        }
        if let WeightUpdate::MeanReverting { target, gamma } = self.weight_update {
            if !(gamma > 0.0) {
                return Err(EcoError::invalid_config("gamma", gamma, "must be positive"));
            }
            if !target.is_finite() {
                return Err(EcoError::invalid_config("target", target, "must be finite"));
            }
        }
        if let Activation::ThresholdRelu { theta } = self.activation {
            if !theta.is_finite() {
                return Err(EcoError::invalid_config("theta", theta, "must be finite"));
            }
        }
        Ok(())
    }
}
