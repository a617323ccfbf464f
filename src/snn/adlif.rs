//! Adaptive leaky integrate-and-fire (AdLIF) neuron.
//!
//! Discrete-time model with a membrane potential `u` and an adaptation
//! current `w` that feeds back inhibitorily:
//!
//! ```text
//! û[t] = α·u[t-1] + (1-α)·(-w[t-1] + I) + w_in·x[t]
//! s[t] = û[t] > θ
//! u[t] = s[t] ? u_rest : û[t]
//! w[t] = β·w[t-1] + (1-β)·(a·u[t] + b·s[t])
//! ```
//!
//! `x[t]` is 1 at each forced input spike time. The loop starts at t = 1, so
//! no spike can occur at t = 0.

use crate::params::Params;
use crate::simulation::{MAX_STEPS, SimulationResult};
use serde::{Deserialize, Serialize};

/// AdLIF parameters with their documented defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdlifParams {
    /// Initial membrane potential.
    pub u0: f64,
    /// Number of time steps, including the initial sample.
    pub timesteps: usize,
    /// Membrane decay coefficient, in (0, 1].
    pub alpha: f64,
    /// Adaptation decay coefficient, in (0, 1].
    pub beta: f64,
    /// Subthreshold coupling of the potential into the adaptation current.
    pub a: f64,
    /// Spike-triggered adaptation increment.
    pub b: f64,
    /// Constant injected current.
    pub input_current: f64,
    /// Firing threshold (strict).
    pub threshold: f64,
    /// Potential the membrane snaps to after a spike.
    pub u_rest: f64,
    /// Steps at which an input spike is forced.
    pub spike_times: Vec<usize>,
    /// Weight of each forced input spike.
    pub w_in: f64,
}

impl Default for AdlifParams {
    fn default() -> Self {
        Self {
            u0: 0.0,
            timesteps: 200,
            alpha: 0.98,
            beta: 0.98,
            a: 20.0,
            b: 0.0,
            input_current: 0.0,
            threshold: 1.0,
            u_rest: 0.0,
            spike_times: Vec::new(),
            w_in: 0.0,
        }
    }
}

impl AdlifParams {
    /// Read parameters from a mapping, defaulting every missing key.
    pub fn from_params(params: &Params) -> Self {
        let defaults = Self::default();
        Self {
            u0: params.number_or("u0", defaults.u0),
            timesteps: step_count(params.number_or("timesteps", defaults.timesteps as f64)),
            alpha: params.number_or("alpha", defaults.alpha),
            beta: params.number_or("beta", defaults.beta),
            a: params.number_or("a", defaults.a),
            b: params.number_or("b", defaults.b),
            input_current: params.number_or("input_current", defaults.input_current),
            threshold: params.number_or("threshold", defaults.threshold),
            u_rest: params.number_or("u_rest", defaults.u_rest),
            spike_times: params
                .list_or_empty("spike_times")
                .iter()
                .filter(|t| t.is_finite() && **t >= 0.0)
                .map(|t| t.round() as usize)
                .collect(),
            w_in: params.number_or("w_in", defaults.w_in),
        }
    }

    /// Forced input at step `t`.
    fn forced_input(&self, t: usize) -> f64 {
        if self.spike_times.contains(&t) {
            self.w_in
        } else {
            0.0
        }
    }

    /// Run the recurrence.
    pub fn run(&self) -> SimulationResult {
        let len = self.timesteps.max(1);
        let mut result = SimulationResult::with_initial(self.u0, 0.0, len);

        let mut u = self.u0;
        let mut w = 0.0;
        for t in 1..self.timesteps {
            let x = self.forced_input(t);
            let u_hat = self.alpha * u + (1.0 - self.alpha) * (-w + self.input_current) + x;

            let spike = u8::from(u_hat > self.threshold);
            u = if spike == 1 { self.u_rest } else { u_hat };
            w = self.beta * w + (1.0 - self.beta) * (self.a * u + self.b * f64::from(spike));

            result.push(t as f64, u, w, spike, x);
        }
        result
    }
}

/// Simulation entry point for the plot controller.
pub fn simulate(params: &Params) -> SimulationResult {
    AdlifParams::from_params(params).run()
}

/// Non-finite or negative step counts collapse to zero; counts above
/// [`MAX_STEPS`] are clamped to it.
pub(crate) fn step_count(value: f64) -> usize {
    if !(value.is_finite() && value > 0.0) {
        return 0;
    }
    let steps = value.round();
    if steps > MAX_STEPS as f64 {
        log::warn!("Step count {value} exceeds {MAX_STEPS}; truncating");
        return MAX_STEPS;
    }
    steps as usize
}
