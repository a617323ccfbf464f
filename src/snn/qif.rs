//! Quadratic integrate-and-fire (QIF) neuron.
//!
//! Forward-Euler integration of `dU/dt = U(U - 1) + I(t)`, where `I(t)` is a
//! rectangular current pulse. Without input, `U = 0` is a stable fixed point
//! and `U = 1` an unstable one: trajectories starting above 1 escape in
//! finite time. An escape is recorded as a spike when the potential reaches
//! `u_peak`, after which the potential restarts from `u_reset`.

use crate::params::Params;
use crate::simulation::{MAX_STEPS, SimulationResult};
use crate::snn::adlif::step_count;
use serde::{Deserialize, Serialize};

/// QIF parameters with their documented defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QifParams {
    /// Initial potential.
    pub u0: f64,
    /// Amplitude of the injected current pulse.
    pub current: f64,
    /// Pulse onset (time units).
    pub current_start: f64,
    /// Pulse end, inclusive (time units).
    pub current_end: f64,
    /// Integration step.
    pub dt: f64,
    /// Simulated duration.
    pub t_max: f64,
    /// Escape level counted as a spike.
    pub u_peak: f64,
    /// Potential after an escape.
    pub u_reset: f64,
}

impl Default for QifParams {
    fn default() -> Self {
        Self {
            u0: 0.0,
            current: 0.0,
            current_start: 10.0,
            current_end: 30.0,
            dt: 0.1,
            t_max: 100.0,
            u_peak: 10.0,
            u_reset: 0.0,
        }
    }
}

impl QifParams {
    /// Read parameters from a mapping, defaulting every missing key.
    pub fn from_params(params: &Params) -> Self {
        let defaults = Self::default();
        let dt = params.number_or("dt", defaults.dt);
        Self {
            u0: params.number_or("u0", defaults.u0),
            current: params.number_or("current", defaults.current),
            current_start: params.number_or("current_start", defaults.current_start),
            current_end: params.number_or("current_end", defaults.current_end),
            dt: if dt.is_finite() && dt > 0.0 { dt } else { defaults.dt },
            t_max: params.number_or("t_max", defaults.t_max),
            u_peak: params.number_or("u_peak", defaults.u_peak),
            u_reset: params.number_or("u_reset", defaults.u_reset),
        }
    }

    /// Number of samples, including the initial one.
    pub fn sample_count(&self) -> usize {
        step_count(self.t_max / self.dt).saturating_add(1).min(MAX_STEPS)
    }

    /// Injected current at time `t`.
    pub fn current_at(&self, t: f64) -> f64 {
        if t >= self.current_start && t <= self.current_end {
            self.current
        } else {
            0.0
        }
    }

    /// Integrate the model.
    pub fn run(&self) -> SimulationResult {
        let n = self.sample_count();
        let mut result = SimulationResult::with_initial(self.u0, 0.0, n);
        // Sample 0 reports the drive applied during the first step.
        result.input[0] = self.current_at(0.0);

        let mut u = self.u0;
        for i in 1..n {
            let t = (i - 1) as f64 * self.dt;
            let drive = self.current_at(t);
            let next = u + (u * (u - 1.0) + drive) * self.dt;

            let spike = u8::from(next >= self.u_peak);
            u = if spike == 1 { self.u_reset } else { next };
            result.push(i as f64 * self.dt, u, 0.0, spike, self.current_at(i as f64 * self.dt));
        }
        result
    }
}

/// Simulation entry point for the plot controller.
pub fn simulate(params: &Params) -> SimulationResult {
    QifParams::from_params(params).run()
}
