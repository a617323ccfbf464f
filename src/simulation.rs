//! Simulation contract for single-neuron models.
//!
//! A simulation is a pure function from a [`Params`] set to a fixed-length,
//! multi-series time trace. Models live under [`crate::snn`]; this module
//! defines what they return and the function type the plot controller
//! accepts. Simulations take no randomness, no clock and no I/O, so two calls
//! with equal parameters produce equal results element for element.

use crate::params::Params;
use serde::{Deserialize, Serialize};

/// Simulation entry point accepted by the plot controller.
///
/// A plain `fn` pointer: it cannot capture mutable state, which keeps every
/// recomputation idempotent.
pub type SimulationFn = fn(&Params) -> SimulationResult;

/// Upper bound on the steps a single run records. Larger requests are
/// truncated to this length.
pub const MAX_STEPS: usize = 1_000_000;

// ============================================================================
// Simulation Result
// ============================================================================

/// Per-step output of a neuron simulation.
///
/// All series share one length. Index `i` is discrete step `i`; `time[i]`
/// holds the corresponding x-axis value (the step index itself for
/// step-based models, `i * dt` for integrated ones).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// X-axis value of each step.
    pub time: Vec<f64>,
    /// Membrane potential u(t).
    pub state: Vec<f64>,
    /// Adaptation current w(t); all zeros for models without adaptation.
    pub adaptation: Vec<f64>,
    /// Output spike indicator s(t), 0 or 1.
    pub spikes: Vec<u8>,
    /// Externally injected drive at each step (forced spikes or current).
    pub input: Vec<f64>,
}

impl SimulationResult {
    /// Result holding only the initial sample, with room for `len` steps.
    pub fn with_initial(u0: f64, t0: f64, len: usize) -> Self {
        let len = len.min(MAX_STEPS);
        let mut result = Self {
            time: Vec::with_capacity(len),
            state: Vec::with_capacity(len),
            adaptation: Vec::with_capacity(len),
            spikes: Vec::with_capacity(len),
            input: Vec::with_capacity(len),
        };
        result.push(t0, u0, 0.0, 0, 0.0);
        result
    }

    pub(crate) fn push(&mut self, time: f64, state: f64, adaptation: f64, spike: u8, input: f64) {
        self.time.push(time);
        self.state.push(state);
        self.adaptation.push(adaptation);
        self.spikes.push(spike);
        self.input.push(input);
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Step indices at which the neuron emitted a spike.
    pub fn spike_indices(&self) -> Vec<usize> {
        self.spikes
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == 1)
            .map(|(i, _)| i)
            .collect()
    }

    /// Step indices that received a nonzero external drive.
    pub fn input_indices(&self) -> Vec<usize> {
        self.input
            .iter()
            .enumerate()
            .filter(|&(_, &x)| x != 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Total spike count.
    pub fn spike_count(&self) -> usize {
        self.spikes.iter().filter(|&&s| s == 1).count()
    }

    /// Firing rate in spikes per step.
    pub fn firing_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.spike_count() as f64 / self.len() as f64
    }
}

// ============================================================================
// Tests
// ============================================================================
