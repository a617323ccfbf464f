//! Trace extraction for the neuron figures.
//!
//! Each function maps one simulation run (plus the parameters that produced
//! it) to the chart series for a figure. They are pure: the controller keeps
//! the derived spike indices in its [`PlotUpdate`](super::PlotUpdate).

use crate::plot::controller::TraceInput;
use crate::plot::trace::{LineStyle, MarkerStyle, MarkerSymbol, Rgb, Trace, Visibility};

pub const POTENTIAL: &str = "u(t) (Membrane Potential)";
pub const ADAPTATION: &str = "w(t) (Adaptive Current)";
pub const OUTPUT_SPIKE: &str = "Output Spike";
pub const QIF_POTENTIAL: &str = "U(t)";
pub const QIF_CURRENT: &str = "I(t)";

fn potential(input: &TraceInput<'_>) -> Trace {
    Trace::line(
        POTENTIAL,
        input.result.time.clone(),
        input.result.state.clone(),
        LineStyle::solid(Rgb::GREEN),
    )
}

fn adaptation(input: &TraceInput<'_>) -> Trace {
    Trace::line(
        ADAPTATION,
        input.result.time.clone(),
        input.result.adaptation.clone(),
        LineStyle::dashed(Rgb::RED),
    )
}

/// Adaptation current behind the membrane potential.
pub fn adaptation_traces(input: &TraceInput<'_>) -> Vec<Trace> {
    vec![adaptation(input), potential(input)]
}

/// Potential, adaptation and output spike markers.
///
/// The adaptation trace is legend-only unless `show_adaptation` is on.
pub fn spike_response_traces(input: &TraceInput<'_>) -> Vec<Trace> {
    let visibility = if input.params.number_or("show_adaptation", 0.0) > 0.5 {
        Visibility::Visible
    } else {
        Visibility::LegendOnly
    };

    let spikes = input.result.spike_indices();
    let x = spikes.iter().map(|&i| input.result.time[i]).collect();
    let y = spikes.iter().map(|&i| input.result.state[i]).collect();

    vec![
        potential(input),
        adaptation(input).with_visibility(visibility),
        Trace::markers(
            OUTPUT_SPIKE,
            x,
            y,
            MarkerStyle {
                symbol: MarkerSymbol::Cross,
                color: Rgb::ORANGE,
                size: 8.0,
            },
        ),
    ]
}

/// QIF potential up to its first escape, and the injected current pulse.
pub fn qif_traces(input: &TraceInput<'_>) -> Vec<Trace> {
    let result = input.result;
    let end = result
        .spikes
        .iter()
        .position(|&s| s == 1)
        .unwrap_or(result.len());

    let mut potential = Trace::line(
        QIF_POTENTIAL,
        result.time[..end].to_vec(),
        result.state[..end].to_vec(),
        LineStyle::solid(Rgb::FOREST),
    );
    potential.line.width = 2.5;

    vec![
        potential,
        Trace::line(
            QIF_CURRENT,
            result.time.clone(),
            result.input.clone(),
            LineStyle::dashed(Rgb::PURPLE),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use crate::snn::{adlif, qif};

    #[test]
    fn test_adaptation_traces_order() {
        let params = Params::new().with("u0", 0.5);
        let result = adlif::simulate(&params);
        let traces = adaptation_traces(&TraceInput {
            params: &params,
            result: &result,
        });
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].name, ADAPTATION);
        assert!(traces[0].line.dashed);
        assert_eq!(traces[1].name, POTENTIAL);
        assert_eq!(traces[1].y, result.state);
        assert_eq!(traces[1].x.len(), 200);
    }

    #[test]
    fn test_spike_markers_follow_events() {
        let params = Params::new()
            .with("a", 0.0)
            .with("input_current", 3.0)
            .with("show_adaptation", 1.0);
        let result = adlif::simulate(&params);
        let traces = spike_response_traces(&TraceInput {
            params: &params,
            result: &result,
        });
        let markers = &traces[2];
        assert_eq!(markers.name, OUTPUT_SPIKE);
        assert_eq!(markers.x.len(), result.spike_count());
        assert_eq!(markers.x[0], 21.0);
        assert!(markers.y.iter().all(|&u| u == 0.0));
        assert!(traces[1].is_visible());
    }

    #[test]
    fn test_adaptation_hidden_by_default() {
        let params = Params::new().with("u0", 1.0);
        let result = adlif::simulate(&params);
        let traces = spike_response_traces(&TraceInput {
            params: &params,
            result: &result,
        });
        assert_eq!(traces[1].visibility, Visibility::LegendOnly);
        assert!(traces[2].x.is_empty());
    }

    #[test]
    fn test_qif_potential_stops_at_escape() {
        let params = Params::new().with("current", 0.3);
        let result = qif::simulate(&params);
        let traces = qif_traces(&TraceInput {
            params: &params,
            result: &result,
        });
        assert_eq!(traces[0].x.len(), 224);
        assert_eq!(traces[1].x.len(), result.len());
        assert!(traces[1].y.iter().any(|&i| i == 0.3));
    }
}
