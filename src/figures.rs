//! The interactive neuron figures.
//!
//! Each figure is a preset: the controls it needs on the page, the
//! [`PlotConfig`] for its controller, and, for the spike-response figures,
//! a spike input strip drawn under the chart.

use crate::params::Params;
use crate::plot::extract::{adaptation_traces, qif_traces, spike_response_traces};
use crate::plot::trace::{Axis, Layout, Margin};
use crate::plot::{BaseParameters, Control, ControlBinding, MemoryPage, PlotConfig};
use crate::snn::{adlif, qif};
use serde::{Deserialize, Serialize};

/// Step horizon of the AdLIF figures.
pub const ADLIF_STEPS: usize = 200;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FigureId {
    #[default]
    AdaptationDecay,
    AdaptationStrength,
    SpikeResponse,
    SpikeTrain,
    QifCurrent,
    QifInitial,
}

impl FigureId {
    pub const ALL: [FigureId; 6] = [
        FigureId::AdaptationDecay,
        FigureId::AdaptationStrength,
        FigureId::SpikeResponse,
        FigureId::SpikeTrain,
        FigureId::QifCurrent,
        FigureId::QifInitial,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FigureId::AdaptationDecay => "AdLIF: initial potential",
            FigureId::AdaptationStrength => "AdLIF: adaptation strength",
            FigureId::SpikeResponse => "AdLIF: single input spike",
            FigureId::SpikeTrain => "AdLIF: input spike train",
            FigureId::QifCurrent => "QIF: injected current",
            FigureId::QifInitial => "QIF: initial potential",
        }
    }

    /// Chart surface id, also used as the export file stem.
    pub fn surface_id(self) -> &'static str {
        match self {
            FigureId::AdaptationDecay => "plot",
            FigureId::AdaptationStrength => "plot2",
            FigureId::SpikeResponse => "plot3",
            FigureId::SpikeTrain => "plot4",
            FigureId::QifCurrent => "qif-interactive-plot",
            FigureId::QifInitial => "qif-potential-plot",
        }
    }

    pub fn from_surface_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.surface_id() == id)
    }

    pub fn figure(self) -> Figure {
        match self {
            FigureId::AdaptationDecay => adaptation_decay(),
            FigureId::AdaptationStrength => adaptation_strength(),
            FigureId::SpikeResponse => spike_response(),
            FigureId::SpikeTrain => spike_train_figure(),
            FigureId::QifCurrent => qif_current(),
            FigureId::QifInitial => qif_initial(),
        }
    }
}

/// A page control together with its binding.
#[derive(Clone, Debug)]
pub struct ControlSpec {
    pub id: &'static str,
    pub control: Control,
    pub binding: ControlBinding,
}

impl ControlSpec {
    fn new(id: &'static str, param: &str, control: Control) -> Self {
        Self {
            id,
            control,
            binding: ControlBinding::new(id, param),
        }
    }

    fn displayed(mut self, display: &str) -> Self {
        self.binding = self.binding.with_display(display);
        self
    }
}

/// Strip under a chart showing input spike times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpikeInput {
    /// Parameter holding the marker times.
    pub param: &'static str,
    /// Whether dragging in the strip moves the (single) input spike.
    pub editable: bool,
    /// Toggle control whose off state greys the markers out.
    pub enabled_control: Option<&'static str>,
    pub steps: usize,
}

#[derive(Clone, Debug)]
pub struct Figure {
    pub id: FigureId,
    pub controls: Vec<ControlSpec>,
    pub config: PlotConfig,
    pub spike_input: Option<SpikeInput>,
}

/// Add every figure's surface, controls and displays to the page.
pub fn install(page: &mut MemoryPage, figures: &[Figure]) {
    for figure in figures {
        page.add_surface(figure.config.surface.clone());
        for spec in &figure.controls {
            page.add_control(spec.id, spec.control.clone());
            if let Some(display) = &spec.binding.display {
                page.add_text(display.clone());
            }
        }
    }
}

/// All figures, in display order.
pub fn all() -> Vec<Figure> {
    FigureId::ALL.into_iter().map(FigureId::figure).collect()
}

// ============================================================================
// Input helpers
// ============================================================================

/// Input spike times for a train of `frequency` bursts over `steps`.
///
/// Burst onsets are spaced `steps / frequency` apart, starting one interval
/// in; each onset `t` expands to the triplet `t, t + 2, t + 4`.
pub fn spike_train(frequency: f64, steps: usize) -> Vec<f64> {
    if frequency.is_nan() || frequency <= 0.0 {
        return Vec::new();
    }
    let interval = steps as f64 / frequency;
    let mut onsets = Vec::new();
    let mut t = interval;
    while t < steps as f64 {
        onsets.push(t.round());
        t += interval;
    }
    onsets
        .into_iter()
        .flat_map(|t| [t, t + 2.0, t + 4.0])
        .collect()
}

/// Map a pointer x position inside a strip to a step index in `[0, steps - 1]`.
pub fn step_at(pointer_x: f32, left: f32, width: f32, steps: usize) -> usize {
    if width <= 0.0 || steps == 0 {
        return 0;
    }
    let fraction = f64::from((pointer_x - left) / width);
    let step = (fraction * steps as f64).round();
    step.clamp(0.0, (steps - 1) as f64) as usize
}

// ============================================================================
// Presets
// ============================================================================

fn adlif_layout(y_min: f64, y_max: f64) -> Layout {
    Layout {
        x_axis: Axis::new("Time (steps)"),
        y_axis: Axis::new("Value").with_range(y_min, y_max),
        ..Default::default()
    }
}

fn adaptation_decay() -> Figure {
    let id = FigureId::AdaptationDecay;
    Figure {
        id,
        controls: vec![ControlSpec::new(
            "u0_slider",
            "u0",
            Control::slider("u₀", 0.0, 1.5, 0.01, 0.5),
        )],
        config: PlotConfig {
            surface: id.surface_id().to_owned(),
            controls: Vec::new(),
            simulate: adlif::simulate,
            traces: adaptation_traces,
            layout: Layout {
                title: "Membrane potential and adaptation".to_owned(),
                ..adlif_layout(-0.5, 1.5)
            },
            base: BaseParameters::Static(
                Params::new()
                    .with("a", 20.0)
                    .with("b", 0.0)
                    .with("beta", 0.98)
                    .with("spike_times", Vec::<f64>::new())
                    .with("w_in", 0.0),
            ),
        },
        spike_input: None,
    }
    .bind_controls()
}

fn adaptation_strength() -> Figure {
    let id = FigureId::AdaptationStrength;
    Figure {
        id,
        controls: vec![
            ControlSpec::new("beta_slider", "beta", Control::slider("β", 0.9, 1.0, 0.001, 0.98))
                .displayed("beta_value"),
            ControlSpec::new("a_slider", "a", Control::slider("a", 0.0, 100.0, 1.0, 20.0))
                .displayed("a_value"),
        ],
        config: PlotConfig {
            surface: id.surface_id().to_owned(),
            controls: Vec::new(),
            simulate: adlif::simulate,
            traces: adaptation_traces,
            layout: Layout {
                title: "Adaptation strength".to_owned(),
                ..adlif_layout(-0.5, 2.0)
            },
            base: BaseParameters::Static(Params::new().with("u0", 1.0)),
        },
        spike_input: None,
    }
    .bind_controls()
}

fn spike_response() -> Figure {
    let id = FigureId::SpikeResponse;
    let mut layout = adlif_layout(-0.55, 1.0);
    layout.title = "Response to one input spike".to_owned();
    layout.x_axis = layout.x_axis.with_range(0.0, ADLIF_STEPS as f64);
    layout.margin = Margin {
        top: 0.0,
        ..Default::default()
    };

    Figure {
        id,
        controls: vec![ControlSpec::new(
            "show_adaptation_3",
            "show_adaptation",
            Control::toggle("Show w(t)", false),
        )],
        config: PlotConfig {
            surface: id.surface_id().to_owned(),
            controls: Vec::new(),
            simulate: adlif::simulate,
            traces: spike_response_traces,
            layout,
            base: BaseParameters::Static(
                Params::new()
                    .with("u0", 1.0)
                    .with("a", 20.0)
                    .with("b", 0.0)
                    .with("beta", 0.98)
                    .with("alpha", 0.98)
                    .with("spike_times", vec![120.0])
                    .with("w_in", 0.4),
            ),
        },
        spike_input: Some(SpikeInput {
            param: "spike_times",
            editable: true,
            enabled_control: None,
            steps: ADLIF_STEPS,
        }),
    }
    .bind_controls()
}

/// Parameters of the spike-train figure, derived from its controls.
fn spike_train_params(controls: &Params) -> Params {
    let all_spike_times = spike_train(controls.number_or("frequency", 0.0), ADLIF_STEPS);
    let enabled = controls.number_or("spikes_enabled", 1.0) > 0.5;

    let mut params = controls.clone();
    params.set("u0", 1.0);
    params.set("a", 55.0);
    params.set("b", 0.0);
    params.set("beta", 0.98);
    params.set("alpha", 0.98);
    params.set("w_in", 0.3);
    params.set(
        "spike_times",
        if enabled {
            all_spike_times.clone()
        } else {
            Vec::new()
        },
    );
    params.set("all_spike_times", all_spike_times);
    params
}

fn spike_train_figure() -> Figure {
    let id = FigureId::SpikeTrain;
    let mut layout = adlif_layout(-0.7, 1.0);
    layout.title = "Response to an input spike train".to_owned();
    layout.x_axis = layout.x_axis.with_range(0.0, ADLIF_STEPS as f64);
    layout.margin = Margin {
        top: 0.0,
        ..Default::default()
    };

    Figure {
        id,
        controls: vec![
            ControlSpec::new(
                "frequency_slider_4",
                "frequency",
                Control::slider("Frequency", 0.0, 10.0, 1.0, 3.0),
            )
            .displayed("frequency_value_4"),
            ControlSpec::new(
                "toggle_spikes_4",
                "spikes_enabled",
                Control::toggle("Input spikes", true),
            ),
            ControlSpec::new(
                "show_adaptation_4",
                "show_adaptation",
                Control::toggle("Show w(t)", false),
            ),
        ],
        config: PlotConfig {
            surface: id.surface_id().to_owned(),
            controls: Vec::new(),
            simulate: adlif::simulate,
            traces: spike_response_traces,
            layout,
            base: BaseParameters::Derived(spike_train_params),
        },
        spike_input: Some(SpikeInput {
            param: "all_spike_times",
            editable: false,
            enabled_control: Some("toggle_spikes_4"),
            steps: ADLIF_STEPS,
        }),
    }
    .bind_controls()
}

fn qif_layout(title: &str, t_max: f64, u_min: f64, u_max: f64) -> Layout {
    Layout {
        title: title.to_owned(),
        x_axis: Axis::new("Time").with_range(0.0, t_max),
        y_axis: Axis::new("Membrane Potential U").with_range(u_min, u_max),
        legend_anchor: [0.8, 0.95],
        margin: Margin {
            left: 60.0,
            right: 20.0,
            bottom: 60.0,
            top: 20.0,
        },
        ..Default::default()
    }
}

fn qif_current() -> Figure {
    let id = FigureId::QifCurrent;
    Figure {
        id,
        controls: vec![
            ControlSpec::new(
                "qif_current_slider",
                "current",
                Control::slider("I", 0.0, 0.5, 0.001, 0.25),
            )
            .displayed("qif_current_value"),
        ],
        config: PlotConfig {
            surface: id.surface_id().to_owned(),
            controls: Vec::new(),
            simulate: qif::simulate,
            traces: qif_traces,
            layout: qif_layout("QIF neuron with a current pulse", 100.0, -0.5, 3.0),
            base: BaseParameters::Static(
                Params::new()
                    .with("u0", 0.0)
                    .with("dt", 0.1)
                    .with("t_max", 100.0)
                    .with("current_start", 10.0)
                    .with("current_end", 30.0),
            ),
        },
        spike_input: None,
    }
    .bind_controls()
}

fn qif_initial() -> Figure {
    let id = FigureId::QifInitial;
    Figure {
        id,
        controls: vec![
            ControlSpec::new("qif_u0_slider", "u0", Control::slider("U₀", -0.3, 1.5, 0.01, 0.5))
                .displayed("qif_u0_value"),
        ],
        config: PlotConfig {
            surface: id.surface_id().to_owned(),
            controls: Vec::new(),
            simulate: qif::simulate,
            traces: qif_traces,
            layout: qif_layout("QIF neuron from an initial potential", 5.0, -0.5, 4.0),
            base: BaseParameters::Static(
                Params::new()
                    .with("dt", 0.01)
                    .with("t_max", 5.0)
                    .with("current", 0.0),
            ),
        },
        spike_input: None,
    }
    .bind_controls()
}

impl Figure {
    /// Copy the control specs' bindings into the plot config.
    fn bind_controls(mut self) -> Self {
        self.config.controls = self.controls.iter().map(|c| c.binding.clone()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::extract::OUTPUT_SPIKE;
    use crate::plot::{InteractivePlot, PageEvent};

    fn build(id: FigureId) -> (MemoryPage, InteractivePlot) {
        let figures = vec![id.figure()];
        let mut page = MemoryPage::new();
        install(&mut page, &figures);
        let plot = InteractivePlot::new(&mut page, figures[0].config.clone()).unwrap();
        (page, plot)
    }

    #[test]
    fn test_spike_train_generation() {
        assert!(spike_train(0.0, 200).is_empty());
        assert!(spike_train(1.0, 200).is_empty());
        assert!(spike_train(f64::NAN, 200).is_empty());
        assert_eq!(
            spike_train(3.0, 200),
            vec![67.0, 69.0, 71.0, 133.0, 135.0, 137.0]
        );
        assert_eq!(spike_train(4.0, 200).len(), 9);
    }

    #[test]
    fn test_step_at_maps_and_clamps() {
        assert_eq!(step_at(150.0, 100.0, 400.0, 200), 25);
        assert_eq!(step_at(100.0, 100.0, 400.0, 200), 0);
        assert_eq!(step_at(40.0, 100.0, 400.0, 200), 0);
        assert_eq!(step_at(500.0, 100.0, 400.0, 200), 199);
        assert_eq!(step_at(900.0, 100.0, 400.0, 200), 199);
        assert_eq!(step_at(120.0, 100.0, 0.0, 200), 0);
    }

    #[test]
    fn test_all_figures_build() {
        let figures = all();
        let mut page = MemoryPage::new();
        install(&mut page, &figures);
        for figure in &figures {
            assert!(
                InteractivePlot::new(&mut page, figure.config.clone()).is_some(),
                "{:?}",
                figure.id
            );
            assert!(page.surface(figure.id.surface_id()).unwrap().has_data());
        }
    }

    #[test]
    fn test_surface_ids_round_trip() {
        for id in FigureId::ALL {
            assert_eq!(FigureId::from_surface_id(id.surface_id()), Some(id));
        }
    }

    #[test]
    fn test_no_spikes_for_subthreshold_start() {
        let (mut page, mut plot) = build(FigureId::AdaptationDecay);
        for u0 in [0.0, 0.2, 0.5, 0.8, 1.0] {
            page.set_control_value("u0_slider", u0);
            plot.handle_event(&mut page, &PageEvent::input("u0_slider"));
            assert!(plot.last_update().unwrap().spike_indices.is_empty(), "u0 = {u0}");
        }
    }

    #[test]
    fn test_single_spike_figure() {
        let (page, plot) = build(FigureId::SpikeResponse);
        let update = plot.last_update().unwrap();
        assert_eq!(update.input_indices, vec![120]);
        assert!(update.spike_indices.is_empty());

        let surface = page.surface("plot3").unwrap();
        let u = &surface.traces()[0].y;
        assert!(u[120] - u[119] > 0.3);
        assert!(u[119] - u[118] < 0.01);
        assert!(surface.trace(OUTPUT_SPIKE).unwrap().x.is_empty());
    }

    #[test]
    fn test_dragging_moves_input_spike() {
        let (mut page, mut plot) = build(FigureId::SpikeResponse);
        let step = step_at(300.0, 0.0, 400.0, ADLIF_STEPS);
        plot.set_parameter("spike_times", vec![step as f64]).unwrap();
        plot.recompute(&mut page);
        assert_eq!(plot.last_update().unwrap().input_indices, vec![150]);
    }

    #[test]
    fn test_spike_train_toggle() {
        let (mut page, mut plot) = build(FigureId::SpikeTrain);
        let update = plot.last_update().unwrap();
        assert_eq!(update.input_indices, vec![67, 69, 71, 133, 135, 137]);
        assert_eq!(page.text("frequency_value_4"), Some("3.00"));

        page.set_control_value("toggle_spikes_4", 0.0);
        plot.handle_event(&mut page, &PageEvent::input("toggle_spikes_4"));
        let update = plot.last_update().unwrap();
        assert!(update.input_indices.is_empty());
        assert_eq!(update.params.list("all_spike_times").map(<[f64]>::len), Some(6));

        assert!(plot.set_parameter("a", 10.0).is_err());
    }

    #[test]
    fn test_spike_train_frequency_changes_only_derived_entries() {
        let (mut page, plot) = build(FigureId::SpikeTrain);
        let before = plot.parameters(&page);
        page.set_control_value("frequency_slider_4", 5.0);
        let after = plot.parameters(&page);
        assert_eq!(after.number("frequency"), Some(5.0));
        assert_eq!(after.number("a"), before.number("a"));
        assert_eq!(after.list("all_spike_times").map(<[f64]>::len), Some(12));
    }

    #[test]
    fn test_qif_figures_follow_sliders() {
        let (mut page, mut plot) = build(FigureId::QifCurrent);
        assert!(plot.last_update().unwrap().spike_indices.is_empty());
        page.set_control_value("qif_current_slider", 0.3);
        plot.handle_event(&mut page, &PageEvent::input("qif_current_slider"));
        assert_eq!(plot.last_update().unwrap().spike_indices, vec![224]);
        assert_eq!(page.text("qif_current_value"), Some("0.30"));

        let (mut page, mut plot) = build(FigureId::QifInitial);
        page.set_control_value("qif_u0_slider", 1.2);
        plot.handle_event(&mut page, &PageEvent::input("qif_u0_slider"));
        assert_eq!(plot.last_update().unwrap().spike_indices.len(), 1);
    }
}
