//! Interactive plot controller.
//!
//! Binds page controls to a simulation function and a trace-extraction
//! function and keeps one chart surface in sync with the controls:
//!
//! ```text
//! control change → read controls → resolve parameters → simulate
//!                → extract traces → replace surface → notify observers
//! ```
//!
//! A controller is created once per chart and lives as long as its page.

use crate::error::{PlotError, Result};
use crate::params::{ParamValue, Params};
use crate::plot::page::{Page, PageEvent};
use crate::plot::trace::{Layout, Trace};
use crate::simulation::{SimulationFn, SimulationResult};

/// Parameters and simulation output handed to trace extraction.
#[derive(Clone, Copy, Debug)]
pub struct TraceInput<'a> {
    pub params: &'a Params,
    pub result: &'a SimulationResult,
}

/// Pure mapping from a simulation run to renderable traces.
pub type TraceFn = fn(&TraceInput<'_>) -> Vec<Trace>;

/// Derives a full parameter set from the current control values.
pub type DeriveFn = fn(&Params) -> Params;

/// Where a plot's simulation parameters come from.
#[derive(Clone, Debug)]
pub enum BaseParameters {
    /// Fixed base; control values are overlaid on top.
    Static(Params),
    /// Computed from the control values alone.
    Derived(DeriveFn),
}

impl Default for BaseParameters {
    fn default() -> Self {
        Self::Static(Params::new())
    }
}

/// One control bound to one parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlBinding {
    pub control: String,
    pub param: String,
    /// Text element mirroring the control value.
    pub display: Option<String>,
}

impl ControlBinding {
    pub fn new(control: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            param: param.into(),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// Everything needed to construct an [`InteractivePlot`].
#[derive(Clone, Debug)]
pub struct PlotConfig {
    pub surface: String,
    pub controls: Vec<ControlBinding>,
    pub simulate: SimulationFn,
    pub traces: TraceFn,
    pub layout: Layout,
    pub base: BaseParameters,
}

/// What observers receive at the end of every recompute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotUpdate {
    /// Resolved parameters the simulation ran with.
    pub params: Params,
    /// Steps at which the neuron spiked.
    pub spike_indices: Vec<usize>,
    /// Steps that received forced input.
    pub input_indices: Vec<usize>,
}

type Observer = Box<dyn FnMut(&PlotUpdate)>;

/// Live binding between a set of controls and one chart.
pub struct InteractivePlot {
    surface: String,
    bindings: Vec<ControlBinding>,
    simulate: SimulationFn,
    traces: TraceFn,
    layout: Layout,
    base: BaseParameters,
    observers: Vec<Observer>,
    last_update: Option<PlotUpdate>,
}

impl std::fmt::Debug for InteractivePlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractivePlot")
            .field("surface", &self.surface)
            .field("bindings", &self.bindings)
            .field("base", &self.base)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl InteractivePlot {
    /// Create a plot and render it once.
    ///
    /// Returns `None` when the page lacks the chart surface (silently) or a
    /// bound control or display element (logged as an error). Either way the
    /// rest of the page keeps working.
    pub fn new(page: &mut dyn Page, config: PlotConfig) -> Option<Self> {
        match Self::try_new(page, config) {
            Ok(plot) => Some(plot),
            Err(PlotError::SurfaceMissing(surface)) => {
                log::debug!("No chart surface '{surface}' on this page; skipping plot");
                None
            }
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }

    /// Like [`InteractivePlot::new`], reporting why construction failed.
    pub fn try_new(page: &mut dyn Page, config: PlotConfig) -> Result<Self> {
        if page.surface_mut(&config.surface).is_none() {
            return Err(PlotError::SurfaceMissing(config.surface));
        }

        for binding in &config.controls {
            let missing = if page.control_value(&binding.control).is_none() {
                Some(&binding.control)
            } else {
                binding.display.as_ref().filter(|id| !page.has_element(id))
            };
            if let Some(element) = missing {
                return Err(PlotError::ControlMissing {
                    plot: config.surface.clone(),
                    element: element.clone(),
                });
            }
        }

        let mut plot = Self {
            surface: config.surface,
            bindings: config.controls,
            simulate: config.simulate,
            traces: config.traces,
            layout: config.layout,
            base: config.base,
            observers: Vec::new(),
            last_update: None,
        };
        plot.recompute(page);
        Ok(plot)
    }

    pub fn surface_id(&self) -> &str {
        &self.surface
    }

    pub fn bindings(&self) -> &[ControlBinding] {
        &self.bindings
    }

    /// Whether `control` drives this plot.
    pub fn binds(&self, control: &str) -> bool {
        self.bindings.iter().any(|b| b.control == control)
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.base, BaseParameters::Derived(_))
    }

    /// Result of the most recent recompute.
    pub fn last_update(&self) -> Option<&PlotUpdate> {
        self.last_update.as_ref()
    }

    /// Current control values keyed by parameter name.
    fn read_controls(&self, page: &dyn Page) -> Params {
        self.bindings
            .iter()
            .filter_map(|b| {
                page.control_value(&b.control)
                    .map(|value| (b.param.clone(), value))
            })
            .collect()
    }

    fn resolve(&self, controls: &Params) -> Params {
        match &self.base {
            BaseParameters::Static(base) => {
                let mut params = base.clone();
                params.overlay(controls);
                params
            }
            BaseParameters::Derived(derive) => derive(controls),
        }
    }

    /// Resolved parameters for the current control values. No side effects.
    pub fn parameters(&self, page: &dyn Page) -> Params {
        self.resolve(&self.read_controls(page))
    }

    /// Re-read controls, re-simulate, re-render and notify observers.
    pub fn recompute(&mut self, page: &mut dyn Page) {
        for binding in &self.bindings {
            if let (Some(display), Some(value)) =
                (&binding.display, page.control_value(&binding.control))
            {
                page.set_text(display, format!("{value:.2}"));
            }
        }

        let params = self.parameters(page);
        let result = (self.simulate)(&params);
        let traces = (self.traces)(&TraceInput {
            params: &params,
            result: &result,
        });

        let layout = self.layout.responsive(page.viewport_width());
        match page.surface_mut(&self.surface) {
            Some(surface) => surface.replace(traces, layout),
            None => log::debug!("Chart surface '{}' disappeared; render skipped", self.surface),
        }

        let update = PlotUpdate {
            params,
            spike_indices: result.spike_indices(),
            input_indices: result.input_indices(),
        };
        for observer in &mut self.observers {
            observer(&update);
        }
        self.last_update = Some(update);
    }

    /// Overwrite one entry of the static base parameters.
    ///
    /// Plots with derived parameters have no base to write into: the call
    /// logs an error and changes nothing.
    pub fn set_parameter(&mut self, key: &str, value: impl Into<ParamValue>) -> Result<()> {
        match &mut self.base {
            BaseParameters::Static(base) => {
                base.set(key, value);
                Ok(())
            }
            BaseParameters::Derived(_) => {
                let err = PlotError::DerivedParameters(self.surface.clone());
                log::error!("{err}");
                Err(err)
            }
        }
    }

    /// Register an observer called with every update.
    pub fn on_update(&mut self, callback: impl FnMut(&PlotUpdate) + 'static) {
        self.observers.push(Box::new(callback));
    }

    /// React to a page event. Returns whether the plot responded.
    pub fn handle_event(&mut self, page: &mut dyn Page, event: &PageEvent) -> bool {
        match event {
            PageEvent::Input { control } if self.binds(control) => {
                self.recompute(page);
                true
            }
            PageEvent::Input { .. } => false,
            PageEvent::Resize => {
                let patch = self.layout.patch_for(page.viewport_width());
                match page.surface_mut(&self.surface) {
                    Some(surface) if surface.has_data() => {
                        surface.relayout(&patch);
                        true
                    }
                    _ => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::page::{Control, MemoryPage};
    use crate::plot::trace::{LineStyle, Rgb};
    use crate::snn::adlif;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn potential_trace(input: &TraceInput<'_>) -> Vec<Trace> {
        vec![Trace::line(
            "u",
            input.result.time.clone(),
            input.result.state.clone(),
            LineStyle::solid(Rgb::GREEN),
        )]
    }

    fn page() -> MemoryPage {
        let mut page = MemoryPage::new();
        page.add_surface("plot2");
        page.add_control("beta_slider", Control::slider("β", 0.8, 1.0, 0.001, 0.98));
        page.add_control("a_slider", Control::slider("a", 0.0, 100.0, 1.0, 20.0));
        page.add_text("beta_value");
        page.add_text("a_value");
        page
    }

    fn config() -> PlotConfig {
        PlotConfig {
            surface: "plot2".to_owned(),
            controls: vec![
                ControlBinding::new("beta_slider", "beta").with_display("beta_value"),
                ControlBinding::new("a_slider", "a").with_display("a_value"),
            ],
            simulate: adlif::simulate,
            traces: potential_trace,
            layout: Layout {
                title: "Adaptation".to_owned(),
                ..Default::default()
            },
            base: BaseParameters::Static(Params::new().with("u0", 1.0).with("b", 0.0)),
        }
    }

    fn doubled_a(controls: &Params) -> Params {
        let mut params = controls.clone();
        params.set("a", controls.number_or("a", 0.0) * 2.0);
        params.set("u0", 1.0);
        params
    }

    #[test]
    fn test_construction_renders_once() {
        let mut page = page();
        let plot = InteractivePlot::new(&mut page, config()).unwrap();
        let surface = page.surface("plot2").unwrap();
        assert_eq!(surface.replace_count(), 1);
        assert_eq!(surface.traces()[0].y.len(), 200);
        assert_eq!(page.text("beta_value"), Some("0.98"));
        assert_eq!(page.text("a_value"), Some("20.00"));
        assert!(plot.last_update().is_some());
    }

    #[test]
    fn test_missing_surface_aborts_quietly() {
        let mut page = page();
        let config = PlotConfig {
            surface: "elsewhere".to_owned(),
            ..config()
        };
        assert!(matches!(
            InteractivePlot::try_new(&mut page, config.clone()),
            Err(PlotError::SurfaceMissing(_))
        ));
        assert!(InteractivePlot::new(&mut page, config).is_none());
    }

    #[test]
    fn test_missing_control_or_display_aborts() {
        let mut page = page();
        let mut bad_control = config();
        bad_control.controls.push(ControlBinding::new("freq_slider", "frequency"));
        match InteractivePlot::try_new(&mut page, bad_control) {
            Err(PlotError::ControlMissing { element, .. }) => assert_eq!(element, "freq_slider"),
            other => panic!("unexpected: {other:?}"),
        }

        let mut bad_display = config();
        bad_display.controls[0].display = Some("gone".to_owned());
        assert!(InteractivePlot::new(&mut page, bad_display).is_none());
        assert_eq!(page.surface("plot2").unwrap().replace_count(), 0);
    }

    #[test]
    fn test_one_failed_plot_leaves_others_working() {
        let mut page = page();
        page.add_surface("plot1");
        let broken = PlotConfig {
            surface: "plot1".to_owned(),
            controls: vec![ControlBinding::new("u0_slider", "u0")],
            ..config()
        };
        assert!(InteractivePlot::new(&mut page, broken).is_none());
        assert!(InteractivePlot::new(&mut page, config()).is_some());
        assert!(page.surface("plot2").unwrap().has_data());
    }

    #[test]
    fn test_static_merge_overlays_controls() {
        let mut page = page();
        let plot = InteractivePlot::new(&mut page, config()).unwrap();
        let params = plot.parameters(&page);
        assert_eq!(params.number("u0"), Some(1.0));
        assert_eq!(params.number("beta"), Some(0.98));
        assert_eq!(params.number("a"), Some(20.0));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_parameters_is_pure_and_tracks_one_control() {
        let mut page = page();
        let plot = InteractivePlot::new(&mut page, config()).unwrap();
        let first = plot.parameters(&page);
        assert_eq!(first, plot.parameters(&page));
        assert_eq!(page.surface("plot2").unwrap().replace_count(), 1);

        page.set_control_value("a_slider", 55.0);
        let second = plot.parameters(&page);
        for (key, value) in first.iter() {
            if key == "a" {
                assert_eq!(second.number("a"), Some(55.0));
            } else {
                assert_eq!(second.get(key), Some(value), "{key}");
            }
        }
        assert_eq!(second.len(), first.len());
    }

    #[test]
    fn test_derived_parameters() {
        let mut page = page();
        let mut plot = InteractivePlot::new(
            &mut page,
            PlotConfig {
                base: BaseParameters::Derived(doubled_a),
                ..config()
            },
        )
        .unwrap();
        let params = plot.parameters(&page);
        assert_eq!(params.number("a"), Some(40.0));
        assert_eq!(params.number("u0"), Some(1.0));
        assert!(plot.is_derived());

        assert!(matches!(
            plot.set_parameter("a", 3.0),
            Err(PlotError::DerivedParameters(_))
        ));
        assert_eq!(plot.parameters(&page), params);
    }

    #[test]
    fn test_set_parameter_changes_static_base() {
        let mut page = page();
        let mut plot = InteractivePlot::new(&mut page, config()).unwrap();
        plot.set_parameter("spike_times", vec![60.0]).unwrap();
        plot.set_parameter("w_in", 0.4).unwrap();
        plot.recompute(&mut page);
        assert_eq!(plot.last_update().unwrap().input_indices, vec![60]);
    }

    #[test]
    fn test_control_overrides_base_entry_of_same_name() {
        let mut page = page();
        let mut plot = InteractivePlot::new(&mut page, config()).unwrap();
        plot.set_parameter("a", 1.0).unwrap();
        assert_eq!(plot.parameters(&page).number("a"), Some(20.0));
    }

    #[test]
    fn test_observers_called_once_with_same_params() {
        let mut page = page();
        let mut plot = InteractivePlot::new(&mut page, config()).unwrap();
        let seen: Rc<RefCell<Vec<(usize, Params)>>> = Rc::default();
        for id in 0..3 {
            let seen = Rc::clone(&seen);
            plot.on_update(move |update| seen.borrow_mut().push((id, update.params.clone())));
        }

        plot.recompute(&mut page);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(seen.iter().all(|(_, p)| *p == seen[0].1));
        assert_eq!(seen[0].1, plot.parameters(&page));
    }

    #[test]
    fn test_input_event_recomputes_and_replaces() {
        let mut page = page();
        let mut plot = InteractivePlot::new(&mut page, config()).unwrap();
        let before = page.surface("plot2").unwrap().traces().to_vec();

        page.set_control_value("a_slider", 80.0);
        assert!(plot.handle_event(&mut page, &PageEvent::input("a_slider")));
        let surface = page.surface("plot2").unwrap();
        assert_eq!(surface.replace_count(), 2);
        assert_eq!(surface.traces().len(), 1);
        assert_ne!(surface.traces()[0].y, before[0].y);
        assert_eq!(page.text("a_value"), Some("80.00"));

        assert!(!plot.handle_event(&mut page, &PageEvent::input("frequency_slider_4")));
        assert_eq!(page.surface("plot2").unwrap().replace_count(), 2);
    }

    #[test]
    fn test_resize_relayouts_without_resimulating() {
        let mut page = page();
        let mut plot = InteractivePlot::new(&mut page, config()).unwrap();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        plot.on_update(move |_| *counter.borrow_mut() += 1);

        page.set_viewport_width(480.0);
        assert!(plot.handle_event(&mut page, &PageEvent::Resize));
        let surface = page.surface("plot2").unwrap();
        assert_eq!(surface.replace_count(), 1);
        assert_eq!(surface.relayout_count(), 1);
        let layout = surface.layout().unwrap();
        assert!(layout.title.is_empty());
        assert!(!layout.show_legend);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_resize_ignores_surface_without_data() {
        let mut page = page();
        let mut plot = InteractivePlot::new(&mut page, config()).unwrap();

        // Same elements, nothing rendered yet.
        let mut blank = self::page();
        blank.set_viewport_width(480.0);
        assert!(!plot.handle_event(&mut blank, &PageEvent::Resize));
        let surface = blank.surface("plot2").unwrap();
        assert_eq!(surface.relayout_count(), 0);
        assert!(surface.layout().is_none());

        let mut empty = MemoryPage::new();
        assert!(!plot.handle_event(&mut empty, &PageEvent::Resize));
    }

    #[test]
    fn test_narrow_viewport_layout_on_recompute() {
        let mut page = page();
        page.set_viewport_width(600.0);
        InteractivePlot::new(&mut page, config()).unwrap();
        let layout = page.surface("plot2").unwrap().layout().unwrap();
        assert!(layout.title.is_empty());

        page.set_viewport_width(1024.0);
        let mut plot = InteractivePlot::new(&mut page, config()).unwrap();
        plot.recompute(&mut page);
        assert_eq!(page.surface("plot2").unwrap().layout().unwrap().title, "Adaptation");
    }
}
