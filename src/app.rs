use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::{
    figures::{self, Figure, FigureId},
    plot::{InteractivePlot, MemoryPage, Page, PageEvent, PlotUpdate},
    ui::{central, inspector_panel, log_panel, top_bar},
};

/// Viewer state persisted between runs.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub(crate) selected: FigureId,
    /// Control values the user changed, by control id.
    pub(crate) control_values: BTreeMap<String, f64>,
    pub(crate) follow_logs: bool,
    /// Show only entries about the selected figure.
    pub(crate) logs_for_selected: bool,
    pub(crate) log_window_open: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            selected: FigureId::default(),
            control_values: BTreeMap::new(),
            follow_logs: true,
            logs_for_selected: false,
            log_window_open: false,
        }
    }
}

/// One figure and its controller. `plot` is `None` if construction failed.
pub(crate) struct FigureView {
    pub(crate) figure: Figure,
    pub(crate) plot: Option<InteractivePlot>,
}

/// Native host for the interactive figures.
pub struct ViewerApp {
    pub(crate) settings: AppSettings,
    pub(crate) page: MemoryPage,
    pub(crate) views: Vec<FigureView>,
    pub(crate) log_messages: Vec<String>,
    log_rx: Receiver<String>,
}

impl ViewerApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_settings(settings)
    }

    /// Build every figure on a fresh page, restoring saved control values.
    pub fn with_settings(settings: AppSettings) -> Self {
        let figures = figures::all();
        let mut page = MemoryPage::new();
        figures::install(&mut page, &figures);
        for (id, value) in &settings.control_values {
            if !page.set_control_value(id, *value) {
                log::warn!("Ignoring saved value for unknown control '{id}'");
            }
        }

        let (log_tx, log_rx) = channel();
        let views = figures
            .into_iter()
            .map(|figure| {
                let plot = InteractivePlot::new(&mut page, figure.config.clone()).map(|mut plot| {
                    attach_log_observer(&mut plot, figure.id, log_tx.clone());
                    plot
                });
                FigureView { figure, plot }
            })
            .collect();

        Self {
            settings,
            page,
            views,
            log_messages: vec![
                "Welcome to Spike Plots.".to_owned(),
                "Pick a figure in the top bar; move the sliders on the right.".to_owned(),
            ],
            log_rx,
        }
    }

    pub(crate) fn push_log(&mut self, message: impl Into<String>) {
        self.log_messages.push(message.into());
    }

    fn drain_plot_logs(&mut self) {
        while let Ok(message) = self.log_rx.try_recv() {
            self.log_messages.push(message);
        }
    }

    /// Log entries to show, honouring the selected-figure filter.
    pub(crate) fn visible_logs(&self) -> impl Iterator<Item = &str> {
        let prefix = self
            .settings
            .logs_for_selected
            .then(|| format!("{}:", self.settings.selected.label()));
        self.log_messages
            .iter()
            .map(String::as_str)
            .filter(move |m| prefix.as_deref().is_none_or(|p| m.starts_with(p)))
    }

    pub(crate) fn selected_view(&self) -> Option<&FigureView> {
        self.views
            .iter()
            .find(|view| view.figure.id == self.settings.selected)
    }

    /// Forward an event to every live plot.
    pub(crate) fn dispatch(&mut self, event: &PageEvent) {
        for view in &mut self.views {
            if let Some(plot) = view.plot.as_mut() {
                plot.handle_event(&mut self.page, event);
            }
        }
    }

    /// Change a control the way user input would.
    pub(crate) fn set_control(&mut self, id: &str, value: f64) {
        if !self.page.set_control_value(id, value) {
            log::warn!("No control '{id}' on the page");
            return;
        }
        if let Some(value) = self.page.control(id).map(|c| c.value) {
            self.settings.control_values.insert(id.to_owned(), value);
        }
        self.dispatch(&PageEvent::input(id));
    }

    /// Put every control back to its preset value.
    pub(crate) fn reset_controls(&mut self) {
        let defaults: Vec<(&'static str, f64)> = self
            .views
            .iter()
            .flat_map(|view| view.figure.controls.iter())
            .map(|spec| (spec.id, spec.control.value))
            .collect();
        for (id, value) in defaults {
            self.set_control(id, value);
        }
        self.settings.control_values.clear();
        self.push_log("Controls reset");
    }

    /// Move the selected figure's single input spike to `step`.
    pub(crate) fn move_input_spike(&mut self, step: usize) {
        let selected = self.settings.selected;
        let Some(view) = self
            .views
            .iter_mut()
            .find(|view| view.figure.id == selected)
        else {
            return;
        };
        let Some(input) = view.figure.spike_input.as_ref().filter(|s| s.editable) else {
            return;
        };
        let Some(plot) = view.plot.as_mut() else {
            return;
        };

        let current = plot
            .last_update()
            .and_then(|u| u.params.list(input.param))
            .and_then(|times| times.first().copied());
        if current == Some(step as f64) {
            return;
        }
        if plot.set_parameter(input.param, vec![step as f64]).is_ok() {
            plot.recompute(&mut self.page);
        }
    }

    /// Relayout plots when the viewport width changes.
    pub(crate) fn set_viewport_width(&mut self, width: f32) {
        if (self.page.viewport_width() - width).abs() < 0.5 {
            return;
        }
        self.page.set_viewport_width(width);
        self.dispatch(&PageEvent::Resize);
    }
}

fn attach_log_observer(plot: &mut InteractivePlot, id: FigureId, tx: Sender<String>) {
    plot.on_update(move |update: &PlotUpdate| {
        let message = format!(
            "{}: {} output spike(s), {} forced input(s)",
            id.label(),
            update.spike_indices.len(),
            update.input_indices.len()
        );
        log::debug!("{message}");
        // The receiver lives as long as the app; a send error only means shutdown.
        let _ = tx.send(message);
    });
}

impl eframe::App for ViewerApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.set_viewport_width(ctx.screen_rect().width());
        self.drain_plot_logs();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            top_bar::top_toolbar(self, ui);
        });

        egui::SidePanel::right("inspector")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                inspector_panel::inspector(self, ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            central::central_view(self, ui);
        });

        let mut log_window_open = self.settings.log_window_open;
        egui::Window::new("Logs")
            .open(&mut log_window_open)
            .default_size(egui::vec2(520.0, 240.0))
            .vscroll(false)
            .show(ctx, |ui| {
                log_panel::log_panel(self, ui);
            });
        self.settings.log_window_open = log_window_open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> ViewerApp {
        ViewerApp::with_settings(AppSettings::default())
    }

    #[test]
    fn test_every_figure_gets_a_plot() {
        let app = app();
        assert_eq!(app.views.len(), FigureId::ALL.len());
        assert!(app.views.iter().all(|view| view.plot.is_some()));
    }

    #[test]
    fn test_set_control_updates_only_bound_plot() {
        let mut app = app();
        app.set_control("a_slider", 60.0);
        assert_eq!(app.page.surface("plot2").unwrap().replace_count(), 2);
        assert_eq!(app.page.surface("plot").unwrap().replace_count(), 1);
        assert_eq!(app.page.text("a_value"), Some("60.00"));
        assert_eq!(app.settings.control_values.get("a_slider"), Some(&60.0));

        app.drain_plot_logs();
        assert!(
            app.log_messages
                .iter()
                .any(|m| m.starts_with(FigureId::AdaptationStrength.label()))
        );
    }

    #[test]
    fn test_log_filter_keeps_selected_figure() {
        let mut app = app();
        app.set_control("a_slider", 60.0);
        app.set_control("qif_current_slider", 0.3);
        app.drain_plot_logs();
        let total = app.visible_logs().count();

        app.settings.logs_for_selected = true;
        app.settings.selected = FigureId::QifCurrent;
        let shown: Vec<&str> = app.visible_logs().collect();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].contains("1 output spike"));
        assert!(total > shown.len());
    }

    #[test]
    fn test_saved_values_are_restored() {
        let mut settings = AppSettings::default();
        settings.control_values.insert("frequency_slider_4".to_owned(), 5.0);
        settings.control_values.insert("retired_slider".to_owned(), 1.0);
        let app = ViewerApp::with_settings(settings);
        assert_eq!(app.page.text("frequency_value_4"), Some("5.00"));
    }

    #[test]
    fn test_drag_moves_spike_on_editable_figure_only() {
        let mut app = app();
        app.move_input_spike(80);
        let plot3 = |app: &ViewerApp| {
            app.views[2]
                .plot
                .as_ref()
                .and_then(|p| p.last_update())
                .map(|u| u.input_indices.clone())
        };
        assert_eq!(plot3(&app), Some(vec![120]));

        app.settings.selected = FigureId::SpikeResponse;
        app.move_input_spike(80);
        assert_eq!(plot3(&app), Some(vec![80]));
        let renders = app.page.surface("plot3").unwrap().replace_count();
        app.move_input_spike(80);
        assert_eq!(app.page.surface("plot3").unwrap().replace_count(), renders);
    }

    #[test]
    fn test_resize_relayouts_all_plots() {
        let mut app = app();
        app.set_viewport_width(500.0);
        for id in FigureId::ALL {
            let surface = app.page.surface(id.surface_id()).unwrap();
            assert_eq!(surface.relayout_count(), 1, "{id:?}");
            assert!(!surface.layout().unwrap().show_legend);
        }
        app.set_viewport_width(500.2);
        assert_eq!(app.page.surface("plot").unwrap().relayout_count(), 1);
    }

    #[test]
    fn test_reset_restores_presets() {
        let mut app = app();
        app.set_control("beta_slider", 0.95);
        app.reset_controls();
        assert_eq!(app.page.control("beta_slider").map(|c| c.value), Some(0.98));
        assert!(app.settings.control_values.is_empty());
    }

    #[test]
    fn test_settings_serde() {
        let mut settings = AppSettings::default();
        settings.selected = FigureId::QifCurrent;
        let json = serde_json::to_string(&settings).unwrap();
        let back: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
        let partial: AppSettings = serde_json::from_str(r#"{"selected":"SpikeTrain"}"#).unwrap();
        assert!(partial.follow_logs);
        assert_eq!(partial.selected, FigureId::SpikeTrain);
        let empty: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.selected, FigureId::AdaptationDecay);
    }
}
