//! Rendering-surface seam between the controller and a chart backend.

use crate::plot::trace::{Layout, LayoutPatch, Trace};

/// A chart the controller can draw into.
pub trait RenderSurface {
    /// Replace all traces and the layout.
    fn replace(&mut self, traces: Vec<Trace>, layout: Layout);

    /// Adjust presentation only; data stays untouched.
    fn relayout(&mut self, patch: &LayoutPatch);

    /// Whether the surface currently holds rendered data.
    fn has_data(&self) -> bool;
}

/// Surface that keeps the latest render in memory.
///
/// Backs the viewer (painted with egui), the PNG exporter, and the tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    traces: Vec<Trace>,
    layout: Option<Layout>,
    replace_count: usize,
    relayout_count: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Trace by name.
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    /// Number of full renders received.
    pub fn replace_count(&self) -> usize {
        self.replace_count
    }

    /// Number of layout-only updates received.
    pub fn relayout_count(&self) -> usize {
        self.relayout_count
    }

    /// Whether anything has been rendered yet.
    pub fn has_data(&self) -> bool {
        self.layout.is_some()
    }
}

impl RenderSurface for RecordingSurface {
    fn replace(&mut self, traces: Vec<Trace>, layout: Layout) {
        self.traces = traces;
        self.layout = Some(layout);
        self.replace_count += 1;
    }

    fn relayout(&mut self, patch: &LayoutPatch) {
        if let Some(layout) = self.layout.as_mut() {
            layout.apply(patch);
        }
        self.relayout_count += 1;
    }

    fn has_data(&self) -> bool {
        RecordingSurface::has_data(self)
    }
}
