//! Interactive plotting: controller, page and surface seams, traces.

pub mod controller;
pub mod extract;
pub mod page;
pub mod surface;
pub mod trace;

pub use controller::{
    BaseParameters, ControlBinding, DeriveFn, InteractivePlot, PlotConfig, PlotUpdate, TraceFn,
    TraceInput,
};
pub use page::{Control, ControlKind, MemoryPage, Page, PageEvent};
pub use surface::{RecordingSurface, RenderSurface};
pub use trace::{Axis, Layout, LayoutPatch, Margin, Rgb, Trace, TraceMode, Visibility};
