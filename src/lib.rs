#![warn(clippy::all, rust_2018_idioms)]

//! Interactive spiking-neuron plots.
//!
//! Pure AdLIF and QIF simulations ([`snn`]) are bound to page controls by an
//! [`InteractivePlot`](plot::InteractivePlot) controller that re-renders a
//! chart surface whenever a control changes. The [`figures`] module holds
//! the concrete figures; [`app`] hosts them in a native viewer and
//! [`export`] renders them to PNG.

pub mod app;
pub mod error;
pub mod export;
pub mod figures;
pub mod params;
pub mod plot;
pub mod simulation;
pub mod snn;
mod ui;

pub use app::ViewerApp;
pub use error::{PlotError, Result};
pub use params::{ParamValue, Params};
pub use simulation::{SimulationFn, SimulationResult};
