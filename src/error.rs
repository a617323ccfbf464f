//! Error types for spikeplots

use thiserror::Error;

/// Plot controller error type
#[derive(Debug, Error)]
pub enum PlotError {
    /// The chart surface is absent from the page. Not a fault: a figure may
    /// be registered on a page that does not host it.
    #[error("Chart surface '{0}' not found")]
    SurfaceMissing(String),

    /// A bound control or its display element is absent from the page.
    #[error("Control element '{element}' not found for plot '{plot}'")]
    ControlMissing { plot: String, element: String },

    /// `set_parameter` on a plot whose parameters are derived from controls.
    #[error("Plot '{0}' derives its parameters from controls; there is no static base to set")]
    DerivedParameters(String),
}

pub type Result<T> = std::result::Result<T, PlotError>;
