//! Single-neuron models.

pub mod adlif;
pub mod qif;

pub use adlif::AdlifParams;
pub use qif::QifParams;
