pub mod central;
pub mod inspector_panel;
pub mod log_panel;
pub mod top_bar;
