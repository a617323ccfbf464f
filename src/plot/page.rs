//! Page abstraction: the controls, text displays and chart surfaces a plot
//! controller binds to.

use crate::plot::surface::{RecordingSurface, RenderSurface};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Element lookup and mutation the controller needs from its host page.
pub trait Page {
    /// Current numeric value of a control, or `None` if the page has no such
    /// control.
    fn control_value(&self, id: &str) -> Option<f64>;

    /// Whether a text display element exists.
    fn has_element(&self, id: &str) -> bool;

    /// Set the text of a display element. Unknown ids are ignored.
    fn set_text(&mut self, id: &str, text: String);

    /// Current viewport width in logical pixels.
    fn viewport_width(&self) -> f32;

    /// Chart surface by id.
    fn surface_mut(&mut self, id: &str) -> Option<&mut dyn RenderSurface>;
}

/// Events the page forwards to plot controllers.
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    /// A control's value changed.
    Input { control: String },
    /// The viewport was resized.
    Resize,
}

impl PageEvent {
    pub fn input(control: impl Into<String>) -> Self {
        Self::Input {
            control: control.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ControlKind {
    /// Bounded numeric range input.
    Slider { min: f64, max: f64, step: f64 },
    /// On/off switch, read as 1.0 or 0.0.
    Toggle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub label: String,
    pub kind: ControlKind,
    pub value: f64,
}

impl Control {
    pub fn slider(label: impl Into<String>, min: f64, max: f64, step: f64, value: f64) -> Self {
        let mut control = Self {
            label: label.into(),
            kind: ControlKind::Slider { min, max, step },
            value,
        };
        control.value = control.constrain(value);
        control
    }

    pub fn toggle(label: impl Into<String>, on: bool) -> Self {
        Self {
            label: label.into(),
            kind: ControlKind::Toggle,
            value: if on { 1.0 } else { 0.0 },
        }
    }

    pub fn is_on(&self) -> bool {
        self.value > 0.5
    }

    /// Clamp a slider value into its range; toggles snap to 0 or 1.
    pub fn constrain(&self, value: f64) -> f64 {
        match self.kind {
            ControlKind::Slider { min, max, .. } => {
                if value.is_nan() {
                    min
                } else {
                    value.clamp(min, max)
                }
            }
            ControlKind::Toggle => {
                if value > 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// In-memory page.
#[derive(Clone, Debug)]
pub struct MemoryPage {
    controls: BTreeMap<String, Control>,
    texts: BTreeMap<String, String>,
    surfaces: BTreeMap<String, RecordingSurface>,
    viewport_width: f32,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self {
            controls: BTreeMap::new(),
            texts: BTreeMap::new(),
            surfaces: BTreeMap::new(),
            viewport_width: 1280.0,
        }
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_control(&mut self, id: impl Into<String>, control: Control) {
        self.controls.insert(id.into(), control);
    }

    pub fn add_text(&mut self, id: impl Into<String>) {
        self.texts.insert(id.into(), String::new());
    }

    pub fn add_surface(&mut self, id: impl Into<String>) {
        self.surfaces.insert(id.into(), RecordingSurface::new());
    }

    pub fn control(&self, id: &str) -> Option<&Control> {
        self.controls.get(id)
    }

    /// Set a control's value (constrained to its range). Returns `false`
    /// for unknown ids.
    pub fn set_control_value(&mut self, id: &str, value: f64) -> bool {
        match self.controls.get_mut(id) {
            Some(control) => {
                control.value = control.constrain(value);
                true
            }
            None => false,
        }
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    pub fn surface(&self, id: &str) -> Option<&RecordingSurface> {
        self.surfaces.get(id)
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }
}

impl Page for MemoryPage {
    fn control_value(&self, id: &str) -> Option<f64> {
        self.controls.get(id).map(|c| c.value)
    }

    fn has_element(&self, id: &str) -> bool {
        self.texts.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: String) {
        if let Some(slot) = self.texts.get_mut(id) {
            *slot = text;
        }
    }

    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    fn surface_mut(&mut self, id: &str) -> Option<&mut dyn RenderSurface> {
        self.surfaces
            .get_mut(id)
            .map(|s| s as &mut dyn RenderSurface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_values_are_clamped() {
        let mut page = MemoryPage::new();
        page.add_control("beta", Control::slider("β", 0.8, 1.0, 0.001, 0.98));
        assert!(page.set_control_value("beta", 1.7));
        assert_eq!(page.control_value("beta"), Some(1.0));
        assert!(page.set_control_value("beta", f64::NAN));
        assert_eq!(page.control_value("beta"), Some(0.8));
        assert!(!page.set_control_value("missing", 0.5));
    }

    #[test]
    fn test_toggle_reads_as_zero_or_one() {
        let mut page = MemoryPage::new();
        page.add_control("enabled", Control::toggle("Input spikes", true));
        assert_eq!(page.control_value("enabled"), Some(1.0));
        page.set_control_value("enabled", 0.2);
        assert_eq!(page.control_value("enabled"), Some(0.0));
    }

    #[test]
    fn test_text_only_written_to_existing_elements() {
        let mut page = MemoryPage::new();
        page.add_text("a_value");
        page.set_text("a_value", "20.00".to_owned());
        page.set_text("nowhere", "1.00".to_owned());
        assert_eq!(page.text("a_value"), Some("20.00"));
        assert!(!page.has_element("nowhere"));
    }
}
