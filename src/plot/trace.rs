//! Chart-ready series and layout options.

use serde::{Deserialize, Serialize};

/// Viewports at or below this width get the compact layout.
pub const NARROW_VIEWPORT_MAX: f32 = 768.0;

/// sRGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREEN: Rgb = Rgb(0x2c, 0xa0, 0x2c);
    pub const RED: Rgb = Rgb(0xd6, 0x27, 0x28);
    pub const ORANGE: Rgb = Rgb(0xff, 0xa5, 0x00);
    pub const BLUE: Rgb = Rgb(0x1f, 0x77, 0xb4);
    pub const FOREST: Rgb = Rgb(0x22, 0x8b, 0x22);
    pub const PURPLE: Rgb = Rgb(0x80, 0x00, 0x80);
    pub const GREY: Rgb = Rgb(0xcc, 0xcc, 0xcc);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    Lines,
    Markers,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Rgb,
    pub width: f32,
    pub dashed: bool,
}

impl LineStyle {
    pub fn solid(color: Rgb) -> Self {
        Self {
            color,
            width: 2.0,
            dashed: false,
        }
    }

    pub fn dashed(color: Rgb) -> Self {
        Self {
            dashed: true,
            ..Self::solid(color)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerSymbol {
    Circle,
    Cross,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub symbol: MarkerSymbol,
    pub color: Rgb,
    pub size: f32,
}

/// Whether a trace is drawn or only listed in the legend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Visible,
    LegendOnly,
}

/// One renderable named series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: TraceMode,
    pub line: LineStyle,
    pub marker: Option<MarkerStyle>,
    pub visibility: Visibility,
}

impl Trace {
    /// Line series.
    pub fn line(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>, line: LineStyle) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            mode: TraceMode::Lines,
            line,
            marker: None,
            visibility: Visibility::Visible,
        }
    }

    /// Marker-only series.
    pub fn markers(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>, marker: MarkerStyle) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            mode: TraceMode::Markers,
            line: LineStyle::solid(marker.color),
            marker: Some(marker),
            visibility: Visibility::Visible,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Iterate `(x, y)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
    /// Fixed range; autoscaled from data when absent.
    pub range: Option<(f64, f64)>,
}

impl Axis {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            range: None,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            left: 50.0,
            right: 50.0,
            bottom: 50.0,
            top: 50.0,
        }
    }
}

/// Chart layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub show_legend: bool,
    /// Legend anchor as fractions of the plot area, from the bottom left.
    pub legend_anchor: [f32; 2],
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub margin: Margin,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title: String::new(),
            show_legend: true,
            legend_anchor: [0.7, 0.95],
            x_axis: Axis::new("Time (steps)"),
            y_axis: Axis::new("Value"),
            margin: Margin::default(),
        }
    }
}

impl Layout {
    /// Layout adjusted for the viewport: narrow screens drop title and legend.
    pub fn responsive(&self, viewport_width: f32) -> Layout {
        let patch = self.patch_for(viewport_width);
        let mut layout = self.clone();
        layout.apply(&patch);
        layout
    }

    /// The title/legend subset of [`Layout::responsive`].
    pub fn patch_for(&self, viewport_width: f32) -> LayoutPatch {
        let narrow = viewport_width <= NARROW_VIEWPORT_MAX;
        LayoutPatch {
            title: if narrow { String::new() } else { self.title.clone() },
            show_legend: !narrow && self.show_legend,
        }
    }

    pub fn apply(&mut self, patch: &LayoutPatch) {
        self.title = patch.title.clone();
        self.show_legend = patch.show_legend;
    }
}

/// Presentation-only layout change issued on viewport resize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutPatch {
    pub title: String,
    pub show_legend: bool,
}
