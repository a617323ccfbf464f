use crate::{
    app::ViewerApp,
    export::axis_ranges,
    figures::{SpikeInput, step_at},
    plot::{
        RecordingSurface,
        trace::{Layout, MarkerSymbol, Rgb, Trace, TraceMode},
    },
};

const CHART_MAX_HEIGHT: f32 = 460.0;
const STRIP_HEIGHT: f32 = 34.0;
const TICKS: usize = 5;
const DASH_LENGTH: f32 = 6.0;
const GAP_LENGTH: f32 = 4.0;
const AXIS_COLOR: egui::Color32 = egui::Color32::from_gray(90);
const GRID_COLOR: egui::Color32 = egui::Color32::from_gray(225);
const TEXT_COLOR: egui::Color32 = egui::Color32::from_gray(30);

pub fn central_view(app: &mut ViewerApp, ui: &mut egui::Ui) {
    let Some(view) = app.selected_view() else {
        ui.label("No figure selected");
        return;
    };
    let id = view.figure.id;
    let surface_id = id.surface_id();
    let strip = view.figure.spike_input.clone().map(|input| {
        let times = view
            .plot
            .as_ref()
            .and_then(|plot| plot.last_update())
            .and_then(|update| update.params.list(input.param))
            .map(<[f64]>::to_vec)
            .unwrap_or_default();
        let enabled = input
            .enabled_control
            .and_then(|control| app.page.control(control))
            .is_none_or(|control| control.is_on());
        (input, times, enabled)
    });

    ui.horizontal(|ui| {
        ui.strong(id.label());
        ui.separator();
        if let Some(update) = view.plot.as_ref().and_then(|plot| plot.last_update()) {
            ui.label(format!(
                "{} output spike(s), {} input spike(s)",
                update.spike_indices.len(),
                update.input_indices.len()
            ));
        }
    });
    ui.separator();

    let reserved = if strip.is_some() { STRIP_HEIGHT + 24.0 } else { 0.0 };
    let height = (ui.available_height() - reserved).clamp(200.0, CHART_MAX_HEIGHT);
    let (rect, _response) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), height), egui::Sense::hover());

    let plot_rect = match app.page.surface(surface_id) {
        Some(surface) if surface.has_data() => draw_chart(ui, rect, surface),
        _ => {
            placeholder(ui, rect, "Nothing rendered for this figure");
            None
        }
    };

    let Some((input, times, enabled)) = strip else {
        return;
    };
    let Some(plot_rect) = plot_rect else {
        return;
    };

    ui.add_space(6.0);
    if input.editable {
        ui.label("Drag in the strip to move the input spike.");
    }
    if let Some(step) = spike_strip(ui, plot_rect, &input, &times, enabled) {
        app.move_input_spike(step);
    }
}

fn color32(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Maps data coordinates onto a screen rectangle.
struct Frame {
    rect: egui::Rect,
    x: (f64, f64),
    y: (f64, f64),
}

impl Frame {
    fn to_screen(&self, x: f64, y: f64) -> egui::Pos2 {
        let fx = ((x - self.x.0) / (self.x.1 - self.x.0)) as f32;
        let fy = ((y - self.y.0) / (self.y.1 - self.y.0)) as f32;
        egui::pos2(
            self.rect.left() + fx * self.rect.width(),
            self.rect.bottom() - fy * self.rect.height(),
        )
    }
}

/// Draw a chart into `rect`, returning the inner plot area.
fn draw_chart(ui: &egui::Ui, rect: egui::Rect, surface: &RecordingSurface) -> Option<egui::Rect> {
    let layout = surface.layout()?;
    let traces = surface.traces();
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, egui::Color32::WHITE);
    painter.rect_stroke(
        rect,
        4.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(80)),
        egui::StrokeKind::Outside,
    );

    // Leave room for the title even when the layout has no top margin.
    let top = if layout.title.is_empty() {
        layout.margin.top.max(10.0)
    } else {
        layout.margin.top.max(32.0)
    };
    let plot_rect = egui::Rect::from_min_max(
        egui::pos2(rect.left() + layout.margin.left, rect.top() + top),
        egui::pos2(
            rect.right() - layout.margin.right,
            rect.bottom() - layout.margin.bottom.max(40.0),
        ),
    );
    if plot_rect.width() <= 0.0 || plot_rect.height() <= 0.0 {
        return None;
    }

    let (x, y) = axis_ranges(layout, traces);
    let frame = Frame {
        rect: plot_rect,
        x,
        y,
    };
    draw_axes(&painter, &frame, layout);

    let plot_painter = painter.with_clip_rect(plot_rect);
    for trace in traces.iter().filter(|t| t.is_visible()) {
        draw_trace(&plot_painter, &frame, trace);
    }

    if !layout.title.is_empty() {
        painter.text(
            egui::pos2(rect.center().x, rect.top() + 8.0),
            egui::Align2::CENTER_TOP,
            &layout.title,
            egui::FontId::proportional(16.0),
            TEXT_COLOR,
        );
    }
    if layout.show_legend {
        draw_legend(&painter, plot_rect, layout, traces);
    }
    Some(plot_rect)
}

fn ticks(range: (f64, f64)) -> impl Iterator<Item = f64> {
    let step = (range.1 - range.0) / TICKS as f64;
    (0..=TICKS).map(move |i| range.0 + step * i as f64)
}

fn draw_axes(painter: &egui::Painter, frame: &Frame, layout: &Layout) {
    let rect = frame.rect;
    let font = egui::FontId::proportional(11.0);

    for x in ticks(frame.x) {
        let pos = frame.to_screen(x, frame.y.0);
        painter.line_segment(
            [egui::pos2(pos.x, rect.top()), egui::pos2(pos.x, rect.bottom())],
            egui::Stroke::new(1.0, GRID_COLOR),
        );
        painter.text(
            pos + egui::vec2(0.0, 4.0),
            egui::Align2::CENTER_TOP,
            format!("{x:.0}"),
            font.clone(),
            TEXT_COLOR,
        );
    }
    for y in ticks(frame.y) {
        let pos = frame.to_screen(frame.x.0, y);
        painter.line_segment(
            [egui::pos2(rect.left(), pos.y), egui::pos2(rect.right(), pos.y)],
            egui::Stroke::new(1.0, GRID_COLOR),
        );
        painter.text(
            pos - egui::vec2(4.0, 0.0),
            egui::Align2::RIGHT_CENTER,
            format!("{y:.2}"),
            font.clone(),
            TEXT_COLOR,
        );
    }

    let axis = egui::Stroke::new(1.0, AXIS_COLOR);
    painter.line_segment([rect.left_bottom(), rect.right_bottom()], axis);
    painter.line_segment([rect.left_bottom(), rect.left_top()], axis);

    let title_font = egui::FontId::proportional(13.0);
    painter.text(
        egui::pos2(rect.center().x, rect.bottom() + 22.0),
        egui::Align2::CENTER_TOP,
        &layout.x_axis.title,
        title_font.clone(),
        TEXT_COLOR,
    );
    painter.text(
        egui::pos2(rect.left() + 4.0, rect.top() - 4.0),
        egui::Align2::LEFT_BOTTOM,
        &layout.y_axis.title,
        title_font,
        TEXT_COLOR,
    );
}

fn draw_trace(painter: &egui::Painter, frame: &Frame, trace: &Trace) {
    match trace.mode {
        TraceMode::Lines => {
            let points: Vec<egui::Pos2> = trace
                .points()
                .filter(|(_, y)| y.is_finite())
                .map(|(x, y)| frame.to_screen(x, y))
                .collect();
            if points.len() < 2 {
                return;
            }
            let stroke = egui::Stroke::new(trace.line.width, color32(trace.line.color));
            if trace.line.dashed {
                painter.extend(egui::Shape::dashed_line(
                    &points,
                    stroke,
                    DASH_LENGTH,
                    GAP_LENGTH,
                ));
            } else {
                painter.add(egui::Shape::line(points, stroke));
            }
        }
        TraceMode::Markers => {
            let (symbol, color, size) = match trace.marker {
                Some(marker) => (marker.symbol, color32(marker.color), marker.size),
                None => (MarkerSymbol::Circle, color32(trace.line.color), 6.0),
            };
            let half = size / 2.0;
            for (x, y) in trace.points() {
                let center = frame.to_screen(x, y);
                match symbol {
                    MarkerSymbol::Circle => {
                        painter.circle_filled(center, half, color);
                    }
                    MarkerSymbol::Cross => {
                        let stroke = egui::Stroke::new(2.0, color);
                        painter.line_segment(
                            [center + egui::vec2(-half, -half), center + egui::vec2(half, half)],
                            stroke,
                        );
                        painter.line_segment(
                            [center + egui::vec2(-half, half), center + egui::vec2(half, -half)],
                            stroke,
                        );
                    }
                }
            }
        }
    }
}

fn draw_legend(painter: &egui::Painter, plot_rect: egui::Rect, layout: &Layout, traces: &[Trace]) {
    let font = egui::FontId::proportional(12.0);
    let row = 16.0;
    let width = 190.0;
    let [ax, ay] = layout.legend_anchor;
    let anchor = egui::pos2(
        plot_rect.left() + ax * plot_rect.width(),
        plot_rect.bottom() - ay * plot_rect.height(),
    );
    // Keep the box inside the plot area.
    let left = anchor.x.min(plot_rect.right() - width).max(plot_rect.left());
    let box_rect = egui::Rect::from_min_size(
        egui::pos2(left, anchor.y),
        egui::vec2(width, row * traces.len() as f32 + 6.0),
    );
    painter.rect_filled(box_rect, 2.0, egui::Color32::from_white_alpha(220));
    painter.rect_stroke(
        box_rect,
        2.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(180)),
        egui::StrokeKind::Inside,
    );

    for (i, trace) in traces.iter().enumerate() {
        let y = box_rect.top() + 3.0 + row * (i as f32 + 0.5);
        let color = if trace.is_visible() {
            match (trace.mode, trace.marker) {
                (TraceMode::Markers, Some(marker)) => color32(marker.color),
                _ => color32(trace.line.color),
            }
        } else {
            egui::Color32::from_gray(190)
        };
        let swatch = [
            egui::pos2(box_rect.left() + 6.0, y),
            egui::pos2(box_rect.left() + 24.0, y),
        ];
        painter.line_segment(swatch, egui::Stroke::new(2.0, color));
        painter.text(
            egui::pos2(box_rect.left() + 30.0, y),
            egui::Align2::LEFT_CENTER,
            &trace.name,
            font.clone(),
            if trace.is_visible() {
                TEXT_COLOR
            } else {
                egui::Color32::from_gray(160)
            },
        );
    }
}

/// Input spike markers under the chart. Returns the step the pointer is
/// dragging to, for editable strips.
fn spike_strip(
    ui: &mut egui::Ui,
    plot_rect: egui::Rect,
    input: &SpikeInput,
    times: &[f64],
    enabled: bool,
) -> Option<usize> {
    let sense = if input.editable {
        egui::Sense::click_and_drag()
    } else {
        egui::Sense::hover()
    };
    let (row, response) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), STRIP_HEIGHT), sense);
    let strip = egui::Rect::from_x_y_ranges(plot_rect.x_range(), row.y_range());
    let painter = ui.painter_at(row);
    painter.rect_filled(strip, 2.0, egui::Color32::from_gray(245));
    painter.line_segment(
        [strip.left_center(), strip.right_center()],
        egui::Stroke::new(1.0, egui::Color32::from_gray(160)),
    );

    let color = if enabled {
        color32(Rgb::BLUE)
    } else {
        color32(Rgb::GREY)
    };
    let steps = input.steps.max(1) as f32;
    for &t in times {
        let x = strip.left() + t as f32 / steps * strip.width();
        painter.line_segment(
            [egui::pos2(x, strip.top() + 4.0), egui::pos2(x, strip.bottom() - 4.0)],
            egui::Stroke::new(3.0, color),
        );
    }

    if !input.editable {
        return None;
    }
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
    }
    if !(response.dragged() || response.clicked()) {
        return None;
    }
    let pointer = response.interact_pointer_pos()?;
    Some(step_at(pointer.x, strip.left(), strip.width(), input.steps))
}

fn placeholder(ui: &egui::Ui, rect: egui::Rect, label: &str) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, egui::Color32::from_gray(25));
    painter.rect_stroke(
        rect,
        4.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(80)),
        egui::StrokeKind::Outside,
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        label,
        egui::FontId::proportional(15.0),
        egui::Color32::LIGHT_GRAY,
    );
}
