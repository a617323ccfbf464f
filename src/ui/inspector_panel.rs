use crate::{
    app::ViewerApp,
    figures::ControlSpec,
    plot::{ControlKind, Page},
};

pub fn inspector(app: &mut ViewerApp, ui: &mut egui::Ui) {
    ui.heading("Controls");
    ui.add_space(6.0);

    let Some(view) = app.selected_view() else {
        return;
    };
    let specs: Vec<ControlSpec> = view.figure.controls.clone();
    let editable = view
        .figure
        .spike_input
        .as_ref()
        .is_some_and(|input| input.editable);

    if specs.is_empty() {
        ui.label("This figure has no controls.");
    }
    for spec in &specs {
        control_row(app, ui, spec);
    }
    if editable {
        ui.add_space(4.0);
        ui.label("Drag in the strip under the chart to move the input spike.");
    }

    ui.separator();
    parameters_section(app, ui);
}

fn control_row(app: &mut ViewerApp, ui: &mut egui::Ui, spec: &ControlSpec) {
    let Some(control) = app.page.control(spec.id).cloned() else {
        ui.colored_label(ui.visuals().warn_fg_color, format!("Missing control {}", spec.id));
        return;
    };

    match control.kind {
        ControlKind::Slider { min, max, step } => {
            ui.horizontal(|ui| {
                let mut value = control.value;
                let response = ui.add(
                    egui::Slider::new(&mut value, min..=max)
                        .step_by(step)
                        .show_value(false)
                        .text(&control.label),
                );
                if response.changed() {
                    app.set_control(spec.id, value);
                }
                let shown = spec
                    .binding
                    .display
                    .as_deref()
                    .filter(|display| app.page.has_element(display))
                    .and_then(|display| app.page.text(display))
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("{:.2}", control.value));
                ui.monospace(shown);
            });
        }
        ControlKind::Toggle => {
            let mut on = control.is_on();
            if ui.checkbox(&mut on, &control.label).changed() {
                app.set_control(spec.id, if on { 1.0 } else { 0.0 });
            }
        }
    }
}

fn parameters_section(app: &ViewerApp, ui: &mut egui::Ui) {
    let Some(update) = app
        .selected_view()
        .and_then(|view| view.plot.as_ref())
        .and_then(|plot| plot.last_update())
    else {
        ui.label("No simulation yet");
        return;
    };

    ui.collapsing("Parameters", |ui| {
        egui::Grid::new("resolved_params_grid")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (key, value) in update.params.iter() {
                    ui.label(key);
                    ui.monospace(value.to_string());
                    ui.end_row();
                }
            });
    });

    ui.collapsing("Spikes", |ui| {
        ui.label(format!("Output at {:?}", update.spike_indices));
        ui.label(format!("Input at {:?}", update.input_indices));
    });
}
