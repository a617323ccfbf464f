use crate::app::ViewerApp;
use crate::figures::FigureId;

pub fn top_toolbar(app: &mut ViewerApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.heading("Spike Plots");
        ui.separator();

        ui.menu_button("Figures", |ui| {
            for id in FigureId::ALL {
                if ui
                    .selectable_value(&mut app.settings.selected, id, id.label())
                    .clicked()
                {
                    app.push_log(format!("Showing {}", id.label()));
                    ui.close_menu();
                }
            }
        });

        ui.separator();
        ui.label("Model:");
        let adlif = matches!(
            app.settings.selected,
            FigureId::AdaptationDecay
                | FigureId::AdaptationStrength
                | FigureId::SpikeResponse
                | FigureId::SpikeTrain
        );
        if ui.selectable_label(adlif, "AdLIF").clicked() && !adlif {
            app.settings.selected = FigureId::AdaptationDecay;
        }
        if ui.selectable_label(!adlif, "QIF").clicked() && adlif {
            app.settings.selected = FigureId::QifCurrent;
        }

        ui.separator();
        if ui.button("Reset controls").clicked() {
            app.reset_controls();
        }
        if ui.button("Logs").clicked() {
            app.settings.log_window_open = true;
        }
    });
}
