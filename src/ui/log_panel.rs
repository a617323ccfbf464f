use crate::app::ViewerApp;

pub fn log_panel(app: &mut ViewerApp, ui: &mut egui::Ui) {
    let selected = app.settings.selected.label();
    ui.horizontal(|ui| {
        ui.checkbox(&mut app.settings.follow_logs, "Follow");
        ui.checkbox(
            &mut app.settings.logs_for_selected,
            format!("Only {selected}"),
        );
        if ui.button("Clear").clicked() {
            app.log_messages.clear();
        }
    });
    ui.separator();

    let footer = ui.spacing().interact_size.y + ui.spacing().item_spacing.y;
    let scroll = egui::ScrollArea::vertical()
        .id_salt("log_scroll_area")
        .stick_to_bottom(app.settings.follow_logs)
        .auto_shrink([false; 2])
        .max_height((ui.available_height() - footer).max(0.0))
        .show(ui, |ui| {
            let mut shown = 0;
            for message in app.visible_logs() {
                ui.monospace(message);
                shown += 1;
            }
            shown
        });

    // Scrolling up by hand stops following.
    let max_offset = (scroll.content_size.y - scroll.inner_rect.height()).max(0.0);
    if scroll.state.offset.y + 1.0 < max_offset {
        app.settings.follow_logs = false;
    }

    ui.separator();
    ui.label(format!(
        "{} of {} entries",
        scroll.inner,
        app.log_messages.len()
    ));
}
