use crate::app::PlanApp;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};

/// Render the "Edit Phase" dialog opened by double-clicking a bar.
pub fn show_phase_dialog(app: &mut PlanApp, ctx: &Context) {
    let Some(editor) = app.phase_editor.as_mut() else {
        return;
    };
    let mut should_save = false;
    let mut should_close = false;

    Window::new(RichText::new("Edit Phase").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);

            egui::Grid::new("edit_phase_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [200.0, 24.0],
                        egui::TextEdit::singleline(&mut editor.name).hint_text("Phase name..."),
                    );
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut editor.has_dates, "Scheduled");
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add_enabled(
                        editor.has_dates,
                        egui_extras::DatePickerButton::new(&mut editor.start).id_salt("dlg_dp_start"),
                    );
                    ui.end_row();

                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.add_enabled(
                        editor.has_dates,
                        egui_extras::DatePickerButton::new(&mut editor.end).id_salt("dlg_dp_end"),
                    );
                    ui.end_row();
                });

            if editor.has_dates && editor.end < editor.start {
                ui.add_space(4.0);
                ui.label(RichText::new("End is before start").color(theme::TODAY_LINE).small());
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                let valid = !editor.has_dates || editor.start <= editor.end;
                if ui.add_enabled(valid, save_btn).clicked() {
                    should_save = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if should_save {
        app.apply_phase_editor();
    } else if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.phase_editor = None;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut PlanApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Phase Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag in an empty lane to schedule a phase.");
                ui.label("Drag a bar to move it, drag its edges to resize.");
                ui.label("Double-click a bar to edit it.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
