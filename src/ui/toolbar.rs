use crate::app::PlanApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;
use phase_timeline::timeline::ScrollBehavior;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut PlanApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  Plan  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{} Add Phase", icons::PLUS)).clicked() {
                app.add_phase();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{} About", icons::INFO)).clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .button(format!("{} Today", icons::CROSSHAIR))
            .on_hover_text("Scroll to today")
            .clicked()
        {
            let today = chrono::Local::now().date_naive();
            app.scroll_to(today, ScrollBehavior::Smooth);
        }

        ui.label(RichText::new(icons::CALENDAR_BLANK).color(theme::TEXT_SECONDARY));
        ui.add(egui_extras::DatePickerButton::new(&mut app.goto_date).id_salt("goto_date"));
        if ui.button("Go").clicked() {
            app.scroll_to(app.goto_date, ScrollBehavior::Smooth);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(&app.plan_name).size(11.0).weak());
        });
    });
}
