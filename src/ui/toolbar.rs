use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

use crate::app::DispatchApp;
use crate::model::{Granularity, ViewMode};
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut DispatchApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  Board  ").font(theme::font_header()), |ui| {
            if ui.button(format!("{}  Reload", icons::ARROWS_CLOCKWISE)).clicked() {
                app.request_reload(ui.ctx());
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Export Image...", icons::IMAGE)).clicked() {
                app.export_png();
                ui.close_menu();
            }
            if ui.button(format!("{}  Export CSV...", icons::TABLE)).clicked() {
                app.export_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save Settings").clicked() {
                app.save_settings();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_header()), |ui| {
            ui.label(RichText::new("Timeline Scale").small().weak());
            for granularity in Granularity::ALL {
                if ui
                    .radio(app.selector.granularity == granularity, granularity.label())
                    .clicked()
                {
                    app.selector.set_granularity(granularity);
                    ui.close_menu();
                }
            }
            ui.separator();
            ui.label(RichText::new("Lanes").small().weak());
            if ui.radio_value(&mut app.view_mode, ViewMode::Project, "By item").clicked() {
                ui.close_menu();
            }
            if ui.radio_value(&mut app.view_mode, ViewMode::Resource, "By agent").clicked() {
                ui.close_menu();
            }
        });

        ui.separator();

        if ui.button(icons::CARET_LEFT).on_hover_text("Previous").clicked() {
            app.selector.prev();
        }
        if ui.button("Today").clicked() {
            app.selector.jump_to(chrono::Local::now().date_naive());
        }
        if ui.button(icons::CARET_RIGHT).on_hover_text("Next").clicked() {
            app.selector.next();
        }

        let mut anchor = app.selector.anchor;
        if ui
            .add(egui_extras::DatePickerButton::new(&mut anchor).id_salt("toolbar_jump"))
            .changed()
        {
            app.selector.jump_to(anchor);
        }

        let window = app.selector.window();
        ui.label(
            RichText::new(format!(
                "{} – {}",
                window.start.format("%d %b %Y"),
                window.end.format("%d %b %Y")
            ))
            .font(theme::font_sub())
            .color(theme::TEXT_SECONDARY),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let loading = if app.loading { " (loading…)" } else { "" };
            ui.label(
                RichText::new(format!("{}{}", app.board_name, loading))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
