use crate::app::TimelineApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use gantt_timeline::{DependencySource, ViewMode};

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut TimelineApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  Open...       Ctrl+O").clicked() {
                app.open_file();
                ui.close_menu();
            }
            if ui.button("  Reload        F5").clicked() {
                app.reload();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Export CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
            if ui.button("  Export Layout...").clicked() {
                app.export_layout();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.zoom_out();
                ui.close_menu();
            }
            if ui.button("  Reset Zoom").clicked() {
                app.reset_zoom();
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Timeline Scale").small().weak());
            for mode in ViewMode::ALL {
                let label = match mode {
                    ViewMode::Days => "Days",
                    ViewMode::Weeks => "Weeks",
                    ViewMode::Months => "Months",
                };
                if ui.radio(app.config.view_mode == mode, label).clicked() {
                    app.set_view_mode(mode);
                    ui.close_menu();
                }
            }
            ui.separator();
            ui.label(RichText::new("Dependencies").small().weak());
            let sources = [
                (DependencySource::Sequential, "Previous row"),
                (DependencySource::Explicit, "From data"),
                (DependencySource::ExplicitOrSequential, "From data, else previous row"),
                (DependencySource::None, "None"),
            ];
            for (source, label) in sources {
                if ui.radio(app.config.dependency_source == source, label).clicked() {
                    app.set_dependency_source(source);
                    ui.close_menu();
                }
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned document name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let source = if app.file_path.is_some() { "" } else { " (sample)" };
            ui.label(
                RichText::new(format!("{}{}", app.document_name(), source))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
