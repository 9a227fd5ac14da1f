//! Toolbar and keyboard shortcuts.

use covgutter_core::ViewState;
use eframe::egui;

use super::App;

impl App {
    pub(crate) fn show_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open coverage…").clicked() {
                self.open_coverage_dialog();
            }
            ui.separator();

            let (label, enabled) = match self.view.state() {
                ViewState::Inactive => ("Show coverage", self.coverage.is_some()),
                ViewState::Loading | ViewState::Active => ("Hide coverage", true),
            };
            if ui
                .add_enabled(enabled, egui::Button::new(label))
                .on_hover_text("Ctrl+Shift+G")
                .clicked()
            {
                self.toggle_coverage();
            }
        });
    }

    /// Handles Ctrl+Shift+G (toggle coverage) and Ctrl+Shift+O (open coverage).
    pub(crate) fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (ctrl, shift, keys) = ctx.input(|i| {
            let keys: Vec<egui::Key> = i
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key, pressed: true, ..
                    } => Some(*key),
                    _ => None,
                })
                .collect();
            (i.modifiers.ctrl || i.modifiers.command, i.modifiers.shift, keys)
        });
        if !(ctrl && shift) {
            return;
        }

        for key in keys {
            match key {
                egui::Key::G => self.toggle_coverage(),
                egui::Key::O => self.open_coverage_dialog(),
                _ => {}
            }
        }
    }

    fn open_coverage_dialog(&mut self) {
        let path = rfd::FileDialog::new()
            .set_title("Open coverage info")
            .add_filter("Coverage", &["json", "info", "gcov"])
            .add_filter("All files", &["*"])
            .pick_file();
        if let Some(path) = path {
            self.load_coverage(&path);
        }
    }
}
