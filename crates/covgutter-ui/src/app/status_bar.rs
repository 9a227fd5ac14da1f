//! Status bar: coverage summary, matched entry, info file and last error.

use covgutter_core::{CoverageRecord, ViewState};
use eframe::egui;
use egui::{Color32, RichText};

use super::App;

/// Formats covered lines out of `total`, e.g. `Coverage: 3/10 lines (30%)`.
fn format_coverage(covered: usize, total: usize) -> String {
    if total == 0 {
        return "Coverage: 0/0 lines".to_string();
    }
    let percent = covered as f64 * 100.0 / total as f64;
    format!("Coverage: {covered}/{total} lines ({percent:.0}%)")
}

/// Covered lines among the first `line_count` lines.
fn covered_in(record: &CoverageRecord, line_count: usize) -> usize {
    record
        .covered_lines
        .iter()
        .filter(|&&n| n >= 1 && n as usize <= line_count)
        .count()
}

impl App {
    /// Summary shown at the left of the status bar.
    pub fn coverage_summary(&self) -> String {
        match self.view.state() {
            ViewState::Inactive => "Coverage off".to_string(),
            ViewState::Loading => "Loading coverage…".to_string(),
            ViewState::Active => {
                let line_count = self.view.surface().map_or(0, |code| code.line_count());
                let covered = self
                    .view
                    .record()
                    .map_or(0, |record| covered_in(record, line_count));
                format_coverage(covered, line_count)
            }
        }
    }

    pub(crate) fn show_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.coverage_summary());

            if let Some(record) = self.view.record() {
                ui.separator();
                match &record.matched_key {
                    Some(key) => {
                        ui.label(format!("Matched: {key}"));
                    }
                    None => {
                        ui.label(
                            RichText::new("No coverage entry for this file")
                                .color(Color32::from_rgb(200, 120, 0)),
                        );
                    }
                }
            }

            if let Some(path) = &self.coverage_path {
                ui.separator();
                ui.label(format!("Info: {}", path.display()));
            }

            if let Some(message) = &self.status_message {
                ui.separator();
                ui.label(RichText::new(message).color(ui.visuals().warn_fg_color));
            }
        });
    }
}
