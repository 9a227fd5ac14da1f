//! Coverage gutter markers painted by [`CodeView`](crate::CodeView).

use covgutter_config::HexColor;
use covgutter_core::{LineStatus, MarkerFactory};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect};

/// Converts a config color to an egui color.
pub(crate) fn hex_to_color32(c: HexColor) -> Color32 {
    Color32::from_rgba_premultiplied(c.r, c.g, c.b, c.a)
}

/// One coverage cell: the line number on a status-colored background.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageLine {
    /// 1-based line number shown in the cell.
    pub number: usize,
    pub status: LineStatus,
    pub color: Color32,
    pub text_color: Color32,
}

impl CoverageLine {
    pub fn new(number: usize, status: LineStatus, color: HexColor) -> Self {
        // Dark text on light backgrounds and vice versa.
        let text_color = if color.luminance() > 0.5 {
            Color32::from_gray(40)
        } else {
            Color32::from_gray(230)
        };
        Self {
            number,
            status,
            color: hex_to_color32(color),
            text_color,
        }
    }

    pub fn paint(&self, painter: &Painter, cell: Rect, font_id: &FontId) {
        painter.rect_filled(cell, 0.0, self.color);
        painter.text(
            Pos2::new(cell.max.x - 8.0, cell.min.y + cell.height() * 0.15),
            Align2::RIGHT_TOP,
            self.number.to_string(),
            font_id.clone(),
            self.text_color,
        );
    }

    /// Hover text, e.g. `Line 12: covered`.
    pub fn tooltip(&self) -> String {
        format!("Line {}: {}", self.number, self.status)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EguiMarkerFactory;

impl MarkerFactory<CoverageLine> for EguiMarkerFactory {
    fn create(&mut self, line_number: usize, status: LineStatus, color: HexColor) -> CoverageLine {
        CoverageLine::new(line_number, status, color)
    }
}
