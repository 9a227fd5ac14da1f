//! Read-only source view with coverage gutters.
//!
//! [`CodeView`] is the egui [`GutterSurface`]: it paints line numbers, the
//! installed gutters and the text of the visible lines, and reports viewport
//! changes back to the app once per frame.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use covgutter_core::{GutterSurface, ListenerId, Viewport};
use egui::{
    text::LayoutJob, Align2, FontId, Pos2, Rect, Response, Sense, Stroke, TextFormat, Ui, Vec2,
};
use ropey::Rope;

use crate::CoverageLine;

/// Lines assumed visible before the first frame is laid out.
const INITIAL_VISIBLE_LINES: usize = 40;

/// Left padding between the gutters and the text.
const TEXT_LEFT_PADDING: f32 = 4.0;

#[derive(Debug)]
pub struct CodeView {
    text: Rope,
    path: Option<PathBuf>,
    font_size: f32,
    /// First visible line, fractional while scrolling.
    scroll_y: f32,
    viewport: Viewport,
    gutters: Vec<String>,
    line_numbers: bool,
    markers: HashMap<String, BTreeMap<usize, CoverageLine>>,
    listeners: BTreeSet<ListenerId>,
    next_listener: u64,
    viewport_changes: Vec<Viewport>,
    refresh_pending: bool,
    refresh_count: usize,
    depth: usize,
    layout_dirty: bool,
    layout_passes: usize,
    ctx: Option<egui::Context>,
}

impl CodeView {
    pub fn new(text: &str, path: Option<PathBuf>, font_size: f32) -> Self {
        let text = Rope::from_str(text);
        let mut view = Self {
            text,
            path,
            font_size,
            scroll_y: 0.0,
            viewport: Viewport::default(),
            gutters: Vec::new(),
            line_numbers: true,
            markers: HashMap::new(),
            listeners: BTreeSet::new(),
            next_listener: 0,
            viewport_changes: Vec::new(),
            refresh_pending: false,
            refresh_count: 0,
            depth: 0,
            layout_dirty: false,
            layout_passes: 0,
            ctx: None,
        };
        view.viewport = Viewport::new(0, view.line_count().min(INITIAL_VISIBLE_LINES));
        view
    }

    /// An empty view, shown when no source file is open.
    pub fn empty(font_size: f32) -> Self {
        Self::new("", None, font_size)
    }

    pub fn from_file(path: &Path, font_size: f32) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::new(&text, Some(path.to_path_buf()), font_size))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of lines, not counting the empty line after a trailing newline.
    pub fn line_count(&self) -> usize {
        let lines = self.text.len_lines();
        if lines > 1 && self.text.line(lines - 1).len_chars() == 0 {
            lines - 1
        } else {
            lines
        }
    }

    /// Text of zero-based `line` without its line ending.
    pub fn line_text(&self, line: usize) -> String {
        if line >= self.text.len_lines() {
            return String::new();
        }
        let mut s: String = self.text.line(line).chars().collect();
        while s.ends_with('\n') || s.ends_with('\r') {
            s.pop();
        }
        s
    }

    pub fn gutters(&self) -> &[String] {
        &self.gutters
    }

    pub fn line_numbers_visible(&self) -> bool {
        self.line_numbers
    }

    pub fn marker(&self, gutter_id: &str, line: usize) -> Option<&CoverageLine> {
        self.markers.get(gutter_id)?.get(&line)
    }

    /// Number of markers in `gutter_id`.
    pub fn marker_count(&self, gutter_id: &str) -> usize {
        self.markers.get(gutter_id).map_or(0, BTreeMap::len)
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    /// Scrolls so that zero-based `line` is the first visible one.
    /// Takes effect on the next frame.
    pub fn scroll_to_line(&mut self, line: usize) {
        self.scroll_y = line as f32;
        self.request_repaint();
    }

    /// Viewport changes observed since the last call, oldest first.
    /// Empty while nobody is subscribed.
    pub fn take_viewport_changes(&mut self) -> Vec<Viewport> {
        std::mem::take(&mut self.viewport_changes)
    }

    /// Shows the view and returns a response.
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        self.ctx = Some(ui.ctx().clone());
        // Idle tick: the refresh scheduled during the previous frame runs now.
        if std::mem::take(&mut self.refresh_pending) {
            self.refresh();
        }

        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::hover());
        let rect = response.rect;

        let font_id = FontId::monospace(self.font_size);
        let line_height = self.font_size * 1.4;
        let char_width = measure_char_width(ui, &font_id);
        let total_lines = self.line_count();

        let visible_lines = ((rect.height() / line_height).ceil() as usize).max(1);
        let max_scroll_y = total_lines.saturating_sub(visible_lines) as f32;
        if response.hovered() {
            let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
            if scroll_delta.y != 0.0 {
                self.scroll_y -= scroll_delta.y / line_height;
            }
        }
        self.scroll_y = self.scroll_y.clamp(0.0, max_scroll_y);

        let first = self.scroll_y.floor() as usize;
        let offset = (self.scroll_y - first as f32) * line_height;
        self.update_viewport(Viewport::new(first, (first + visible_lines).min(total_lines)));

        let column_width = self.column_width(char_width);
        let line_number_width = if self.line_numbers { column_width } else { 0.0 };
        let gutter_width = line_number_width + self.gutters.len() as f32 * column_width;
        let gutter_rect = Rect::from_min_size(rect.min, Vec2::new(gutter_width, rect.height()));

        let visuals = ui.visuals();
        painter.rect_filled(rect, 0.0, visuals.extreme_bg_color);
        painter.rect_filled(gutter_rect, 0.0, visuals.faint_bg_color);
        if gutter_width > 0.0 {
            painter.line_segment(
                [
                    Pos2::new(gutter_rect.max.x, rect.min.y),
                    Pos2::new(gutter_rect.max.x, rect.max.y),
                ],
                Stroke::new(1.0, visuals.widgets.noninteractive.bg_stroke.color),
            );
        }
        let number_color = visuals.weak_text_color();
        let text_color = visuals.text_color();

        let hover = response.hover_pos();
        let mut tooltip = None;

        for (row, line) in (self.viewport.from..self.viewport.to).enumerate() {
            let line_y = rect.min.y + row as f32 * line_height - offset;
            let mut x = rect.min.x;

            if self.line_numbers {
                painter.text(
                    Pos2::new(x + column_width - 8.0, line_y + line_height * 0.15),
                    Align2::RIGHT_TOP,
                    format!("{}", line + 1),
                    font_id.clone(),
                    number_color,
                );
                x += column_width;
            }

            for gutter in &self.gutters {
                let cell = Rect::from_min_size(
                    Pos2::new(x, line_y),
                    Vec2::new(column_width, line_height),
                );
                if let Some(marker) = self.markers.get(gutter).and_then(|m| m.get(&line)) {
                    marker.paint(&painter, cell, &font_id);
                    if hover.is_some_and(|p| cell.contains(p)) {
                        tooltip = Some(marker.tooltip());
                    }
                }
                x += column_width;
            }

            painter.text(
                Pos2::new(
                    gutter_rect.max.x + TEXT_LEFT_PADDING,
                    line_y + line_height * 0.15,
                ),
                Align2::LEFT_TOP,
                self.line_text(line).replace('\t', "    "),
                font_id.clone(),
                text_color,
            );
        }

        match tooltip {
            Some(text) => response.on_hover_text(text),
            None => response,
        }
    }

    /// Width of one gutter column, sized for the largest line number.
    fn column_width(&self, char_width: f32) -> f32 {
        let line_count = self.line_count();
        let digits = if line_count == 0 {
            1
        } else {
            (line_count as f64).log10().floor() as usize + 1
        }
        .max(3);
        (digits as f32 + 2.0) * char_width + 8.0
    }

    fn update_viewport(&mut self, next: Viewport) {
        if next == self.viewport {
            return;
        }
        self.viewport = next;
        if !self.listeners.is_empty() {
            self.viewport_changes.push(next);
        }
    }

    fn invalidate_layout(&mut self) {
        if self.depth > 0 {
            self.layout_dirty = true;
        } else {
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        self.layout_passes += 1;
        self.request_repaint();
    }

    fn request_repaint(&self) {
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
    }
}

fn measure_char_width(ui: &Ui, font_id: &FontId) -> f32 {
    let mut job = LayoutJob::default();
    job.append(
        "M",
        0.0,
        TextFormat {
            font_id: font_id.clone(),
            ..Default::default()
        },
    );
    let galley = ui.fonts_mut(|f| f.layout_job(job));
    galley.rect.width()
}

impl GutterSurface for CodeView {
    type Marker = CoverageLine;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_gutter_marker(&mut self, line: usize, gutter_id: &str, marker: CoverageLine) {
        self.markers
            .entry(gutter_id.to_string())
            .or_default()
            .insert(line, marker);
        self.invalidate_layout();
    }

    fn clear_gutter(&mut self, gutter_id: &str) {
        if self.markers.remove(gutter_id).is_some() {
            self.invalidate_layout();
        }
    }

    fn set_gutters(&mut self, gutters: &[&str]) {
        self.gutters = gutters.iter().map(|g| g.to_string()).collect();
        self.invalidate_layout();
    }

    fn set_line_numbers(&mut self, visible: bool) {
        self.line_numbers = visible;
        self.invalidate_layout();
    }

    fn subscribe_viewport(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id);
        id
    }

    fn unsubscribe_viewport(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
        if self.listeners.is_empty() {
            self.viewport_changes.clear();
        }
    }

    fn refresh(&mut self) {
        self.layout_dirty = false;
        self.refresh_count += 1;
    }

    fn schedule_refresh(&mut self) {
        self.refresh_pending = true;
        self.request_repaint();
    }

    fn operation<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        if self.depth == 0 && std::mem::take(&mut self.layout_dirty) {
            self.relayout();
        }
        result
    }
}
