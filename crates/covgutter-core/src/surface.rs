//! Editor surface seen by the coverage renderer.
//!
//! [`GutterSurface`] is the slice of an editor the coverage view needs: a
//! viewport query, per-line gutter markers, gutter/line-number options,
//! viewport-change subscriptions, refreshes and batched mutation.
//! [`MarkerFactory`] builds the marker element placed in the gutter.
//!
//! [`MemorySurface`] is a headless implementation that keeps everything in
//! memory; it backs plain-text output and tests.

use std::collections::{BTreeMap, BTreeSet};

use covgutter_config::HexColor;

use crate::LineStatus;

/// Half-open range of zero-based line indices, `from..to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub from: usize,
    pub to: usize,
}

impl Viewport {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.from..self.to).contains(&line)
    }
}

/// Handle of a viewport-change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

pub trait GutterSurface {
    /// Element shown in a gutter cell.
    type Marker;

    /// Lines currently visible.
    fn viewport(&self) -> Viewport;

    /// Places `marker` in gutter `gutter_id` at zero-based `line`, replacing any previous one.
    fn set_gutter_marker(&mut self, line: usize, gutter_id: &str, marker: Self::Marker);

    /// Removes every marker of `gutter_id`.
    fn clear_gutter(&mut self, gutter_id: &str);

    /// Sets the installed gutters (an empty slice removes them all).
    fn set_gutters(&mut self, gutters: &[&str]);

    fn set_line_numbers(&mut self, visible: bool);

    /// Starts delivering viewport-change notifications.
    fn subscribe_viewport(&mut self) -> ListenerId;

    fn unsubscribe_viewport(&mut self, id: ListenerId);

    /// Recomputes layout immediately.
    fn refresh(&mut self);

    /// Requests a refresh on the next idle tick, after the current paint cycle completes.
    fn schedule_refresh(&mut self);

    /// Runs `f` as a single batched mutation (one layout pass).
    fn operation<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        f(self)
    }
}

/// Builds gutter marker elements.
pub trait MarkerFactory<M> {
    fn create(&mut self, line_number: usize, status: LineStatus, color: HexColor) -> M;
}

impl<M, F> MarkerFactory<M> for F
where
    F: FnMut(usize, LineStatus, HexColor) -> M,
{
    fn create(&mut self, line_number: usize, status: LineStatus, color: HexColor) -> M {
        (*self)(line_number, status, color)
    }
}

/// Headless [`GutterSurface`] over a fixed number of lines.
#[derive(Debug, Clone)]
pub struct MemorySurface<M> {
    line_count: usize,
    viewport: Viewport,
    gutters: Vec<String>,
    line_numbers: bool,
    markers: BTreeMap<String, BTreeMap<usize, M>>,
    listeners: BTreeSet<ListenerId>,
    next_listener: u64,
    refresh_pending: bool,
    refresh_count: usize,
    depth: usize,
    layout_dirty: bool,
    layout_passes: usize,
    marker_writes: usize,
}

impl<M> MemorySurface<M> {
    /// A surface with `line_count` lines showing `viewport` (clamped to the line count).
    pub fn new(line_count: usize, viewport: Viewport) -> Self {
        Self {
            line_count,
            viewport: clamp(viewport, line_count),
            gutters: Vec::new(),
            line_numbers: true,
            markers: BTreeMap::new(),
            listeners: BTreeSet::new(),
            next_listener: 0,
            refresh_pending: false,
            refresh_count: 0,
            depth: 0,
            layout_dirty: false,
            layout_passes: 0,
            marker_writes: 0,
        }
    }

    /// Moves the viewport. Returns the new range when it changed and someone is subscribed,
    /// i.e. when a viewport-change notification must be delivered.
    pub fn scroll_to(&mut self, from: usize, to: usize) -> Option<Viewport> {
        let next = clamp(Viewport::new(from, to), self.line_count);
        if next == self.viewport {
            return None;
        }
        self.viewport = next;
        (!self.listeners.is_empty()).then_some(next)
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn gutters(&self) -> &[String] {
        &self.gutters
    }

    pub fn line_numbers_visible(&self) -> bool {
        self.line_numbers
    }

    /// Markers of `gutter_id` by line index.
    pub fn markers(&self, gutter_id: &str) -> Option<&BTreeMap<usize, M>> {
        self.markers.get(gutter_id)
    }

    pub fn marker(&self, gutter_id: &str, line: usize) -> Option<&M> {
        self.markers.get(gutter_id)?.get(&line)
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Runs the work deferred to the idle tick. Returns whether a refresh ran.
    pub fn run_idle(&mut self) -> bool {
        if std::mem::take(&mut self.refresh_pending) {
            self.refresh();
            true
        } else {
            false
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    /// Number of layout passes caused by marker changes.
    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    /// Number of `set_gutter_marker` calls so far.
    pub fn marker_writes(&self) -> usize {
        self.marker_writes
    }

    fn invalidate_layout(&mut self) {
        if self.depth > 0 {
            self.layout_dirty = true;
        } else {
            self.layout_passes += 1;
        }
    }
}

fn clamp(viewport: Viewport, line_count: usize) -> Viewport {
    let to = viewport.to.min(line_count);
    Viewport::new(viewport.from.min(to), to)
}

impl<M> GutterSurface for MemorySurface<M> {
    type Marker = M;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_gutter_marker(&mut self, line: usize, gutter_id: &str, marker: M) {
        self.markers
            .entry(gutter_id.to_string())
            .or_default()
            .insert(line, marker);
        self.marker_writes += 1;
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
    }

    fn refresh(&mut self) {
        self.refresh_count += 1;
    }

    fn schedule_refresh(&mut self) {
        self.refresh_pending = true;
    }

    fn operation<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        if self.depth == 0 && std::mem::take(&mut self.layout_dirty) {
            self.layout_passes += 1;
        }
        result
    }
}
