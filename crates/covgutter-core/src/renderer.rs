//! Incremental gutter-marker renderer.
//!
//! Markers are created only for lines that don't have one yet, so repeated
//! and overlapping range requests (one per viewport change while scrolling)
//! cost O(newly visible lines).

use covgutter_config::CoveragePalette;

use crate::{CoverageRecord, GutterSurface, MarkerCache, MarkerFactory};

#[derive(Debug, Clone)]
pub struct GutterRenderer {
    gutter_id: String,
    palette: CoveragePalette,
    cache: MarkerCache,
}

impl GutterRenderer {
    pub fn new(gutter_id: impl Into<String>, palette: CoveragePalette) -> Self {
        Self {
            gutter_id: gutter_id.into(),
            palette,
            cache: MarkerCache::new(),
        }
    }

    pub fn gutter_id(&self) -> &str {
        &self.gutter_id
    }

    pub fn palette(&self) -> &CoveragePalette {
        &self.palette
    }

    pub fn cache(&self) -> &MarkerCache {
        &self.cache
    }

    /// Forgets every rendered line. The gutter itself is left untouched.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Renders markers for zero-based lines `from..to` in one batched surface
    /// operation, then schedules a refresh for the next idle tick.
    ///
    /// Returns the number of markers created.
    pub fn render_range<S, F>(
        &mut self,
        surface: &mut S,
        factory: &mut F,
        record: &CoverageRecord,
        from: usize,
        to: usize,
    ) -> usize
    where
        S: GutterSurface,
        F: MarkerFactory<S::Marker>,
    {
        if from > to {
            tracing::debug!("Ignoring inverted gutter range {from}..{to}");
            return 0;
        }

        let pending: Vec<usize> = self.cache.missing(from, to).collect();
        let created = pending.len();

        if created > 0 {
            let gutter_id = self.gutter_id.as_str();
            let palette = &self.palette;
            let cache = &mut self.cache;
            surface.operation(|s| {
                for line in pending {
                    let line_number = line + 1;
                    let status = record.status_of(line_number);
                    let marker = factory.create(line_number, status, status.color_in(palette));
                    s.set_gutter_marker(line, gutter_id, marker);
                    cache.mark(line);
                }
            });
            tracing::trace!("Rendered {created} coverage marker(s) in {from}..{to}");
        }

        surface.schedule_refresh();
        created
    }
}
