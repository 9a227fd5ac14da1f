//! Coverage view controller.
//!
//! `CoverageView` switches an editor surface between its normal line-number
//! gutter and the coverage gutter, keeps the markers in step with the
//! viewport, and mirrors the mode into navigable state as `view=coverage`.
//!
//! Enabling is split in two so the coverage lookup can run on whatever
//! executor the host uses:
//!
//! ```ignore
//! if let Some(pending) = view.enable(Some(map)) {
//!     let loaded = pending.load().await;
//!     view.finish_enable(loaded);
//! }
//! ```
//!
//! Each `enable`/`disable` starts a new session. A load that settles after a
//! newer session started is dropped, so the latest request always wins.

use std::sync::Arc;
use std::time::Duration;

use covgutter_config::CoverageConfig;

use crate::{
    load_info, resolve, CoverageMap, CoverageRecord, GutterRenderer, GutterSurface, ListenerId,
    MarkerCache, MarkerFactory, Navigator, QueryState, COVERAGE_VIEW, VIEW_KEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Inactive,
    /// Coverage lookup in flight.
    Loading,
    Active,
}

/// Identifies one enable/disable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

/// A coverage lookup started by [`CoverageView::enable`].
#[derive(Debug, Clone)]
pub struct PendingCoverage {
    token: SessionToken,
    file_path: String,
    map: Arc<CoverageMap>,
    delay: Duration,
}

impl PendingCoverage {
    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Runs the lookup.
    pub async fn load(self) -> LoadedCoverage {
        let record = load_info(Some(&self.file_path), Some(&self.map), self.delay).await;
        LoadedCoverage {
            token: self.token,
            record,
        }
    }

    /// Resolves synchronously, for hosts without an async executor.
    pub fn resolve_now(self) -> LoadedCoverage {
        LoadedCoverage {
            token: self.token,
            record: resolve(Some(&self.file_path), Some(&self.map)),
        }
    }
}

/// Result of a [`PendingCoverage`] lookup, ready for [`CoverageView::finish_enable`].
#[derive(Debug, Clone)]
pub struct LoadedCoverage {
    token: SessionToken,
    record: CoverageRecord,
}

impl LoadedCoverage {
    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn record(&self) -> &CoverageRecord {
        &self.record
    }
}

pub struct CoverageView<S, F, N>
where
    S: GutterSurface,
{
    surface: Option<S>,
    factory: F,
    navigator: N,
    source_file: Option<String>,
    coverage_map: Option<Arc<CoverageMap>>,
    record: Option<CoverageRecord>,
    renderer: GutterRenderer,
    listener: Option<ListenerId>,
    session: u64,
    state: ViewState,
    load_delay: Duration,
}

impl<S, F, N> CoverageView<S, F, N>
where
    S: GutterSurface,
    F: MarkerFactory<S::Marker>,
    N: Navigator,
{
    pub fn new(factory: F, navigator: N, config: &CoverageConfig) -> Self {
        Self {
            surface: None,
            factory,
            navigator,
            source_file: None,
            coverage_map: None,
            record: None,
            renderer: GutterRenderer::new(config.gutter_id.clone(), config.palette),
            listener: None,
            session: 0,
            state: ViewState::Inactive,
            load_delay: config.load_delay(),
        }
    }

    /// Attaches an editor surface, detaching (and restoring) any previous one.
    pub fn attach(&mut self, surface: S) -> Option<S> {
        let previous = self.detach();
        self.surface = Some(surface);
        previous
    }

    /// Hides coverage on the attached surface and hands it back.
    pub fn detach(&mut self) -> Option<S> {
        self.disable();
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Sets the displayed source file. Switching files turns coverage view off.
    pub fn set_source_file(&mut self, path: Option<String>) {
        if self.source_file == path {
            return;
        }
        if self.state != ViewState::Inactive {
            self.disable();
        }
        self.source_file = path;
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn record(&self) -> Option<&CoverageRecord> {
        self.record.as_ref()
    }

    pub fn coverage_map(&self) -> Option<&Arc<CoverageMap>> {
        self.coverage_map.as_ref()
    }

    pub fn cache(&self) -> &MarkerCache {
        self.renderer.cache()
    }

    pub fn gutter_id(&self) -> &str {
        self.renderer.gutter_id()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn is_subscribed(&self) -> bool {
        self.listener.is_some()
    }

    /// Whether `query` asks for coverage view.
    pub fn is_requested(query: &QueryState) -> bool {
        query.is_coverage_view()
    }

    /// Starts showing coverage from `map` for the current source file.
    ///
    /// Returns `None` without doing anything when there is no source file,
    /// no map or no attached surface. Otherwise the view enters
    /// [`ViewState::Loading`]; pass the loaded result to [`finish_enable`](Self::finish_enable).
    pub fn enable(&mut self, map: Option<Arc<CoverageMap>>) -> Option<PendingCoverage> {
        let Some(file_path) = self.source_file.clone() else {
            tracing::debug!("Coverage view not enabled: no source file");
            return None;
        };
        let Some(map) = map else {
            tracing::debug!("Coverage view not enabled: no coverage map");
            return None;
        };
        if self.surface.is_none() {
            tracing::debug!("Coverage view not enabled: no editor attached");
            return None;
        }

        self.coverage_map = Some(Arc::clone(&map));
        self.session += 1;
        self.state = ViewState::Loading;
        tracing::debug!("Loading coverage for {file_path} (session {})", self.session);

        Some(PendingCoverage {
            token: SessionToken(self.session),
            file_path,
            map,
            delay: self.load_delay,
        })
    }

    /// Installs a loaded record: switches the surface to the coverage gutter,
    /// renders the viewport and subscribes to viewport changes.
    ///
    /// Returns false when the result belongs to an outdated session or the
    /// surface has been detached in the meantime.
    pub fn finish_enable(&mut self, loaded: LoadedCoverage) -> bool {
        if loaded.token != SessionToken(self.session) {
            tracing::debug!(
                "Discarding coverage from session {:?}, current is {}",
                loaded.token,
                self.session
            );
            return false;
        }
        if self.surface.is_none() {
            self.state = ViewState::Inactive;
            return false;
        }

        self.record = Some(loaded.record);
        self.reset();

        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let gutter_id = self.renderer.gutter_id().to_string();
        surface.clear_gutter(&gutter_id);
        surface.set_gutters(&[gutter_id.as_str()]);
        surface.set_line_numbers(false);

        let viewport = surface.viewport();
        if let Some(record) = self.record.as_ref() {
            self.renderer.render_range(
                surface,
                &mut self.factory,
                record,
                viewport.from,
                viewport.to,
            );
            tracing::info!(
                "Coverage view on for {} ({} covered line(s))",
                record.file_name,
                record.covered_count()
            );
        }
        self.listener = Some(surface.subscribe_viewport());
        self.state = ViewState::Active;

        self.navigate(Some(COVERAGE_VIEW));
        true
    }

    /// `enable` + `load` + `finish_enable` in one go.
    pub async fn enable_now(&mut self, map: Option<Arc<CoverageMap>>) -> bool {
        match self.enable(map) {
            Some(pending) => {
                let loaded = pending.load().await;
                self.finish_enable(loaded)
            }
            None => false,
        }
    }

    /// Viewport-change notification from the surface. Renders markers for
    /// the newly visible lines while coverage view is subscribed.
    pub fn viewport_changed(&mut self, from: usize, to: usize) -> usize {
        if self.listener.is_none() {
            return 0;
        }
        let (Some(surface), Some(record)) = (self.surface.as_mut(), self.record.as_ref()) else {
            return 0;
        };
        self.renderer
            .render_range(surface, &mut self.factory, record, from, to)
    }

    /// Hides coverage and restores the default gutter. Also cancels any
    /// lookup still in flight.
    pub fn disable(&mut self) {
        if self.surface.is_none() {
            return;
        }

        self.session += 1;
        self.reset();
        if let Some(surface) = self.surface.as_mut() {
            surface.clear_gutter(self.renderer.gutter_id());
            surface.set_gutters(&[]);
            surface.set_line_numbers(true);
            surface.schedule_refresh();
        }
        self.record = None;
        if self.state != ViewState::Inactive {
            tracing::info!("Coverage view off");
        }
        self.state = ViewState::Inactive;

        self.navigate(None);
    }

    /// Drops the viewport subscription and the marker cache. Gutter options stay as they are.
    fn reset(&mut self) {
        if let Some(id) = self.listener.take() {
            if let Some(surface) = self.surface.as_mut() {
                surface.unsubscribe_viewport(id);
            }
        }
        self.renderer.reset();
    }

    fn navigate(&mut self, view: Option<&str>) {
        let query = self.navigator.query().merged(VIEW_KEY, view);
        if let Err(e) = self.navigator.replace_query(query) {
            tracing::debug!("Ignoring failed view state update: {e:#}");
        }
    }
}
