//! Main application state and eframe integration.
//!
//! The app owns one [`SourceView`]: a [`CodeView`] of the source file plus the
//! coverage view driving its gutter. Coverage loads run on a small tokio
//! runtime and come back over a channel, polled at the start of every frame.

mod status_bar;
mod toolbar;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use covgutter_config::{CoverageConfig, ViewStateStore};
use covgutter_core::{
    CoverageMap, CoverageView, LoadedCoverage, Navigator, PendingCoverage, ViewState, VIEW_KEY,
};
use eframe::egui;
use tokio::runtime::Runtime;

use crate::{CodeView, EguiMarkerFactory, StoreNavigator};

/// Coverage view over the egui code view.
pub type SourceView = CoverageView<CodeView, EguiMarkerFactory, StoreNavigator>;

/// Startup arguments passed from the CLI.
#[derive(Debug, Default, Clone)]
pub struct StartupArgs {
    /// Source file to show.
    pub source: Option<PathBuf>,
    /// Coverage info file: JSON, lcov `.info` or `.gcov`.
    pub coverage: Option<PathBuf>,
    /// Initial `view` query value, e.g. `coverage`.
    pub view: Option<String>,
    /// View state database. Defaults to [`ViewStateStore::state_path`].
    pub state_path: Option<PathBuf>,
    /// Config file. Defaults to [`CoverageConfig::config_path`].
    pub config_path: Option<PathBuf>,
}

pub struct App {
    pub view: SourceView,
    pub config: CoverageConfig,
    /// Loaded coverage info, shared with in-flight loads.
    pub coverage: Option<Arc<CoverageMap>>,
    pub coverage_path: Option<PathBuf>,
    /// Last error or notice shown in the status bar.
    pub status_message: Option<String>,
    runtime: Option<Runtime>,
    loads_tx: Sender<LoadedCoverage>,
    loads_rx: Receiver<LoadedCoverage>,
    pending_loads: usize,
    ctx: Option<egui::Context>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, args: StartupArgs) -> Self {
        Self::build(args, Some(cc.egui_ctx.clone()))
    }

    /// Builds the app without a window, e.g. for tests.
    pub fn headless(args: StartupArgs) -> Self {
        Self::build(args, None)
    }

    fn build(args: StartupArgs, ctx: Option<egui::Context>) -> Self {
        let config_path = args
            .config_path
            .clone()
            .unwrap_or_else(CoverageConfig::config_path);
        let config = CoverageConfig::load_or_create(&config_path);
        let mut status_message = None;

        let code = match &args.source {
            Some(path) => match CodeView::from_file(path, config.font_size) {
                Ok(code) => code,
                Err(e) => {
                    tracing::warn!("{e:#}");
                    status_message = Some(format!("{e:#}"));
                    CodeView::empty(config.font_size)
                }
            },
            None => CodeView::empty(config.font_size),
        };
        let source_file = args.source.as_ref().map(|p| p.display().to_string());

        let state_path = args
            .state_path
            .clone()
            .unwrap_or_else(ViewStateStore::state_path);
        let store = match ViewStateStore::open(&state_path) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("Failed to open view state store, view state won't persist: {e:#}");
                None
            }
        };
        let navigator = StoreNavigator::open(store, source_file.clone().unwrap_or_default());

        let mut view = CoverageView::new(EguiMarkerFactory, navigator, &config);
        view.attach(code);
        view.set_source_file(source_file);

        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("covgutter-load")
            .enable_time()
            .build()
        {
            Ok(rt) => Some(rt),
            Err(e) => {
                tracing::warn!("Failed to start load runtime, loading inline: {e}");
                None
            }
        };
        let (loads_tx, loads_rx) = mpsc::channel();

        let mut app = Self {
            view,
            config,
            coverage: None,
            coverage_path: None,
            status_message,
            runtime,
            loads_tx,
            loads_rx,
            pending_loads: 0,
            ctx,
        };

        if let Some(path) = &args.coverage {
            app.load_coverage(path);
        }
        if let Some(value) = &args.view {
            app.set_view_query(value);
        }
        if app.config.restore_view || args.view.is_some() {
            app.restore_view();
        } else {
            app.forget_view_request();
        }
        app
    }

    /// Loads coverage info from `path`. An active view switches to the new map.
    pub fn load_coverage(&mut self, path: &Path) -> bool {
        match CoverageMap::load(path) {
            Ok(map) => {
                self.coverage = Some(Arc::new(map));
                self.coverage_path = Some(path.to_path_buf());
                self.status_message = None;
                if self.view.state() != ViewState::Inactive {
                    self.show_coverage();
                }
                true
            }
            Err(e) => {
                tracing::warn!("{e:#}");
                self.status_message = Some(format!("{e:#}"));
                false
            }
        }
    }

    /// Starts showing coverage. Returns `false` when there is nothing to show.
    pub fn show_coverage(&mut self) -> bool {
        let Some(pending) = self.view.enable(self.coverage.clone()) else {
            if self.status_message.is_none() {
                self.status_message = Some("No coverage loaded".to_string());
            }
            return false;
        };
        self.status_message = None;
        self.dispatch(pending);
        true
    }

    pub fn hide_coverage(&mut self) {
        self.view.disable();
    }

    pub fn toggle_coverage(&mut self) {
        match self.view.state() {
            ViewState::Inactive => {
                self.show_coverage();
            }
            ViewState::Loading | ViewState::Active => self.hide_coverage(),
        }
    }

    /// Number of loads dispatched but not yet received.
    pub fn pending_loads(&self) -> usize {
        self.pending_loads
    }

    /// Applies every finished load.
    pub fn poll_loads(&mut self) {
        while let Ok(loaded) = self.loads_rx.try_recv() {
            self.receive(loaded);
        }
    }

    /// Blocks until every dispatched load has been applied or `timeout` elapses.
    /// Returns whether all loads settled.
    pub fn settle_loads(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending_loads > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.loads_rx.recv_timeout(remaining) {
                Ok(loaded) => self.receive(loaded),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
        true
    }

    fn receive(&mut self, loaded: LoadedCoverage) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
        self.view.finish_enable(loaded);
    }

    fn dispatch(&mut self, pending: PendingCoverage) {
        let Some(runtime) = &self.runtime else {
            let loaded = pending.resolve_now();
            self.view.finish_enable(loaded);
            return;
        };
        let tx = self.loads_tx.clone();
        let ctx = self.ctx.clone();
        runtime.spawn(async move {
            let loaded = pending.load().await;
            if tx.send(loaded).is_err() {
                tracing::debug!("Coverage load finished after the app closed");
            }
            if let Some(ctx) = ctx {
                ctx.request_repaint();
            }
        });
        self.pending_loads += 1;
    }

    fn set_view_query(&mut self, value: &str) {
        let navigator = self.view.navigator_mut();
        let query = navigator.query().merged(VIEW_KEY, Some(value));
        if let Err(e) = navigator.replace_query(query) {
            tracing::warn!("{e:#}");
        }
    }

    /// Re-enters coverage view when the navigable state asks for it.
    fn restore_view(&mut self) {
        if !SourceView::is_requested(&self.view.navigator().query()) {
            return;
        }
        if !self.show_coverage() {
            // Nothing to show: drop the stale request so state matches the gutter.
            self.view.disable();
        }
    }

    /// Drops a stored coverage request that startup won't honor, so the
    /// navigable state matches the plain gutter.
    fn forget_view_request(&mut self) {
        if SourceView::is_requested(&self.view.navigator().query()) {
            tracing::debug!("Not restoring coverage view; clearing the stored request");
            self.view.disable();
        }
    }

    fn deliver_viewport_changes(&mut self) {
        let changes = self
            .view
            .surface_mut()
            .map(CodeView::take_viewport_changes)
            .unwrap_or_default();
        for viewport in changes {
            self.view.viewport_changed(viewport.from, viewport.to);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ctx = Some(ctx.clone());
        self.poll_loads();
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.show_toolbar(ui));
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.show_status_bar(ui));
        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                if let Some(code) = self.view.surface_mut() {
                    code.show(ui);
                }
            });

        self.deliver_viewport_changes();
    }

    // Required by eframe 0.34; all rendering happens in `update`, which
    // eframe still calls immediately before `ui` each frame.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}
}
