use std::path::PathBuf;
use std::time::Duration;

use covgutter_ui::{App, StartupArgs};
use egui_kittest::Harness;
use tempfile::TempDir;

/// Source and coverage files in a temp dir, with config and state kept there too.
pub struct Fixture {
    pub dir: TempDir,
    pub source: PathBuf,
    pub coverage: PathBuf,
}

impl Fixture {
    pub fn new(source: &str, coverage_json: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let source_path = dir.path().join("a.c");
        std::fs::write(&source_path, source).expect("write source");
        let coverage_path = dir.path().join("coverage.json");
        std::fs::write(&coverage_path, coverage_json).expect("write coverage");
        Self {
            dir,
            source: source_path,
            coverage: coverage_path,
        }
    }

    pub fn args(&self) -> StartupArgs {
        StartupArgs {
            source: Some(self.source.clone()),
            coverage: Some(self.coverage.clone()),
            view: None,
            state_path: Some(self.dir.path().join("state.redb")),
            config_path: Some(self.dir.path().join("covgutter.json")),
        }
    }
}

/// Creates a standard test harness with the app at 1024x768.
pub fn create_harness(args: StartupArgs) -> Harness<'static, App> {
    Harness::builder()
        .with_size(egui::Vec2::new(1024.0, 768.0))
        .build_eframe(move |cc| App::new(cc, args.clone()))
}

/// Waits for background loads and lets the resulting frames run.
pub fn settle(harness: &mut Harness<'static, App>) {
    assert!(harness
        .state_mut()
        .settle_loads(Duration::from_secs(5)));
    harness.run();
}
