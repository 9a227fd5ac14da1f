/// Integration tests for the covgutter App using egui_kittest.
///
/// These tests exercise the full `eframe::App::update` loop through AccessKit queries.
mod common;

use covgutter_core::{GutterSurface, LineStatus, Navigator, ViewState, VIEW_KEY};
use egui::{Key, Modifiers};
use egui_kittest::kittest::Queryable;

use common::{create_harness, settle, Fixture};

const SOURCE: &str = "int a;\nint b;\nint c;\n";

fn ctrl_shift() -> Modifiers {
    Modifiers {
        ctrl: true,
        shift: true,
        ..Default::default()
    }
}

// ── A. Startup ─────────────────────────────────────────────────────────────

#[test]
fn test_initial_state_is_plain_editor() {
    let fx = Fixture::new(SOURCE, r#"{"a.c": [2]}"#);
    let harness = create_harness(fx.args());
    let app = harness.state();

    assert_eq!(app.view.state(), ViewState::Inactive);
    let code = app.view.surface().unwrap();
    assert!(code.line_numbers_visible());
    assert!(code.gutters().is_empty());
    harness.get_by_label("Coverage off");
    harness.get_by_label("Show coverage");
}

#[test]
fn test_missing_source_file_reports_error() {
    let fx = Fixture::new(SOURCE, "{}");
    let mut args = fx.args();
    args.source = Some(fx.dir.path().join("missing.c"));
    let harness = create_harness(args);
    let message = harness.state().status_message.clone().unwrap();
    assert!(message.contains("missing.c"));
}

// ── B. Toggling ────────────────────────────────────────────────────────────

#[test]
fn test_show_coverage_from_toolbar() {
    let fx = Fixture::new(SOURCE, r#"{"a.c": [2]}"#);
    let mut harness = create_harness(fx.args());

    harness.get_by_label("Show coverage").click();
    harness.run();
    settle(&mut harness);

    let app = harness.state();
    assert_eq!(app.view.state(), ViewState::Active);
    let code = app.view.surface().unwrap();
    assert_eq!(code.gutters(), ["coverage-gutter".to_string()].as_slice());
    assert!(!code.line_numbers_visible());
    assert_eq!(code.marker_count("coverage-gutter"), 3);
    assert_eq!(
        code.marker("coverage-gutter", 1).map(|m| m.status),
        Some(LineStatus::Covered)
    );
    assert_eq!(
        code.marker("coverage-gutter", 2).map(|m| m.status),
        Some(LineStatus::Uncovered)
    );
    assert!(app.view.navigator().query().is_coverage_view());

    harness.get_by_label("Coverage: 1/3 lines (33%)");
    harness.get_by_label("Matched: a.c");
    harness.get_by_label("Hide coverage");
}

#[test]
fn test_hide_coverage_restores_editor() {
    let fx = Fixture::new(SOURCE, r#"{"a.c": [2]}"#);
    let mut harness = create_harness(fx.args());
    harness.get_by_label("Show coverage").click();
    harness.run();
    settle(&mut harness);

    harness.get_by_label("Hide coverage").click();
    harness.run();

    let app = harness.state();
    assert_eq!(app.view.state(), ViewState::Inactive);
    let code = app.view.surface().unwrap();
    assert!(code.line_numbers_visible());
    assert!(code.gutters().is_empty());
    assert_eq!(code.marker_count("coverage-gutter"), 0);
    assert_eq!(app.view.navigator().query().get(VIEW_KEY), None);
    harness.get_by_label("Coverage off");
}

#[test]
fn test_shortcut_toggles_coverage() {
    let fx = Fixture::new(SOURCE, r#"{"a.c": [1]}"#);
    let mut harness = create_harness(fx.args());

    harness.key_press_modifiers(ctrl_shift(), Key::G);
    harness.run();
    settle(&mut harness);
    assert_eq!(harness.state().view.state(), ViewState::Active);

    harness.key_press_modifiers(ctrl_shift(), Key::G);
    harness.run();
    assert_eq!(harness.state().view.state(), ViewState::Inactive);
}

#[test]
fn test_unmatched_file_is_all_uncovered() {
    let fx = Fixture::new(SOURCE, r#"{"other.c": [1, 2, 3]}"#);
    let mut harness = create_harness(fx.args());
    harness.state_mut().show_coverage();
    settle(&mut harness);

    let code = harness.state().view.surface().unwrap();
    assert!((0..3).all(|line| {
        code.marker("coverage-gutter", line).map(|m| m.status) == Some(LineStatus::Uncovered)
    }));
    harness.get_by_label("No coverage entry for this file");
}

// ── C. Navigable state ─────────────────────────────────────────────────────

#[test]
fn test_view_state_is_restored_on_next_start() {
    let fx = Fixture::new(SOURCE, r#"{"a.c": [3]}"#);
    {
        let mut harness = create_harness(fx.args());
        harness.state_mut().show_coverage();
        settle(&mut harness);
        assert!(harness.state().view.navigator().query().is_coverage_view());
    }

    let mut harness = create_harness(fx.args());
    settle(&mut harness);
    let app = harness.state();
    assert_eq!(app.view.state(), ViewState::Active);
    assert_eq!(
        app.view
            .surface()
            .unwrap()
            .marker("coverage-gutter", 2)
            .map(|m| m.status),
        Some(LineStatus::Covered)
    );
}

#[test]
fn test_view_arg_requests_coverage() {
    let fx = Fixture::new(SOURCE, r#"{"a.c": [1]}"#);
    let mut args = fx.args();
    args.view = Some("coverage".to_string());
    let mut harness = create_harness(args);
    settle(&mut harness);
    assert_eq!(harness.state().view.state(), ViewState::Active);
}

#[test]
fn test_other_view_value_stays_inactive() {
    let fx = Fixture::new(SOURCE, r#"{"a.c": [1]}"#);
    let mut args = fx.args();
    args.view = Some("reports".to_string());
    let mut harness = create_harness(args);
    settle(&mut harness);
    let app = harness.state();
    assert_eq!(app.view.state(), ViewState::Inactive);
    assert_eq!(app.view.navigator().query().get(VIEW_KEY), Some("reports"));
}

// ── D. Reloading ───────────────────────────────────────────────────────────

#[test]
fn test_loading_new_coverage_rerenders_active_view() {
    let fx = Fixture::new(SOURCE, r#"{"a.c": [1]}"#);
    let mut harness = create_harness(fx.args());
    harness.state_mut().show_coverage();
    settle(&mut harness);

    let second = fx.dir.path().join("second.json");
    std::fs::write(&second, r#"{"a.c": [3]}"#).unwrap();
    assert!(harness.state_mut().load_coverage(&second));
    settle(&mut harness);

    let code = harness.state().view.surface().unwrap();
    assert_eq!(
        code.marker("coverage-gutter", 0).map(|m| m.status),
        Some(LineStatus::Uncovered)
    );
    assert_eq!(
        code.marker("coverage-gutter", 2).map(|m| m.status),
        Some(LineStatus::Covered)
    );
}

#[test]
fn test_scrolling_renders_new_lines() {
    let source = "x;\n".repeat(400);
    let fx = Fixture::new(&source, r#"{"a.c": [300]}"#);
    let mut harness = create_harness(fx.args());
    harness.state_mut().show_coverage();
    settle(&mut harness);
    assert!(harness
        .state()
        .view
        .surface()
        .unwrap()
        .marker("coverage-gutter", 299)
        .is_none());

    harness
        .state_mut()
        .view
        .surface_mut()
        .unwrap()
        .scroll_to_line(290);
    harness.run();
    harness.run();

    let code = harness.state().view.surface().unwrap();
    assert!(code.viewport().contains(299));
    assert_eq!(
        code.marker("coverage-gutter", 299).map(|m| m.status),
        Some(LineStatus::Covered)
    );
}
