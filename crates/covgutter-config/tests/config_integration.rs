use covgutter_config::{CoverageConfig, CoveragePalette, HexColor};

#[test]
fn test_load_creates_default_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covgutter.json");
    assert!(!path.exists());

    let config = CoverageConfig::load_or_create(&path);
    assert!(path.exists());
    assert_eq!(config, CoverageConfig::default());

    // File should contain valid JSON
    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["gutter_id"], "coverage-gutter");
    assert_eq!(parsed["palette"]["covered"], "#C8FFC8");
}

#[test]
fn test_load_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covgutter.json");
    let json = r##"{
        "palette": {
            "covered": "rgb(0, 128, 0)",
            "uncovered": "#800000",
            "not_executed": "#808080",
            "fallback": "#FFFFFF"
        },
        "gutter_id": "cov",
        "load_delay_ms": 150,
        "font_size": 18.0,
        "restore_view": false
    }"##;
    std::fs::write(&path, json).unwrap();

    let config = CoverageConfig::load_or_create(&path);
    assert_eq!(config.palette.covered, HexColor::rgb(0, 128, 0));
    assert_eq!(config.palette.uncovered, HexColor::rgb(128, 0, 0));
    assert_eq!(config.gutter_id, "cov");
    assert_eq!(config.load_delay_ms, 150);
    assert!((config.font_size - 18.0).abs() < f32::EPSILON);
    assert!(!config.restore_view);
}

#[test]
fn test_broken_json_returns_defaults_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covgutter.json");
    std::fs::write(&path, "{ this is not valid json }}}").unwrap();

    let config = CoverageConfig::load_or_create(&path);
    assert_eq!(config, CoverageConfig::default());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{ this is not valid json }}}"
    );
}

#[test]
fn test_invalid_color_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covgutter.json");
    std::fs::write(&path, r#"{"palette": {"covered": "green"}}"#).unwrap();

    let config = CoverageConfig::load_or_create(&path);
    assert_eq!(config.palette, CoveragePalette::LIGHT);
}

#[test]
fn test_load_sanitizes_out_of_range_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covgutter.json");
    std::fs::write(&path, r#"{"font_size": 500.0, "load_delay_ms": 999999}"#).unwrap();

    let config = CoverageConfig::load_or_create(&path);
    assert!((config.font_size - 72.0).abs() < f32::EPSILON);
    assert_eq!(config.load_delay_ms, 10_000);
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covgutter.json");
    let config = CoverageConfig {
        gutter_id: "lines".to_string(),
        load_delay_ms: 40,
        ..Default::default()
    };
    config.save(&path).unwrap();

    let loaded = CoverageConfig::load_or_create(&path);
    assert_eq!(loaded, config);
}
