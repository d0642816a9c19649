use cellpick::{DensityPolicy, Error, GeoBounds, SelectionConfig};

#[test]
fn defaults_match_the_selection_form() {
    let cfg = SelectionConfig::default();
    assert_eq!(cfg.initial_density, 128);
    assert_eq!(cfg.min_cells_across, 4.0);
    assert_eq!(cfg.hover_pause_ms, 2);
    assert_eq!(cfg.density_policy(), DensityPolicy::default());
    assert!(cfg.deep_link_base.starts_with("http://www.openstreetmap.org/"));
}

#[test]
fn yaml_fills_missing_fields_with_defaults() {
    let cfg = SelectionConfig::from_yaml("min_cells_across: 16\ninitial_bounds: [10, -42, 11, -41]\n").unwrap();
    assert_eq!(cfg.min_cells_across, 16.0);
    assert_eq!(cfg.bounds(), GeoBounds::new(-42.0, 10.0, -41.0, 11.0));
    assert_eq!(cfg.initial_density, 128);
    // 16 cells across one degree.
    assert_eq!(cfg.density_policy().compute_density(&cfg.bounds()), 16);
}

#[test]
fn json_config_file_is_detected_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cellpick.json");
    std::fs::write(&path, r#"{"hover_pause_ms": 250, "deep_link_base": "https://osm.example/"}"#).unwrap();
    let cfg = SelectionConfig::load(&path).unwrap();
    assert_eq!(cfg.hover_pause_ms, 250);
    assert_eq!(cfg.deep_link_base, "https://osm.example/");
}

#[test]
fn yaml_config_file_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cellpick.yaml");
    std::fs::write(&path, "min_cells_across: [not, a, number]\n").unwrap();
    assert!(matches!(SelectionConfig::load(&path), Err(Error::Yaml(_))));
}
