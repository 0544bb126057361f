use std::sync::Arc;

use vc_engine::Calculator;
use vc_project::schema::*;
use vc_project::{Project, ProjectError, load_json, load_yaml, save_json, save_yaml};
use vc_units::{FlowrateUnit, HeadUnit, Units, ViscosityUnit};

fn sample() -> ProjectFile {
    ProjectFile::new(
        "Transfer pump",
        InputsDef {
            flowrate: "1666.6666".to_string(),
            total_head: "328.08".to_string(),
            viscosity: "100".to_string(),
            density: "0".to_string(),
        },
        Units {
            flowrate: FlowrateUnit::LitersPerMinute,
            head: HeadUnit::Feet,
            viscosity: ViscosityUnit::Centistokes,
            ..Units::default()
        },
    )
}

#[test]
fn roundtrip_yaml() {
    let path = std::env::temp_dir().join("vc_project_roundtrip.yaml");
    save_yaml(&path, &sample()).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(loaded, sample());
}

#[test]
fn roundtrip_json() {
    let path = std::env::temp_dir().join("vc_project_roundtrip.json");
    save_json(&path, &sample()).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(loaded, sample());
}

#[test]
fn old_yaml_is_migrated() {
    let yaml = r#"
version: 1
name: legacy
inputs:
  flowrate: "100"
  total_head: "100"
  viscosity: "100"
  density: ""
precision: 0
"#;
    let path = std::env::temp_dir().join("vc_project_legacy.yaml");
    std::fs::write(&path, yaml).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(loaded.version, vc_project::LATEST_VERSION);
    assert_eq!(loaded.precision, 17);
    assert_eq!(loaded.inputs.density, "0");
    assert_eq!(loaded.units, Units::default());
}

#[test]
fn invalid_input_is_rejected_on_load() {
    let yaml = r#"
version: 2
name: broken
inputs:
  flowrate: "one hundred"
  total_head: "100"
  viscosity: "100"
"#;
    let path = std::env::temp_dir().join("vc_project_broken.yaml");
    std::fs::write(&path, yaml).unwrap();
    assert!(matches!(load_yaml(&path), Err(ProjectError::Validation(_))));
}

#[test]
fn loaded_file_drives_the_facade() {
    let path = std::env::temp_dir().join("vc_project_facade.yaml");
    save_yaml(&path, &sample()).unwrap();
    let file = load_yaml(&path).unwrap();

    let project = Project::from_file(Arc::new(Calculator::default()), &file).unwrap();
    let converted = project.converted();
    assert!((converted.flowrate.to_f64() - 100.0).abs() < 1e-3);
    assert!((converted.total_head.to_f64() - 100.0).abs() < 1e-2);

    let factors = project.factors();
    assert!(factors.is_ok());
    assert!((factors.q - 0.98).abs() <= 0.01);
    assert_eq!(project.to_file(), file);
}
