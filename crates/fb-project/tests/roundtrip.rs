use fb_project::schema::*;
use fb_project::{ProjectError, load, load_json, load_yaml, save_json, save_yaml, validate_project};

#[test]
fn roundtrip_yaml_default_project() {
    let project = Project::new("Default Linkage");
    validate_project(&project).unwrap();

    let path = std::env::temp_dir().join("fb_project_roundtrip_default.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json_custom_project() {
    let mut project = Project::new("Crossed");
    project.mechanism.branch = BranchDef::Crossed;
    project.mechanism.lengths.input = 45.0;
    project.mechanism.dashpot = DashpotDef {
        anchor: [0.0, -20.0],
        link: LinkDef::Coupler,
        fraction: 0.25,
    };
    project.run.max_ticks = None;
    // Short decimals keep the JSON float round trip exact
    project.run.equilibrium_angle_rad = 1.5;
    project.run.initial_angle_rad = 3.0;
    project.gate = GateDef {
        min_angle_deg: 30.0,
        max_angle_deg: 150.0,
    };

    let path = std::env::temp_dir().join("fb_project_roundtrip_custom.json");
    save_json(&path, &project).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(project, loaded);

    // Extension picks the format
    assert_eq!(load(&path).unwrap(), project);
}

#[test]
fn minimal_yaml_fills_defaults() {
    let yaml = "version: 1\nname: Minimal\nrun:\n  damping_coefficient: 2.5\n";
    let project: Project = serde_yaml::from_str(yaml).unwrap();
    validate_project(&project).unwrap();
    assert_eq!(project.mechanism, MechanismDef::default());
    assert_eq!(project.run.damping_coefficient, 2.5);
    assert_eq!(project.run.mass, 10.0);
    assert_eq!(project.gate, GateDef::default());
}

#[test]
fn save_refuses_invalid_project() {
    let mut project = Project::new("Broken");
    project.mechanism.lengths.output = -3.0;
    let path = std::env::temp_dir().join("fb_project_invalid.yaml");
    let err = save_yaml(&path, &project).unwrap_err();
    assert!(matches!(err, ProjectError::Validation(_)));
}

#[test]
fn load_rejects_invalid_file() {
    let path = std::env::temp_dir().join("fb_project_load_invalid.yaml");
    std::fs::write(&path, "version: 1\nname: Bad\ngate:\n  min_angle_deg: -5.0\n").unwrap();
    assert!(matches!(load_yaml(&path), Err(ProjectError::Validation(_))));
}

#[test]
fn demo_project_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/default.yaml");
    let project = load_yaml(&path).unwrap();
    assert_eq!(project.version, 1);
    assert_eq!(project.mechanism.lengths, LengthsDef::default());
}

#[test]
fn unlimited_run_survives_yaml_roundtrip() {
    let mut project = Project::new("Until settled");
    project.run.max_ticks = None;

    let path = std::env::temp_dir().join("fb_project_roundtrip_unlimited.yaml");
    save_yaml(&path, &project).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("max_ticks: null"));

    let loaded = load_yaml(&path).unwrap();
    assert_eq!(loaded.run.max_ticks, None);
    assert_eq!(loaded, project);
}
