use ggxf_model::{ConfigError, ModelError, StructuralError};
use ggxf_project::{LoadOptions, ProjectError, build_model, parse_yaml_str};

fn grid(name: &str, x0: f64, extra: &str) -> String {
    format!(
        "      - gridName: {name}\n        iNodeCount: 3\n        jNodeCount: 3\n        affineCoeffs: [{x0}, 1.0, 0.0, 0.0, 0.0, 1.0]\n        data: [1, 1, 1, 1, 1, 1, 1, 1, 1]\n{extra}"
    )
}

fn group(name: &str, parameter: &str, grids: &[String]) -> String {
    format!(
        "  - ggxfGroupName: {name}\n    parameters:\n      - parameterName: {parameter}\n        unit: metre\n    interpolationMethod: bilinear\n    grids:\n{}",
        grids.concat()
    )
}

fn document(groups: &[String]) -> String {
    format!("content: geoidModel\nggxfGroups:\n{}", groups.concat())
}

fn structural(err: ProjectError) -> StructuralError {
    match err {
        ProjectError::Model(ModelError::Structural(err)) => err,
        other => panic!("expected a structural error, got {other}"),
    }
}

#[test]
fn parent_may_appear_after_child() {
    let text = document(&[group(
        "g",
        "geoidHeight",
        &[
            grid("inner", 10.0, "        parentGridName: outer\n"),
            grid("outer", 10.0, ""),
        ],
    )]);
    let document = parse_yaml_str(&text).unwrap();
    let loaded = build_model(&document, &LoadOptions::default()).unwrap();
    let group = &loaded.model.groups()[0];
    let inner = group.grid_at((11.0, 1.0)).unwrap().unwrap();
    assert_eq!(inner.name(), "inner");
    assert_eq!(inner.display_id(), "0:0:0");
}

#[test]
fn unknown_parent_is_structural() {
    let text = document(&[group(
        "g",
        "geoidHeight",
        &[grid("orphan", 0.0, "        parentGridName: nowhere\n")],
    )]);
    let document = parse_yaml_str(&text).unwrap();
    let err = build_model(&document, &LoadOptions::default()).unwrap_err();
    assert_eq!(
        structural(err),
        StructuralError::UnknownParent {
            grid: "orphan".into(),
            parent: "nowhere".into()
        }
    );
}

#[test]
fn parent_in_another_group_is_rejected() {
    let text = document(&[
        group("first", "geoidHeight", &[grid("base", 0.0, "")]),
        group(
            "second",
            "geoidHeightUncertainty",
            &[grid("detail", 0.5, "        parentGridName: base\n")],
        ),
    ]);
    let document = parse_yaml_str(&text).unwrap();
    let err = build_model(&document, &LoadOptions::default()).unwrap_err();
    assert_eq!(
        structural(err),
        StructuralError::CrossGroupNesting {
            grid: "detail".into(),
            parent: "base".into(),
            parent_group: "first".into()
        }
    );
}

fn timed_group(name: &str, grid_text: &str) -> String {
    format!(
        "  - ggxfGroupName: {name}\n    parameters:\n      - parameterName: geoidHeight\n    interpolationMethod: bilinear\n    timeFunctions:\n      - functionType: wobble\n    grids:\n{grid_text}"
    )
}

#[test]
fn best_effort_keeps_good_groups() {
    let text = document(&[
        timed_group("timed", &grid("t", 0.0, "")),
        group("unknown", "undulation", &[grid("u", 20.0, "")]),
        group("good", "geoidHeight", &[grid("ok", 40.0, "")]),
    ]);
    let document = parse_yaml_str(&text).unwrap();

    assert!(build_model(&document, &LoadOptions::default()).is_err());

    let loaded = build_model(&document, &LoadOptions::best_effort()).unwrap();
    assert_eq!(loaded.errors.len(), 2);
    assert!(matches!(loaded.errors[0], ConfigError::TimeFunction { .. }));
    assert!(matches!(loaded.errors[1], ConfigError::DisallowedParameters { .. }));
    let names: Vec<_> = loaded.model.groups().iter().map(|g| g.name()).collect();
    assert_eq!(names, ["good"]);
}

#[test]
fn best_effort_still_rejects_singular_transform() {
    let singular = "      - gridName: flat\n        iNodeCount: 3\n        jNodeCount: 3\n        affineCoeffs: [0.0, 1.0, 2.0, 0.0, 2.0, 4.0]\n        data: [1, 1, 1, 1, 1, 1, 1, 1, 1]\n".to_string();
    let text = document(&[
        group("broken", "geoidHeight", &[singular]),
        group("good", "geoidHeight", &[grid("ok", 40.0, "")]),
    ]);
    let document = parse_yaml_str(&text).unwrap();
    let err = build_model(&document, &LoadOptions::best_effort()).unwrap_err();
    assert_eq!(
        structural(err),
        StructuralError::SingularTransform { grid: "flat".into() }
    );
}

#[test]
fn best_effort_still_rejects_short_data() {
    let short = "      - gridName: short\n        iNodeCount: 3\n        jNodeCount: 3\n        affineCoeffs: [0.0, 1.0, 0.0, 0.0, 0.0, 1.0]\n        data: [1, 2, 3, 4]\n".to_string();
    let text = document(&[
        group("shape", "geoidHeight", &[short]),
        group("good", "geoidHeight", &[grid("ok", 40.0, "")]),
    ]);
    let document = parse_yaml_str(&text).unwrap();
    let err = build_model(&document, &LoadOptions::best_effort()).unwrap_err();
    assert!(matches!(structural(err), StructuralError::MalformedData { .. }));
}

#[test]
fn best_effort_still_rejects_unknown_parent() {
    let text = document(&[
        group("broken", "geoidHeight", &[grid("bad", 0.0, "        parentGridName: nowhere\n")]),
        group("good", "geoidHeight", &[grid("ok", 40.0, "")]),
    ]);
    let document = parse_yaml_str(&text).unwrap();
    let err = build_model(&document, &LoadOptions::best_effort()).unwrap_err();
    assert!(matches!(structural(err), StructuralError::UnknownParent { .. }));
}

#[test]
fn inconsistent_parameter_units_are_reported() {
    let text = format!(
        "content: geoidModel\nparameters:\n  - parameterName: geoidHeight\n    unit: foot\n    unitSiRatio: 0.3048\nggxfGroups:\n{}",
        group("g", "geoidHeight", &[grid("a", 0.0, "")])
    );
    let document = parse_yaml_str(&text).unwrap();
    let err = build_model(&document, &LoadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Model(ModelError::Config(ConfigError::InconsistentParameter { .. }))
    ));
}

#[test]
fn bad_time_function_is_a_configuration_error() {
    let text = "content: deformationModel\nggxfGroups:\n  - ggxfGroupName: d\n    parameters:\n      - parameterName: displacementUp\n    interpolationMethod: bilinear\n    timeFunctions:\n      - functionType: wobble\n    grids: []\n";
    let document = parse_yaml_str(text).unwrap();
    let err = build_model(&document, &LoadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Model(ModelError::Config(ConfigError::TimeFunction { .. }))
    ));
}
