use std::path::{Path, PathBuf};

use ggxf_model::{ContentType, EvalError};
use ggxf_project::{LoadOptions, open_model};

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name)
}

fn close(actual: &[f64], expected: &[f64]) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| (a - e).abs() < 1e-12)
}

#[test]
fn nested_geoid_loads_and_evaluates() {
    let loaded = open_model(&demo("nested_geoid.yaml"), &LoadOptions::default())
        .unwrap_or_else(|e| panic!("Failed to load nested_geoid.yaml: {e}"));
    assert!(loaded.errors.is_empty());
    let model = loaded.model;
    assert_eq!(model.content(), ContentType::GeoidModel);
    assert_eq!(model.metadata()["title"], "Nested geoid demonstration");
    assert_eq!(model.metadata()["ggxfVersion"], "1.0");

    let at = |x: f64, y: f64| model.evaluate((x, y), None, None).unwrap();
    assert!(close(&at(170.5, -44.5).unwrap(), &[11.5]));
    assert!(close(&at(173.0, -42.0).unwrap(), &[19.0]));
    assert!(close(&at(171.5, -43.5).unwrap(), &[100.0]));
    assert_eq!(at(180.0, 0.0), None);

    let names: Vec<_> = model.grids().map(|(_, grid)| grid.name().to_string()).collect();
    assert_eq!(names, ["national", "city"]);
    let city = model.grids().find(|(_, g)| g.name() == "city").map(|(_, g)| g).unwrap();
    assert_eq!(city.display_id(), "0:0:0");
}

#[test]
fn deformation_demo_sums_active_groups() {
    let loaded = open_model(&demo("deformation.json"), &LoadOptions::default())
        .unwrap_or_else(|e| panic!("Failed to load deformation.json: {e}"));
    let model = loaded.model;
    assert!(model.needs_epoch());
    assert_eq!(model.groups().len(), 2);

    assert_eq!(
        model.evaluate((5.0, 5.0), None, None),
        Err(EvalError::EpochRequired {
            content: ContentType::DeformationModel
        })
    );
    let before = model.evaluate((5.0, 5.0), Some(2005.0), None).unwrap().unwrap();
    assert!(close(&before, &[0.05, 0.1, 0.0]), "{before:?}");
    let after = model.evaluate((5.0, 5.0), Some(2012.0), None).unwrap().unwrap();
    assert!(close(&after, &[0.12, 0.24, -0.5]), "{after:?}");
}

#[test]
fn loaded_parameters_carry_their_set_tags() {
    let loaded = open_model(&demo("deformation.json"), &LoadOptions::default()).unwrap();
    let tags: Vec<_> = loaded
        .model
        .parameters()
        .iter()
        .map(|p| p.parameter_set())
        .collect();
    assert_eq!(tags, [Some("displacement"); 3]);

    let summary = loaded.model.summary();
    let quake = summary.groups.iter().find(|g| g.parameters == ["displacementUp"]).unwrap();
    assert_eq!(
        quake.grids[0].parameters[0].parameter_set.as_deref(),
        Some("displacement")
    );
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["parameters"][0]["parameterSet"], "displacement");
}

#[test]
fn unknown_extension_is_rejected() {
    let err = open_model(&demo("nested_geoid.txt"), &LoadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("Unsupported file type"), "{err}");
}
