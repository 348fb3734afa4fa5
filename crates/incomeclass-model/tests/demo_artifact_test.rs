//! Tests against the demo artifact shipped in `demos/`.

use approx::assert_relative_eq;
use incomeclass_model::{IncomeBracket, ModelArtifact, load_model};
use ndarray::array;

const DEMO_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/best_model.json");

#[test]
fn test_demo_artifact_loads() {
    let model = load_model(DEMO_MODEL).unwrap();
    assert_eq!(model.name(), "logistic_regression");
    assert_eq!(model.columns().len(), 13);
    assert_eq!(model.columns()[0], "age");
    assert_eq!(model.columns()[12], "native-country");
    assert_relative_eq!(model.threshold(), 0.5);
}

#[test]
fn test_demo_artifact_predicts() {
    let model = load_model(DEMO_MODEL).unwrap();
    let rows = array![
        // young, single, clerical
        [30.0, 4.0, 50_000.0, 10.0, 2.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 40.0, 39.0],
        // senior manager with capital gains
        [52.0, 4.0, 200_000.0, 16.0, 1.0, 5.0, 2.0, 4.0, 1.0, 15_024.0, 0.0, 60.0, 39.0],
    ];

    let probabilities = model.probabilities(rows.view()).unwrap();
    assert!(probabilities[0] < 0.1);
    assert!(probabilities[1] > 0.99);

    let labels = model.predict(rows.view()).unwrap();
    assert_eq!(labels, vec![IncomeBracket::AtOrBelow, IncomeBracket::Above]);
}

#[test]
fn test_demo_artifact_reserializes() {
    let json = std::fs::read_to_string(DEMO_MODEL).unwrap();
    let artifact = ModelArtifact::from_json(&json).unwrap();
    let again = ModelArtifact::from_json(&artifact.to_json().unwrap()).unwrap();
    assert_eq!(again, artifact);
}
