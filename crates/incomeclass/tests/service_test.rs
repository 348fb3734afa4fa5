//! End-to-end tests using the demo artifacts.

use incomeclass::{
    BatchTable, FeatureRecord, IncomeBracket, PredictionService, ServiceConfig, ServiceError,
    UnknownLabelPolicy, output::PREDICTION_COLUMN,
};
use rstest::{fixture, rstest};
use std::path::PathBuf;

fn demo(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(file)
}

#[fixture]
fn config() -> ServiceConfig {
    ServiceConfig {
        model_path: demo("best_model.json"),
        schema_path: Some(demo("encoding_schema.json")),
        unknown_labels: UnknownLabelPolicy::Reject,
    }
}

#[fixture]
fn service(config: ServiceConfig) -> PredictionService {
    PredictionService::load(&config).unwrap()
}

#[rstest]
fn test_reference_record(service: PredictionService) {
    let record = FeatureRecord {
        workclass: "Private".to_string(),
        gender: "Female".to_string(),
        race: "White".to_string(),
        relationship: "Not-in-family".to_string(),
        marital_status: "Never-married".to_string(),
        occupation: "Adm-clerical".to_string(),
        native_country: "United-States".to_string(),
        ..FeatureRecord::default()
    };

    let prediction = service.predict(&record).unwrap();

    assert_eq!(prediction.encoded.workclass, 4);
    assert_eq!(prediction.encoded.gender, 0);
    assert_eq!(prediction.encoded.race, 4);
    assert_eq!(prediction.encoded.relationship, 3);
    assert_eq!(prediction.encoded.marital_status, 2);
    assert_eq!(prediction.encoded.occupation, 0);
    assert_eq!(prediction.encoded.native_country, 39);
    assert_eq!(prediction.encoded.fnlwgt, 50_000);
    assert_eq!(prediction.bracket, IncomeBracket::AtOrBelow);
}

#[rstest]
fn test_batch_prediction(service: PredictionService) {
    let input = std::fs::read_to_string(demo("employees.csv")).unwrap();
    let table = BatchTable::from_reader(input.as_bytes()).unwrap();
    let original_rows = table.rows().to_vec();

    let predicted = service.predict_table(table).unwrap();

    assert_eq!(predicted.len(), original_rows.len());
    assert_eq!(predicted.headers().len(), 14);
    assert_eq!(&predicted.headers()[13], PREDICTION_COLUMN);

    for (before, after) in original_rows.iter().zip(predicted.rows()) {
        assert_eq!(after.len(), before.len() + 1);
        for (i, cell) in before.iter().enumerate() {
            assert_eq!(&after[i], cell);
        }
    }

    let labels: Vec<&str> = predicted.rows().iter().map(|row| &row[13]).collect();
    assert_eq!(labels, vec!["<=50K", ">50K", "<=50K", ">50K", "<=50K"]);
}

#[rstest]
fn test_batch_and_interactive_agree(service: PredictionService) {
    let table = BatchTable::from_path(demo("employees.csv")).unwrap();
    let records = table.feature_records().unwrap();
    let predicted = service.predict_table(table).unwrap();

    for (record, row) in records.iter().zip(predicted.rows()) {
        let single = service.predict(record).unwrap();
        assert_eq!(single.bracket.to_string(), &row[13]);
    }
}

#[rstest]
fn test_batch_unknown_label(service: PredictionService) {
    let mut input = std::fs::read_to_string(demo("employees.csv")).unwrap();
    input = input.replacen("Self-emp-not-inc", "Freelance", 1);
    let table = BatchTable::from_reader(input.as_bytes()).unwrap();

    let err = service.predict_table(table).unwrap_err();

    assert!(matches!(err, ServiceError::EncodeRow { row: 3, .. }));
    assert_eq!(err.to_string(), "Row 3: Unknown workclass label 'Freelance'");
}

#[rstest]
fn test_fallback_policy(mut config: ServiceConfig) {
    config.unknown_labels = UnknownLabelPolicy::Fallback;
    let service = PredictionService::load(&config).unwrap();
    let record = FeatureRecord {
        workclass: "Freelance".to_string(),
        native_country: "Atlantis".to_string(),
        ..FeatureRecord::default()
    };

    let prediction = service.predict(&record).unwrap();

    assert_eq!(prediction.encoded.workclass, 8);
    assert_eq!(prediction.encoded.native_country, 100);
}

#[rstest]
fn test_missing_model_is_fatal(mut config: ServiceConfig) {
    config.model_path = demo("no_such_model.json");
    let err = PredictionService::load(&config).unwrap_err();
    assert!(matches!(err, ServiceError::Model(_)));
}

#[test]
fn test_builtin_schema_when_unset() {
    let config = ServiceConfig {
        model_path: demo("best_model.json"),
        ..ServiceConfig::default()
    };
    let service = PredictionService::load(&config).unwrap();
    assert_eq!(service.schema(), &incomeclass::EncodingSchema::builtin());
}
