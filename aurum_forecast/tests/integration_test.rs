use aurum_forecast::builder::ImputationPolicy;
use aurum_forecast::data::{DAY_OF_WEEK, INFLATION_RATE, YEAR};
use aurum_forecast::{
    ArtifactPaths, ForecastError, LoadOptions, PredictionContext, PredictionRequest,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FEATURES: &str = r#"["SPX", "year", "month", "day", "dayofweek", "inflation_rate"]"#;

// SPX has median 2100 and first-row value 1800; gold close has one gap
const DATASET: &str = "\
date,gold close,SPX,CPI
2014-01-02,1200.0,1800.0,233.0
2015-06-15,,2100.0,
2016-03-01,1250.0,1950.0,238.0
2018-07-02,1300.0,2700.0,251.0
2020-08-06,2000.0,3300.0,259.0
";

// Helper function to write a full set of artifacts into a temporary directory
fn write_artifacts(model: &str, features: &str, dataset: &str) -> (TempDir, ArtifactPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths {
        model: dir.path().join("model.json"),
        feature_list: dir.path().join("feature_cols.json"),
        dataset: dir.path().join("history.csv"),
    };

    fs::write(&paths.model, model).unwrap();
    fs::write(&paths.feature_list, features).unwrap();
    fs::write(&paths.dataset, dataset).unwrap();

    (dir, paths)
}

fn linear_model(intercept: f64, coefficients: &[f64]) -> String {
    serde_json::json!({
        "kind": "linear",
        "intercept": intercept,
        "coefficients": coefficients,
    })
    .to_string()
}

fn load(model: &str) -> (TempDir, PredictionContext) {
    let (dir, paths) = write_artifacts(model, FEATURES, DATASET);
    let context = PredictionContext::load(&paths, &LoadOptions::default()).unwrap();
    (dir, context)
}

#[test]
fn test_full_prediction_workflow() {
    // 1. Load artifacts: price depends on SPX only
    let (_dir, context) = load(&linear_model(100.0, &[0.5, 0.0, 0.0, 0.0, 0.0, 0.0]));

    // 2. Inspect the loaded snapshot
    assert_eq!(context.schema().len(), 6);
    assert_eq!(context.schema().median("SPX"), Some(2100.0));
    assert_eq!(context.model_name(), "Linear Regression");
    assert_eq!(context.imputation(), ImputationPolicy::Medians);

    // 3. Predict at the training-center year, where no correction applies
    let request = PredictionRequest::new(2015, 6, 15, 0.0).unwrap();
    let result = context.predict(&request).unwrap();

    assert_eq!(result.predicted_price, 1150.0);
    assert_eq!(result.year, 2015);
    assert_eq!(result.month, 6);
    assert_eq!(result.day, 15);
    assert_eq!(result.currency, "USD");
    assert_eq!(result.unit, "per troy ounce");
}

#[test]
fn test_center_year_with_flat_model() {
    let dataset = "date,gold close\n2014-01-02,1000.0\n2016-01-04,2000.0\n";
    let (_dir, paths) = write_artifacts(
        &linear_model(1300.0, &[0.0, 0.0, 0.0, 0.0]),
        r#"["year", "month", "day", "dayofweek"]"#,
        dataset,
    );
    let context = PredictionContext::load(&paths, &LoadOptions::default()).unwrap();

    assert_eq!(context.price_stats().min, 1000.0);
    assert_eq!(context.price_stats().max, 2000.0);

    let request = PredictionRequest::new(2015, 6, 15, 0.0).unwrap();
    assert_eq!(context.predict(&request).unwrap().predicted_price, 1300.0);
}

#[test]
fn test_missing_target_excluded_from_price_stats() {
    let (_dir, context) = load(&linear_model(1500.0, &[0.0; 6]));
    let stats = context.price_stats();

    assert!(!stats.fallback);
    assert_eq!(stats.min, 1200.0);
    assert_eq!(stats.max, 2000.0);
    assert_eq!(stats.mean, 1437.5);
    assert_eq!(context.corrector().bounds(), (600.0, 6000.0));
}

#[test]
fn test_prices_stay_within_bounds() {
    let (_dir, context) = load(&linear_model(1500.0, &[0.0; 6]));
    let (min, max) = context.corrector().bounds();

    for year in (1800..=2300).step_by(7) {
        let request = PredictionRequest::new(year, 1, 10, 2.0).unwrap();
        let price = context.predict(&request).unwrap().predicted_price;
        assert!(price >= min && price <= max, "{} -> {}", year, price);
    }
}

#[test]
fn test_feature_row_matches_schema_order() {
    let (_dir, context) = load(&linear_model(1500.0, &[0.0; 6]));
    let request = PredictionRequest::new(2024, 1, 1, 3.5).unwrap();
    let trace = context.trace(&request).unwrap();

    assert_eq!(trace.row.names(), context.schema().names());
    assert_eq!(
        trace.row.values(),
        &[2100.0, 2024.0, 1.0, 1.0, 0.0, 3.5]
    );
    // 2024-01-01 was a Monday
    assert_eq!(trace.row.get(DAY_OF_WEEK), Some(0.0));
    assert_eq!(trace.row.get(INFLATION_RATE), Some(3.5));
}

#[test]
fn test_identical_requests_are_bit_identical() {
    let (_dir, context) = load(&linear_model(100.0, &[0.5, 1.5, 0.0, 0.0, 0.0, 4.0]));
    let request = PredictionRequest::new(2031, 9, 17, 6.25).unwrap();

    let first = context.predict(&request).unwrap();
    let second = context.predict(&request).unwrap();
    assert_eq!(
        first.predicted_price.to_bits(),
        second.predicted_price.to_bits()
    );
}

#[test]
fn test_fallback_band_without_prices() {
    let dataset = "date,SPX\n2014-01-02,1800.0\n2016-01-04,2000.0\n";
    let (_dir, paths) = write_artifacts(&linear_model(1500.0, &[0.0; 6]), FEATURES, dataset);
    let context = PredictionContext::load(&paths, &LoadOptions::default()).unwrap();

    assert!(context.price_stats().fallback);
    assert_eq!(context.corrector().bounds(), (500.0, 6000.0));

    let request = PredictionRequest::new(2015, 6, 15, 0.0).unwrap();
    assert_eq!(context.predict(&request).unwrap().predicted_price, 1500.0);
}

#[test]
fn test_first_row_policy_diverges_from_medians() {
    let model = linear_model(100.0, &[0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let (_dir, paths) = write_artifacts(&model, FEATURES, DATASET);
    let request = PredictionRequest::new(2015, 6, 15, 0.0).unwrap();

    let medians = PredictionContext::load(&paths, &LoadOptions::default()).unwrap();
    let first_row = PredictionContext::load(
        &paths,
        &LoadOptions {
            imputation: ImputationPolicy::FirstRow,
            ..LoadOptions::default()
        },
    )
    .unwrap();

    assert_eq!(medians.predict(&request).unwrap().predicted_price, 1150.0);
    assert_eq!(first_row.predict(&request).unwrap().predicted_price, 1000.0);
}

#[test]
fn test_tree_ensemble_artifact() {
    // Single stump on the year feature
    let model = r#"{
        "kind": "tree_ensemble",
        "base_score": 1000.0,
        "n_features": 6,
        "trees": [
            {"nodes": [
                {"split": {"feature": 1, "threshold": 2016.0, "left": 1, "right": 2}},
                {"leaf": {"value": 200.0}},
                {"leaf": {"value": 600.0}}
            ]}
        ]
    }"#;
    let (_dir, context) = load(model);
    assert_eq!(context.model_name(), "Gradient Boosted Trees");

    let request = PredictionRequest::new(2015, 3, 2, 0.0).unwrap();
    assert_eq!(context.predict(&request).unwrap().predicted_price, 1200.0);

    let trace = context
        .trace(&PredictionRequest::new(2016, 3, 2, 0.0).unwrap())
        .unwrap();
    assert_eq!(trace.correction.base_prediction, 1600.0);
    assert_eq!(trace.row.get(YEAR), Some(2016.0));
}

#[test]
fn test_width_mismatch_fails_load() {
    let (_dir, paths) =
        write_artifacts(&linear_model(1500.0, &[0.0; 4]), FEATURES, DATASET);
    let result = PredictionContext::load(&paths, &LoadOptions::default());
    assert!(matches!(result, Err(ForecastError::SchemaLoadError(_))));
}

#[test]
fn test_missing_artifacts_fail_load() {
    let (dir, paths) = write_artifacts(&linear_model(1500.0, &[0.0; 6]), FEATURES, DATASET);
    let missing = dir.path().join("missing");

    for paths in [
        ArtifactPaths {
            model: missing.clone(),
            ..paths.clone()
        },
        ArtifactPaths {
            feature_list: missing.clone(),
            ..paths.clone()
        },
        ArtifactPaths {
            dataset: missing.clone(),
            ..paths.clone()
        },
    ] {
        let result = PredictionContext::load(&paths, &LoadOptions::default());
        assert!(
            matches!(result, Err(ForecastError::SchemaLoadError(_))),
            "{:?}",
            result
        );
    }
}

#[test]
fn test_malformed_feature_list_fails_load() {
    for features in ["[]", r#"["SPX", "SPX"]"#, r#"{"features": []}"#] {
        let (_dir, paths) =
            write_artifacts(&linear_model(1500.0, &[0.0; 6]), features, DATASET);
        let result = PredictionContext::load(&paths, &LoadOptions::default());
        assert!(matches!(result, Err(ForecastError::SchemaLoadError(_))));
    }
}

#[test]
fn test_invalid_date_is_client_error() {
    let (_dir, context) = load(&linear_model(1500.0, &[0.0; 6]));
    let request = PredictionRequest::new(2023, 2, 29, 0.0).unwrap();

    let err = context.predict(&request).unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(err.to_string(), "Invalid date: 2023-02-29");
}

#[test]
fn test_default_artifact_paths_are_relative() {
    let paths = ArtifactPaths::default();
    assert!(paths.model.is_relative());
    assert_eq!(paths.dataset, Path::new("data/Gold_Price_Regression.csv"));
}
