//! Integration test: Preprocessing pipeline end-to-end

use depscreen::preprocessing::{Preprocessor, UNSEEN_CATEGORY};
use depscreen::schema::{CATEGORICAL_COLUMNS, FEATURE_COLUMNS, NUMERICAL_COLUMNS};
use polars::prelude::*;

fn survey_df() -> DataFrame {
    df!(
        "chatgpt_usage_frequency_per_week" => [0i64, 2, 4, 6],
        "average_duration_per_session_minutes" => [10i64, 30, 60, 120],
        "attempt_before_chatgpt" => [5i64, 3, 1, 0],
        "confidence_in_solving_alone" => [5i64, 4, 2, 1],
        "peer_usage_influence" => [1i64, 2, 4, 5],
        "reason_for_using_chatgpt" => ["No idea", "Save time", "Better answers", "Save time"],
        "cgpa" => [9.0, 8.0, 6.5, 5.5],
        "department" => ["MECH", "IT", "CIVIL", "IT"],
        "used_other_ai_tools" => [0i64, 0, 1, 1],
        "chatgpt_preferred_over_google" => [0i64, 1, 1, 1],
    )
    .unwrap()
}

#[test]
fn test_fit_transform_covers_all_features() {
    let mut preprocessor = Preprocessor::new();
    let matrix = preprocessor.fit_transform(&survey_df()).unwrap();

    assert_eq!(matrix.nrows(), 4, "row count should be preserved");
    assert_eq!(matrix.ncols(), FEATURE_COLUMNS.len());

    let names = preprocessor.output_feature_names();
    assert_eq!(&names[..2], CATEGORICAL_COLUMNS.as_slice());
    assert_eq!(&names[2..], NUMERICAL_COLUMNS.as_slice());
}

#[test]
fn test_categorical_codes_follow_sorted_tables() {
    let mut preprocessor = Preprocessor::new();
    let matrix = preprocessor.fit_transform(&survey_df()).unwrap();

    // reason table: Better answers=0, No idea=1, Save time=2
    assert_eq!(matrix[[0, 0]], 1.0);
    assert_eq!(matrix[[1, 0]], 2.0);
    assert_eq!(matrix[[2, 0]], 0.0);

    // department table: CIVIL=0, IT=1, MECH=2
    assert_eq!(matrix[[0, 1]], 2.0);
    assert_eq!(matrix[[1, 1]], 1.0);
    assert_eq!(matrix[[2, 1]], 0.0);
    assert_eq!(matrix[[3, 1]], 1.0);
}

#[test]
fn test_numerical_columns_use_population_statistics() {
    let mut preprocessor = Preprocessor::new();
    let matrix = preprocessor.fit_transform(&survey_df()).unwrap();

    // usage values [0, 2, 4, 6]: mean 3, population std sqrt(5)
    let expected = (0.0 - 3.0) / 5.0_f64.sqrt();
    let usage_col = 2; // first numerical column after the categorical block
    assert!((matrix[[0, usage_col]] - expected).abs() < 1e-12);

    // each scaled column has zero mean
    for col in 2..matrix.ncols() {
        let mean: f64 = (0..matrix.nrows()).map(|r| matrix[[r, col]]).sum::<f64>()
            / matrix.nrows() as f64;
        assert!(mean.abs() < 1e-9, "column {} should be centered", col);
    }
}

#[test]
fn test_serving_row_matches_training_row() {
    let train = survey_df();
    let mut preprocessor = Preprocessor::new();
    let train_matrix = preprocessor.fit_transform(&train).unwrap();

    // Re-submit the second training row as a single-record frame
    let single = df!(
        "chatgpt_usage_frequency_per_week" => [2i64],
        "average_duration_per_session_minutes" => [30i64],
        "attempt_before_chatgpt" => [3i64],
        "confidence_in_solving_alone" => [4i64],
        "peer_usage_influence" => [2i64],
        "reason_for_using_chatgpt" => ["Save time"],
        "cgpa" => [8.0],
        "department" => ["IT"],
        "used_other_ai_tools" => [0i64],
        "chatgpt_preferred_over_google" => [1i64],
    )
    .unwrap();

    let row = preprocessor.transform(&single).unwrap();
    assert_eq!(row.nrows(), 1);
    for col in 0..train_matrix.ncols() {
        assert_eq!(
            row[[0, col]],
            train_matrix[[1, col]],
            "column {} should transform identically at serve time",
            col
        );
    }
}

#[test]
fn test_input_column_order_does_not_matter() {
    let train = survey_df();
    let mut preprocessor = Preprocessor::new();
    let expected = preprocessor.fit_transform(&train).unwrap();

    let mut reversed_cols: Vec<&str> = FEATURE_COLUMNS.to_vec();
    reversed_cols.reverse();
    let shuffled = train.select(reversed_cols).unwrap();

    let matrix = preprocessor.transform(&shuffled).unwrap();
    assert_eq!(matrix, expected);
}

#[test]
fn test_unseen_category_maps_to_sentinel() {
    let mut preprocessor = Preprocessor::new();
    preprocessor.fit(&survey_df()).unwrap();

    let mut unseen = survey_df().head(Some(1));
    unseen
        .with_column(Series::new("department".into(), ["AEROSPACE"]))
        .unwrap();

    let matrix = preprocessor.transform(&unseen).unwrap();
    assert_eq!(matrix[[0, 1]], UNSEEN_CATEGORY);
}

#[test]
fn test_null_numeric_falls_back_to_center() {
    let mut preprocessor = Preprocessor::new();
    preprocessor.fit(&survey_df()).unwrap();

    let mut with_null = survey_df().head(Some(1));
    with_null
        .with_column(Series::new("cgpa".into(), [None::<f64>]))
        .unwrap();

    let matrix = preprocessor.transform(&with_null).unwrap();
    let cgpa_col = 2 + NUMERICAL_COLUMNS
        .iter()
        .position(|&c| c == "cgpa")
        .unwrap();
    assert_eq!(matrix[[0, cgpa_col]], 0.0);
}

#[test]
fn test_transform_before_fit_fails() {
    let preprocessor = Preprocessor::new();
    assert!(preprocessor.transform(&survey_df()).is_err());
}

#[test]
fn test_missing_column_fails() {
    let df = survey_df().drop("department").unwrap();
    let mut preprocessor = Preprocessor::new();
    assert!(preprocessor.fit(&df).is_err());
}
