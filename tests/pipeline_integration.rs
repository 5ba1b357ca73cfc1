//! End-to-end tests of the forecasting pipeline and its CSV surface.

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use qos_forecast::core::Table;
use qos_forecast::io::{
    read_table, read_table_from_path, write_predictions, write_predictions_to_path, RowPolicy,
};
use qos_forecast::models::var::{simulate, InformationCriterion, VAR};
use qos_forecast::pipeline::{run, PipelineConfig};
use std::fs;

/// Slowly decaying rotation around a fixed point, so every lag-1 design
/// matrix built from it has full rank.
fn rotation_truth() -> VAR {
    let a = DMatrix::from_row_slice(2, 2, &[0.9, -0.4, 0.4, 0.9]);
    VAR::from_parameters(&[1.0, 2.0], &[a]).unwrap()
}

/// 20 noise-free rows of the rotation process starting at [5, -3].
fn twenty_rows() -> Vec<Vec<f64>> {
    let truth = rotation_truth();
    let mut rows = vec![vec![5.0, -3.0]];
    while rows.len() < 20 {
        let next = truth.predict_next(&rows).unwrap();
        rows.push(next);
    }
    rows
}

fn two_var_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_variables(vec!["RTT".into(), "JIT".into()])
        .with_auto_difference(false)
        .with_max_lag(1)
}

#[test]
fn twenty_row_var1_forecast_matches_hand_recursion() {
    let rows = twenty_rows();
    let table = Table::new(rows.clone()).unwrap();
    let config = two_var_config().with_normalize(false);

    let report = run(&table, &config).unwrap();

    assert_eq!(report.train_size, 14);
    assert_eq!(report.test_size, 6);
    assert_eq!(report.selected_lag, 1);
    assert!(report.normalization.is_none());
    assert!(report.differencing.is_empty());

    // y_t = [1, 2] + A y_{t-1}, continued from the last training row.
    let mut last = rows[13].clone();
    for h in 0..6 {
        let next = [
            1.0 + 0.9 * last[0] - 0.4 * last[1],
            2.0 + 0.4 * last[0] + 0.9 * last[1],
        ];
        let predicted = report.forecasts.row(h).unwrap();
        assert_relative_eq!(predicted[0], next[0], epsilon = 1e-6);
        assert_relative_eq!(predicted[1], next[1], epsilon = 1e-6);
        last = next.to_vec();
    }

    for m in &report.metrics {
        assert!(m.mae < 1e-6);
        assert!(m.rmse < 1e-6);
    }
}

#[test]
fn normalization_is_undone_before_scoring() {
    let table = Table::new(twenty_rows()).unwrap();

    let report = run(&table, &two_var_config()).unwrap();

    let params = report.normalization.as_ref().unwrap();
    assert_eq!(params.width(), 2);
    // Actuals come back on the original scale.
    for (a, original) in report.actuals.rows().iter().zip(&twenty_rows()[14..]) {
        assert_relative_eq!(a[0], original[0], epsilon = 1e-9);
        assert_relative_eq!(a[1], original[1], epsilon = 1e-9);
    }
    for m in &report.metrics {
        assert!(m.mae < 1e-6);
    }
}

#[test]
fn default_six_variable_pipeline_runs() {
    let a = DMatrix::from_fn(6, 6, |i, j| if i == j { 0.6 } else { 0.03 });
    let truth = VAR::from_parameters(&[1.0, 20.0, 1.5, 12.0, 2.0, 8.0], &[a]).unwrap();
    let table = simulate(&truth, 300, 100, 0.5, 99).unwrap();

    let config = PipelineConfig::default().with_criterion(InformationCriterion::Bic);
    let report = run(&table, &config).unwrap();

    assert_eq!(report.metrics.len(), 6);
    assert_eq!(report.scores.len(), 12);
    assert!(report.selected_lag >= 1 && report.selected_lag <= 12);
    assert_eq!(report.forecasts.len(), report.test_size);
    assert_eq!(report.train_size + report.test_size, 300 - report.differencing.len());
    assert!(report.metrics.iter().all(|m| m.rmse.is_finite()));
}

#[test]
fn csv_in_csv_out() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("qos.csv");
    let output = dir.path().join("predictions.csv");

    let mut csv = String::from("Time,RTT,JIT\n");
    for (t, row) in twenty_rows().iter().enumerate() {
        csv.push_str(&format!("2024-01-01T00:{t:02},{},{}\n", row[0], row[1]));
    }
    csv.push_str("broken,1.0\n");
    fs::write(&input, csv).unwrap();

    let table = read_table_from_path(&input, 2, RowPolicy::Skip).unwrap();
    assert_eq!(table.len(), 20);
    assert!(read_table_from_path(&input, 2, RowPolicy::Strict).is_err());

    let config = two_var_config().with_normalize(false);
    let report = run(&table, &config).unwrap();
    write_predictions_to_path(&output, &report, &config.variables).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "Time,RTT_actual,RTT_pred,JIT_actual,JIT_pred");
    assert!(lines[1].starts_with("2024-01-01T00:14,"));
    assert_eq!(lines[1].split(',').count(), 5);

    // Written values read back as a table of actual/pred pairs.
    let back = read_table(written.as_bytes(), 4, RowPolicy::Strict).unwrap();
    assert_eq!(back.len(), 6);
    assert_relative_eq!(
        back.row(0).unwrap()[0],
        report.actuals.row(0).unwrap()[0],
        epsilon = 1e-12
    );
}

#[test]
fn unlabelled_rows_use_row_index() {
    let table = Table::new(twenty_rows()).unwrap();
    let config = two_var_config().with_normalize(false);
    let report = run(&table, &config).unwrap();

    let mut buffer = Vec::new();
    write_predictions(&mut buffer, &report, &config.variables).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    let times: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(times, vec!["14", "15", "16", "17", "18", "19"]);
}

#[test]
fn write_rejects_wrong_name_count() {
    let table = Table::new(twenty_rows()).unwrap();
    let config = two_var_config();
    let report = run(&table, &config).unwrap();

    let mut buffer = Vec::new();
    let names = vec!["RTT".to_string()];
    assert!(write_predictions(&mut buffer, &report, &names).is_err());
}
