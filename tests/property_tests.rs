//! Property-based tests for preprocessing, estimation and order selection.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated tables.

use proptest::prelude::*;
use qos_forecast::core::Table;
use qos_forecast::models::var::{max_candidate_lag, select_order, InformationCriterion, VAR};
use qos_forecast::transform::{denormalize, difference_column, normalize};
use qos_forecast::utils::calculate_metrics;

/// Strategy for tables of `rows × width` values.
/// Adds a small trend per column to avoid all-constant columns.
fn table_strategy(
    rows: std::ops::Range<usize>,
    width: std::ops::Range<usize>,
) -> impl Strategy<Value = Table> {
    (rows, width).prop_flat_map(|(n, w)| {
        prop::collection::vec(prop::collection::vec(-1000.0..1000.0_f64, w), n).prop_map(
            |mut rows| {
                for (t, row) in rows.iter_mut().enumerate() {
                    for v in row.iter_mut() {
                        *v += t as f64 * 0.01;
                    }
                }
                Table::new(rows).unwrap()
            },
        )
    })
}

proptest! {
    #[test]
    fn normalize_round_trip(table in table_strategy(2..60, 1..5)) {
        let (scaled, params) = normalize(&table).unwrap();
        let restored = denormalize(&scaled, &params).unwrap();

        prop_assert_eq!(restored.len(), table.len());
        for (r, o) in restored.rows().iter().zip(table.rows()) {
            for (a, b) in r.iter().zip(o.iter()) {
                prop_assert!((a - b).abs() <= 1e-9 * (1.0 + b.abs()));
            }
        }
    }

    #[test]
    fn normalized_columns_have_zero_mean(table in table_strategy(2..60, 1..5)) {
        let (scaled, _) = normalize(&table).unwrap();
        for j in 0..scaled.width() {
            let column = scaled.column(j).unwrap();
            let mean = column.iter().sum::<f64>() / column.len() as f64;
            prop_assert!(mean.abs() < 1e-9);
        }
    }

    #[test]
    fn constant_column_normalizes_to_zero(value in -1e6..1e6_f64, n in 1usize..40) {
        let table = Table::new(vec![vec![value]; n]).unwrap();
        let (scaled, params) = normalize(&table).unwrap();

        prop_assert_eq!(params.columns()[0].std, 1.0);
        for row in scaled.rows() {
            prop_assert!(row[0].abs() < 1e-9 * (1.0 + value.abs()));
        }
    }

    #[test]
    fn differencing_drops_exactly_one_row(table in table_strategy(2..40, 1..4), col in 0usize..4) {
        let col = col % table.width();
        let diffed = difference_column(&table, col).unwrap();
        prop_assert_eq!(diffed.len(), table.len() - 1);
        prop_assert_eq!(diffed.width(), table.width());
    }

    #[test]
    fn selected_order_within_bound(
        table in table_strategy(3..30, 1..4),
        max_lag in 1usize..15,
        bic in any::<bool>(),
    ) {
        let criterion = if bic { InformationCriterion::Bic } else { InformationCriterion::Aic };
        let selection = select_order(&table, max_lag, criterion).unwrap();
        let bound = max_candidate_lag(table.len(), max_lag);

        prop_assert!(selection.selected_lag >= 1);
        prop_assert!(selection.selected_lag <= bound);
        prop_assert_eq!(selection.scores.len(), bound);
    }

    #[test]
    fn forecast_has_requested_horizon(
        table in table_strategy(10..40, 1..4),
        lag in 1usize..4,
        horizon in 0usize..20,
    ) {
        let mut model = VAR::new(table.width(), lag);
        model.fit(&table).unwrap();
        let forecast = model.forecast_recursive(&table, horizon).unwrap();

        prop_assert_eq!(forecast.len(), horizon);
        prop_assert_eq!(forecast.width(), table.width());
    }

    #[test]
    fn metrics_are_non_negative(
        pairs in prop::collection::vec((-100.0..100.0_f64, -100.0..100.0_f64), 1..50)
    ) {
        let (actual, predicted): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let metrics = calculate_metrics(&actual, &predicted).unwrap();

        prop_assert!(metrics.mae >= 0.0);
        prop_assert!(metrics.rmse >= metrics.mae - 1e-12);
        if let Some(mape) = metrics.mape {
            prop_assert!(mape >= 0.0);
        }
    }
}
