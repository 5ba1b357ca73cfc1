//! CSV input and output for QoS tables and prediction reports.
//!
//! Input layout: one header row, then one row per observation with the
//! time label in the first field and the N metric values after it. Extra
//! trailing fields are ignored.

use crate::core::Table;
use crate::error::{ForecastError, Result};
use crate::pipeline::PipelineReport;
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// What to do with a row that has too few fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Skip the row and log a warning.
    #[default]
    Skip,
    /// Fail with [`ForecastError::MalformedRow`].
    Strict,
}

/// Read a labelled table of `n_vars` metrics from CSV.
///
/// # Errors
/// `MalformedRow` for a short row under [`RowPolicy::Strict`],
/// `DataFormat` for a value that does not parse as `f64`, `Io` for reader
/// failures.
pub fn read_table<R: Read>(reader: R, n_vars: usize, policy: RowPolicy) -> Result<Table> {
    if n_vars == 0 {
        return Err(ForecastError::InvalidParameter(
            "n_vars must be at least 1".into(),
        ));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let expected = n_vars + 1;
    let mut labels = Vec::new();
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);

        if record.len() < expected {
            match policy {
                RowPolicy::Skip => {
                    warn!(line, found = record.len(), expected, "skipping short row");
                    skipped += 1;
                    continue;
                }
                RowPolicy::Strict => {
                    return Err(ForecastError::MalformedRow {
                        line,
                        found: record.len(),
                        expected,
                    });
                }
            }
        }

        labels.push(record.get(0).unwrap_or_default().to_string());
        rows.push(parse_values(&record, n_vars, line)?);
    }

    info!(rows = rows.len(), skipped, "loaded table");
    if rows.is_empty() {
        return Ok(Table::empty(n_vars));
    }
    Table::with_labels(labels, rows)
}

/// Read a labelled table from a CSV file.
pub fn read_table_from_path<P: AsRef<Path>>(
    path: P,
    n_vars: usize,
    policy: RowPolicy,
) -> Result<Table> {
    let file = File::open(path.as_ref()).map_err(|e| {
        ForecastError::Io(format!("failed to open {}: {e}", path.as_ref().display()))
    })?;
    read_table(BufReader::new(file), n_vars, policy)
}

fn parse_values(record: &StringRecord, n_vars: usize, line: u64) -> Result<Vec<f64>> {
    (1..=n_vars)
        .map(|column| {
            let field = record.get(column).unwrap_or_default();
            field.parse::<f64>().map_err(|_| ForecastError::DataFormat {
                line,
                column,
                value: field.to_string(),
            })
        })
        .collect()
}

/// Write forecasts next to actuals as CSV.
///
/// Header: `Time,<V>_actual,<V>_pred,...` for each name in
/// `variable_names`. One row per test step; the time column is the row's
/// label, or its row index when the input had none.
pub fn write_predictions<W: Write>(
    writer: W,
    report: &PipelineReport,
    variable_names: &[String],
) -> Result<()> {
    if variable_names.len() != report.forecasts.width() {
        return Err(ForecastError::DimensionMismatch {
            expected: report.forecasts.width(),
            got: variable_names.len(),
        });
    }

    let mut writer = Writer::from_writer(writer);

    let mut header = Vec::with_capacity(1 + 2 * variable_names.len());
    header.push("Time".to_string());
    for name in variable_names {
        header.push(format!("{name}_actual"));
        header.push(format!("{name}_pred"));
    }
    writer.write_record(&header)?;

    for (i, (actual, predicted)) in report
        .actuals
        .rows()
        .iter()
        .zip(report.forecasts.rows())
        .enumerate()
    {
        let mut record = Vec::with_capacity(header.len());
        record.push(report.time_label(i));
        for (a, p) in actual.iter().zip(predicted.iter()) {
            record.push(a.to_string());
            record.push(p.to_string());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write forecasts next to actuals to a CSV file.
pub fn write_predictions_to_path<P: AsRef<Path>>(
    path: P,
    report: &PipelineReport,
    variable_names: &[String],
) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(|e| {
        ForecastError::Io(format!("failed to create {}: {e}", path.as_ref().display()))
    })?;
    write_predictions(file, report, variable_names)?;
    info!(path = %path.as_ref().display(), "wrote predictions");
    Ok(())
}
