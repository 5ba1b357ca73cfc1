//! Table data structure for multivariate, time-indexed observations.

use crate::error::{ForecastError, Result};

/// Chronologically ordered rows of `width` real-valued variables.
///
/// Rows are stored row-major: `rows[observation][variable]`. Every row has
/// exactly `width` values, and when time labels are present there is one
/// label per row. Row order is significant and is never changed by any
/// operation in this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Vec<f64>>,
    labels: Option<Vec<String>>,
    width: usize,
}

impl Table {
    /// Create an unlabelled table from rows.
    ///
    /// The width is taken from the first row. Use [`Table::empty`] for a
    /// table with no rows but a known width.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        Self::validate_rows(&rows, width)?;
        Ok(Self {
            rows,
            labels: None,
            width,
        })
    }

    /// Create a table whose rows carry time labels.
    pub fn with_labels(labels: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if labels.len() != rows.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: rows.len(),
                got: labels.len(),
            });
        }
        let mut table = Self::new(rows)?;
        table.labels = Some(labels);
        Ok(table)
    }

    /// Create a table with no rows and the given width.
    pub fn empty(width: usize) -> Self {
        Self {
            rows: Vec::new(),
            labels: None,
            width,
        }
    }

    /// Build a table from row data of a known width, keeping optional labels.
    pub(crate) fn from_parts(
        rows: Vec<Vec<f64>>,
        labels: Option<Vec<String>>,
        width: usize,
    ) -> Result<Self> {
        Self::validate_rows(&rows, width)?;
        if let Some(labels) = &labels {
            if labels.len() != rows.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: rows.len(),
                    got: labels.len(),
                });
            }
        }
        Ok(Self {
            rows,
            labels,
            width,
        })
    }

    fn validate_rows(rows: &[Vec<f64>], width: usize) -> Result<()> {
        for row in rows {
            if row.len() != width {
                return Err(ForecastError::DimensionMismatch {
                    expected: width,
                    got: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Number of rows (observations).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of variables per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// All rows in chronological order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// A single row.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// Copy out one variable as a series.
    pub fn column(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.width {
            return Err(ForecastError::IndexOutOfBounds {
                index,
                size: self.width,
            });
        }
        Ok(self.rows.iter().map(|r| r[index]).collect())
    }

    /// Time labels, if the table carries them.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Time label of a row, if the table carries labels.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels
            .as_ref()
            .and_then(|l| l.get(index))
            .map(|s| s.as_str())
    }

    /// Time label of a row, falling back to `fallback_index` as text.
    pub fn row_label(&self, index: usize, fallback_index: usize) -> String {
        self.label(index)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_index.to_string())
    }

    /// Split into `[0, at)` and `[at, len)`, keeping labels aligned.
    pub fn split_at(&self, at: usize) -> Result<(Table, Table)> {
        if at > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: at,
                size: self.len(),
            });
        }
        let (head, tail) = self.rows.split_at(at);
        let (head_labels, tail_labels) = match &self.labels {
            Some(labels) => {
                let (h, t) = labels.split_at(at);
                (Some(h.to_vec()), Some(t.to_vec()))
            }
            None => (None, None),
        };
        Ok((
            Table::from_parts(head.to_vec(), head_labels, self.width)?,
            Table::from_parts(tail.to_vec(), tail_labels, self.width)?,
        ))
    }

    /// The most recent `n` rows (or all rows if fewer).
    pub fn tail(&self, n: usize) -> &[Vec<f64>] {
        let start = self.len().saturating_sub(n);
        &self.rows[start..]
    }

    /// Apply a function to every row, keeping labels and width.
    pub fn map_rows<F>(&self, mut f: F) -> Table
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        let rows: Vec<Vec<f64>> = self.rows.iter().map(|r| f(r)).collect();
        Self {
            rows,
            labels: self.labels.clone(),
            width: self.width,
        }
    }

    /// Replace the labels of this table.
    pub fn relabel(mut self, labels: Option<Vec<String>>) -> Result<Table> {
        if let Some(l) = &labels {
            if l.len() != self.rows.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: self.rows.len(),
                    got: l.len(),
                });
            }
        }
        self.labels = labels;
        Ok(self)
    }

    /// Consume the table, returning its rows.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}
