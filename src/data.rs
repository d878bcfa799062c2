//! Dataset schema and CSV loading.
//!
//! The input is one row per customer with a fixed 17-column numeric schema
//! ([`FEATURE_COLUMNS`]). An identifier column (`CUST_ID`) is dropped if
//! present; rows with missing or unparseable values in any required column
//! are dropped. A required column missing from the header is fatal before
//! any clustering runs.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Error, Result};

/// The required numeric schema, in pipeline column order.
pub const FEATURE_COLUMNS: [&str; 17] = [
    "BALANCE",
    "BALANCE_FREQUENCY",
    "PURCHASES",
    "ONEOFF_PURCHASES",
    "INSTALLMENTS_PURCHASES",
    "CASH_ADVANCE",
    "PURCHASES_FREQUENCY",
    "ONEOFF_PURCHASES_FREQUENCY",
    "PURCHASES_INSTALLMENTS_FREQUENCY",
    "CASH_ADVANCE_FREQUENCY",
    "CASH_ADVANCE_TRX",
    "PURCHASES_TRX",
    "CREDIT_LIMIT",
    "PAYMENTS",
    "MINIMUM_PAYMENTS",
    "PRC_FULL_PAYMENT",
    "TENURE",
];

/// An n×d table of observations with a stable, named column order.
///
/// Column order is fixed across all pipeline stages; downstream distance
/// computations assume positional alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    rows: Vec<Vec<f32>>,
}

impl FeatureFrame {
    /// Build a frame, validating that every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f32>>) -> Result<Self> {
        let d = columns.len();
        for row in &rows {
            if row.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Column names in pipeline order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Observation rows.
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// Number of observations.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of feature columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Index of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of the column at `idx`.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = f32> + '_ {
        self.rows.iter().map(move |row| row[idx])
    }

    /// Pearson correlation matrix of the columns (d×d, symmetric).
    ///
    /// A zero-variance column correlates 1.0 with itself and 0.0 with
    /// everything else.
    pub fn correlation(&self) -> Vec<Vec<f32>> {
        let d = self.n_cols();
        let n = self.n_rows() as f64;
        if n == 0.0 {
            return vec![vec![0.0; d]; d];
        }

        let means: Vec<f64> = (0..d)
            .map(|j| self.column(j).map(|v| v as f64).sum::<f64>() / n)
            .collect();
        let stds: Vec<f64> = (0..d)
            .map(|j| {
                (self
                    .column(j)
                    .map(|v| {
                        let diff = v as f64 - means[j];
                        diff * diff
                    })
                    .sum::<f64>()
                    / n)
                    .sqrt()
            })
            .collect();

        let mut corr = vec![vec![0.0f32; d]; d];
        for a in 0..d {
            corr[a][a] = 1.0;
            for b in (a + 1)..d {
                if stds[a] == 0.0 || stds[b] == 0.0 {
                    continue;
                }
                let cov = self
                    .rows
                    .iter()
                    .map(|row| (row[a] as f64 - means[a]) * (row[b] as f64 - means[b]))
                    .sum::<f64>()
                    / n;
                let r = (cov / (stds[a] * stds[b])) as f32;
                corr[a][b] = r;
                corr[b][a] = r;
            }
        }
        corr
    }
}

/// Load the customer dataset from a CSV file.
///
/// Selects exactly the [`FEATURE_COLUMNS`] (so an identifier column is
/// implicitly dropped), fails with [`Error::MissingColumn`] if any required
/// column is absent, and drops rows where any required value is missing or
/// non-numeric.
pub fn load_customers<P: AsRef<Path>>(path: P) -> Result<FeatureFrame> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();

    let mut indices = Vec::with_capacity(FEATURE_COLUMNS.len());
    for name in FEATURE_COLUMNS {
        match headers.iter().position(|h| h == name) {
            Some(idx) => indices.push(idx),
            None => {
                return Err(Error::MissingColumn {
                    name: name.to_string(),
                })
            }
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;

        let mut row = Vec::with_capacity(indices.len());
        let mut complete = true;
        for &idx in &indices {
            let field = record.get(idx).unwrap_or("");
            match field.parse::<f32>() {
                Ok(v) if v.is_finite() => row.push(v),
                _ => {
                    complete = false;
                    break;
                }
            }
        }

        if complete {
            rows.push(row);
        }
    }

    FeatureFrame::new(
        FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    )
}
