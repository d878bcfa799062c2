//! Outlier clipping and standardization.
//!
//! Clipping runs on raw-scale data *before* standardization, so the clip
//! bounds reflect raw statistics. Both steps use the population standard
//! deviation (denominator n). A zero-variance column is left untouched by
//! clipping and standardizes to all zeros (divisor coerced to 1.0) instead
//! of failing.

use crate::data::FeatureFrame;
use crate::error::{Error, Result};

/// Per-column standardization statistics, kept for inverse transforms.
#[derive(Debug, Clone)]
pub struct ColumnScale {
    /// Column name.
    pub name: String,
    /// Column mean on the scale the statistics were computed from.
    pub mean: f64,
    /// Population standard deviation (coerced to 1.0 when zero).
    pub std: f64,
}

/// Ordered standardization statistics for a frame.
#[derive(Debug, Clone)]
pub struct ScaleStats {
    columns: Vec<ColumnScale>,
}

impl ScaleStats {
    /// Statistics for a named column.
    pub fn get(&self, name: &str) -> Option<&ColumnScale> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All column statistics in frame order.
    pub fn columns(&self) -> &[ColumnScale] {
        &self.columns
    }
}

/// Population mean and standard deviation of one column.
fn column_moments(frame: &FeatureFrame, idx: usize) -> (f64, f64) {
    let n = frame.n_rows() as f64;
    let mean = frame.column(idx).map(|v| v as f64).sum::<f64>() / n;
    let var = frame
        .column(idx)
        .map(|v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, var.sqrt())
}

/// Clip every column to `[μ − z·σ, μ + z·σ]` using raw-scale statistics.
///
/// Columns whose standard deviation is zero or undefined are left untouched.
pub fn zscore_clip(frame: &FeatureFrame, z: f64) -> Result<FeatureFrame> {
    if !z.is_finite() || z < 0.0 {
        return Err(Error::InvalidParameter {
            name: "z",
            message: "must be finite and non-negative",
        });
    }
    if frame.n_rows() == 0 {
        return Ok(frame.clone());
    }

    let mut bounds = Vec::with_capacity(frame.n_cols());
    for idx in 0..frame.n_cols() {
        let (mean, std) = column_moments(frame, idx);
        if std == 0.0 || !std.is_finite() {
            bounds.push(None);
        } else {
            bounds.push(Some(((mean - z * std) as f32, (mean + z * std) as f32)));
        }
    }

    let rows = frame
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(&bounds)
                .map(|(&v, bound)| match bound {
                    Some((lo, hi)) => v.clamp(*lo, *hi),
                    None => v,
                })
                .collect()
        })
        .collect();

    FeatureFrame::new(frame.columns().to_vec(), rows)
}

/// Standardize every column to `(x − μ)/σ`, returning the statistics map
/// needed for [`inverse_standardize`].
///
/// A zero standard deviation is coerced to 1.0, so a constant column comes
/// out as all zeros rather than failing.
pub fn standardize(frame: &FeatureFrame) -> Result<(FeatureFrame, ScaleStats)> {
    if frame.n_rows() == 0 {
        return Err(Error::EmptyInput);
    }

    let mut columns = Vec::with_capacity(frame.n_cols());
    for (idx, name) in frame.columns().iter().enumerate() {
        let (mean, std) = column_moments(frame, idx);
        let std = if std == 0.0 || !std.is_finite() { 1.0 } else { std };
        columns.push(ColumnScale {
            name: name.clone(),
            mean,
            std,
        });
    }

    let rows = frame
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(&columns)
                .map(|(&v, scale)| ((v as f64 - scale.mean) / scale.std) as f32)
                .collect()
        })
        .collect();

    let standardized = FeatureFrame::new(frame.columns().to_vec(), rows)?;
    Ok((standardized, ScaleStats { columns }))
}

/// Reconstruct original-scale values from standardized ones: `x·σ + μ`.
///
/// Exact round trip modulo floating-point error for data standardized with
/// the same statistics. Fails if a stats column is absent from the frame.
pub fn inverse_standardize(frame: &FeatureFrame, stats: &ScaleStats) -> Result<FeatureFrame> {
    let mut scale_by_idx: Vec<Option<&ColumnScale>> = vec![None; frame.n_cols()];
    for scale in stats.columns() {
        match frame.column_index(&scale.name) {
            Some(idx) => scale_by_idx[idx] = Some(scale),
            None => {
                return Err(Error::MissingColumn {
                    name: scale.name.clone(),
                })
            }
        }
    }

    let rows = frame
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(&scale_by_idx)
                .map(|(&v, scale)| match scale {
                    Some(s) => (v as f64 * s.std + s.mean) as f32,
                    None => v,
                })
                .collect()
        })
        .collect();

    FeatureFrame::new(frame.columns().to_vec(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: &[&str], rows: Vec<Vec<f32>>) -> FeatureFrame {
        FeatureFrame::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_clip_bounds_all_cells() {
        let f = frame(
            &["x"],
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![100.0]],
        );
        let clipped = zscore_clip(&f, 1.0).unwrap();

        let (mean, std) = column_moments(&f, 0);
        let (lo, hi) = ((mean - std) as f32, (mean + std) as f32);
        for row in clipped.rows() {
            assert!(row[0] >= lo && row[0] <= hi, "{} outside [{}, {}]", row[0], lo, hi);
        }
        // The outlier actually moved.
        assert!(clipped.rows()[4][0] < 100.0);
    }

    #[test]
    fn test_clip_leaves_zero_variance_column_untouched() {
        let f = frame(&["c", "x"], vec![vec![5.0, 0.0], vec![5.0, 10.0], vec![5.0, 20.0]]);
        let clipped = zscore_clip(&f, 0.5).unwrap();

        for row in clipped.rows() {
            assert_eq!(row[0], 5.0);
        }
    }

    #[test]
    fn test_clip_single_row_is_noop() {
        let f = frame(&["x"], vec![vec![42.0]]);
        let clipped = zscore_clip(&f, 3.0).unwrap();
        assert_eq!(clipped.rows()[0][0], 42.0);
    }

    #[test]
    fn test_standardize_round_trip() {
        let f = frame(
            &["a", "b"],
            vec![vec![1.0, 100.0], vec![2.0, 200.0], vec![3.0, 350.0]],
        );
        let (std_frame, stats) = standardize(&f).unwrap();
        let restored = inverse_standardize(&std_frame, &stats).unwrap();

        for (orig, back) in f.rows().iter().zip(restored.rows()) {
            for (o, b) in orig.iter().zip(back) {
                assert!((o - b).abs() < 1e-3, "round trip drifted: {} vs {}", o, b);
            }
        }
    }

    #[test]
    fn test_standardize_zero_variance_column_becomes_zeros() {
        let f = frame(&["c"], vec![vec![7.0], vec![7.0], vec![7.0]]);
        let (std_frame, stats) = standardize(&f).unwrap();

        for row in std_frame.rows() {
            assert_eq!(row[0], 0.0);
        }
        assert_eq!(stats.get("c").unwrap().std, 1.0);
        assert_eq!(stats.get("c").unwrap().mean, 7.0);
    }

    #[test]
    fn test_standardized_columns_have_zero_mean_unit_variance() {
        let f = frame(
            &["x"],
            vec![vec![2.0], vec![4.0], vec![6.0], vec![8.0]],
        );
        let (std_frame, _) = standardize(&f).unwrap();

        let (mean, std) = column_moments(&std_frame, 0);
        assert!(mean.abs() < 1e-6);
        assert!((std - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_fails_on_missing_column() {
        let f = frame(&["a"], vec![vec![1.0], vec![2.0]]);
        let (_, stats) = standardize(&f).unwrap();

        let other = frame(&["z"], vec![vec![0.0]]);
        assert!(inverse_standardize(&other, &stats).is_err());
    }

    #[test]
    fn test_clip_rejects_bad_z() {
        let f = frame(&["x"], vec![vec![1.0], vec![2.0]]);
        assert!(zscore_clip(&f, f64::NAN).is_err());
        assert!(zscore_clip(&f, -1.0).is_err());
    }
}
