//! Distance-feature construction.
//!
//! Each point is described by its distance to the nearest cluster center
//! under every base algorithm. Points with similar distance signatures sit
//! in similar positions relative to *all three* partitions, whatever the
//! raw label ids say, which is what makes the signature re-clusterable.

use std::collections::BTreeMap;

use crate::cluster::{euclidean, Label};
use crate::error::{Error, Result};

/// Distance recorded for points without any cluster affinity (noise).
pub const NO_AFFINITY: f32 = 1e6;

/// Per-cluster mean of assigned points, ordered by cluster id.
///
/// This is how centers are derived for algorithms without a built-in center
/// concept. Empty when the labeling contains no non-noise points.
pub fn derived_centers(data: &[Vec<f32>], labels: &[Label]) -> Result<Vec<Vec<f32>>> {
    if data.len() != labels.len() {
        return Err(Error::DimensionMismatch {
            expected: data.len(),
            found: labels.len(),
        });
    }
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let d = data[0].len();
    let mut sums: BTreeMap<usize, (Vec<f64>, usize)> = BTreeMap::new();
    for (point, label) in data.iter().zip(labels) {
        if let Some(id) = label.id() {
            let (sum, count) = sums.entry(id).or_insert_with(|| (vec![0.0; d], 0));
            for (s, &v) in sum.iter_mut().zip(point) {
                *s += v as f64;
            }
            *count += 1;
        }
    }

    Ok(sums
        .into_values()
        .map(|(sum, count)| sum.into_iter().map(|s| (s / count as f64) as f32).collect())
        .collect())
}

/// Euclidean distance from each point to its nearest center.
///
/// With no centers at all, every point gets [`NO_AFFINITY`].
pub fn min_center_distance(data: &[Vec<f32>], centers: &[Vec<f32>]) -> Vec<f32> {
    data.iter()
        .map(|point| {
            centers
                .iter()
                .map(|center| euclidean(point, center))
                .fold(f32::INFINITY, f32::min)
        })
        .map(|d| if d.is_finite() { d } else { NO_AFFINITY })
        .collect()
}

/// Build the n×3 distance-feature matrix.
///
/// Columns: min distance to a k-means centroid, min distance to a mixture
/// mean, min distance to a derived density-cluster center. Points the
/// density algorithm labeled noise get [`NO_AFFINITY`] in the third column
/// regardless of their coordinates; with zero non-noise density clusters
/// the whole column is [`NO_AFFINITY`].
///
/// The output is positionally aligned with `data`.
pub fn distance_features(
    data: &[Vec<f32>],
    km_centroids: &[Vec<f32>],
    db_labels: &[Label],
    gmm_means: &[Vec<f32>],
) -> Result<Vec<Vec<f32>>> {
    if db_labels.len() != data.len() {
        return Err(Error::DimensionMismatch {
            expected: data.len(),
            found: db_labels.len(),
        });
    }

    let d_km = min_center_distance(data, km_centroids);
    let d_gmm = min_center_distance(data, gmm_means);

    let db_centers = derived_centers(data, db_labels)?;
    let d_db: Vec<f32> = min_center_distance(data, &db_centers)
        .into_iter()
        .zip(db_labels)
        .map(|(dist, label)| if label.is_noise() { NO_AFFINITY } else { dist })
        .collect();

    Ok(d_km
        .into_iter()
        .zip(d_gmm)
        .zip(d_db)
        .map(|((km, gmm), db)| vec![km, gmm, db])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_centers_are_cluster_means() {
        let data = vec![
            vec![0.0, 0.0],
            vec![2.0, 0.0],
            vec![10.0, 10.0],
            vec![100.0, 100.0],
        ];
        let labels = vec![
            Label::Assigned(0),
            Label::Assigned(0),
            Label::Assigned(1),
            Label::Noise,
        ];

        let centers = derived_centers(&data, &labels).unwrap();
        assert_eq!(centers.len(), 2);
        assert_eq!(centers[0], vec![1.0, 0.0]);
        assert_eq!(centers[1], vec![10.0, 10.0]);
    }

    #[test]
    fn test_derived_centers_empty_for_all_noise() {
        let data = vec![vec![1.0], vec![2.0]];
        let labels = vec![Label::Noise, Label::Noise];
        assert!(derived_centers(&data, &labels).unwrap().is_empty());
    }

    #[test]
    fn test_min_center_distance_picks_nearest() {
        let data = vec![vec![0.0, 0.0], vec![9.0, 0.0]];
        let centers = vec![vec![1.0, 0.0], vec![10.0, 0.0]];

        let dists = min_center_distance(&data, &centers);
        assert!((dists[0] - 1.0).abs() < 1e-6);
        assert!((dists[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_noise_rows_get_sentinel_regardless_of_coordinates() {
        // The second point sits exactly on the only density center, but it
        // was labeled noise, so it must get the sentinel distance anyway.
        let data = vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![4.0, 0.0]];
        let db_labels = vec![Label::Assigned(0), Label::Noise, Label::Assigned(0)];
        let km = vec![vec![0.0, 0.0]];
        let gmm = vec![vec![0.0, 0.0]];

        let features = distance_features(&data, &km, &db_labels, &gmm).unwrap();
        assert_eq!(features[1][2], NO_AFFINITY);
        assert!(features[0][2] < NO_AFFINITY);
        assert!(features[2][2] < NO_AFFINITY);
    }

    #[test]
    fn test_all_noise_column_is_sentinel() {
        let data = vec![vec![0.0], vec![1.0], vec![2.0]];
        let db_labels = vec![Label::Noise; 3];
        let km = vec![vec![0.0]];
        let gmm = vec![vec![0.0]];

        let features = distance_features(&data, &km, &db_labels, &gmm).unwrap();
        for row in &features {
            assert_eq!(row[2], NO_AFFINITY);
        }
    }

    #[test]
    fn test_output_aligned_with_input() {
        let data: Vec<Vec<f32>> = (0..7).map(|i| vec![i as f32, 0.0]).collect();
        let db_labels: Vec<Label> = (0..7)
            .map(|i| if i % 2 == 0 { Label::Assigned(0) } else { Label::Noise })
            .collect();
        let km = vec![vec![0.0, 0.0], vec![6.0, 0.0]];
        let gmm = vec![vec![3.0, 0.0]];

        let features = distance_features(&data, &km, &db_labels, &gmm).unwrap();
        assert_eq!(features.len(), data.len());
        for row in &features {
            assert_eq!(row.len(), 3);
        }
        // Row i corresponds to point i: check a couple directly.
        assert!((features[0][0] - 0.0).abs() < 1e-6);
        assert!((features[6][0] - 0.0).abs() < 1e-6);
        assert!((features[0][1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_misaligned_labels_fail() {
        let data = vec![vec![0.0], vec![1.0]];
        let db_labels = vec![Label::Noise];
        assert!(distance_features(&data, &[], &db_labels, &[]).is_err());
    }
}
