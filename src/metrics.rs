//! Unsupervised cluster-quality metrics.
//!
//! Segmentation has no ground-truth labels, so quality is measured
//! intrinsically: how well separated and how compact the clusters are.
//!
//! | Metric | Range | Best | Measures |
//! |--------|-------|------|----------|
//! | [`silhouette`] | [-1, 1] | 1 | per-point separation vs. cohesion |
//! | [`calinski_harabasz`] | [0, ∞) | high | between/within dispersion ratio |
//!
//! Both are computed only over non-noise points when noise exists, and both
//! are **undefined** (`None`, never a sentinel number) unless there are at
//! least two distinct non-noise clusters and at least two assigned points.
//! Per-label point counts ([`label_counts`]) are always available.
//!
//! # References
//!
//! - Rousseeuw (1987). "Silhouettes: a graphical aid to the interpretation
//!   and validation of cluster analysis"
//! - Caliński & Harabasz (1974). "A dendrite method for cluster analysis"

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cluster::{euclidean, squared_euclidean, Label};
use crate::error::{Error, Result};

/// Per-label point counts, with noise tracked separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    /// Points per cluster id.
    pub clusters: BTreeMap<usize, usize>,
    /// Points left unassigned.
    pub noise: usize,
}

impl LabelCounts {
    /// Number of distinct non-noise clusters.
    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Total number of assigned (non-noise) points.
    pub fn n_assigned(&self) -> usize {
        self.clusters.values().sum()
    }
}

/// Quality summary for one labeling.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Mean silhouette coefficient, absent when undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silhouette: Option<f64>,
    /// Calinski–Harabasz score, absent when undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calinski_harabasz: Option<f64>,
    /// Per-label point counts.
    pub counts: LabelCounts,
}

/// Count points per label.
pub fn label_counts(labels: &[Label]) -> LabelCounts {
    let mut counts = LabelCounts::default();
    for label in labels {
        match label {
            Label::Assigned(id) => *counts.clusters.entry(*id).or_insert(0) += 1,
            Label::Noise => counts.noise += 1,
        }
    }
    counts
}

/// Mean silhouette coefficient over non-noise points.
///
/// For each assigned point, `a` is its mean distance to the rest of its own
/// cluster and `b` the smallest mean distance to any other cluster;
/// the coefficient is `(b − a) / max(a, b)` (0 for singleton clusters).
///
/// Returns `Ok(None)` unless at least two distinct non-noise clusters and
/// at least two assigned points exist. Fails on misaligned inputs.
pub fn silhouette(data: &[Vec<f32>], labels: &[Label]) -> Result<Option<f64>> {
    check_aligned(data, labels)?;

    let assigned: Vec<(usize, usize)> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, l)| l.id().map(|id| (i, id)))
        .collect();

    let counts = label_counts(labels);
    if counts.n_clusters() < 2 || assigned.len() < 2 {
        return Ok(None);
    }

    let mut total = 0.0;
    for &(i, own) in &assigned {
        // Mean distance to every other cluster, own cluster included.
        let mut dist_sum: BTreeMap<usize, f64> = BTreeMap::new();
        for &(j, other) in &assigned {
            if i == j {
                continue;
            }
            *dist_sum.entry(other).or_insert(0.0) += euclidean(&data[i], &data[j]) as f64;
        }

        let own_size = counts.clusters[&own];
        if own_size <= 1 {
            // Singleton cluster: silhouette defined as 0.
            continue;
        }

        let a = dist_sum.get(&own).copied().unwrap_or(0.0) / (own_size - 1) as f64;
        let b = dist_sum
            .iter()
            .filter(|(id, _)| **id != own)
            .map(|(id, sum)| sum / counts.clusters[id] as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    Ok(Some(total / assigned.len() as f64))
}

/// Calinski–Harabasz score (variance-ratio criterion) over non-noise points.
///
/// Ratio of between-cluster to within-cluster dispersion, each normalized
/// by its degrees of freedom; higher means denser, better-separated
/// clusters. By convention the score is 1.0 when the within-cluster
/// dispersion is exactly zero.
///
/// Returns `Ok(None)` under the same preconditions as [`silhouette`].
pub fn calinski_harabasz(data: &[Vec<f32>], labels: &[Label]) -> Result<Option<f64>> {
    check_aligned(data, labels)?;

    let assigned: Vec<(usize, usize)> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, l)| l.id().map(|id| (i, id)))
        .collect();

    let counts = label_counts(labels);
    let k = counts.n_clusters();
    let n = assigned.len();
    if k < 2 || n < 2 {
        return Ok(None);
    }

    let d = data[0].len();

    // Overall and per-cluster means over assigned points.
    let mut overall = vec![0.0f64; d];
    let mut cluster_sums: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for &(i, id) in &assigned {
        let entry = cluster_sums.entry(id).or_insert_with(|| vec![0.0; d]);
        for (j, &v) in data[i].iter().enumerate() {
            entry[j] += v as f64;
            overall[j] += v as f64;
        }
    }
    for v in &mut overall {
        *v /= n as f64;
    }

    let cluster_means: BTreeMap<usize, Vec<f32>> = cluster_sums
        .into_iter()
        .map(|(id, sums)| {
            let size = counts.clusters[&id] as f64;
            (id, sums.into_iter().map(|s| (s / size) as f32).collect())
        })
        .collect();

    let overall_f32: Vec<f32> = overall.iter().map(|&v| v as f32).collect();

    let mut between = 0.0f64;
    for (id, mean) in &cluster_means {
        between += counts.clusters[id] as f64 * squared_euclidean(mean, &overall_f32) as f64;
    }

    let mut within = 0.0f64;
    for &(i, id) in &assigned {
        within += squared_euclidean(&data[i], &cluster_means[&id]) as f64;
    }

    if within == 0.0 {
        return Ok(Some(1.0));
    }

    Ok(Some(between * (n - k) as f64 / (within * (k - 1) as f64)))
}

/// Evaluate one labeling: both scores (where defined) plus counts.
pub fn evaluate(data: &[Vec<f32>], labels: &[Label]) -> Result<Evaluation> {
    Ok(Evaluation {
        silhouette: silhouette(data, labels)?,
        calinski_harabasz: calinski_harabasz(data, labels)?,
        counts: label_counts(labels),
    })
}

fn check_aligned(data: &[Vec<f32>], labels: &[Label]) -> Result<()> {
    if data.len() != labels.len() {
        return Err(Error::DimensionMismatch {
            expected: data.len(),
            found: labels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tight_blobs() -> (Vec<Vec<f32>>, Vec<Label>) {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
        ];
        let labels = vec![
            Label::Assigned(0),
            Label::Assigned(0),
            Label::Assigned(1),
            Label::Assigned(1),
        ];
        (data, labels)
    }

    #[test]
    fn test_silhouette_high_for_separated_blobs() {
        let (data, labels) = tight_blobs();
        let score = silhouette(&data, &labels).unwrap().unwrap();
        assert!(score > 0.9, "got {}", score);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_silhouette_low_for_shuffled_labels() {
        let (data, _) = tight_blobs();
        let labels = vec![
            Label::Assigned(0),
            Label::Assigned(1),
            Label::Assigned(0),
            Label::Assigned(1),
        ];
        let score = silhouette(&data, &labels).unwrap().unwrap();
        assert!(score < 0.0, "mixing clusters should be negative, got {}", score);
    }

    #[test]
    fn test_scores_absent_for_single_cluster() {
        let data = vec![vec![0.0], vec![1.0], vec![2.0]];
        let labels = vec![Label::Assigned(0); 3];

        assert_eq!(silhouette(&data, &labels).unwrap(), None);
        assert_eq!(calinski_harabasz(&data, &labels).unwrap(), None);

        // Counts still available.
        let eval = evaluate(&data, &labels).unwrap();
        assert!(eval.silhouette.is_none());
        assert!(eval.calinski_harabasz.is_none());
        assert_eq!(eval.counts.clusters[&0], 3);
    }

    #[test]
    fn test_scores_ignore_noise_points() {
        let (mut data, mut labels) = tight_blobs();
        let baseline = silhouette(&data, &labels).unwrap().unwrap();

        // A wild noise point must not affect the score.
        data.push(vec![500.0, -500.0]);
        labels.push(Label::Noise);
        let with_noise = silhouette(&data, &labels).unwrap().unwrap();

        assert!((baseline - with_noise).abs() < 1e-12);
    }

    #[test]
    fn test_calinski_harabasz_prefers_separated_blobs() {
        let (data, good) = tight_blobs();
        let mixed = vec![
            Label::Assigned(0),
            Label::Assigned(1),
            Label::Assigned(0),
            Label::Assigned(1),
        ];

        let good_score = calinski_harabasz(&data, &good).unwrap().unwrap();
        let mixed_score = calinski_harabasz(&data, &mixed).unwrap().unwrap();
        assert!(good_score > mixed_score);
        assert!(mixed_score >= 0.0);
    }

    #[test]
    fn test_counts_include_noise() {
        let labels = vec![
            Label::Assigned(0),
            Label::Noise,
            Label::Assigned(0),
            Label::Assigned(2),
            Label::Noise,
        ];
        let counts = label_counts(&labels);

        assert_eq!(counts.clusters[&0], 2);
        assert_eq!(counts.clusters[&2], 1);
        assert_eq!(counts.noise, 2);
        assert_eq!(counts.n_clusters(), 2);
        assert_eq!(counts.n_assigned(), 3);
    }

    #[test]
    fn test_misaligned_inputs_fail() {
        let data = vec![vec![0.0], vec![1.0]];
        let labels = vec![Label::Assigned(0)];
        assert!(silhouette(&data, &labels).is_err());
        assert!(calinski_harabasz(&data, &labels).is_err());
        assert!(evaluate(&data, &labels).is_err());
    }
}
