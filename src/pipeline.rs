//! End-to-end segmentation pipeline.
//!
//! Stage order: load -> clip -> standardize -> base clusterers -> fusion ->
//! evaluation/figures. Every stage consumes the previous stage's output
//! immutably; given a fixed seed and input the whole run is deterministic,
//! so there are no retries anywhere. A failed stage aborts the run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::cluster::{Clustering, Dbscan, Gmm, Kmeans, Label};
use crate::config::PipelineConfig;
use crate::data::{load_customers, FeatureFrame};
use crate::ensemble::{distance_features, fuse, majority_vote};
use crate::error::{Error, Result};
use crate::metrics::{evaluate, label_counts, Evaluation, LabelCounts};
use crate::preprocess::{standardize, zscore_clip};
use crate::reduce::Pca;
use crate::viz;

/// Summary of the hybrid (secondary-clustering) partition.
#[derive(Debug, Clone, Serialize)]
pub struct HybridSummary {
    /// Number of hybrid clusters.
    pub n_clusters: usize,
    /// Per-cluster point counts.
    pub counts: LabelCounts,
    /// Feature columns the profile is computed over.
    pub features: Vec<String>,
}

/// Structured result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationReport {
    /// K-means labeling quality.
    pub kmeans: Evaluation,
    /// DBSCAN labeling quality.
    pub dbscan: Evaluation,
    /// GMM labeling quality.
    pub gmm: Evaluation,
    /// Per-label counts of the direct majority-vote consensus.
    pub consensus_counts: LabelCounts,
    /// The authoritative hybrid partition.
    pub hybrid: HybridSummary,
    /// Figure files written during the run.
    pub figures: Vec<String>,
}

/// Per-cluster column means on the scale of the frame it was computed from.
#[derive(Debug, Clone)]
pub struct ClusterProfile {
    /// Cluster ids, ascending, one per profile row.
    pub clusters: Vec<usize>,
    /// Column names, one per profile column.
    pub columns: Vec<String>,
    /// Mean feature values, row per cluster.
    pub means: Vec<Vec<f32>>,
}

/// Group a frame by label and average each column per cluster.
///
/// Noise rows are excluded from every profile row.
pub fn cluster_profile(frame: &FeatureFrame, labels: &[Label]) -> Result<ClusterProfile> {
    if frame.n_rows() != labels.len() {
        return Err(Error::DimensionMismatch {
            expected: frame.n_rows(),
            found: labels.len(),
        });
    }

    let d = frame.n_cols();
    let mut groups: BTreeMap<usize, (Vec<f64>, usize)> = BTreeMap::new();
    for (row, label) in frame.rows().iter().zip(labels) {
        if let Some(id) = label.id() {
            let (sums, count) = groups.entry(id).or_insert_with(|| (vec![0.0; d], 0));
            for (s, &v) in sums.iter_mut().zip(row) {
                *s += v as f64;
            }
            *count += 1;
        }
    }

    let mut clusters = Vec::with_capacity(groups.len());
    let mut means = Vec::with_capacity(groups.len());
    for (id, (sums, count)) in groups {
        clusters.push(id);
        means.push(
            sums.into_iter()
                .map(|s| (s / count as f64) as f32)
                .collect(),
        );
    }

    Ok(ClusterProfile {
        clusters,
        columns: frame.columns().to_vec(),
        means,
    })
}

/// Run the full segmentation pipeline over a CSV dataset.
pub fn run_pipeline<P: AsRef<Path>>(
    data_path: P,
    config: &PipelineConfig,
) -> Result<SegmentationReport> {
    let frame = load_customers(data_path.as_ref())?;
    info!(
        rows = frame.n_rows(),
        cols = frame.n_cols(),
        "loaded dataset"
    );

    let clipped = zscore_clip(&frame, config.clip_z)?;
    let (standardized, _scale) = standardize(&clipped)?;
    let data = standardized.rows();

    std::fs::create_dir_all(&config.fig_dir)?;
    let mut figures = Vec::new();

    // Elbow sweep: visualization input only, nothing downstream reads it.
    let elbow = Kmeans::new(config.kmeans_k)
        .with_seed(config.seed)
        .inertia_over_k(data, config.elbow_k_min, config.elbow_k_max)?;
    let elbow_path = config.fig_dir.join("elbow_kmeans.svg");
    viz::save_elbow_plot(&elbow, &elbow_path)?;
    figures.push(elbow_path.to_string_lossy().into_owned());

    // The three base clusterers are independent of each other.
    let km = Kmeans::new(config.kmeans_k)
        .with_seed(config.seed)
        .fit_full(data)?;
    debug!(inertia = km.inertia, "k-means fitted");

    let db = Dbscan::new(config.dbscan_eps, config.dbscan_min_samples).fit(data)?;
    debug!(
        noise = db.labels.iter().filter(|l| l.is_noise()).count(),
        "dbscan fitted"
    );

    let gmm = Gmm::new()
        .with_n_components(config.gmm_components)
        .with_covariance(config.gmm_covariance)
        .with_seed(config.seed)
        .fit_full(data)?;
    debug!(log_likelihood = gmm.log_likelihood, "gmm fitted");

    // 2-d projection for the scatter figures.
    let pca = Pca::new(2).with_seed(config.seed).fit(data)?;
    let scores = pca.transform(data)?;

    let km_centers_2d = pca.transform(&km.centroids)?;
    let km_scatter = config.fig_dir.join("pca_kmeans.svg");
    viz::save_scatter_2d(
        &scores,
        &km.labels,
        Some(km_centers_2d.as_slice()),
        "PCA 2D Clusters (K-Means)",
        &km_scatter,
    )?;
    figures.push(km_scatter.to_string_lossy().into_owned());

    let gmm_means_2d = pca.transform(&gmm.means)?;
    let gmm_scatter = config.fig_dir.join("pca_gmm.svg");
    viz::save_scatter_2d(
        &scores,
        &gmm.labels,
        Some(gmm_means_2d.as_slice()),
        "PCA 2D Clusters (GMM)",
        &gmm_scatter,
    )?;
    figures.push(gmm_scatter.to_string_lossy().into_owned());

    let m_km = evaluate(data, &km.labels)?;
    let m_db = evaluate(data, &db.labels)?;
    let m_gmm = evaluate(data, &gmm.labels)?;

    // Fusion: distance signatures, then the secondary clustering that
    // produces the authoritative labels; the direct vote is reported too.
    let features = distance_features(data, &km.centroids, &db.labels, &gmm.means)?;
    let hybrid_labels = fuse(&features, &Kmeans::new(config.hybrid_k).with_seed(config.seed))?;
    let consensus = majority_vote(&km.labels, &db.labels, &gmm.labels)?;
    info!(
        hybrid_clusters = label_counts(&hybrid_labels).n_clusters(),
        "ensemble fused"
    );

    // Profile on the raw-scale (clipped) frame, not the standardized one.
    let profile = cluster_profile(&clipped, &hybrid_labels)?;
    let heatmap_path = config.fig_dir.join("cluster_profiles_heatmap.svg");
    let row_names: Vec<String> = profile.clusters.iter().map(|id| format!("cluster {id}")).collect();
    viz::save_heatmap(
        "Cluster Profiles",
        &row_names,
        &profile.columns,
        &normalize_columns(&profile.means),
        &heatmap_path,
    )?;
    figures.push(heatmap_path.to_string_lossy().into_owned());

    let corr = clipped.correlation();
    let corr_unit: Vec<Vec<f32>> = corr
        .iter()
        .map(|row| row.iter().map(|v| (v + 1.0) / 2.0).collect())
        .collect();
    let corr_path = config.fig_dir.join("correlation_matrix.svg");
    viz::save_heatmap(
        "Correlation Matrix",
        clipped.columns(),
        clipped.columns(),
        &corr_unit,
        &corr_path,
    )?;
    figures.push(corr_path.to_string_lossy().into_owned());

    let hybrid_counts = label_counts(&hybrid_labels);
    Ok(SegmentationReport {
        kmeans: m_km,
        dbscan: m_db,
        gmm: m_gmm,
        consensus_counts: label_counts(&consensus),
        hybrid: HybridSummary {
            n_clusters: hybrid_counts.n_clusters(),
            counts: hybrid_counts,
            features: profile.columns,
        },
        figures,
    })
}

/// Scale each column of a profile to its own `[min, max]` span, for the
/// heatmap color ramp. A constant column maps to 0.5.
fn normalize_columns(values: &[Vec<f32>]) -> Vec<Vec<f32>> {
    if values.is_empty() {
        return Vec::new();
    }
    let d = values[0].len();

    let mut lo = vec![f32::INFINITY; d];
    let mut hi = vec![f32::NEG_INFINITY; d];
    for row in values {
        for (j, &v) in row.iter().enumerate() {
            lo[j] = lo[j].min(v);
            hi[j] = hi[j].max(v);
        }
    }

    values
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(j, &v)| {
                    let span = hi[j] - lo[j];
                    if span > 0.0 {
                        (v - lo[j]) / span
                    } else {
                        0.5
                    }
                })
                .collect()
        })
        .collect()
}
