//! Pipeline configuration.

use std::path::PathBuf;

use crate::cluster::Covariance;

/// Every tunable of a segmentation run, including where figures land.
///
/// The figure directory is an explicit value threaded through the run, not
/// process-wide state. `Default` carries the standard settings; override
/// fields as needed:
///
/// ```rust
/// use cohort::config::PipelineConfig;
///
/// let config = PipelineConfig {
///     kmeans_k: 4,
///     ..PipelineConfig::default()
/// };
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Partition-based cluster count.
    pub kmeans_k: usize,
    /// Density neighborhood radius.
    pub dbscan_eps: f32,
    /// Density minimum neighborhood size.
    pub dbscan_min_samples: usize,
    /// Mixture component count.
    pub gmm_components: usize,
    /// Mixture covariance structure.
    pub gmm_covariance: Covariance,
    /// Outlier-clip z-score threshold.
    pub clip_z: f64,
    /// Secondary (hybrid) cluster count.
    pub hybrid_k: usize,
    /// Inclusive elbow sweep range.
    pub elbow_k_min: usize,
    /// Inclusive elbow sweep range.
    pub elbow_k_max: usize,
    /// Seed driving every stochastic fit in the run.
    pub seed: u64,
    /// Where figures are written.
    pub fig_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            kmeans_k: 3,
            dbscan_eps: 3.5,
            dbscan_min_samples: 40,
            gmm_components: 2,
            gmm_covariance: Covariance::Full,
            clip_z: 3.0,
            hybrid_k: 3,
            elbow_k_min: 1,
            elbow_k_max: 10,
            seed: 42,
            fig_dir: PathBuf::from("results/figs"),
        }
    }
}
