//! # cohort
//!
//! Behavioral customer segmentation from tabular numeric features.
//!
//! Three base clustering algorithms (k-means, DBSCAN, Gaussian mixture)
//! partition the same standardized dataset independently; the [`ensemble`]
//! module fuses their disagreeing labelings into a single consensus
//! partition, by per-point majority vote and by re-clustering each point's
//! distance-to-nearest-center signature. The fused labeling is what the
//! pipeline profiles and reports.
//!
//! The library is usable piecemeal ([`cluster`], [`ensemble`], [`metrics`]
//! work on plain `&[Vec<f32>]` data) or end to end via
//! [`pipeline::run_pipeline`], which loads a CSV, preprocesses, fits,
//! fuses, and writes figures plus a structured report.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod reduce;
pub mod viz;

pub use cluster::{
    ClusterFit, Clustering, Covariance, Dbscan, Gmm, GmmFit, Kmeans, KmeansFit, Label,
    SoftClustering,
};
pub use config::PipelineConfig;
pub use data::{FeatureFrame, FEATURE_COLUMNS};
pub use ensemble::{distance_features, fuse, majority_vote, NO_AFFINITY};
pub use error::{Error, Result};
pub use metrics::{calinski_harabasz, evaluate, label_counts, silhouette, Evaluation};
pub use pipeline::{run_pipeline, SegmentationReport};
