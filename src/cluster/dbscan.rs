//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! Groups points by neighborhood density (Ester et al., 1996). Unlike
//! k-means it discovers the number of clusters from the data, finds
//! arbitrarily shaped clusters, and leaves low-density points unassigned.
//!
//! ## Core Concepts
//!
//! - **Epsilon (ε)**: maximum distance between two points to be neighbors.
//! - **min_samples**: minimum neighborhood size (including the point itself)
//!   for a point to be "core".
//! - **Core point**: has at least `min_samples` neighbors within ε.
//! - **Border point**: within ε of a core point but not core itself.
//! - **Noise point**: neither core nor border, reported as [`Label::Noise`].
//!
//! With aggressive parameters every point can end up noise; callers must
//! treat a zero-cluster outcome as valid.
//!
//! ## Complexity
//!
//! O(n²) distance computations (no spatial index), O(n) labels. Fine at the
//! dataset sizes this crate targets.

use super::traits::{ClusterFit, Clustering, Label};
use super::util::euclidean;
use crate::error::{Error, Result};

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Neighborhood radius.
    eps: f32,
    /// Minimum neighborhood size (including the point itself) for a core point.
    min_samples: usize,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `eps` - Maximum distance between two points to be neighbors.
    /// * `min_samples` - Minimum number of points to form a dense region.
    pub fn new(eps: f32, min_samples: usize) -> Self {
        Self { eps, min_samples }
    }

    /// Set the neighborhood radius.
    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// Set the minimum neighborhood size.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Find all neighbors of `point_idx` within eps (excluding itself).
    fn region_query(&self, data: &[Vec<f32>], point_idx: usize) -> Vec<usize> {
        let point = &data[point_idx];
        data.iter()
            .enumerate()
            .filter(|(idx, other)| *idx != point_idx && euclidean(point, other) <= self.eps)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Grow a cluster outward from a core point.
    fn expand_cluster(
        &self,
        data: &[Vec<f32>],
        seed_idx: usize,
        neighbors: Vec<usize>,
        labels: &mut [Label],
        cluster_id: usize,
        visited: &mut [bool],
    ) {
        labels[seed_idx] = Label::Assigned(cluster_id);

        // Queue-based expansion; recursion depth would be unbounded.
        let mut to_process = neighbors;

        while let Some(idx) = to_process.pop() {
            // A previously rejected point reachable from a core point is a
            // border point; a point already claimed by another cluster stays.
            if labels[idx].is_noise() {
                labels[idx] = Label::Assigned(cluster_id);
            }

            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            let idx_neighbors = self.region_query(data, idx);

            // min_samples counts the point itself.
            if idx_neighbors.len() + 1 >= self.min_samples {
                for nn in idx_neighbors {
                    if !visited[nn] {
                        to_process.push(nn);
                    }
                }
            }
        }
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::new(0.5, 5)
    }
}

impl Clustering for Dbscan {
    fn fit(&self, data: &[Vec<f32>]) -> Result<ClusterFit> {
        let n = data.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }

        if !(self.eps > 0.0) {
            return Err(Error::InvalidParameter {
                name: "eps",
                message: "must be positive",
            });
        }

        if self.min_samples == 0 {
            return Err(Error::InvalidParameter {
                name: "min_samples",
                message: "must be at least 1",
            });
        }

        let d = data[0].len();
        for point in data {
            if point.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: point.len(),
                });
            }
        }

        let mut labels = vec![Label::Noise; n];
        let mut visited = vec![false; n];
        let mut cluster_id = 0;

        for point_idx in 0..n {
            if visited[point_idx] {
                continue;
            }
            visited[point_idx] = true;

            let neighbors = self.region_query(data, point_idx);

            if neighbors.len() + 1 < self.min_samples {
                // Stays noise unless later claimed as a border point.
                continue;
            }

            self.expand_cluster(
                data,
                point_idx,
                neighbors,
                &mut labels,
                cluster_id,
                &mut visited,
            );
            cluster_id += 1;
        }

        // No built-in center concept; callers derive centers from the
        // labeling when they need them.
        Ok(ClusterFit {
            labels,
            centers: None,
        })
    }

    /// DBSCAN discovers the cluster count from the data.
    fn n_clusters(&self) -> usize {
        0
    }
}
