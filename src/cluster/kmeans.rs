//! K-means clustering with random restarts.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of
//! squares** (inertia):
//!
//! ```text
//! inertia = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids via k-means++
//! 2. **Assign**: each point → nearest centroid
//! 3. **Update**: each centroid → mean of assigned points
//! 4. Repeat until the centroid shift drops below tolerance
//!
//! Lloyd only finds a local minimum, so each fit runs `n_init` independent
//! restarts and keeps the one with the lowest inertia. Restart seeds are
//! derived from the base seed, which keeps multi-restart fits reproducible.
//!
//! ## K-means++ Initialization
//!
//! Spreads initial centroids: the first is a uniform random point, each
//! subsequent one is sampled with probability proportional to D(x)², the
//! squared distance to the nearest centroid chosen so far. Provable
//! O(log k) approximation to the optimal inertia.
//!
//! # Elbow Sweep
//!
//! [`Kmeans::inertia_over_k`] fits independently at every k in an inclusive
//! range (no warm starts) and reports the per-k inertia. Consumed only by
//! visualization; nothing downstream reads it.

use ndarray::Array2;
use rand::prelude::*;

use super::traits::{ClusterFit, Clustering, Label};
use super::util::to_matrix;
use crate::error::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Independent restarts per fit.
    n_init: usize,
    /// Maximum Lloyd iterations per restart.
    max_iter: usize,
    /// Convergence tolerance on the squared centroid shift.
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
}

/// Outcome of the best restart: labels, centroids, and its inertia.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Cluster assignment per point.
    pub labels: Vec<Label>,
    /// One centroid per cluster, indexed by cluster id.
    pub centroids: Vec<Vec<f32>>,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

impl Kmeans {
    /// Create a new K-means clusterer with `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: None,
        }
    }

    /// Set the number of independent restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit and return the best restart in full (labels + centroids + inertia).
    pub fn fit_full(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        let data_arr = to_matrix(data)?;
        let n = data_arr.nrows();

        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        if self.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be at least 1",
            });
        }

        // One seed per restart. Without a base seed the restarts are drawn
        // from the thread RNG and the fit is not reproducible.
        let restart_seeds: Vec<u64> = match self.seed {
            Some(base) => (0..self.n_init as u64).map(|i| base.wrapping_add(i)).collect(),
            None => {
                let mut rng = rand::rng();
                (0..self.n_init).map(|_| rng.random()).collect()
            }
        };

        let mut best = self.lloyd(&data_arr, restart_seeds[0]);
        for &seed in &restart_seeds[1..] {
            let fit = self.lloyd(&data_arr, seed);
            if fit.inertia < best.inertia {
                best = fit;
            }
        }

        Ok(best)
    }

    /// Inertia for every k in `[k_min, k_max]`, fitting independently at
    /// each k with this instance's restart settings.
    pub fn inertia_over_k(
        &self,
        data: &[Vec<f32>],
        k_min: usize,
        k_max: usize,
    ) -> Result<Vec<(usize, f64)>> {
        if k_min == 0 || k_min > k_max {
            return Err(Error::InvalidParameter {
                name: "k_range",
                message: "requires 1 <= k_min <= k_max",
            });
        }

        let ks: Vec<usize> = (k_min..=k_max).collect();

        #[cfg(feature = "parallel")]
        let fits: Vec<Result<(usize, f64)>> = ks
            .par_iter()
            .map(|&k| {
                let fit = Kmeans { k, ..self.clone() }.fit_full(data)?;
                Ok((k, fit.inertia))
            })
            .collect();

        #[cfg(not(feature = "parallel"))]
        let fits: Vec<Result<(usize, f64)>> = ks
            .iter()
            .map(|&k| {
                let fit = Kmeans { k, ..self.clone() }.fit_full(data)?;
                Ok((k, fit.inertia))
            })
            .collect();

        fits.into_iter().collect()
    }

    /// One seeded restart of Lloyd's algorithm.
    fn lloyd(&self, data_arr: &Array2<f32>, seed: u64) -> KmeansFit {
        let n = data_arr.nrows();
        let d = data_arr.ncols();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut centroids = self.init_centroids(data_arr, &mut rng);
        let mut labels = vec![0usize; n];

        for _iter in 0..self.max_iter {
            self.assign(data_arr, &centroids, &mut labels);

            // Update step
            let mut new_centroids = Array2::zeros((self.k, d));
            let mut counts = vec![0usize; self.k];

            for i in 0..n {
                let k = labels[i];
                for j in 0..d {
                    new_centroids[[k, j]] += data_arr[[i, j]];
                }
                counts[k] += 1;
            }

            for k in 0..self.k {
                if counts[k] > 0 {
                    for j in 0..d {
                        new_centroids[[k, j]] /= counts[k] as f32;
                    }
                } else {
                    // Empty cluster: reinitialize from a random point
                    let idx = rng.random_range(0..n);
                    new_centroids.row_mut(k).assign(&data_arr.row(idx));
                }
            }

            // Check convergence
            let shift: f32 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            centroids = new_centroids;

            if (shift as f64) < self.tol {
                break;
            }
        }

        // Final assignment against the converged centroids, plus inertia.
        self.assign(data_arr, &centroids, &mut labels);
        let mut inertia = 0.0f64;
        for i in 0..n {
            let point = data_arr.row(i);
            let centroid = centroids.row(labels[i]);
            inertia += point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| ((a - b) as f64).powi(2))
                .sum::<f64>();
        }

        KmeansFit {
            labels: labels.into_iter().map(Label::Assigned).collect(),
            centroids: (0..self.k).map(|k| centroids.row(k).to_vec()).collect(),
            inertia,
        }
    }

    /// Assignment step: each point to its nearest centroid.
    fn assign(&self, data_arr: &Array2<f32>, centroids: &Array2<f32>, labels: &mut [usize]) {
        #[cfg(feature = "parallel")]
        {
            labels.par_iter_mut().enumerate().for_each(|(i, label)| {
                *label = Self::nearest(&data_arr.row(i), centroids, self.k);
            });
        }

        #[cfg(not(feature = "parallel"))]
        for (i, label) in labels.iter_mut().enumerate() {
            *label = Self::nearest(&data_arr.row(i), centroids, self.k);
        }
    }

    fn nearest(point: &ndarray::ArrayView1<'_, f32>, centroids: &Array2<f32>, k: usize) -> usize {
        let mut best_cluster = 0;
        let mut best_dist = f32::MAX;

        for c in 0..k {
            let centroid = centroids.row(c);
            let dist: f32 = point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();
            if dist < best_dist {
                best_dist = dist;
                best_cluster = c;
            }
        }
        best_cluster
    }

    /// Initialize centroids using the k-means++ algorithm.
    fn init_centroids(&self, data: &Array2<f32>, rng: &mut impl Rng) -> Array2<f32> {
        let n = data.nrows();
        let d = data.ncols();
        let mut centroids = Array2::zeros((self.k, d));

        // First centroid: random point
        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        // Remaining centroids: k-means++ selection
        for i in 1..self.k {
            let mut distances: Vec<f32> = Vec::with_capacity(n);

            for j in 0..n {
                let point = data.row(j);
                let min_dist = (0..i)
                    .map(|c| {
                        let centroid = centroids.row(c);
                        point
                            .iter()
                            .zip(centroid.iter())
                            .map(|(a, b)| (a - b).powi(2))
                            .sum::<f32>()
                    })
                    .fold(f32::MAX, f32::min);
                distances.push(min_dist);
            }

            // Sample proportional to squared distance
            let total: f32 = distances.iter().sum();
            if total == 0.0 {
                let idx = rng.random_range(0..n);
                centroids.row_mut(i).assign(&data.row(idx));
                continue;
            }

            let threshold = rng.random::<f32>() * total;
            let mut cumsum = 0.0;
            let mut selected = 0;

            for (j, &dist) in distances.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold {
                    selected = j;
                    break;
                }
            }

            centroids.row_mut(i).assign(&data.row(selected));
        }

        centroids
    }
}

impl Clustering for Kmeans {
    fn fit(&self, data: &[Vec<f32>]) -> Result<ClusterFit> {
        let fit = self.fit_full(data)?;
        Ok(ClusterFit {
            labels: fit.labels,
            centers: Some(fit.centroids),
        })
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
