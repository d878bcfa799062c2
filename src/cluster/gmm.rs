//! Gaussian Mixture Model clustering.
//!
//! Models the data as a mixture of K Gaussian components:
//!
//! ```text
//! P(x) = Σₖ πₖ × N(x | μₖ, Σₖ)
//! ```
//!
//! fitted with the EM algorithm:
//!
//! **E-step**: compute responsibilities (soft assignments):
//! ```text
//! γₙₖ = πₖ × N(xₙ | μₖ, Σₖ) / Σⱼ πⱼ × N(xₙ | μⱼ, Σⱼ)
//! ```
//!
//! **M-step**: update πₖ, μₖ, Σₖ from the responsibilities.
//!
//! All density computations run in log space with log-sum-exp
//! normalization; responsibilities near machine zero would underflow a
//! linear-space E-step long before EM converges.
//!
//! # Covariance Structure
//!
//! [`Covariance::Full`] (default) maintains a d×d covariance matrix per
//! component, factored with a Cholesky decomposition for the log-density;
//! a component that collapses to a singular covariance fails the
//! factorization and surfaces as an error. [`Covariance::Diag`] keeps one
//! variance per dimension, which is cheaper and cannot go singular thanks
//! to the `reg_covar` floor.
//!
//! # Failure Modes
//!
//! - **Local optima**: EM converges to local maxima; initialization matters
//! - **Singular covariance**: small clusters can collapse; `reg_covar`
//!   regularization pushes the spectrum away from zero
//! - **Wrong K**: too many components overfit; too few underfit

use ndarray::{Array1, Array2};
use rand::prelude::*;

use super::traits::{ClusterFit, Clustering, Label, SoftClustering};
use super::util::to_matrix;
use crate::error::{Error, Result};

/// Covariance structure maintained per mixture component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Covariance {
    /// Full d×d covariance matrix per component.
    Full,
    /// One variance per dimension (axis-aligned Gaussians).
    Diag,
}

/// Gaussian Mixture Model clustering.
#[derive(Debug, Clone)]
pub struct Gmm {
    /// Number of components (clusters).
    n_components: usize,
    /// Covariance structure.
    covariance: Covariance,
    /// Maximum EM iterations.
    max_iter: usize,
    /// Convergence tolerance on the mean log-likelihood change.
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
    /// Regularization added to covariance diagonals.
    reg_covar: f64,
}

/// Outcome of an EM fit.
#[derive(Debug, Clone)]
pub struct GmmFit {
    /// Hard assignment per point (most likely component).
    pub labels: Vec<Label>,
    /// Component means in input space, indexed by component id.
    pub means: Vec<Vec<f32>>,
    /// Responsibilities: entry \[i\]\[k\] is P(component k | point i).
    pub responsibilities: Vec<Vec<f64>>,
    /// Total log-likelihood of the data at the final parameters.
    pub log_likelihood: f64,
}

/// Per-component covariance state for one EM pass.
enum CovState {
    /// k×d variances.
    Diag(Array2<f64>),
    /// One matrix per component, with its Cholesky factor and log-determinant.
    Full(Vec<(Array2<f64>, f64)>),
}

impl Gmm {
    /// Create a new GMM with default settings (full covariance).
    pub fn new() -> Self {
        Self {
            n_components: 2,
            covariance: Covariance::Full,
            max_iter: 100,
            tol: 1e-3,
            seed: None,
            reg_covar: 1e-6,
        }
    }

    /// Set number of components.
    pub fn with_n_components(mut self, n: usize) -> Self {
        self.n_components = n;
        self
    }

    /// Set the covariance structure.
    pub fn with_covariance(mut self, covariance: Covariance) -> Self {
        self.covariance = covariance;
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

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run EM and return labels, means, responsibilities, and likelihood.
    pub fn fit_full(&self, data: &[Vec<f32>]) -> Result<GmmFit> {
        let data_arr = to_matrix(data)?;
        let n = data_arr.nrows();
        let d = data_arr.ncols();
        let k = self.n_components;

        if k == 0 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be > 0",
            });
        }
        if k > n {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: n,
            });
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        // Means: random points from the data.
        let mut means = Array2::zeros((k, d));
        for i in 0..k {
            let idx = rng.random_range(0..n);
            for j in 0..d {
                means[[i, j]] = data_arr[[idx, j]] as f64;
            }
        }

        // Covariances: unit spheres until the first M-step.
        let mut cov = match self.covariance {
            Covariance::Diag => CovState::Diag(Array2::from_elem((k, d), 1.0)),
            Covariance::Full => {
                let factors = (0..k)
                    .map(|_| cholesky(&Array2::eye(d)).map(|l| (l, 0.0)))
                    .collect::<Result<Vec<_>>>()?;
                CovState::Full(factors)
            }
        };

        // Weights: uniform.
        let mut weights = Array1::from_elem(k, 1.0 / k as f64);

        let mut resp = Array2::zeros((n, k));
        let mut log_likelihood = f64::NEG_INFINITY;

        for _iter in 0..self.max_iter {
            // E-step: responsibilities and total log-likelihood.
            let mut ll = 0.0;
            for i in 0..n {
                let point = data_arr.row(i);
                let mut log_probs = vec![0.0; k];

                for c in 0..k {
                    let log_density = match &cov {
                        CovState::Diag(vars) => {
                            log_gaussian_diag(&point, &means.row(c), &vars.row(c))
                        }
                        CovState::Full(factors) => {
                            let (chol, log_det) = &factors[c];
                            log_gaussian_full(&point, &means.row(c), chol, *log_det)
                        }
                    };
                    log_probs[c] = weights[c].ln() + log_density;
                }

                let log_sum = logsumexp(&log_probs);
                ll += log_sum;

                for c in 0..k {
                    resp[[i, c]] = (log_probs[c] - log_sum).exp();
                }
            }

            // M-step: update parameters.
            let resp_sum: Vec<f64> = (0..k).map(|c| resp.column(c).sum()).collect();
            let total: f64 = resp_sum.iter().sum();

            for c in 0..k {
                weights[c] = resp_sum[c] / total;
            }

            let mut new_means = Array2::zeros((k, d));
            for c in 0..k {
                if resp_sum[c] > 1e-10 {
                    for i in 0..n {
                        for j in 0..d {
                            new_means[[c, j]] += resp[[i, c]] * data_arr[[i, j]] as f64;
                        }
                    }
                    for j in 0..d {
                        new_means[[c, j]] /= resp_sum[c];
                    }
                } else {
                    new_means.row_mut(c).assign(&means.row(c));
                }
            }

            cov = match self.covariance {
                Covariance::Diag => {
                    let mut new_vars = Array2::from_elem((k, d), self.reg_covar);
                    for c in 0..k {
                        if resp_sum[c] > 1e-10 {
                            for i in 0..n {
                                for j in 0..d {
                                    let diff = data_arr[[i, j]] as f64 - new_means[[c, j]];
                                    new_vars[[c, j]] += resp[[i, c]] * diff * diff;
                                }
                            }
                            for j in 0..d {
                                new_vars[[c, j]] /= resp_sum[c];
                                new_vars[[c, j]] = new_vars[[c, j]].max(self.reg_covar);
                            }
                        }
                    }
                    CovState::Diag(new_vars)
                }
                Covariance::Full => {
                    let mut factors = Vec::with_capacity(k);
                    for c in 0..k {
                        let mut sigma = Array2::zeros((d, d));
                        if resp_sum[c] > 1e-10 {
                            for i in 0..n {
                                for a in 0..d {
                                    let da = data_arr[[i, a]] as f64 - new_means[[c, a]];
                                    for b in a..d {
                                        let db = data_arr[[i, b]] as f64 - new_means[[c, b]];
                                        sigma[[a, b]] += resp[[i, c]] * da * db;
                                    }
                                }
                            }
                            for a in 0..d {
                                for b in a..d {
                                    sigma[[a, b]] /= resp_sum[c];
                                    sigma[[b, a]] = sigma[[a, b]];
                                }
                            }
                        } else {
                            sigma = Array2::eye(d);
                        }
                        for a in 0..d {
                            sigma[[a, a]] += self.reg_covar;
                        }

                        let chol = cholesky(&sigma)?;
                        let log_det = 2.0 * (0..d).map(|a| chol[[a, a]].ln()).sum::<f64>();
                        factors.push((chol, log_det));
                    }
                    CovState::Full(factors)
                }
            };

            means = new_means;

            // Convergence on the mean log-likelihood change.
            if (ll - log_likelihood).abs() / n as f64 <= self.tol {
                log_likelihood = ll;
                break;
            }
            log_likelihood = ll;
        }

        // Hard assignment: argmax responsibility.
        let labels = (0..n)
            .map(|i| {
                let best = (0..k)
                    .max_by(|&a, &b| {
                        resp[[i, a]]
                            .partial_cmp(&resp[[i, b]])
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .unwrap_or(0);
                Label::Assigned(best)
            })
            .collect();

        Ok(GmmFit {
            labels,
            means: (0..k)
                .map(|c| (0..d).map(|j| means[[c, j]] as f32).collect())
                .collect(),
            responsibilities: (0..n)
                .map(|i| (0..k).map(|c| resp[[i, c]]).collect())
                .collect(),
            log_likelihood,
        })
    }
}

impl Default for Gmm {
    fn default() -> Self {
        Self::new()
    }
}

impl Clustering for Gmm {
    fn fit(&self, data: &[Vec<f32>]) -> Result<ClusterFit> {
        let fit = self.fit_full(data)?;
        Ok(ClusterFit {
            labels: fit.labels,
            centers: Some(fit.means),
        })
    }

    fn n_clusters(&self) -> usize {
        self.n_components
    }
}

impl SoftClustering for Gmm {
    fn fit_predict_proba(&self, data: &[Vec<f32>]) -> Result<Vec<Vec<f64>>> {
        Ok(self.fit_full(data)?.responsibilities)
    }
}

/// Log-density of a point under an axis-aligned Gaussian.
fn log_gaussian_diag(
    point: &ndarray::ArrayView1<'_, f32>,
    mean: &ndarray::ArrayView1<'_, f64>,
    var: &ndarray::ArrayView1<'_, f64>,
) -> f64 {
    let d = point.len() as f64;
    let mut log_prob = -0.5 * d * (2.0 * std::f64::consts::PI).ln();

    for i in 0..point.len() {
        let diff = point[i] as f64 - mean[i];
        log_prob -= 0.5 * var[i].ln();
        log_prob -= 0.5 * diff * diff / var[i];
    }

    log_prob
}

/// Log-density under a full-covariance Gaussian, given the Cholesky factor
/// L of Σ and log det Σ. The quadratic form (x−μ)ᵀΣ⁻¹(x−μ) is ‖L⁻¹(x−μ)‖².
fn log_gaussian_full(
    point: &ndarray::ArrayView1<'_, f32>,
    mean: &ndarray::ArrayView1<'_, f64>,
    chol: &Array2<f64>,
    log_det: f64,
) -> f64 {
    let d = point.len();
    let mut diff: Vec<f64> = (0..d).map(|i| point[i] as f64 - mean[i]).collect();
    forward_solve(chol, &mut diff);
    let quad: f64 = diff.iter().map(|v| v * v).sum();

    -0.5 * (d as f64 * (2.0 * std::f64::consts::PI).ln() + log_det + quad)
}

/// Lower-triangular Cholesky factorization of a symmetric matrix.
///
/// Fails when the matrix is not positive definite.
fn cholesky(a: &Array2<f64>) -> Result<Array2<f64>> {
    let d = a.nrows();
    let mut l = Array2::zeros((d, d));

    for i in 0..d {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for p in 0..j {
                sum -= l[[i, p]] * l[[j, p]];
            }
            if i == j {
                if sum <= 0.0 {
                    return Err(Error::InversionFailed);
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    Ok(l)
}

/// Solve L y = b in place for lower-triangular L.
fn forward_solve(l: &Array2<f64>, b: &mut [f64]) {
    for i in 0..b.len() {
        let mut sum = b[i];
        for p in 0..i {
            sum -= l[[i, p]] * b[p];
        }
        b[i] = sum / l[[i, i]];
    }
}

/// Log-sum-exp for numerical stability.
fn logsumexp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    let max_val = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max_val.is_infinite() {
        return max_val;
    }
    max_val
        + values
            .iter()
            .map(|&v| (v - max_val).exp())
            .sum::<f64>()
            .ln()
}
