//! Principal component analysis for 2-d projections.
//!
//! Embed-then-look: the pipeline projects the standardized features onto
//! their top principal components purely so the cluster structure can be
//! drawn in two dimensions. Nothing downstream of the figures reads the
//! projection.
//!
//! Components are extracted one at a time by power iteration on the
//! covariance matrix, deflating after each extraction:
//!
//! ```text
//! v ← C v / ||C v||   until the direction stops moving
//! C ← C − λ v vᵀ      then extract the next component
//! ```
//!
//! The start vector is drawn from a seeded standard normal, which makes the
//! projection reproducible run to run (up to the usual sign indeterminacy
//! of principal axes).

use ndarray::Array2;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use crate::error::{Error, Result};

/// Principal component analysis.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Number of components to extract.
    n_components: usize,
    /// Power iteration cap per component.
    max_iter: usize,
    /// Convergence tolerance on the direction change.
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
}

/// A fitted projection: component axes plus the centering mean.
#[derive(Debug, Clone)]
pub struct PcaFit {
    /// Unit-norm component axes, one row per component.
    components: Vec<Vec<f64>>,
    /// Per-dimension mean removed before projecting.
    mean: Vec<f64>,
}

impl Pca {
    /// Create a PCA extractor for `n_components` axes.
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            max_iter: 500,
            tol: 1e-9,
            seed: None,
        }
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the projection to data.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<PcaFit> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        let n = data.len();
        let d = data[0].len();
        for point in data {
            if point.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: point.len(),
                });
            }
        }
        if self.n_components == 0 || self.n_components > d {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be in 1..=d",
            });
        }

        let mut mean = vec![0.0f64; d];
        for point in data {
            for (m, &v) in mean.iter_mut().zip(point) {
                *m += v as f64;
            }
        }
        for m in &mut mean {
            *m /= n as f64;
        }

        // Population covariance of the centered data.
        let mut cov = Array2::<f64>::zeros((d, d));
        for point in data {
            for a in 0..d {
                let da = point[a] as f64 - mean[a];
                for b in a..d {
                    let db = point[b] as f64 - mean[b];
                    cov[[a, b]] += da * db;
                }
            }
        }
        for a in 0..d {
            for b in a..d {
                cov[[a, b]] /= n as f64;
                cov[[b, a]] = cov[[a, b]];
            }
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        let normal = Normal::new(0.0, 1.0).map_err(|_| Error::InvalidParameter {
            name: "normal",
            message: "invalid distribution parameters",
        })?;

        let mut components = Vec::with_capacity(self.n_components);
        for _ in 0..self.n_components {
            let mut v: Vec<f64> = (0..d).map(|_| normal.sample(&mut rng)).collect();
            normalize(&mut v);

            for _iter in 0..self.max_iter {
                let mut next = vec![0.0f64; d];
                for a in 0..d {
                    for b in 0..d {
                        next[a] += cov[[a, b]] * v[b];
                    }
                }
                let norm = normalize(&mut next);
                if norm == 0.0 {
                    // Degenerate direction (zero-variance residual); keep
                    // the current vector.
                    break;
                }

                let drift: f64 = v
                    .iter()
                    .zip(&next)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
                    .sqrt();
                v = next;
                if drift < self.tol {
                    break;
                }
            }

            // Deflate: remove the extracted direction's variance.
            let lambda = rayleigh(&cov, &v);
            for a in 0..d {
                for b in 0..d {
                    cov[[a, b]] -= lambda * v[a] * v[b];
                }
            }

            components.push(v);
        }

        Ok(PcaFit { components, mean })
    }
}

impl PcaFit {
    /// Project data onto the fitted axes, one score row per input row.
    pub fn transform(&self, data: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        let d = self.mean.len();
        data.iter()
            .map(|point| {
                if point.len() != d {
                    return Err(Error::DimensionMismatch {
                        expected: d,
                        found: point.len(),
                    });
                }
                Ok(self
                    .components
                    .iter()
                    .map(|axis| {
                        axis.iter()
                            .zip(point)
                            .zip(&self.mean)
                            .map(|((c, &v), m)| c * (v as f64 - m))
                            .sum::<f64>() as f32
                    })
                    .collect())
            })
            .collect()
    }

    /// Number of fitted components.
    pub fn n_components(&self) -> usize {
        self.components.len()
    }
}

/// Normalize to unit length in place, returning the original norm.
fn normalize(v: &mut [f64]) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}

/// Rayleigh quotient vᵀ C v for a unit vector.
fn rayleigh(cov: &Array2<f64>, v: &[f64]) -> f64 {
    let d = v.len();
    let mut out = 0.0;
    for a in 0..d {
        let mut row = 0.0;
        for b in 0..d {
            row += cov[[a, b]] * v[b];
        }
        out += v[a] * row;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pca_finds_dominant_axis() {
        // Variance overwhelmingly along x.
        let data: Vec<Vec<f32>> = (0..50)
            .map(|i| vec![i as f32, (i % 3) as f32 * 0.01])
            .collect();

        let fit = Pca::new(1).with_seed(42).fit(&data).unwrap();
        let scores = fit.transform(&data).unwrap();

        // Scores along the first axis should nearly reproduce the x spread.
        let min = scores.iter().map(|s| s[0]).fold(f32::INFINITY, f32::min);
        let max = scores.iter().map(|s| s[0]).fold(f32::NEG_INFINITY, f32::max);
        assert!((max - min) > 45.0, "spread {}", max - min);
    }

    #[test]
    fn test_pca_components_are_orthonormal() {
        let data: Vec<Vec<f32>> = (0..40)
            .map(|i| {
                vec![
                    (i as f32 * 0.7).sin() * 3.0,
                    i as f32 * 0.5,
                    (i % 7) as f32,
                ]
            })
            .collect();

        let fit = Pca::new(2).with_seed(7).fit(&data).unwrap();
        let c0 = &fit.components[0];
        let c1 = &fit.components[1];

        let norm0: f64 = c0.iter().map(|x| x * x).sum();
        let norm1: f64 = c1.iter().map(|x| x * x).sum();
        let dot: f64 = c0.iter().zip(c1).map(|(a, b)| a * b).sum();

        assert!((norm0 - 1.0).abs() < 1e-6);
        assert!((norm1 - 1.0).abs() < 1e-6);
        assert!(dot.abs() < 1e-4, "components not orthogonal: {}", dot);
    }

    #[test]
    fn test_pca_reproducible_with_seed() {
        let data: Vec<Vec<f32>> = (0..30)
            .map(|i| vec![i as f32, (i * i % 11) as f32])
            .collect();

        let a = Pca::new(2).with_seed(9).fit(&data).unwrap();
        let b = Pca::new(2).with_seed(9).fit(&data).unwrap();
        assert_eq!(a.transform(&data).unwrap(), b.transform(&data).unwrap());
    }

    #[test]
    fn test_pca_rejects_too_many_components() {
        let data = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert!(Pca::new(3).fit(&data).is_err());
        assert!(Pca::new(0).fit(&data).is_err());
    }

    #[test]
    fn test_transform_rejects_wrong_dimension() {
        let data = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![0.0, 1.0]];
        let fit = Pca::new(1).with_seed(1).fit(&data).unwrap();
        assert!(fit.transform(&[vec![1.0]]).is_err());
    }
}
