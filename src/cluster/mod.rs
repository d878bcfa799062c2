//! The three base clustering algorithms.
//!
//! Every algorithm is consumed through the same contract, [`Clustering`]:
//! fit a numeric dataset, get one [`Label`] per row and, where the algorithm
//! has them, one center per cluster. That uniformity is what keeps the
//! fusion code in [`crate::ensemble`] decoupled from any one algorithm's
//! parameters.
//!
//! ## Algorithms
//!
//! | Algorithm | Cluster count | Centers | Noise |
//! |-----------|---------------|---------|-------|
//! | [`Kmeans`] | fixed k | centroids | never |
//! | [`Dbscan`] | discovered | none (derived downstream) | yes |
//! | [`Gmm`] | fixed components | component means | never |
//!
//! ### K-means
//!
//! Hard partitioning into k spherical clusters by minimizing within-cluster
//! sum of squares, with k-means++ seeding and random restarts.
//!
//! ### DBSCAN
//!
//! Density clustering: grows clusters from dense neighborhoods, of any
//! shape, and declines to assign points outside every dense region
//! ([`Label::Noise`]). The only algorithm here with a noise concept.
//!
//! ### Gaussian Mixture
//!
//! Soft probabilistic clustering via EM; a point between two components is
//! genuinely ambiguous and the responsibilities say so. Hard labels are the
//! most-likely component; [`SoftClustering`] exposes the probabilities.
//!
//! ## Usage
//!
//! ```rust
//! use cohort::cluster::{Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let fit = Kmeans::new(2).with_seed(42).fit(&data).unwrap();
//! assert_eq!(fit.labels[0], fit.labels[1]);  // First two together
//! assert_ne!(fit.labels[0], fit.labels[2]);  // Separate from last two
//! assert!(fit.labels.iter().all(|l| !l.is_noise()));
//! ```

mod dbscan;
mod gmm;
mod kmeans;
mod traits;
mod util;

pub use dbscan::Dbscan;
pub use gmm::{Covariance, Gmm, GmmFit};
pub use kmeans::{Kmeans, KmeansFit};
pub use traits::{ClusterFit, Clustering, Label, SoftClustering};

pub(crate) use util::{euclidean, squared_euclidean};
