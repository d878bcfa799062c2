//! Ensemble fusion: one consensus partition out of three disagreeing ones.
//!
//! Three base algorithms see the same customers through different lenses
//! (a fixed-k partition, density reachability, mixture likelihood) and
//! their raw labelings rarely agree. This module turns them into a single
//! partition two ways:
//!
//! 1. **Majority vote** ([`majority_vote`]): per-point, directly over the
//!    three label ids, with density noise excluded from the vote whenever
//!    real votes exist.
//! 2. **Distance-signature re-clustering** ([`distance_features`] +
//!    [`fuse`]): describe each point by its distance to the nearest center
//!    under each algorithm, then re-cluster that 3-d signature space.
//!    Points the base algorithms placed similarly end up together even
//!    when the raw ids disagreed, which smooths over algorithm-specific
//!    instabilities (k interpretations, density threshold sensitivity,
//!    component overlap).
//!
//! The pipeline reports both, and treats the re-clustered labeling as the
//! authoritative segmentation.

mod features;
mod vote;

pub use features::{derived_centers, distance_features, min_center_distance, NO_AFFINITY};
pub use vote::majority_vote;

use crate::cluster::{Clustering, Label};
use crate::error::Result;

/// Re-cluster a distance-feature matrix into the final hybrid labeling.
///
/// Any [`Clustering`] works as the secondary clusterer; the fusion step
/// needs nothing beyond the fit contract. The pipeline passes a k-means
/// with the configured hybrid cluster count.
pub fn fuse(features: &[Vec<f32>], secondary: &impl Clustering) -> Result<Vec<Label>> {
    Ok(secondary.fit(features)?.labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Kmeans;

    #[test]
    fn test_fuse_groups_similar_distance_signatures() {
        // Two signature regimes: close-to-everything and far-from-everything.
        let features = vec![
            vec![0.1, 0.2, 0.1],
            vec![0.2, 0.1, 0.2],
            vec![5.0, 6.0, NO_AFFINITY],
            vec![5.1, 6.1, NO_AFFINITY],
        ];

        let labels = fuse(&features, &Kmeans::new(2).with_seed(42)).unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn test_fuse_is_reproducible_with_seed() {
        let features: Vec<Vec<f32>> = (0..20)
            .map(|i| vec![(i % 4) as f32, (i % 5) as f32, (i % 2) as f32])
            .collect();

        let secondary = Kmeans::new(3).with_seed(42);
        let first = fuse(&features, &secondary).unwrap();
        let second = fuse(&features, &secondary).unwrap();
        assert_eq!(first, second);
    }
}
