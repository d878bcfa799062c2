//! Clustering traits and label types.

use crate::error::Result;

/// Per-point cluster assignment.
///
/// Density-based algorithms can decline to assign a point; that outcome is a
/// first-class variant rather than a reserved integer, so a noise marker can
/// never collide with a real cluster id.
///
/// The derived `Ord` places `Assigned(a) < Assigned(b)` for `a < b` and any
/// assignment below `Noise`, so "lowest label wins" tie-breaks are a plain
/// `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// Member of the cluster with this id.
    Assigned(usize),
    /// Not part of any dense region.
    Noise,
}

impl Label {
    /// Cluster id, or `None` for noise.
    pub fn id(self) -> Option<usize> {
        match self {
            Label::Assigned(id) => Some(id),
            Label::Noise => None,
        }
    }

    /// True if this point was left unassigned.
    pub fn is_noise(self) -> bool {
        matches!(self, Label::Noise)
    }
}

/// Result of fitting a clustering algorithm: one label per input point and,
/// for algorithms that have them, one center per cluster.
#[derive(Debug, Clone)]
pub struct ClusterFit {
    /// Cluster assignment per point, positionally aligned with the input.
    pub labels: Vec<Label>,
    /// Cluster centers in input space, ordered by cluster id. `None` for
    /// algorithms without a center concept (density-based).
    pub centers: Option<Vec<Vec<f32>>>,
}

/// Trait for clustering algorithms.
pub trait Clustering {
    /// Fit the model to data and return assignments plus optional centers.
    ///
    /// The returned labels are positionally aligned with `data`.
    fn fit(&self, data: &[Vec<f32>]) -> Result<ClusterFit>;

    /// Number of clusters this instance is configured for, or 0 when the
    /// count is discovered from the data.
    fn n_clusters(&self) -> usize;
}

/// Trait for soft clustering algorithms that return probabilities.
pub trait SoftClustering: Clustering {
    /// Fit and return soft cluster assignments (probabilities).
    ///
    /// Returns a matrix where entry \[i\]\[k\] is the probability that
    /// point i belongs to cluster k.
    fn fit_predict_proba(&self, data: &[Vec<f32>]) -> Result<Vec<Vec<f64>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_ordering() {
        assert!(Label::Assigned(0) < Label::Assigned(1));
        assert!(Label::Assigned(usize::MAX) < Label::Noise);

        let min = [Label::Assigned(2), Label::Noise, Label::Assigned(1)]
            .into_iter()
            .min()
            .unwrap();
        assert_eq!(min, Label::Assigned(1));
    }

    #[test]
    fn test_label_accessors() {
        assert_eq!(Label::Assigned(3).id(), Some(3));
        assert_eq!(Label::Noise.id(), None);
        assert!(Label::Noise.is_noise());
        assert!(!Label::Assigned(0).is_noise());
    }
}
