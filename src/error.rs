use thiserror::Error;

/// Result alias for `cohort`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the segmentation pipeline and its building blocks.
#[derive(Debug, Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Positional alignment broken: two sequences that must be row-aligned
    /// have different lengths, or points have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension or length.
        expected: usize,
        /// Found dimension or length.
        found: usize,
    },

    /// Invalid number of clusters requested.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Covariance factorization failure (matrix not positive definite).
    #[error("matrix inversion failed")]
    InversionFailed,

    /// A required column is absent from the input schema.
    #[error("required column '{name}' is missing from the input")]
    MissingColumn {
        /// Column name.
        name: String,
    },

    /// I/O failure while reading data or writing figures.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed CSV input.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Figure rendering failure.
    #[error("figure rendering failed: {0}")]
    Render(String),
}
