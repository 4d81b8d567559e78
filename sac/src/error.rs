use thiserror::Error;

/// Errors reported before or while drawing samples. Numeric trouble inside
/// a single trial (a degenerate candidate) is never surfaced here; the trial
/// simply contributes no inliers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SacError {
    /// The point set is smaller than the minimal sample of the model.
    #[error("model requires at least {required} points, got {actual}")]
    InsufficientPoints {
        /// Minimal sample size of the model.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// The inlier tolerance is not a finite, strictly positive number.
    #[error("distance tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),

    /// A parallel fit was asked to run on zero workers.
    #[error("parallel consensus requires at least one worker")]
    InvalidWorkers,

    /// The sampler gave up before collecting enough distinct indices.
    #[error("failed to draw {required} distinct indices after {attempts} attempts")]
    SamplingExhausted {
        /// Minimal sample size of the model.
        required: usize,
        /// Number of random draws performed.
        attempts: usize,
    },
}

pub(crate) fn check_tolerance(distance_tol: f64) -> Result<(), SacError> {
    if distance_tol.is_finite() && distance_tol > 0. {
        Ok(())
    } else {
        Err(SacError::InvalidTolerance(distance_tol))
    }
}

pub(crate) fn check_points(actual: usize, required: usize) -> Result<(), SacError> {
    if actual < required {
        Err(SacError::InsufficientPoints { required, actual })
    } else {
        Ok(())
    }
}
