//! Random sample consensus for lines and planes.
//!
//! A fit repeatedly draws a minimal sample, builds a candidate model from it
//! and keeps the candidate supported by the most points:
//!
//! ```
//! use nalgebra::Point2;
//! use rfit_sac::{LineEstimator, Ransac};
//!
//! let points = [
//!     Point2::new(0., 0.),
//!     Point2::new(1., 1.),
//!     Point2::new(2., 2.),
//!     Point2::new(3., 3.),
//!     Point2::new(10., -10.),
//! ];
//! let mut ransac = Ransac::seeded(50, 0.1, Some(42));
//! let inliers = ransac.inliers(&LineEstimator, &points)?;
//! assert_eq!(inliers, vec![0, 1, 2, 3]);
//! # Ok::<(), rfit_sac::SacError>(())
//! ```

mod base;
mod error;
mod line;
mod par;
mod plane;
mod ransac;
mod sample;

pub use self::{
    base::{RobustFitter, SacModel},
    error::SacError,
    line::{Line2, LineEstimator},
    par::ParRansac,
    plane::{Plane, PlaneEstimator},
    ransac::{Fitted, Ransac, RansacParams},
    sample::{clock_seed, seeded_rng, Sampler, MAX_DRAW_ATTEMPTS},
};
pub use sample_consensus::{Consensus, Estimator, Model};

#[cfg(test)]
mod tests {
    use nalgebra::Point3;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rfit_common::PointSet;

    use crate::{PlaneEstimator, Ransac, RobustFitter};

    #[test]
    fn test_ground_plane() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut points = (0..300)
            .map(|_| {
                Point3::new(
                    rng.random_range(-20.0..20.0),
                    rng.random_range(-20.0..20.0),
                    rng.random_range(-0.02..0.02),
                )
            })
            .collect::<Vec<_>>();
        points.extend((0..60).map(|_| {
            Point3::new(
                rng.random_range(-3.0..3.0),
                rng.random_range(-3.0..3.0),
                rng.random_range(1.0..4.0),
            )
        }));
        let points = PointSet::from_vec(points);

        let mut fitter = RobustFitter::new(&points, Ransac::new(200, 0.3, rng));
        let fitted = fitter.fit(&PlaneEstimator).unwrap().unwrap();
        assert!(fitted.inliers.len() >= 290);
        assert!(fitted.inliers.iter().all(|&index| index < 300));

        let (ground, obstacles) = fitter.partition(&fitted.inliers);
        assert_eq!(ground.len() + obstacles.len(), points.len());
        assert_eq!(obstacles.iter().filter(|point| point.z >= 1.).count(), 60);
    }
}
