use rand::RngCore;
use rfit_common::PointSet;
use sample_consensus::{Consensus, Estimator, Model};

use crate::{
    error::SacError,
    par::ParRansac,
    ransac::{Fitted, Ransac},
};

/// Geometric models that can tell when they are degenerate and snap points
/// onto themselves.
pub trait SacModel<Data>: Model<Data> {
    fn is_degenerate(&self) -> bool;

    fn project(&self, coords: &Data) -> Data;
}

/// Binds a point set to a consensus strategy. The set is borrowed read-only
/// for as long as the fitter lives.
pub struct RobustFitter<'a, P, C> {
    point_set: &'a PointSet<P>,
    inner: C,
}

impl<'a, P, C> RobustFitter<'a, P, C> {
    pub fn new(point_set: &'a PointSet<P>, inner: C) -> Self {
        RobustFitter { point_set, inner }
    }

    #[inline]
    pub fn point_set(&self) -> &'a PointSet<P> {
        self.point_set
    }

    #[inline]
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<'a, P: Clone, C> RobustFitter<'a, P, C> {
    /// Runs any [`Consensus`] implementation over the point set.
    pub fn compute<E: Estimator<P>>(&mut self, estimator: &E) -> Option<(E::Model, C::Inliers)>
    where
        C: Consensus<E, P>,
    {
        self.inner.model_inliers(estimator, self.point_set.iter().cloned())
    }

    /// Splits the point set into its inliers and outliers.
    pub fn partition(&self, inliers: &[usize]) -> (PointSet<P>, PointSet<P>) {
        self.point_set.partition(inliers)
    }

    /// The inliers of `fitted`, moved onto its model.
    pub fn project_inliers<M: SacModel<P>>(&self, fitted: &Fitted<M>) -> PointSet<P> {
        { fitted.inliers.iter() }
            .map(|&index| fitted.model.project(&self.point_set[index]))
            .collect()
    }
}

impl<'a, P: Clone, R: RngCore> RobustFitter<'a, P, Ransac<R>> {
    pub fn fit<E: Estimator<P>>(
        &mut self,
        estimator: &E,
    ) -> Result<Option<Fitted<E::Model>>, SacError> {
        self.inner.fit::<E, P>(estimator, self.point_set)
    }

    pub fn inliers<E: Estimator<P>>(&mut self, estimator: &E) -> Result<Vec<usize>, SacError> {
        self.inner.inliers::<E, P>(estimator, self.point_set)
    }
}

impl<'a, P: Clone + Sync> RobustFitter<'a, P, ParRansac> {
    pub fn fit<E>(&self, estimator: &E) -> Result<Option<Fitted<E::Model>>, SacError>
    where
        E: Estimator<P> + Sync,
        E::Model: Send,
    {
        self.inner.fit::<E, P>(estimator, self.point_set)
    }

    pub fn inliers<E>(&self, estimator: &E) -> Result<Vec<usize>, SacError>
    where
        E: Estimator<P> + Sync,
        E::Model: Send,
    {
        self.inner.inliers::<E, P>(estimator, self.point_set)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Point3};

    use super::*;
    use crate::{line::LineEstimator, plane::PlaneEstimator};

    #[test]
    fn test_partition_line() {
        let points = PointSet::from([[0., 0.], [1., 1.], [2., 2.], [3., 3.], [10., -10.]]);
        let mut fitter = RobustFitter::new(&points, Ransac::seeded(50, 0.1, Some(2)));
        let inliers = fitter.inliers(&LineEstimator).unwrap();
        assert_eq!(inliers, vec![0, 1, 2, 3]);

        let (inside, outside) = fitter.partition(&inliers);
        assert_eq!(inside.len(), 4);
        assert_eq!(outside.into_vec(), vec![Point2::new(10., -10.)]);
    }

    #[test]
    fn test_empty_result_is_all_outliers() {
        let points = PointSet::from([[1., 1., 1.], [1., 1., 1.], [1., 1., 1.]]);
        let mut fitter = RobustFitter::new(&points, Ransac::seeded(20, 0.1, Some(2)));
        let inliers = fitter.inliers(&PlaneEstimator).unwrap();
        assert!(inliers.is_empty());

        let (inside, outside) = fitter.partition(&inliers);
        assert!(inside.is_empty());
        assert_eq!(&outside, fitter.point_set());
    }

    #[test]
    fn test_project_inliers() {
        let points = PointSet::from([
            [0., 0., 0.],
            [1., 0., 0.05],
            [1., 1., -0.05],
            [0., 1., 0.],
            [0.5, 0.5, 0.02],
            [0., 0., 5.],
        ]);
        let mut fitter = RobustFitter::new(&points, Ransac::seeded(200, 0.2, Some(13)));
        let fitted = fitter.fit(&PlaneEstimator).unwrap().unwrap();
        assert_eq!(fitted.inliers, vec![0, 1, 2, 3, 4]);

        for point in fitter.project_inliers(&fitted).iter() {
            assert_relative_eq!(fitted.model.distance(point), 0., epsilon = 1e-9);
        }
    }

    #[test]
    fn test_parallel() {
        let points = PointSet::from([
            [0., 0., 0.],
            [1., 0., 0.],
            [1., 1., 0.],
            [0., 1., 0.],
            [0., 0., 5.],
        ]);
        let fitter = RobustFitter::new(&points, ParRansac::new(100, 0.1, Some(6), 4));
        assert_eq!(fitter.inliers(&PlaneEstimator).unwrap(), vec![0, 1, 2, 3]);
        let lines = PointSet::from_vec(vec![Point3::new(0., 0., 3.), Point3::new(2., 2., -1.)]);
        let fitter = RobustFitter::new(&lines, ParRansac::new(4, 0.1, Some(6), 2));
        assert_eq!(fitter.inliers(&LineEstimator).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_compute() {
        let points = PointSet::from([[0., 0.], [1., 1.], [2., 2.], [3., 3.], [10., -10.]]);
        let mut fitter = RobustFitter::new(&points, Ransac::seeded(50, 0.1, Some(31)));
        let (_model, inliers) = fitter.compute(&LineEstimator).unwrap();
        assert_eq!(inliers, vec![0, 1, 2, 3]);
    }
}
