use std::ops::{Deref, Index};

use nalgebra::{Point, RealField, Scalar};

/// An ordered, fixed-size sequence of points. Points carry no identity
/// beyond their position, so every index handed out by a fitter refers back
/// into this storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointSet<P> {
    storage: Vec<P>,
}

impl<P> PointSet<P> {
    #[inline]
    pub fn from_vec(storage: Vec<P>) -> Self {
        PointSet { storage }
    }

    #[inline]
    pub fn into_vec(self) -> Vec<P> {
        self.storage
    }
}

impl<P: Clone> PointSet<P> {
    /// Copies the points at `indices`, in the order given.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Self {
        PointSet {
            storage: { indices.iter() }
                .map(|&index| self.storage[index].clone())
                .collect(),
        }
    }

    /// Splits the set into `(inliers, outliers)`, both keeping the original
    /// point order. Indices outside the set are ignored, and an empty
    /// `inliers` puts every point into the outlier half.
    pub fn partition(&self, inliers: &[usize]) -> (Self, Self) {
        let mut mask = vec![false; self.storage.len()];
        for &index in inliers {
            if let Some(slot) = mask.get_mut(index) {
                *slot = true;
            }
        }

        let (inside, outside): (Vec<_>, Vec<_>) = { self.storage.iter().zip(mask) }
            .partition(|(_, inlier)| *inlier);
        (
            inside.into_iter().map(|(point, _)| point.clone()).collect(),
            outside.into_iter().map(|(point, _)| point.clone()).collect(),
        )
    }
}

impl<T: RealField, const D: usize> PointSet<Point<T, D>> {
    #[inline]
    pub fn is_finite(&self) -> bool {
        { self.storage.iter() }.all(|point| point.coords.iter().all(|x| x.is_finite()))
    }
}

impl<T: Scalar, const D: usize> From<&[[T; D]]> for PointSet<Point<T, D>> {
    fn from(coords: &[[T; D]]) -> Self {
        coords.iter().cloned().map(Point::<T, D>::from).collect()
    }
}

impl<T: Scalar, const D: usize, const N: usize> From<[[T; D]; N]> for PointSet<Point<T, D>> {
    fn from(coords: [[T; D]; N]) -> Self {
        coords.into_iter().map(Point::<T, D>::from).collect()
    }
}

impl<P> From<Vec<P>> for PointSet<P> {
    #[inline]
    fn from(storage: Vec<P>) -> Self {
        PointSet { storage }
    }
}

impl<P> FromIterator<P> for PointSet<P> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        PointSet {
            storage: iter.into_iter().collect(),
        }
    }
}

impl<P> Deref for PointSet<P> {
    type Target = [P];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

impl<P> Index<usize> for PointSet<P> {
    type Output = P;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.storage[index]
    }
}

impl<'a, P> IntoIterator for &'a PointSet<P> {
    type Item = &'a P;

    type IntoIter = std::slice::Iter<'a, P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.storage.iter()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Point3};

    use super::*;

    #[test]
    fn test_from_coords() {
        let points = PointSet::from([[0., 0.], [1., 2.], [3., 4.]]);
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Point2::new(1., 2.));

        let slice: &[[f32; 3]] = &[[1., 2., 3.]];
        let points = PointSet::from(slice);
        assert_relative_eq!(points[0], Point3::new(1., 2., 3.));
    }

    #[test]
    fn test_partition() {
        let points = PointSet::from([[0., 0.], [1., 1.], [2., 2.], [10., -10.]]);
        let (inliers, outliers) = points.partition(&[2, 0, 1]);
        assert_eq!(
            inliers.into_vec(),
            vec![Point2::new(0., 0.), Point2::new(1., 1.), Point2::new(2., 2.)]
        );
        assert_eq!(outliers.into_vec(), vec![Point2::new(10., -10.)]);
    }

    #[test]
    fn test_partition_empty_inliers() {
        let points = PointSet::from([[0., 0., 0.], [1., 1., 1.]]);
        let (inliers, outliers) = points.partition(&[]);
        assert!(inliers.is_empty());
        assert_eq!(outliers, points);

        let (inliers, outliers) = points.partition(&[1, 7]);
        assert_eq!(inliers.len(), 1);
        assert_eq!(outliers[0], Point3::new(0., 0., 0.));
    }

    #[test]
    fn test_select_and_finite() {
        let points = PointSet::from([[0., 1.], [2., 3.], [4., 5.]]);
        let selected = points.select(&[2, 0]);
        assert_eq!(selected[0], Point2::new(4., 5.));
        assert_eq!(selected[1], Point2::new(0., 1.));
        assert!(points.is_finite());

        let points = PointSet::from([[0., f64::NAN]]);
        assert!(!points.is_finite());
    }
}
