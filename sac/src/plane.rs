use nalgebra::{Point3, RealField, Scalar, Vector3};
use num::ToPrimitive;
use sample_consensus::{Estimator, Model};

use crate::base::SacModel;

/// A plane `a·x + b·y + c·z + d = 0` with an unnormalized normal `(a, b, c)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Plane<T: Scalar> {
    pub a: T,
    pub b: T,
    pub c: T,
    pub d: T,
}

impl<T: RealField + Copy> Plane<T> {
    /// The plane through `p1`, `p2` and `p3`, with normal
    /// `(p2 - p1) × (p3 - p1)`.
    pub fn through(p1: &Point3<T>, p2: &Point3<T>, p3: &Point3<T>) -> Self {
        let normal = (p2 - p1).cross(&(p3 - p1));
        Plane::from_normal(&normal, p1)
    }

    pub fn from_normal(normal: &Vector3<T>, coords: &Point3<T>) -> Self {
        Plane {
            a: normal.x,
            b: normal.y,
            c: normal.z,
            d: -normal.dot(&coords.coords),
        }
    }

    #[inline]
    pub fn normal(&self) -> Vector3<T> {
        Vector3::new(self.a, self.b, self.c)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        let norm = self.normal().norm();
        norm.is_zero() || !norm.is_finite()
    }

    pub fn distance_directed(&self, point: &Point3<T>) -> T {
        (self.normal().dot(&point.coords) + self.d) / self.normal().norm()
    }

    pub fn distance(&self, point: &Point3<T>) -> T {
        self.distance_directed(point).abs()
    }
}

impl<T: RealField + Copy + ToPrimitive> Model<Point3<T>> for Plane<T> {
    fn residual(&self, data: &Point3<T>) -> f64 {
        if self.is_degenerate() {
            return f64::INFINITY;
        }
        self.distance(data).to_f64().unwrap_or(f64::INFINITY)
    }
}

impl<T: RealField + Copy + ToPrimitive> SacModel<Point3<T>> for Plane<T> {
    fn is_degenerate(&self) -> bool {
        Plane::is_degenerate(self)
    }

    fn project(&self, coords: &Point3<T>) -> Point3<T> {
        let distance = self.distance_directed(coords);
        let direction = self.normal().normalize();
        coords - direction * distance
    }
}

pub struct PlaneEstimator;

impl PlaneEstimator {
    /// Rejects collinear samples, and also near-collinear ones: the sine of
    /// the angle between the two edges must exceed `sqrt(ε)`, so for `f32`
    /// triangles thinner than roughly 3.4e-4 rad are discarded too. Their
    /// normal direction is dominated by rounding. A line sample has no such
    /// angle; its normal is as long as the sample itself, so only coincident
    /// points are rejected there.
    pub(crate) fn make<T: RealField + Copy>(
        a: &Point3<T>,
        b: &Point3<T>,
        c: &Point3<T>,
    ) -> Option<Plane<T>> {
        let xa = b - a;
        let xb = c - a;
        let normal = xa.cross(&xb);

        let area = normal.norm();
        let scale = xa.norm() * xb.norm();
        (area.is_finite() && area > T::default_epsilon().sqrt() * scale)
            .then(|| Plane::from_normal(&normal, a))
    }
}

impl<T: RealField + Copy + ToPrimitive> Estimator<Point3<T>> for PlaneEstimator {
    type Model = Plane<T>;

    type ModelIter = Option<Plane<T>>;

    const MIN_SAMPLES: usize = 3;

    fn estimate<I>(&self, mut data: I) -> Self::ModelIter
    where
        I: Iterator<Item = Point3<T>> + Clone,
    {
        match (data.next(), data.next(), data.next()) {
            (Some(a), Some(b), Some(c)) => Self::make(&a, &b, &c),
            _ => None,
        }
    }
}
