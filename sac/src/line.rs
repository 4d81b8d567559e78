use nalgebra::{Point2, Point3, RealField, Scalar, Vector2};
use num::ToPrimitive;
use sample_consensus::{Estimator, Model};

use crate::base::SacModel;

/// A 2D line `a·x + b·y + c = 0`. `(a, b)` is a normal of the line but is
/// not normalized.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Line2<T: Scalar> {
    pub a: T,
    pub b: T,
    pub c: T,
}

impl<T: RealField + Copy> Line2<T> {
    /// The line through `p1` and `p2`, in cross-product form.
    pub fn through(p1: &Point2<T>, p2: &Point2<T>) -> Self {
        Line2 {
            a: p1.y - p2.y,
            b: p2.x - p1.x,
            c: p1.x * p2.y - p2.x * p1.y,
        }
    }

    #[inline]
    pub fn normal(&self) -> Vector2<T> {
        Vector2::new(self.a, self.b)
    }

    /// Whether the normal vanishes, i.e. the line was built from two
    /// coincident points and describes no direction at all.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        let norm = self.normal().norm();
        norm.is_zero() || !norm.is_finite()
    }

    pub fn distance_directed(&self, x: T, y: T) -> T {
        (self.a * x + self.b * y + self.c) / self.normal().norm()
    }

    /// Orthogonal distance of `(x, y)` to the line. Degenerate lines have no
    /// meaningful distance and yield a non-finite value.
    pub fn distance(&self, x: T, y: T) -> T {
        self.distance_directed(x, y).abs()
    }

    fn foot(&self, x: T, y: T) -> (T, T) {
        let distance = self.distance_directed(x, y);
        let direction = self.normal().normalize();
        (x - direction.x * distance, y - direction.y * distance)
    }
}

fn residual<T: RealField + Copy + ToPrimitive>(line: &Line2<T>, x: T, y: T) -> f64 {
    if line.is_degenerate() {
        return f64::INFINITY;
    }
    line.distance(x, y).to_f64().unwrap_or(f64::INFINITY)
}

impl<T: RealField + Copy + ToPrimitive> Model<Point2<T>> for Line2<T> {
    fn residual(&self, data: &Point2<T>) -> f64 {
        residual(self, data.x, data.y)
    }
}

/// Points in space are measured against the line in their xy projection.
impl<T: RealField + Copy + ToPrimitive> Model<Point3<T>> for Line2<T> {
    fn residual(&self, data: &Point3<T>) -> f64 {
        residual(self, data.x, data.y)
    }
}

impl<T: RealField + Copy + ToPrimitive> SacModel<Point2<T>> for Line2<T> {
    fn is_degenerate(&self) -> bool {
        Line2::is_degenerate(self)
    }

    fn project(&self, coords: &Point2<T>) -> Point2<T> {
        let (x, y) = self.foot(coords.x, coords.y);
        Point2::new(x, y)
    }
}

impl<T: RealField + Copy + ToPrimitive> SacModel<Point3<T>> for Line2<T> {
    fn is_degenerate(&self) -> bool {
        Line2::is_degenerate(self)
    }

    fn project(&self, coords: &Point3<T>) -> Point3<T> {
        let (x, y) = self.foot(coords.x, coords.y);
        Point3::new(x, y, coords.z)
    }
}

pub struct LineEstimator;

impl LineEstimator {
    pub(crate) fn make<T: RealField + Copy>(a: &Point2<T>, b: &Point2<T>) -> Option<Line2<T>> {
        let line = Line2::through(a, b);
        (!line.is_degenerate()).then_some(line)
    }
}

impl<T: RealField + Copy + ToPrimitive> Estimator<Point2<T>> for LineEstimator {
    type Model = Line2<T>;

    type ModelIter = Option<Line2<T>>;

    const MIN_SAMPLES: usize = 2;

    fn estimate<I>(&self, mut data: I) -> Self::ModelIter
    where
        I: Iterator<Item = Point2<T>> + Clone,
    {
        match (data.next(), data.next()) {
            (Some(a), Some(b)) => Self::make(&a, &b),
            _ => None,
        }
    }
}

impl<T: RealField + Copy + ToPrimitive> Estimator<Point3<T>> for LineEstimator {
    type Model = Line2<T>;

    type ModelIter = Option<Line2<T>>;

    const MIN_SAMPLES: usize = 2;

    fn estimate<I>(&self, mut data: I) -> Self::ModelIter
    where
        I: Iterator<Item = Point3<T>> + Clone,
    {
        match (data.next(), data.next()) {
            (Some(a), Some(b)) => Self::make(&a.xy(), &b.xy()),
            _ => None,
        }
    }
}
