//! Geometric utility functions

use crate::types::Point;
use serde::{Deserialize, Serialize};

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn delta(&self) -> Point {
        self.end.sub(&self.start)
    }

    /// Parameter `t` of the projection of `point` on the supporting line,
    /// so that `start + t * delta` is the closest point. Clamped to `[0, 1]`
    /// when `clamped` is set.
    pub fn closest_point_to_point_parameter(&self, point: &Point, clamped: bool) -> f64 {
        let delta = self.delta();
        let length_sq = delta.magnitude_squared();
        if length_sq == 0.0 {
            return 0.0;
        }

        let t = point.sub(&self.start).dot(&delta) / length_sq;
        if clamped { t.clamp(0.0, 1.0) } else { t }
    }

    /// Closest point on the segment (or its line when `clamped` is false)
    pub fn closest_point_to_point(&self, point: &Point, clamped: bool) -> Point {
        let t = self.closest_point_to_point_parameter(point, clamped);
        self.start.add(&self.delta().scale(t))
    }
}

/// An oriented plane `normal . p + constant = 0`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal (zero for degenerate input)
    pub normal: Point,
    pub constant: f64,
}

impl Plane {
    pub fn from_normal_and_coplanar_point(normal: Point, point: &Point) -> Self {
        Self {
            normal,
            constant: -normal.dot(point),
        }
    }

    /// Plane through three points; counter-clockwise `a, b, c` give the
    /// normal pointing towards the viewer.
    pub fn from_coplanar_points(a: &Point, b: &Point, c: &Point) -> Self {
        let normal = b.sub(a).cross(&c.sub(a)).normalize();
        Self::from_normal_and_coplanar_point(normal, a)
    }

    /// Signed distance along the normal (positive = in front)
    #[inline]
    pub fn distance_to_point(&self, point: &Point) -> f64 {
        self.normal.dot(point) + self.constant
    }
}

/// Indices of the points with minimum and maximum coordinate along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremes {
    pub min: [usize; 3],
    pub max: [usize; 3],
}

impl Extremes {
    /// Axis with the largest 1-D separation between its extremes.
    /// Ties keep the earlier axis.
    pub fn widest_axis(&self, points: &[Point]) -> usize {
        let mut best_axis = 0;
        let mut best_distance = f64::NEG_INFINITY;
        for axis in 0..3 {
            let distance = points[self.max[axis]].axis(axis) - points[self.min[axis]].axis(axis);
            if distance > best_distance {
                best_distance = distance;
                best_axis = axis;
            }
        }
        best_axis
    }
}

/// Find the extreme points (min/max in each dimension).
/// The first point reaching an extreme wins ties.
pub fn find_extremes(points: &[Point]) -> Extremes {
    let mut min = [0; 3];
    let mut max = [0; 3];

    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p.axis(axis) < points[min[axis]].axis(axis) {
                min[axis] = i;
            }
            if p.axis(axis) > points[max[axis]].axis(axis) {
                max[axis] = i;
            }
        }
    }

    Extremes { min, max }
}

/// Visibility tolerance scaled to the magnitude of the input coordinates
pub fn tolerance_from_extremes(points: &[Point], extremes: &Extremes, scale: f64) -> f64 {
    let extent: f64 = (0..3)
        .map(|axis| {
            let lo = points[extremes.min[axis]].axis(axis).abs();
            let hi = points[extremes.max[axis]].axis(axis).abs();
            lo.max(hi)
        })
        .sum();
    scale * f64::EPSILON * extent
}

/// Compute the volume of a tetrahedron formed by 4 points
pub fn tetrahedron_volume(p0: &Point, p1: &Point, p2: &Point, p3: &Point) -> f64 {
    let v1 = p1.sub(p0);
    let v2 = p2.sub(p0);
    let v3 = p3.sub(p0);

    v1.dot(&v2.cross(&v3)).abs() / 6.0
}
