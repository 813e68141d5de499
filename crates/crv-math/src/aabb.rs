use crate::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box in the plane.
///
/// An empty box has `min = +inf` and `max = -inf`, so that including the first
/// point collapses it onto that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: Point2,
    pub max: Point2,
}

impl Aabb2 {
    pub const EMPTY: Self = Self {
        min: Point2::splat(f64::INFINITY),
        max: Point2::splat(f64::NEG_INFINITY),
    };

    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    pub fn from_point(p: Point2) -> Self {
        Self { min: p, max: p }
    }

    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut aabb = Self::from_point(first);
        for &p in rest {
            aabb.include(p);
        }
        Some(aabb)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn x1(&self) -> f64 {
        self.min.x
    }

    pub fn y1(&self) -> f64 {
        self.min.y
    }

    pub fn x2(&self) -> f64 {
        self.max.x
    }

    pub fn y2(&self) -> f64 {
        self.max.y
    }

    pub fn include(&mut self, p: Point2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn contains_point(&self, p: Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn expand(&self, amount: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        let offset = Vector2::splat(amount);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }

    /// Squared distance from `p` to the box; zero when `p` is inside.
    pub fn distance_sq_to_point(&self, p: Point2) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }
        let d = (self.min - p).max(p - self.max).max(Vector2::ZERO);
        d.length_squared()
    }
}

impl Default for Aabb2 {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn test_from_points() {
        let pts = vec![dvec2(1.0, 2.0), dvec2(-1.0, 5.0), dvec2(3.0, -1.0)];
        let aabb = Aabb2::from_points(&pts).unwrap();
        assert_eq!(aabb.min, dvec2(-1.0, -1.0));
        assert_eq!(aabb.max, dvec2(3.0, 5.0));
        assert!(Aabb2::from_points(&[]).is_none());
    }

    #[test]
    fn test_empty_merge() {
        let a = Aabb2::EMPTY;
        assert!(a.is_empty());
        let b = Aabb2::new(dvec2(0.0, 0.0), dvec2(1.0, 1.0));
        assert_eq!(a.merge(&b), b);
        assert_eq!(a.expand(1.0), a);
    }

    #[test]
    fn test_distance_sq_to_point() {
        let aabb = Aabb2::new(dvec2(0.0, 0.0), dvec2(2.0, 2.0));
        assert_eq!(aabb.distance_sq_to_point(dvec2(1.0, 1.0)), 0.0);
        assert_eq!(aabb.distance_sq_to_point(dvec2(5.0, 1.0)), 9.0);
        assert_eq!(aabb.distance_sq_to_point(dvec2(5.0, 6.0)), 25.0);
        assert_eq!(Aabb2::EMPTY.distance_sq_to_point(dvec2(0.0, 0.0)), f64::INFINITY);
    }
}
