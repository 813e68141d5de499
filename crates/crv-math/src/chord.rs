use crate::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A straight chord between two samples of a curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Chord {
    pub start: Point2,
    pub end: Point2,
}

impl Chord {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vector2 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    /// Get a point along the chord at parameter `f ∈ [0, 1]`.
    pub fn at(&self, f: f64) -> Point2 {
        self.start + self.direction() * f
    }

    /// Parameter of the orthogonal projection of `point`, clamped to the chord.
    ///
    /// A zero-length chord projects everything onto its start.
    pub fn project(&self, point: Point2) -> f64 {
        let d = self.direction();
        let len_sq = d.length_squared();
        if len_sq <= 0.0 {
            return 0.0;
        }
        ((point - self.start).dot(d) / len_sq).clamp(0.0, 1.0)
    }

    /// Find the closest point on the chord to a given point.
    pub fn closest_point(&self, point: Point2) -> Point2 {
        self.at(self.project(point))
    }

    /// Squared distance from a point to the chord.
    pub fn distance_sq_to_point(&self, point: Point2) -> f64 {
        (point - self.closest_point(point)).length_squared()
    }

    /// Move `point` onto the line perpendicular to the chord through `foot`.
    ///
    /// Only the component of `point - foot` across the chord survives; the
    /// along-chord drift is discarded.
    pub fn onto_perpendicular(&self, foot: Point2, point: Point2) -> Point2 {
        let across = self.direction().perp().normalize_or_zero();
        foot + across * (point - foot).dot(across)
    }
}
