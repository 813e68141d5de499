use crv_math::{Aabb2, Point2, Vector2};
use serde::{Deserialize, Serialize};

use super::SegmentCurve;

/// A straight segment between two weighted vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSegment {
    pub start: Point2,
    pub end: Point2,
    pub weights: [f64; 2],
}

impl LinearSegment {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            weights: [1.0, 1.0],
        }
    }

    pub fn with_weights(start: Point2, end: Point2, w0: f64, w1: f64) -> Self {
        Self {
            start,
            end,
            weights: [w0, w1],
        }
    }

    /// Split at `t` into two segments covering `[0, t]` and `[t, 1]`.
    pub fn split(&self, t: f64) -> (Self, Self) {
        let mid = self.point_at(t);
        let w = self.ratio_at(t);
        (
            Self::with_weights(self.start, mid, self.weights[0], w),
            Self::with_weights(mid, self.end, w, self.weights[1]),
        )
    }
}

impl SegmentCurve for LinearSegment {
    fn point_at(&self, t: f64) -> Point2 {
        self.start.lerp(self.end, t)
    }

    fn tangent_at(&self, _t: f64) -> Vector2 {
        self.end - self.start
    }

    fn ratio_at(&self, t: f64) -> f64 {
        self.weights[0] + (self.weights[1] - self.weights[0]) * t
    }

    fn bounding_box(&self, padding: f64) -> Aabb2 {
        Aabb2::new(self.start.min(self.end), self.start.max(self.end)).expand(padding)
    }
}
