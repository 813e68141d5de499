//! The curve orchestrator: vertices, dirty tracking, lazy validation and the
//! query/mutation API shared by every curve type.

mod controls;
mod segment;
mod spline;
mod vertex;

use crv_math::Point2;

use crate::basis::Sample;

pub use segment::Segment;
pub use spline::{Curve, CurveType, EndControl};
pub use vertex::{ControlPoint, Side, Vertex, VertexType};

/// Anything that can be evaluated as a chain of segments over `t ∈ [0, 1]`.
pub trait SegmentEvaluator {
    fn segment_count(&self) -> usize;

    fn evaluate(&self, segment: usize, t: f64, want_normal: bool) -> Sample;

    fn evaluate_point(&self, segment: usize, t: f64) -> Point2 {
        self.evaluate(segment, t, false).point
    }
}
