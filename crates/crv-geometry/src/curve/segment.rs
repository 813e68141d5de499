use crv_math::{Aabb2, Point2};

use crate::basis::{CubicBezier, LinearSegment, QuadBezier, Sample, SegmentCurve};
use crate::nurbs::NurbsEngine;

/// One segment of a curve resolved to a concrete evaluator.
///
/// Segments are assembled on demand from the curve's vertices. Bezier
/// segments with square handles arrive here already degraded to a lower
/// degree.
#[derive(Debug, Clone, Copy)]
pub enum Segment<'a> {
    /// A curve with a single vertex.
    Point(Point2),
    Linear(LinearSegment),
    Quadratic(QuadBezier),
    Cubic(CubicBezier),
    BSpline {
        engine: &'a NurbsEngine,
        index: usize,
    },
}

impl Segment<'_> {
    pub fn eval(&self, t: f64, want_normal: bool) -> Sample {
        match self {
            Segment::Point(p) => Sample::isolated(*p),
            Segment::Linear(s) => s.eval(t, want_normal),
            Segment::Quadratic(s) => s.eval(t, want_normal),
            Segment::Cubic(s) => s.eval(t, want_normal),
            Segment::BSpline { engine, index } => engine.eval_segment(*index, t, want_normal),
        }
    }

    /// Weighted basis sum at `t`.
    pub fn ratio(&self, t: f64) -> f64 {
        match self {
            Segment::Point(_) => 1.0,
            Segment::Linear(s) => s.ratio_at(t),
            Segment::Quadratic(s) => s.ratio_at(t),
            Segment::Cubic(s) => s.ratio_at(t),
            Segment::BSpline { engine, index } => {
                let (u0, u1) = engine.segment_domain(*index);
                engine.eval_ratio(u0 + (u1 - u0) * t)
            }
        }
    }

    /// Conservative bounds. B-spline segments use the hull of their control
    /// window, which contains the segment for positive weights.
    pub fn bounding_box(&self, padding: f64) -> Aabb2 {
        match self {
            Segment::Point(p) => Aabb2::from_point(*p).expand(padding),
            Segment::Linear(s) => s.bounding_box(padding),
            Segment::Quadratic(s) => s.bounding_box(padding),
            Segment::Cubic(s) => s.bounding_box(padding),
            Segment::BSpline { engine, index } => {
                let window: Vec<Point2> = engine.control_window(*index).collect();
                Aabb2::from_points(&window)
                    .unwrap_or_default()
                    .expand(padding)
            }
        }
    }
}
