//! Closed-form evaluators for a single curve segment.
//!
//! Every segment is parameterized over `t ∈ [0, 1]`. Rational forms carry one
//! weight per control point; when all weights are equal they reduce to the
//! plain polynomial and are evaluated with direct Bernstein blending.

pub mod catmull_rom;
mod cubic;
mod linear;
mod quadratic;

use crv_math::{normal_from_tangent, poly, Aabb2, Point2, Vector2};
use serde::{Deserialize, Serialize};

pub use cubic::CubicBezier;
pub use linear::LinearSegment;
pub use quadratic::QuadBezier;

/// Sample count used to bracket the roots of the rational cubic extrema polynomial.
pub(crate) const BOUNDS_SAMPLES: usize = 16;
pub(crate) const BOUNDS_MAX_ITER: usize = 32;

/// A point on a curve with its unit normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub point: Point2,
    /// Unit normal, `(0, 0)` where the tangent vanishes or when not requested.
    pub normal: Vector2,
}

impl Sample {
    pub fn new(point: Point2, normal: Vector2) -> Self {
        Self { point, normal }
    }

    /// Sample of a degenerate curve that collapses to a single point.
    pub fn isolated(point: Point2) -> Self {
        Self {
            point,
            normal: Vector2::X,
        }
    }
}

/// A parametric segment over `t ∈ [0, 1]`.
pub trait SegmentCurve {
    /// Position at `t`.
    fn point_at(&self, t: f64) -> Point2;

    /// First derivative with respect to `t`.
    fn tangent_at(&self, t: f64) -> Vector2;

    /// Weighted basis sum at `t` (1 for non-rational segments).
    fn ratio_at(&self, t: f64) -> f64;

    /// Axis-aligned box enclosing the segment, grown by `padding`.
    fn bounding_box(&self, padding: f64) -> Aabb2;

    /// Unit normal at `t`: the tangent rotated by +90°.
    fn normal_at(&self, t: f64) -> Vector2 {
        normal_from_tangent(self.tangent_at(t))
    }

    fn eval(&self, t: f64, want_normal: bool) -> Sample {
        let normal = if want_normal {
            self.normal_at(t)
        } else {
            Vector2::ZERO
        };
        Sample::new(self.point_at(t), normal)
    }
}

/// Whether a set of weights describes a non-rational curve.
pub(crate) fn uniform_weights(weights: &[f64]) -> bool {
    match weights.split_first() {
        Some((first, rest)) => rest
            .iter()
            .all(|w| (w - first).abs() <= 1e-12 * first.abs().max(1.0)),
        None => true,
    }
}

/// Convert Bernstein coefficients (degree 1 to 3) into power-basis coefficients.
pub(crate) fn bernstein_to_power(c: &[f64]) -> Vec<f64> {
    match *c {
        [c0, c1] => vec![c0, c1 - c0],
        [c0, c1, c2] => vec![c0, 2.0 * (c1 - c0), c0 - 2.0 * c1 + c2],
        [c0, c1, c2, c3] => vec![
            c0,
            3.0 * (c1 - c0),
            3.0 * (c0 - 2.0 * c1 + c2),
            -c0 + 3.0 * c1 - 3.0 * c2 + c3,
        ],
        _ => c.to_vec(),
    }
}

/// Numerator of the derivative of `A(t) / W(t)` along one axis: `A'W - AW'`.
///
/// `values` are the control coordinates on that axis, `weights` their weights.
pub(crate) fn rational_extrema_numerator(values: &[f64], weights: &[f64]) -> Vec<f64> {
    let weighted: Vec<f64> = values.iter().zip(weights).map(|(v, w)| v * w).collect();
    let a = bernstein_to_power(&weighted);
    let w = bernstein_to_power(weights);
    poly::subtract(
        &poly::multiply(&poly::derivative(&a), &w),
        &poly::multiply(&a, &poly::derivative(&w)),
    )
}
