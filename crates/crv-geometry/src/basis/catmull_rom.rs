//! Catmull-Rom segments expressed as cubic Bezier segments.
//!
//! A segment between `p1` and `p2` is shaped by its outer neighbours `p0` and
//! `p3`. Open curves have no outer neighbour at their ends, so one is
//! synthesized from the end chord.

use crv_math::Point2;

use super::CubicBezier;

/// Convert a Catmull-Rom span to Bezier form.
///
/// `tension_start` and `tension_end` scale the tangents at `p1` and `p2`; a
/// tension of 1 gives the uniform Catmull-Rom spline, 0 a straight segment.
pub fn to_cubic_bezier(
    p0: Point2,
    p1: Point2,
    p2: Point2,
    p3: Point2,
    tension_start: f64,
    tension_end: f64,
) -> CubicBezier {
    let b1 = p1 + (p2 - p0) * (tension_start / 6.0);
    let b2 = p2 - (p3 - p1) * (tension_end / 6.0);
    CubicBezier::new(p1, b1, b2, p2)
}

/// Phantom neighbour continuing the end chord: `2·end - next`.
pub fn extrapolate(end: Point2, next: Point2) -> Point2 {
    2.0 * end - next
}

/// Phantom neighbour obtained by reflecting `third` across the perpendicular
/// bisector of the chord `end → next`.
///
/// Unlike [`extrapolate`] this keeps the turning angle of the first real span,
/// so the end segment bends like its neighbour. Falls back to extrapolation for
/// a zero-length chord.
pub fn mirror_end(end: Point2, next: Point2, third: Point2) -> Point2 {
    let axis = (next - end).normalize_or_zero();
    if axis == Point2::ZERO {
        return extrapolate(end, next);
    }
    let mid = (end + next) * 0.5;
    third - 2.0 * (third - mid).dot(axis) * axis
}
