//! Knot insertion and approximate vertex insertion on the control polygon.

use crv_math::Homogeneous;

use super::knot::{find_span, multiplicity};

/// Where a knot insertion changed the control polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnotInsertion {
    /// Span containing the inserted knot, in the old knot vector.
    pub span: usize,
    /// Multiplicity of the knot before insertion.
    pub multiplicity: usize,
    /// First new control point that differs from the old polygon.
    pub first: usize,
    /// Last new control point that differs from the old polygon.
    pub last: usize,
}

/// Boehm's single knot insertion.
///
/// Returns the new knot vector and control points, or `None` when `u` lies
/// outside the open domain interior or its multiplicity already reached the
/// degree. The curve shape is unchanged.
pub fn insert_knot(
    degree: usize,
    knots: &[f64],
    points: &[Homogeneous],
    u: f64,
    tolerance: f64,
) -> Option<(Vec<f64>, Vec<Homogeneous>, KnotInsertion)> {
    let p = degree;
    let m = points.len();
    if m <= p || knots.len() != m + p + 1 {
        return None;
    }
    if u <= knots[p] || u >= knots[m] {
        return None;
    }
    let s = multiplicity(knots, u, tolerance);
    if s >= p {
        return None;
    }

    let k = find_span(p, knots, m - 1, u);
    let mut new_points = Vec::with_capacity(m + 1);
    for i in 0..=m {
        let q = if i + p <= k {
            points[i]
        } else if i + s > k {
            points[i - 1]
        } else {
            let alpha = (u - knots[i]) / (knots[i + p] - knots[i]);
            points[i - 1].lerp(points[i], alpha)
        };
        new_points.push(q);
    }

    let mut new_knots = Vec::with_capacity(knots.len() + 1);
    new_knots.extend_from_slice(&knots[..=k]);
    new_knots.push(u);
    new_knots.extend_from_slice(&knots[k + 1..]);

    let insertion = KnotInsertion {
        span: k,
        multiplicity: s,
        first: k + 1 - p,
        last: k - s,
    };
    Some((new_knots, new_points, insertion))
}

/// Greville abscissa of control point `i`: the average of its `degree` inner knots.
pub fn greville(knots: &[f64], degree: usize, i: usize) -> f64 {
    knots[i + 1..=i + degree].iter().sum::<f64>() / degree as f64
}

/// The control polygon leg `P_i → P_{i+1}` whose Greville interval contains
/// `u`, with the interpolation factor along it.
pub fn control_leg(knots: &[f64], degree: usize, control_count: usize, u: f64) -> Option<(usize, f64)> {
    if control_count < 2 {
        return None;
    }
    for i in 0..control_count - 1 {
        let a = greville(knots, degree, i);
        let b = greville(knots, degree, i + 1);
        if u <= b || i + 2 == control_count {
            let f = if b > a { ((u - a) / (b - a)).clamp(0.0, 1.0) } else { 0.5 };
            return Some((i, f));
        }
    }
    None
}
