//! Rational curve evaluation from homogeneous control points.

use crv_math::{Homogeneous, Vector2};

use super::knot::BasisScratch;

/// Evaluate the homogeneous curve point on a known knot span.
pub fn curve_point(
    degree: usize,
    knots: &[f64],
    control_points: &[Homogeneous],
    span: usize,
    t: f64,
    scratch: &mut BasisScratch,
) -> Homogeneous {
    let basis = scratch.basis(degree, knots, span, t);
    basis
        .iter()
        .enumerate()
        .map(|(i, &b)| b * control_points[span - degree + i])
        .sum()
}

/// Homogeneous derivatives `(A^(k), w^(k))` for `k` in `0..=order`, written into `out`.
#[allow(clippy::too_many_arguments)]
pub fn curve_derivatives(
    degree: usize,
    knots: &[f64],
    control_points: &[Homogeneous],
    span: usize,
    t: f64,
    order: usize,
    scratch: &mut BasisScratch,
    out: &mut Vec<Homogeneous>,
) {
    let ders = scratch.derivatives(degree, knots, span, t, order);
    out.clear();
    for k in 0..=order {
        let row = ders.row(k);
        out.push(
            row.iter()
                .enumerate()
                .map(|(i, &b)| b * control_points[span - degree + i])
                .sum(),
        );
    }
}

/// Binomial coefficient `C(n, k)` as a float.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Cartesian derivatives of a rational curve from its homogeneous derivatives.
///
/// `C^(k) = (A^(k) - Σ_{i=1..k} C(k,i) w^(i) C^(k-i)) / w`
pub fn rational_derivatives(homogeneous: &[Homogeneous], out: &mut Vec<Vector2>) {
    out.clear();
    let Some(first) = homogeneous.first() else {
        return;
    };
    let w = first.z;
    for (k, h) in homogeneous.iter().enumerate() {
        let mut v = h.truncate();
        for i in 1..=k {
            v -= binomial(k, i) * homogeneous[i].z * out[k - i];
        }
        out.push(if w == 0.0 { v } else { v / w });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::knot::find_span;
    use crv_math::{dvec2, from_homogeneous, to_homogeneous};

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(4, 2), 6.0);
        assert_eq!(binomial(5, 0), 1.0);
        assert_eq!(binomial(3, 4), 0.0);
    }

    #[test]
    fn test_curve_point_quadratic() {
        let degree = 2;
        let knots = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let cps = [
            to_homogeneous(dvec2(0.0, 0.0), 1.0),
            to_homogeneous(dvec2(0.5, 1.0), 1.0),
            to_homogeneous(dvec2(1.0, 0.0), 1.0),
        ];
        let mut scratch = BasisScratch::new();

        let span = find_span(degree, &knots, 2, 0.5);
        let (p, w) = from_homogeneous(curve_point(degree, &knots, &cps, span, 0.5, &mut scratch));
        assert!((p - dvec2(0.5, 0.5)).length() < 1e-10);
        assert!((w - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rational_circle_derivatives() {
        // Quarter circle as a degree-2 rational curve
        let degree = 2;
        let knots = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let cps = [
            to_homogeneous(dvec2(1.0, 0.0), 1.0),
            to_homogeneous(dvec2(1.0, 1.0), w),
            to_homogeneous(dvec2(0.0, 1.0), 1.0),
        ];
        let mut scratch = BasisScratch::new();
        let mut homogeneous = Vec::new();
        let mut cartesian = Vec::new();

        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let span = find_span(degree, &knots, 2, t);
            curve_derivatives(degree, &knots, &cps, span, t, 2, &mut scratch, &mut homogeneous);
            rational_derivatives(&homogeneous, &mut cartesian);
            let (p, d1) = (cartesian[0], cartesian[1]);
            assert!((p.length() - 1.0).abs() < 1e-12);
            assert!(p.dot(d1).abs() < 1e-10, "tangent not perpendicular at t={}", t);
            // |C|² = 1 ⇒ C·C'' = -|C'|²
            assert!((p.dot(cartesian[2]) + d1.length_squared()).abs() < 1e-8);
        }
    }
}
