use crv_math::{
    from_homogeneous, normal_from_tangent, poly, to_homogeneous, Aabb2, Homogeneous, Point2,
    Vector2,
};
use serde::{Deserialize, Serialize};

use super::{
    rational_extrema_numerator, uniform_weights, Sample, SegmentCurve, BOUNDS_MAX_ITER,
    BOUNDS_SAMPLES,
};

/// Rational cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub points: [Point2; 4],
    pub weights: [f64; 4],
}

fn bernstein(t: f64) -> [f64; 4] {
    let mt = 1.0 - t;
    [mt * mt * mt, 3.0 * t * mt * mt, 3.0 * t * t * mt, t * t * t]
}

fn bernstein_derivative(t: f64) -> [f64; 4] {
    let mt = 1.0 - t;
    [
        -3.0 * mt * mt,
        3.0 * mt * mt - 6.0 * t * mt,
        6.0 * t * mt - 3.0 * t * t,
        3.0 * t * t,
    ]
}

impl CubicBezier {
    pub fn new(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Self {
        Self {
            points: [p0, p1, p2, p3],
            weights: [1.0; 4],
        }
    }

    pub fn rational(points: [Point2; 4], weights: [f64; 4]) -> Self {
        Self { points, weights }
    }

    pub fn is_rational(&self) -> bool {
        !uniform_weights(&self.weights)
    }

    fn homogeneous(&self, t: f64) -> (Point2, f64, Vector2, f64) {
        let b = bernstein(t);
        let db = bernstein_derivative(t);
        let mut a = Point2::ZERO;
        let mut da = Vector2::ZERO;
        let (mut w, mut dw) = (0.0, 0.0);
        for i in 0..4 {
            let wp = self.points[i] * self.weights[i];
            a += b[i] * wp;
            da += db[i] * wp;
            w += b[i] * self.weights[i];
            dw += db[i] * self.weights[i];
        }
        (a, w, da, dw)
    }

    /// De Casteljau split at `t`, carried out on homogeneous points.
    pub fn split(&self, t: f64) -> (Self, Self) {
        let h: [Homogeneous; 4] =
            std::array::from_fn(|i| to_homogeneous(self.points[i], self.weights[i]));
        let a = h[0].lerp(h[1], t);
        let b = h[1].lerp(h[2], t);
        let c = h[2].lerp(h[3], t);
        let d = a.lerp(b, t);
        let e = b.lerp(c, t);
        let m = d.lerp(e, t);

        let cartesian = |hs: [Homogeneous; 4]| {
            let mut points = [Point2::ZERO; 4];
            let mut weights = [0.0; 4];
            for (i, h) in hs.into_iter().enumerate() {
                (points[i], weights[i]) = from_homogeneous(h);
            }
            Self { points, weights }
        };
        (cartesian([h[0], a, d, m]), cartesian([m, e, c, h[3]]))
    }

    /// Parameters in `(0, 1)` where either coordinate has a local extremum.
    fn extrema(&self) -> Vec<f64> {
        let mut roots = Vec::new();
        let rational = self.is_rational();
        for axis in 0..2 {
            let c: [f64; 4] = std::array::from_fn(|i| self.points[i][axis]);
            if rational {
                let n = rational_extrema_numerator(&c, &self.weights);
                roots.extend(poly::roots_in_unit_interval(&n, BOUNDS_SAMPLES, BOUNDS_MAX_ITER));
            } else {
                let d0 = c[1] - c[0];
                let d1 = c[2] - c[1];
                let d2 = c[3] - c[2];
                let a = d0 - 2.0 * d1 + d2;
                let b = 2.0 * (d1 - d0);
                roots.extend(poly::solve_quadratic(d0, b, a));
            }
        }
        roots.retain(|t| *t > 0.0 && *t < 1.0);
        roots
    }
}

impl SegmentCurve for CubicBezier {
    fn point_at(&self, t: f64) -> Point2 {
        if self.is_rational() {
            let (a, w, _, _) = self.homogeneous(t);
            if w == 0.0 {
                a
            } else {
                a / w
            }
        } else {
            let b = bernstein(t);
            (0..4).map(|i| b[i] * self.points[i]).sum()
        }
    }

    fn tangent_at(&self, t: f64) -> Vector2 {
        if self.is_rational() {
            let (a, w, da, dw) = self.homogeneous(t);
            if w == 0.0 {
                return da;
            }
            (da - dw * (a / w)) / w
        } else {
            let db = bernstein_derivative(t);
            (0..4).map(|i| db[i] * self.points[i]).sum()
        }
    }

    fn ratio_at(&self, t: f64) -> f64 {
        let b = bernstein(t);
        b.iter().zip(&self.weights).map(|(b, w)| b * w).sum()
    }

    fn bounding_box(&self, padding: f64) -> Aabb2 {
        let mut bounds = Aabb2::from_point(self.points[0]);
        bounds.include(self.points[3]);
        for t in self.extrema() {
            bounds.include(self.point_at(t));
        }
        bounds.expand(padding)
    }

    fn eval(&self, t: f64, want_normal: bool) -> Sample {
        if !self.is_rational() {
            let normal = if want_normal {
                self.normal_at(t)
            } else {
                Vector2::ZERO
            };
            return Sample::new(self.point_at(t), normal);
        }
        let (a, w, da, dw) = self.homogeneous(t);
        let (point, tangent) = if w == 0.0 {
            (a, da)
        } else {
            let point = a / w;
            (point, (da - dw * point) / w)
        };
        let normal = if want_normal {
            normal_from_tangent(tangent)
        } else {
            Vector2::ZERO
        };
        Sample::new(point, normal)
    }
}
