use crv_math::{from_homogeneous, normal_from_tangent, poly, to_homogeneous, Aabb2, Point2, Vector2};
use serde::{Deserialize, Serialize};

use super::{rational_extrema_numerator, uniform_weights, Sample, SegmentCurve};

/// Rational quadratic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadBezier {
    pub points: [Point2; 3],
    pub weights: [f64; 3],
}

fn bernstein(t: f64) -> [f64; 3] {
    let mt = 1.0 - t;
    [mt * mt, 2.0 * t * mt, t * t]
}

fn bernstein_derivative(t: f64) -> [f64; 3] {
    [-2.0 * (1.0 - t), 2.0 * (1.0 - 2.0 * t), 2.0 * t]
}

impl QuadBezier {
    pub fn new(p0: Point2, p1: Point2, p2: Point2) -> Self {
        Self {
            points: [p0, p1, p2],
            weights: [1.0; 3],
        }
    }

    pub fn rational(points: [Point2; 3], weights: [f64; 3]) -> Self {
        Self { points, weights }
    }

    pub fn is_rational(&self) -> bool {
        !uniform_weights(&self.weights)
    }

    /// Homogeneous value and first derivative: `(A, W, A', W')`.
    fn homogeneous(&self, t: f64) -> (Point2, f64, Vector2, f64) {
        let b = bernstein(t);
        let db = bernstein_derivative(t);
        let mut a = Point2::ZERO;
        let mut da = Vector2::ZERO;
        let (mut w, mut dw) = (0.0, 0.0);
        for i in 0..3 {
            let wp = self.points[i] * self.weights[i];
            a += b[i] * wp;
            da += db[i] * wp;
            w += b[i] * self.weights[i];
            dw += db[i] * self.weights[i];
        }
        (a, w, da, dw)
    }

    /// De Casteljau split in homogeneous space; both halves reproduce the
    /// original shape exactly.
    pub fn split(&self, t: f64) -> (Self, Self) {
        let h: [_; 3] = std::array::from_fn(|i| to_homogeneous(self.points[i], self.weights[i]));
        let q0 = h[0].lerp(h[1], t);
        let q1 = h[1].lerp(h[2], t);
        let m = q0.lerp(q1, t);

        let cartesian = |hs: [crv_math::Homogeneous; 3]| {
            let mut points = [Point2::ZERO; 3];
            let mut weights = [0.0; 3];
            for (i, h) in hs.into_iter().enumerate() {
                (points[i], weights[i]) = from_homogeneous(h);
            }
            Self { points, weights }
        };
        (cartesian([h[0], q0, m]), cartesian([m, q1, h[2]]))
    }

    fn extrema(&self) -> Vec<f64> {
        let mut roots = Vec::new();
        let rational = self.is_rational();
        for axis in 0..2 {
            let c = [self.points[0][axis], self.points[1][axis], self.points[2][axis]];
            if rational {
                let n = rational_extrema_numerator(&c, &self.weights);
                roots.extend(poly::solve_quadratic(n[0], n[1], n[2]));
            } else {
                let denom = c[0] - 2.0 * c[1] + c[2];
                if denom != 0.0 {
                    roots.push((c[0] - c[1]) / denom);
                }
            }
        }
        roots.retain(|t| *t > 0.0 && *t < 1.0);
        roots
    }
}

impl SegmentCurve for QuadBezier {
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
            b[0] * self.points[0] + b[1] * self.points[1] + b[2] * self.points[2]
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
            db[0] * self.points[0] + db[1] * self.points[1] + db[2] * self.points[2]
        }
    }

    fn ratio_at(&self, t: f64) -> f64 {
        let b = bernstein(t);
        b.iter().zip(&self.weights).map(|(b, w)| b * w).sum()
    }

    fn bounding_box(&self, padding: f64) -> Aabb2 {
        let mut bounds = Aabb2::from_point(self.points[0]);
        bounds.include(self.points[2]);
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
        if w == 0.0 {
            return Sample::new(a, if want_normal { normal_from_tangent(da) } else { Vector2::ZERO });
        }
        let point = a / w;
        let normal = if want_normal {
            normal_from_tangent((da - dw * point) / w)
        } else {
            Vector2::ZERO
        };
        Sample::new(point, normal)
    }
}
