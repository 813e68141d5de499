//! Vertex insertion that keeps the curve shape where the representation allows it.

use crv_core::traits::Validate;
use crv_core::{CrvError, Result};
use crv_math::{from_homogeneous, Point2, Vector2};

use super::{Curve, CurveType};
use crate::basis::{CubicBezier, QuadBezier};
use crate::closest::ClosestPointOptions;
use crate::curve::segment::Segment;
use crate::curve::vertex::{Side, Vertex, VertexType};

/// Hits closer than this to a segment end count as landing on a vertex.
const END_EPSILON: f64 = 1e-9;

impl Curve {
    /// Insert a vertex at `t` on `segment` and return its index.
    ///
    /// Bezier and linear segments are split exactly: the neighbouring handles
    /// are rewritten and their vertices frozen (`None` becomes `Smooth`).
    /// Open B-splines use knot insertion when exact insertion is enabled;
    /// closed or inexact B-splines get a vertex on the control polygon.
    /// Catmull-Rom curves receive the evaluated point.
    pub fn insert_vertex(&mut self, segment: usize, t: f64) -> Result<usize> {
        self.validate();
        let count = self.segment_count();
        if segment >= count {
            return Err(CrvError::SegmentOutOfRange {
                index: segment,
                count,
            });
        }
        if !(t > 0.0 && t < 1.0) {
            return Err(CrvError::InvalidOperation(format!(
                "insertion parameter {t} must lie strictly inside (0, 1)"
            )));
        }

        let index = match self.effective_kind() {
            CurveType::BSpline => self.insert_bspline(segment, t)?,
            CurveType::CatmullRom => {
                let point = self.eval_point(segment, t);
                self.insert_raw(segment + 1, Vertex::new(point));
                segment + 1
            }
            CurveType::Linear | CurveType::QuadraticBezier | CurveType::CubicBezier => {
                self.split_segment(segment, t)
            }
        };
        log::debug!("inserted vertex {} on segment {} at t = {:.6}", index, segment, t);
        Ok(index)
    }

    /// Insert a vertex at the point of the curve closest to `(x, y)`.
    ///
    /// Returns `Ok(None)` when nothing is hit or the hit coincides with an
    /// existing vertex.
    pub fn insert_vertex_at(
        &mut self,
        x: f64,
        y: f64,
        options: &ClosestPointOptions,
    ) -> Result<Option<usize>> {
        self.validate();
        let Some(hit) = self.closest_point(x, y, options) else {
            return Ok(None);
        };
        if self.segment_count() == 0 || hit.t <= END_EPSILON || hit.t >= 1.0 - END_EPSILON {
            return Ok(None);
        }
        self.insert_vertex(hit.segment, hit.t).map(Some)
    }

    fn freeze(&mut self, index: usize) {
        let vertex = &mut self.vertices[index];
        if vertex.kind == VertexType::None {
            vertex.kind = VertexType::Smooth;
        }
    }

    fn set_handle(&mut self, index: usize, side: Side, offset: Vector2, weight: f64) {
        let control = self.vertices[index].control_mut(side);
        control.offset = Some(offset);
        control.weight = weight;
    }

    fn split_segment(&mut self, s: usize, t: f64) -> usize {
        let n = self.vertices.len();
        let (a, b) = (s, (s + 1) % n);
        let at = s + 1;

        let vertex = match self.segment(s) {
            Segment::Linear(line) => {
                let (left, _) = line.split(t);
                let mut vertex = Vertex::new(left.end).with_weight(left.weights[1]);
                if self.kind != CurveType::Linear {
                    vertex.kind = VertexType::Square;
                }
                vertex
            }
            Segment::Quadratic(quad) => self.split_quadratic(a, b, &quad, t),
            Segment::Cubic(cubic) => self.split_cubic(a, b, &cubic, t),
            Segment::Point(_) | Segment::BSpline { .. } => {
                Vertex::new(self.eval_point(s, t))
            }
        };

        if self.kind != CurveType::Linear {
            self.freeze(a);
            self.freeze(b);
        }
        self.insert_raw(at, vertex);
        at
    }

    /// Split a (possibly degraded) quadratic segment between vertices `a` and `b`.
    fn split_quadratic(&mut self, a: usize, b: usize, quad: &QuadBezier, t: f64) -> Vertex {
        let (left, right) = quad.split(t);
        let mid = left.points[2];
        let mut vertex = Vertex::new(mid)
            .with_weight(left.weights[2])
            .with_kind(VertexType::Manual);
        let offset_in = left.points[1] - mid;
        let offset_out = right.points[1] - mid;

        let a_square = self.vertices[a].is_square(Side::Right);
        let degraded_cubic = self.kind == CurveType::CubicBezier;
        if degraded_cubic && a_square {
            // handle came from b.left
            vertex.left.offset = Some(offset_in);
            vertex.left.weight = left.weights[1];
            vertex.right.kind = VertexType::Square;
            vertex.right.offset = Some(Vector2::ZERO);
            let pb = self.vertices[b].position;
            self.set_handle(b, Side::Left, right.points[1] - pb, right.weights[1]);
        } else {
            let pa = self.vertices[a].position;
            self.set_handle(a, Side::Right, left.points[1] - pa, left.weights[1]);
            vertex.right.offset = Some(offset_out);
            vertex.right.weight = right.weights[1];
            if degraded_cubic {
                vertex.left.kind = VertexType::Square;
                vertex.left.offset = Some(Vector2::ZERO);
            } else {
                vertex.left.offset = Some(-offset_out);
            }
        }
        vertex
    }

    fn split_cubic(&mut self, a: usize, b: usize, cubic: &CubicBezier, t: f64) -> Vertex {
        let (left, right) = cubic.split(t);
        let mid = left.points[3];
        let pa = self.vertices[a].position;
        let pb = self.vertices[b].position;
        self.set_handle(a, Side::Right, left.points[1] - pa, left.weights[1]);
        self.set_handle(b, Side::Left, right.points[2] - pb, right.weights[2]);

        let mut vertex = Vertex::new(mid)
            .with_weight(left.weights[3])
            .with_kind(VertexType::Smooth);
        vertex.left.offset = Some(left.points[2] - mid);
        vertex.left.weight = left.weights[2];
        vertex.right.offset = Some(right.points[1] - mid);
        vertex.right.weight = right.weights[1];
        vertex
    }

    fn insert_bspline(&mut self, s: usize, t: f64) -> Result<usize> {
        let (u0, u1) = self.engine.segment_domain(s);
        let u = u0 + (u1 - u0) * t;

        if self.exact_knot_insertion && !self.closed {
            // The refined knots belong to the degree in force; a clamped
            // request would otherwise regrow once a vertex is added.
            let degree = self.effective_degree();
            if degree != self.b_spline_degree {
                log::debug!(
                    "b-spline degree {} pinned to {} for knot insertion",
                    self.b_spline_degree,
                    degree
                );
                self.b_spline_degree = degree;
            }
            let Some(insertion) = self.engine.insert_knot(u) else {
                return Err(CrvError::InvalidOperation(format!(
                    "knot {u} cannot be inserted (already at full multiplicity)"
                )));
            };
            let at = insertion.last;
            self.vertices.insert(at, Vertex::new(Point2::ZERO));
            for i in insertion.first..=insertion.last {
                let (position, weight) = from_homogeneous(self.engine.control_points()[i]);
                self.vertices[i].position = position;
                self.vertices[i].weight = weight;
            }
            self.reindex(at);
            self.invalidate_segments();
            log::trace!(
                "knot {:.6} inserted at span {} (multiplicity {}), vertices {}..={} rewritten",
                u,
                insertion.span,
                insertion.multiplicity,
                insertion.first,
                insertion.last
            );
            return Ok(at);
        }

        if self.exact_knot_insertion {
            log::warn!("exact knot insertion is unavailable on closed b-splines; inserting on the control polygon");
        }
        let insertion = self
            .engine
            .insert_vertex_linear(u)
            .ok_or_else(|| CrvError::Geometry("b-spline engine has no control polygon".into()))?;
        let vertex = Vertex::new(insertion.position).with_weight(insertion.weight);
        self.insert_raw(insertion.index, vertex);
        Ok(insertion.index)
    }
}
