//! Stateful rational B-spline evaluator behind the curve orchestrator.

use std::cell::RefCell;

use crv_math::{from_homogeneous, normal_from_tangent, to_homogeneous, Homogeneous, Point2, Vector2};

use super::deboor::{curve_derivatives, curve_point, rational_derivatives};
use super::insert::{control_leg, insert_knot, KnotInsertion};
use super::knot::{clamp_degree, find_span, generate_knots, BasisScratch};
use crate::basis::Sample;

/// Knots closer than this are treated as the same knot when inserting.
const KNOT_TOLERANCE: f64 = 1e-10;

/// Signed segment offsets influenced by a single vertex.
pub fn influence_range(degree: usize, closed: bool) -> (isize, isize) {
    let p = degree as isize;
    if closed {
        let offset = (degree.saturating_sub(1) / 2) as isize;
        (offset - p, offset)
    } else {
        (-p, 0)
    }
}

#[derive(Debug, Clone, Default)]
struct Scratch {
    basis: BasisScratch,
    homogeneous: Vec<Homogeneous>,
    cartesian: Vec<Vector2>,
}

/// A vertex produced by approximate insertion on the control polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearInsertion {
    /// Index the new vertex takes in the caller's vertex list.
    pub index: usize,
    pub position: Point2,
    pub weight: f64,
}

/// Rational B-spline engine.
///
/// Holds the knot vector and homogeneous control points `(x·w, y·w, w)`.
/// Closed curves append `degree + 1` wrapped copies of the vertices and shift
/// them by `offset = (degree - 1) / 2` so that parameter 0 sits on the first
/// real vertex. Scratch buffers live in a `RefCell`, which makes the engine
/// `Send` but not `Sync`.
#[derive(Debug, Clone, Default)]
pub struct NurbsEngine {
    degree: usize,
    closed: bool,
    clamped: bool,
    vertex_count: usize,
    offset: usize,
    knots: Vec<f64>,
    points: Vec<Homogeneous>,
    custom_knots: bool,
    scratch: RefCell<Scratch>,
}

impl NurbsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load weighted vertices.
    ///
    /// Knots are regenerated when `regenerate` is set or the topology (vertex
    /// count, degree, closed/clamped) differs from the last call; otherwise
    /// the current knots, including ones refined by [`Self::insert_knot`], are kept.
    /// Fewer than three vertices leave the engine invalid.
    pub fn set_vertices(
        &mut self,
        vertices: &[(Point2, f64)],
        degree: usize,
        closed: bool,
        clamped: bool,
        regenerate: bool,
    ) {
        let n = vertices.len();
        if n < 3 {
            self.vertex_count = n;
            self.points.clear();
            self.knots.clear();
            self.custom_knots = false;
            return;
        }

        let p = clamp_degree(degree, n);
        let clamped = clamped && !closed;
        let topology_changed = regenerate
            || n != self.vertex_count
            || p != self.degree
            || closed != self.closed
            || clamped != self.clamped;

        self.degree = p;
        self.closed = closed;
        self.clamped = clamped;
        self.vertex_count = n;
        self.offset = if closed { (p - 1) / 2 } else { 0 };

        self.points.clear();
        if closed {
            let offset = self.offset;
            self.points.extend((0..n + p + 1).map(|j| {
                let (pt, w) = vertices[(j + n - offset) % n];
                to_homogeneous(pt, w)
            }));
        } else {
            self.points
                .extend(vertices.iter().map(|&(pt, w)| to_homogeneous(pt, w)));
        }

        if topology_changed || self.knots.len() != self.points.len() + p + 1 {
            generate_knots(&mut self.knots, self.points.len(), p, clamped);
            self.custom_knots = false;
            log::trace!(
                "nurbs: regenerated {} knots (degree {}, closed {}, clamped {})",
                self.knots.len(),
                p,
                closed,
                clamped
            );
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Homogeneous control points, including the wrapped copies of a closed curve.
    pub fn control_points(&self) -> &[Homogeneous] {
        &self.points
    }

    /// Whether the knots were refined by insertion rather than generated.
    pub fn has_custom_knots(&self) -> bool {
        self.custom_knots
    }

    pub fn segment_count(&self) -> usize {
        if !self.is_valid() {
            0
        } else if self.closed {
            self.vertex_count
        } else {
            self.points.len() - self.degree
        }
    }

    /// Knot interval of segment `s` (knot span `degree + s`).
    pub fn segment_domain(&self, s: usize) -> (f64, f64) {
        let span = self.degree + s;
        (self.knots[span], self.knots[span + 1])
    }

    /// Parameter range covered by all segments.
    pub fn domain(&self) -> (f64, f64) {
        if !self.is_valid() {
            return (0.0, 0.0);
        }
        let p = self.degree;
        (self.knots[p], self.knots[p + self.segment_count()])
    }

    pub fn influence_range(&self) -> (isize, isize) {
        influence_range(self.degree, self.closed)
    }

    /// Cartesian control points active on segment `s`.
    pub fn control_window(&self, s: usize) -> impl Iterator<Item = Point2> + '_ {
        let end = (s + self.degree + 1).min(self.points.len());
        self.points[s.min(end)..end]
            .iter()
            .map(|h| from_homogeneous(*h).0)
    }

    fn span_for(&self, u: f64) -> usize {
        find_span(self.degree, &self.knots, self.points.len() - 1, u)
    }

    /// Evaluate at knot parameter `u`, clamped into [`Self::domain`].
    pub fn eval(&self, u: f64, want_normal: bool) -> Sample {
        if !self.is_valid() {
            return Sample::isolated(Point2::ZERO);
        }
        let (lo, hi) = self.domain();
        let u = u.clamp(lo, hi);
        self.eval_on_span(self.span_for(u), u, want_normal)
    }

    /// Evaluate segment `s` at local parameter `t ∈ [0, 1]`.
    pub fn eval_segment(&self, s: usize, t: f64, want_normal: bool) -> Sample {
        let count = self.segment_count();
        if count == 0 {
            return Sample::isolated(Point2::ZERO);
        }
        let s = s.min(count - 1);
        let (u0, u1) = self.segment_domain(s);
        let u = u0 + (u1 - u0) * t.clamp(0.0, 1.0);
        let span = if u1 > u0 {
            self.degree + s
        } else {
            self.span_for(u)
        };
        self.eval_on_span(span, u, want_normal)
    }

    fn eval_on_span(&self, span: usize, u: f64, want_normal: bool) -> Sample {
        let mut scratch = self.scratch.borrow_mut();
        let Scratch {
            basis,
            homogeneous,
            cartesian,
        } = &mut *scratch;
        if want_normal {
            curve_derivatives(self.degree, &self.knots, &self.points, span, u, 1, basis, homogeneous);
            rational_derivatives(homogeneous, cartesian);
            Sample::new(cartesian[0], normal_from_tangent(cartesian[1]))
        } else {
            let h = curve_point(self.degree, &self.knots, &self.points, span, u, basis);
            Sample::new(from_homogeneous(h).0, Vector2::ZERO)
        }
    }

    /// Weighted basis sum at knot parameter `u`.
    pub fn eval_ratio(&self, u: f64) -> f64 {
        if !self.is_valid() {
            return 1.0;
        }
        let (lo, hi) = self.domain();
        let u = u.clamp(lo, hi);
        let span = self.span_for(u);
        let mut scratch = self.scratch.borrow_mut();
        curve_point(self.degree, &self.knots, &self.points, span, u, &mut scratch.basis).z
    }

    /// Cartesian derivatives `C, C', …, C^(order)` at knot parameter `u`.
    pub fn derivatives(&self, u: f64, order: usize) -> Vec<Vector2> {
        if !self.is_valid() {
            return vec![Vector2::ZERO; order + 1];
        }
        let (lo, hi) = self.domain();
        let u = u.clamp(lo, hi);
        let span = self.span_for(u);
        let mut scratch = self.scratch.borrow_mut();
        let Scratch {
            basis,
            homogeneous,
            ..
        } = &mut *scratch;
        curve_derivatives(self.degree, &self.knots, &self.points, span, u, order, basis, homogeneous);
        let mut out = Vec::with_capacity(order + 1);
        rational_derivatives(homogeneous, &mut out);
        out
    }

    /// Insert knot `u` exactly (open curves only).
    ///
    /// On success the engine holds one more control point and the new knot
    /// vector is kept by later [`Self::set_vertices`] calls with the same
    /// topology. Returns `None` for closed curves, parameters outside the
    /// domain interior, or knots already at full multiplicity.
    pub fn insert_knot(&mut self, u: f64) -> Option<KnotInsertion> {
        if self.closed || !self.is_valid() {
            return None;
        }
        let (knots, points, insertion) =
            insert_knot(self.degree, &self.knots, &self.points, u, KNOT_TOLERANCE)?;
        self.knots = knots;
        self.points = points;
        self.vertex_count = self.points.len();
        self.custom_knots = true;
        Some(insertion)
    }

    /// Approximate insertion: a new vertex on the control polygon leg whose
    /// Greville interval contains `u`. The engine itself is not modified.
    pub fn insert_vertex_linear(&self, u: f64) -> Option<LinearInsertion> {
        if !self.is_valid() {
            return None;
        }
        let (leg, f) = control_leg(&self.knots, self.degree, self.points.len(), u)?;
        let (a, wa) = from_homogeneous(self.points[leg]);
        let (b, wb) = from_homogeneous(self.points[leg + 1]);
        let index = if self.closed {
            let n = self.vertex_count;
            (leg + n - self.offset) % n + 1
        } else {
            leg + 1
        };
        Some(LinearInsertion {
            index,
            position: a.lerp(b, f),
            weight: wa + (wb - wa) * f,
        })
    }
}
