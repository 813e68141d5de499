mod edit;

use crv_core::traits::{BoundingBox, Validate};
use crv_core::{CrvError, Result};
use crv_math::{dvec2, Aabb2, Point2, Vector2};
use serde::{Deserialize, Serialize};

use super::controls;
use super::segment::Segment;
use super::vertex::{Side, Vertex, VertexType};
use super::SegmentEvaluator;
use crate::arclength::{self, Arc, ArcLengthOptions};
use crate::basis::{catmull_rom, CubicBezier, LinearSegment, QuadBezier, Sample};
use crate::closest::{self, ClosestPoint, ClosestPointOptions, SegmentLut};
use crate::nurbs::{self, clamp_degree, NurbsEngine};

/// Curve representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveType {
    #[default]
    Linear,
    QuadraticBezier,
    CubicBezier,
    CatmullRom,
    BSpline,
}

/// How an open Catmull-Rom curve synthesizes the neighbour missing at each end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndControl {
    /// Continue the end chord: `2·p0 - p1`.
    #[default]
    Extrapolate,
    /// Reflect the third vertex across the end chord's perpendicular bisector.
    Mirror,
    /// Caller-supplied positions, see [`Curve::set_manual_end_controls`].
    Manual,
}

fn dirty() -> bool {
    true
}

/// A 2D curve: an ordered list of vertices evaluated as a chain of segments.
///
/// Mutations only mark vertices dirty. [`Validate::validate`] rebuilds
/// automatic handles, the NURBS engine, per-segment arc-length tables and
/// bounds. Queries read those caches and must follow a `validate()` call.
///
/// Segment `s` starts at vertex `s`; its table, length and bounds are stored
/// on that vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve {
    vertices: Vec<Vertex>,
    kind: CurveType,
    closed: bool,
    tension: f64,
    b_spline_degree: usize,
    b_spline_clamped: bool,
    end_control: EndControl,
    manual_end_controls: [Option<Point2>; 2],
    exact_knot_insertion: bool,
    arc_options: ArcLengthOptions,
    bounds_padding: f64,
    #[serde(skip)]
    length: f64,
    #[serde(skip)]
    bounds: Aabb2,
    #[serde(skip, default = "dirty")]
    dirty: bool,
    #[serde(skip, default = "dirty")]
    topology_dirty: bool,
    #[serde(skip)]
    engine: NurbsEngine,
}

impl Default for Curve {
    fn default() -> Self {
        Self::new()
    }
}

impl Curve {
    pub const DEFAULT_BOUNDS_PADDING: f64 = 1e-6;

    /// An empty linear curve.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            kind: CurveType::Linear,
            closed: false,
            tension: 1.0,
            b_spline_degree: 3,
            b_spline_clamped: true,
            end_control: EndControl::Extrapolate,
            manual_end_controls: [None, None],
            exact_knot_insertion: true,
            arc_options: ArcLengthOptions::default(),
            bounds_padding: Self::DEFAULT_BOUNDS_PADDING,
            length: 0.0,
            bounds: Aabb2::EMPTY,
            dirty: false,
            topology_dirty: true,
            engine: NurbsEngine::new(),
        }
    }

    pub fn with_kind(kind: CurveType) -> Self {
        Self {
            kind,
            ..Self::new()
        }
    }

    /// Build a curve through `points`. The result still needs `validate()`.
    pub fn from_points(kind: CurveType, points: &[Point2], closed: bool) -> Self {
        let mut curve = Self::with_kind(kind);
        curve.closed = closed;
        for &p in points {
            curve.add_vertex(p);
        }
        curve
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn kind(&self) -> CurveType {
        self.kind
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn tension(&self) -> f64 {
        self.tension
    }

    /// Requested B-spline degree.
    pub fn b_spline_degree(&self) -> usize {
        self.b_spline_degree
    }

    /// Degree actually used: the requested one clamped into `[2, n - 1]`.
    pub fn effective_degree(&self) -> usize {
        clamp_degree(self.b_spline_degree, self.vertices.len())
    }

    pub fn b_spline_clamped(&self) -> bool {
        self.b_spline_clamped
    }

    pub fn end_control(&self) -> EndControl {
        self.end_control
    }

    pub fn manual_end_controls(&self) -> [Option<Point2>; 2] {
        self.manual_end_controls
    }

    pub fn exact_knot_insertion(&self) -> bool {
        self.exact_knot_insertion
    }

    pub fn arc_options(&self) -> &ArcLengthOptions {
        &self.arc_options
    }

    pub fn bounds_padding(&self) -> f64 {
        self.bounds_padding
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex(&self, index: usize) -> Result<&Vertex> {
        self.check_vertex(index)?;
        Ok(&self.vertices[index])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn engine(&self) -> &NurbsEngine {
        &self.engine
    }

    /// The representation segments are evaluated with; B-splines with fewer
    /// than three vertices fall back to linear.
    pub fn effective_kind(&self) -> CurveType {
        if self.kind == CurveType::BSpline && self.vertices.len() < 3 {
            CurveType::Linear
        } else {
            self.kind
        }
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    fn check_vertex(&self, index: usize) -> Result<()> {
        if index < self.vertices.len() {
            Ok(())
        } else {
            Err(CrvError::VertexOutOfRange {
                index,
                count: self.vertices.len(),
            })
        }
    }

    fn check_weight(weight: f64) -> Result<()> {
        if weight.is_finite() && weight > 0.0 {
            Ok(())
        } else {
            Err(CrvError::InvalidWeight(weight))
        }
    }

    /// Vertex `delta` steps away from `index`; wraps on closed curves.
    fn neighbour(&self, index: usize, delta: isize) -> Option<usize> {
        let n = self.vertices.len() as isize;
        let j = index as isize + delta;
        if self.closed && n > 0 {
            Some(j.rem_euclid(n) as usize)
        } else if (0..n).contains(&j) {
            Some(j as usize)
        } else {
            None
        }
    }

    /// Vertices around a changed vertex whose segments must be rebuilt.
    fn influence(&self) -> (isize, isize) {
        match self.effective_kind() {
            CurveType::Linear | CurveType::QuadraticBezier | CurveType::CubicBezier => (-1, 1),
            CurveType::CatmullRom => (-2, 1),
            CurveType::BSpline => nurbs::influence_range(self.effective_degree(), self.closed),
        }
    }

    fn invalidate_around(&mut self, index: usize) {
        let (lo, hi) = self.influence();
        for d in lo..=hi {
            if let Some(j) = self.neighbour(index, d) {
                self.vertices[j].invalidated = true;
            }
        }
        self.dirty = true;
    }

    /// Rebuild every segment without touching the knot vector.
    fn invalidate_segments(&mut self) {
        for v in &mut self.vertices {
            v.invalidated = true;
        }
        self.dirty = true;
    }

    /// Rebuild everything, knots included.
    fn invalidate_topology(&mut self) {
        self.invalidate_segments();
        self.topology_dirty = true;
    }

    fn invalidate_ends(&mut self) {
        if let Some(last) = self.vertices.len().checked_sub(1) {
            self.invalidate_around(0);
            self.invalidate_around(last);
        }
    }

    fn reindex(&mut self, from: usize) {
        for (i, v) in self.vertices.iter_mut().enumerate().skip(from) {
            v.set_index(i);
        }
    }

    /// Insert a prepared vertex and invalidate around it.
    fn insert_raw(&mut self, index: usize, vertex: Vertex) {
        self.vertices.insert(index, vertex);
        self.reindex(index);
        if self.kind == CurveType::BSpline {
            self.invalidate_topology();
        } else {
            self.invalidate_around(index);
            self.topology_dirty = true;
        }
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Append a vertex and return its index.
    ///
    /// Invalidates the influence range of the new vertex; B-splines rebuild
    /// entirely since their knot vector changes.
    pub fn add_vertex(&mut self, position: Point2) -> usize {
        self.push_vertex(Vertex::new(position))
    }

    /// Append a prepared vertex (weight, tension, handles already set).
    pub fn push_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.insert_raw(index, vertex);
        index
    }

    /// Remove a vertex. Invalidates the segments on both sides of the gap.
    pub fn remove_vertex(&mut self, index: usize) -> Result<Vertex> {
        self.check_vertex(index)?;
        let removed = self.vertices.remove(index);
        self.reindex(index);
        if self.kind == CurveType::BSpline {
            self.invalidate_topology();
        } else {
            let n = self.vertices.len();
            if n > 0 {
                self.invalidate_around(index.min(n - 1));
                if let Some(prev) = self.neighbour(index, -1) {
                    self.invalidate_around(prev.min(n - 1));
                }
            }
            self.topology_dirty = true;
            self.dirty = true;
        }
        Ok(removed)
    }

    /// Change the representation. Invalidates everything.
    pub fn set_kind(&mut self, kind: CurveType) {
        if self.kind != kind {
            self.kind = kind;
            self.invalidate_topology();
        }
    }

    /// Open or close the curve. Invalidates everything.
    pub fn set_closed(&mut self, closed: bool) {
        if self.closed != closed {
            self.closed = closed;
            self.invalidate_topology();
        }
    }

    /// Requested B-spline degree; clamped into `[2, n - 1]` when used.
    /// Invalidates everything on B-spline curves.
    pub fn set_b_spline_degree(&mut self, degree: usize) {
        if self.b_spline_degree != degree {
            self.b_spline_degree = degree;
            if self.kind == CurveType::BSpline {
                self.invalidate_topology();
            }
        }
    }

    /// Clamped (end-interpolating) or uniform knots for open B-splines.
    /// Invalidates everything on B-spline curves.
    pub fn set_b_spline_clamped(&mut self, clamped: bool) {
        if self.b_spline_clamped != clamped {
            self.b_spline_clamped = clamped;
            if self.kind == CurveType::BSpline {
                self.invalidate_topology();
            }
        }
    }

    /// Global Catmull-Rom tension. Invalidates every Catmull-Rom segment.
    pub fn set_tension(&mut self, tension: f64) {
        self.tension = tension;
        if self.kind == CurveType::CatmullRom {
            self.invalidate_segments();
        }
    }

    /// End handling of open Catmull-Rom curves. Invalidates the end segments.
    pub fn set_end_control(&mut self, end_control: EndControl) {
        self.end_control = end_control;
        if self.kind == CurveType::CatmullRom {
            self.invalidate_ends();
        }
    }

    /// Absolute phantom positions used by [`EndControl::Manual`]; `None`
    /// falls back to extrapolation. Invalidates the end segments.
    pub fn set_manual_end_controls(&mut self, start: Option<Point2>, end: Option<Point2>) {
        self.manual_end_controls = [start, end];
        if self.kind == CurveType::CatmullRom {
            self.invalidate_ends();
        }
    }

    /// Use Boehm knot insertion for open B-splines (on by default).
    pub fn set_exact_knot_insertion(&mut self, exact: bool) {
        self.exact_knot_insertion = exact;
    }

    /// Arc-length subdivision settings. Invalidates every segment.
    pub fn set_arc_options(&mut self, options: ArcLengthOptions) {
        self.arc_options = options;
        self.invalidate_segments();
    }

    /// Padding added to every segment box. Invalidates every segment.
    pub fn set_bounds_padding(&mut self, padding: f64) {
        self.bounds_padding = padding;
        self.invalidate_segments();
    }

    // ------------------------------------------------------------------
    // Vertex mutation
    // ------------------------------------------------------------------

    /// Move a vertex. Invalidates its influence range.
    pub fn set_vertex_position(&mut self, index: usize, position: Point2) -> Result<()> {
        self.check_vertex(index)?;
        self.vertices[index].position = position;
        self.invalidate_around(index);
        Ok(())
    }

    /// Set a vertex weight (finite, positive). Invalidates its influence range.
    pub fn set_vertex_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        self.check_vertex(index)?;
        Self::check_weight(weight)?;
        self.vertices[index].weight = weight;
        self.invalidate_around(index);
        Ok(())
    }

    /// Per-vertex Catmull-Rom tension multiplier. Invalidates its influence range.
    pub fn set_vertex_tension(&mut self, index: usize, tension: f64) -> Result<()> {
        self.check_vertex(index)?;
        self.vertices[index].tension = tension;
        self.invalidate_around(index);
        Ok(())
    }

    /// Change the vertex type and conform its handles to it.
    /// Invalidates its influence range.
    pub fn set_vertex_kind(&mut self, index: usize, kind: VertexType) -> Result<()> {
        self.check_vertex(index)?;
        let vertex = &mut self.vertices[index];
        vertex.kind = kind;
        controls::apply_kind(vertex);
        self.invalidate_around(index);
        Ok(())
    }

    /// Set a handle offset relative to its vertex.
    ///
    /// An automatic vertex becomes `Smooth` and a square one `Manual`; the
    /// opposite handle follows the `Smooth`/`Mirror` constraint. Invalidates
    /// the vertex's influence range.
    pub fn set_control_point(&mut self, index: usize, side: Side, offset: Vector2) -> Result<()> {
        self.check_vertex(index)?;
        let vertex = &mut self.vertices[index];
        if vertex.control(side).kind == VertexType::Square {
            vertex.control_mut(side).kind = VertexType::None;
        }
        match vertex.kind {
            VertexType::None => vertex.kind = VertexType::Smooth,
            VertexType::Square => vertex.kind = VertexType::Manual,
            _ => {}
        }
        vertex.control_mut(side).offset = Some(offset);
        controls::enforce(vertex, side);
        self.invalidate_around(index);
        Ok(())
    }

    /// Set a handle weight (finite, positive). Invalidates the vertex's influence range.
    pub fn set_control_point_weight(&mut self, index: usize, side: Side, weight: f64) -> Result<()> {
        self.check_vertex(index)?;
        Self::check_weight(weight)?;
        self.vertices[index].control_mut(side).weight = weight;
        self.invalidate_around(index);
        Ok(())
    }

    /// Set the type of a single handle; `VertexType::None` inherits the
    /// vertex type. Invalidates the vertex's influence range.
    pub fn set_control_point_kind(&mut self, index: usize, side: Side, kind: VertexType) -> Result<()> {
        self.check_vertex(index)?;
        let vertex = &mut self.vertices[index];
        vertex.control_mut(side).kind = kind;
        match vertex.control_kind(side) {
            VertexType::Square => vertex.control_mut(side).offset = Some(Vector2::ZERO),
            VertexType::None => vertex.control_mut(side).offset = None,
            VertexType::Smooth | VertexType::Mirror => {
                if vertex.control(side).is_set() {
                    controls::enforce(vertex, side);
                }
            }
            VertexType::Manual => {}
        }
        self.invalidate_around(index);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Segments
    // ------------------------------------------------------------------

    /// Number of segments for the current vertex count and representation.
    pub fn segment_count(&self) -> usize {
        let n = self.vertices.len();
        if n < 2 {
            return 0;
        }
        match self.effective_kind() {
            CurveType::BSpline if !self.closed => n - self.effective_degree(),
            _ if self.closed => n,
            _ => n - 1,
        }
    }

    /// Resolve segment `s` (clamped to the last segment) to its evaluator.
    pub fn segment(&self, s: usize) -> Segment<'_> {
        let n = self.vertices.len();
        match n {
            0 => return Segment::Point(Point2::ZERO),
            1 => return Segment::Point(self.vertices[0].position),
            _ => {}
        }
        let s = s.min(self.segment_count() - 1);
        let a = &self.vertices[s];
        let b = &self.vertices[(s + 1) % n];
        let linear = || {
            Segment::Linear(LinearSegment::with_weights(
                a.position, b.position, a.weight, b.weight,
            ))
        };

        match self.effective_kind() {
            CurveType::Linear => linear(),
            CurveType::QuadraticBezier => {
                if a.is_square(Side::Right) {
                    linear()
                } else {
                    Segment::Quadratic(QuadBezier::rational(
                        [a.position, a.control_position(Side::Right), b.position],
                        [a.weight, a.right.weight, b.weight],
                    ))
                }
            }
            CurveType::CubicBezier => match (a.is_square(Side::Right), b.is_square(Side::Left)) {
                (true, true) => linear(),
                (true, false) => Segment::Quadratic(QuadBezier::rational(
                    [a.position, b.control_position(Side::Left), b.position],
                    [a.weight, b.left.weight, b.weight],
                )),
                (false, true) => Segment::Quadratic(QuadBezier::rational(
                    [a.position, a.control_position(Side::Right), b.position],
                    [a.weight, a.right.weight, b.weight],
                )),
                (false, false) => Segment::Cubic(CubicBezier::rational(
                    [
                        a.position,
                        a.control_position(Side::Right),
                        b.control_position(Side::Left),
                        b.position,
                    ],
                    [a.weight, a.right.weight, b.left.weight, b.weight],
                )),
            },
            CurveType::CatmullRom => Segment::Cubic(self.catmull_rom_segment(s)),
            CurveType::BSpline => {
                if self.engine.is_valid() {
                    Segment::BSpline {
                        engine: &self.engine,
                        index: s,
                    }
                } else {
                    linear()
                }
            }
        }
    }

    fn catmull_rom_segment(&self, s: usize) -> CubicBezier {
        let n = self.vertices.len();
        let (i1, i2) = (s, (s + 1) % n);
        let p1 = self.vertices[i1].position;
        let p2 = self.vertices[i2].position;
        let p0 = match self.neighbour(i1, -1) {
            Some(i) => self.vertices[i].position,
            None => self.phantom(false),
        };
        let p3 = match self.neighbour(i2, 1) {
            Some(i) => self.vertices[i].position,
            None => self.phantom(true),
        };
        catmull_rom::to_cubic_bezier(
            p0,
            p1,
            p2,
            p3,
            self.tension * self.vertices[i1].tension,
            self.tension * self.vertices[i2].tension,
        )
    }

    /// Synthesized neighbour beyond the start (or end) of an open curve.
    fn phantom(&self, at_end: bool) -> Point2 {
        let n = self.vertices.len();
        let at = |i: usize| self.vertices[if at_end { n - 1 - i } else { i }].position;
        let (end, next) = (at(0), at(1));
        let manual = self.manual_end_controls[usize::from(at_end)];
        match self.end_control {
            EndControl::Extrapolate => catmull_rom::extrapolate(end, next),
            EndControl::Mirror if n >= 3 => catmull_rom::mirror_end(end, next, at(2)),
            EndControl::Mirror => catmull_rom::extrapolate(end, next),
            EndControl::Manual => manual.unwrap_or_else(|| catmull_rom::extrapolate(end, next)),
        }
    }

    /// Map `(segment, t)` onto a valid segment: closed curves wrap and carry
    /// `t` outside `[0, 1]` into neighbouring segments, open curves clamp.
    fn normalize(&self, segment: usize, t: f64) -> (usize, f64) {
        let count = self.segment_count();
        let t = if t.is_nan() { 0.0 } else { t };
        if self.closed {
            let mut s = segment as i64;
            let mut t = t;
            if t.is_finite() && !(0.0..=1.0).contains(&t) {
                let shift = t.floor();
                s += shift as i64;
                t -= shift;
            }
            (s.rem_euclid(count as i64) as usize, t.clamp(0.0, 1.0))
        } else if segment >= count {
            (count - 1, 1.0)
        } else {
            (segment, t.clamp(0.0, 1.0))
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Point and unit normal at `t` on `segment`.
    pub fn eval(&self, segment: usize, t: f64) -> Sample {
        debug_assert!(!self.dirty, "curve queried before validate()");
        self.evaluate(segment, t, true)
    }

    pub fn eval_point(&self, segment: usize, t: f64) -> Point2 {
        debug_assert!(!self.dirty, "curve queried before validate()");
        self.evaluate_point(segment, t)
    }

    pub fn eval_normal(&self, segment: usize, t: f64) -> Vector2 {
        self.eval(segment, t).normal
    }

    /// Weighted basis sum at `t` on `segment`.
    pub fn eval_ratio(&self, segment: usize, t: f64) -> f64 {
        debug_assert!(!self.dirty, "curve queried before validate()");
        match self.vertices.len() {
            0 => 1.0,
            1 => self.vertices[0].weight,
            _ => {
                let (s, t) = self.normalize(segment, t);
                self.segment(s).ratio(t)
            }
        }
    }

    /// Map a global parameter `u ∈ [0, 1]` to `(segment, t)`, one equal share
    /// per segment. Closed curves wrap `u`, open curves clamp it.
    pub fn locate(&self, u: f64) -> (usize, f64) {
        let count = self.segment_count();
        if count == 0 {
            return (0, 0.0);
        }
        let u = if u.is_nan() { 0.0 } else { u };
        let u = if self.closed {
            u.rem_euclid(1.0)
        } else {
            u.clamp(0.0, 1.0)
        };
        let x = u * count as f64;
        let s = (x.floor() as usize).min(count - 1);
        (s, x - s as f64)
    }

    pub fn eval_global(&self, u: f64) -> Sample {
        let (s, t) = self.locate(u);
        self.eval(s, t)
    }

    /// Closest point on the curve to `(x, y)`.
    pub fn closest_point(&self, x: f64, y: f64, options: &ClosestPointOptions) -> Option<ClosestPoint> {
        debug_assert!(!self.dirty, "curve queried before validate()");
        let target = dvec2(x, y);
        match self.vertices.as_slice() {
            [] => None,
            [only] => {
                let distance = (only.position - target).length();
                if options.max_distance > 0.0 && distance > options.max_distance {
                    return None;
                }
                Some(ClosestPoint {
                    segment: 0,
                    t: 0.0,
                    point: only.position,
                    distance,
                })
            }
            vertices => {
                let luts: Vec<SegmentLut<'_>> = vertices[..self.segment_count()]
                    .iter()
                    .map(|v| SegmentLut {
                        arcs: &v.arcs,
                        bounds: v.bounds,
                    })
                    .collect();
                closest::closest_point(self, &luts, target, options)
            }
        }
    }

    /// Cached bounding box (`x1, y1, x2, y2` via [`Aabb2`]).
    pub fn bounds(&self) -> Aabb2 {
        debug_assert!(!self.dirty, "curve queried before validate()");
        self.bounds
    }

    /// Cached total length.
    pub fn length(&self) -> f64 {
        debug_assert!(!self.dirty, "curve queried before validate()");
        self.length
    }

    /// Arc-length table of segment `s`.
    pub fn segment_arcs(&self, s: usize) -> Result<&[Arc]> {
        debug_assert!(!self.dirty, "curve queried before validate()");
        let count = self.segment_count();
        if s >= count {
            return Err(CrvError::SegmentOutOfRange { index: s, count });
        }
        Ok(&self.vertices[s].arcs)
    }

    pub fn segment_length(&self, s: usize) -> Result<f64> {
        self.segment_arcs(s)?;
        Ok(self.vertices[s].length)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn derive_handles(&mut self, quadratic: bool) {
        for i in 0..self.vertices.len() {
            if !self.vertices[i].invalidated {
                continue;
            }
            let prev = self.neighbour(i, -1).map(|j| self.vertices[j].position);
            let next = self.neighbour(i, 1).map(|j| self.vertices[j].position);
            controls::derive(&mut self.vertices[i], prev, next, quadratic);
        }
    }

    fn feed_engine(&mut self) {
        let n = self.vertices.len();
        if self.topology_dirty && self.effective_degree() != self.b_spline_degree {
            log::warn!(
                "b-spline degree {} clamped to {} for {} vertices",
                self.b_spline_degree,
                self.effective_degree(),
                n
            );
        }
        let weighted: Vec<(Point2, f64)> = self
            .vertices
            .iter()
            .map(|v| (v.position, v.weight))
            .collect();
        self.engine.set_vertices(
            &weighted,
            self.b_spline_degree,
            self.closed,
            self.b_spline_clamped,
            self.topology_dirty,
        );
    }

    fn rebuild_segment(&mut self, s: usize) {
        let (arcs, bounds) = {
            let arcs = arclength::build_lut(&*self, s, &self.arc_options);
            let segment = self.segment(s);
            let mut bounds = segment.bounding_box(self.bounds_padding);
            if let Segment::BSpline { .. } = segment {
                for arc in [arcs.first(), arcs.last()].into_iter().flatten() {
                    bounds.include(arc.point);
                }
            }
            (arcs, bounds)
        };
        let vertex = &mut self.vertices[s];
        vertex.length = arclength::table_length(&arcs);
        vertex.arcs = arcs;
        vertex.bounds = bounds;
        log::trace!(
            "segment {}: {} arcs, length {:.6}",
            s,
            vertex.arcs.len(),
            vertex.length
        );
    }
}

impl Validate for Curve {
    /// Rebuild whatever mutations invalidated; a no-op on a clean curve.
    fn validate(&mut self) {
        if !self.dirty {
            return;
        }
        let n = self.vertices.len();
        let kind = self.effective_kind();
        if kind != self.kind {
            log::warn!("b-spline with {} vertices evaluates as linear", n);
        }

        match kind {
            CurveType::QuadraticBezier => self.derive_handles(true),
            CurveType::CubicBezier => self.derive_handles(false),
            CurveType::BSpline => self.feed_engine(),
            CurveType::Linear | CurveType::CatmullRom => {}
        }

        let count = self.segment_count();
        let stale: Vec<usize> = (0..count)
            .filter(|&s| self.vertices[s].invalidated || self.vertices[(s + 1) % n].invalidated)
            .collect();
        for &s in &stale {
            self.rebuild_segment(s);
        }
        for vertex in self.vertices.iter_mut().skip(count) {
            vertex.clear_caches();
        }

        let mut total = 0.0;
        for (s, vertex) in self.vertices.iter_mut().take(count).enumerate() {
            for arc in &mut vertex.arcs {
                total += arc.length;
                arc.total_length = total;
                arc.total_param = s as f64 + arc.t;
            }
        }
        self.length = total;

        self.bounds = match self.vertices.as_slice() {
            [] => Aabb2::EMPTY,
            [only] => Aabb2::from_point(only.position).expand(self.bounds_padding),
            vertices => vertices[..count]
                .iter()
                .fold(Aabb2::EMPTY, |acc, v| acc.merge(&v.bounds)),
        };

        for vertex in &mut self.vertices {
            vertex.invalidated = false;
        }
        self.dirty = false;
        self.topology_dirty = false;
        log::debug!(
            "curve validated: rebuilt {} of {} segments, length {:.6}",
            stale.len(),
            count,
            self.length
        );
    }

    fn is_validated(&self) -> bool {
        !self.dirty
    }
}

impl BoundingBox for Curve {
    type Bounds = Aabb2;

    fn bounding_box(&self) -> Aabb2 {
        self.bounds()
    }
}

impl SegmentEvaluator for Curve {
    fn segment_count(&self) -> usize {
        Curve::segment_count(self)
    }

    fn evaluate(&self, segment: usize, t: f64, want_normal: bool) -> Sample {
        match self.vertices.as_slice() {
            [] => Sample::isolated(Point2::ZERO),
            [only] => Sample::isolated(only.position),
            _ => {
                let (s, t) = self.normalize(segment, t);
                self.segment(s).eval(t, want_normal)
            }
        }
    }
}
