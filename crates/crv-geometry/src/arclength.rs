//! Adaptive arc-length tables.
//!
//! A segment is sampled by recursive bisection of its parameter range. The
//! resulting samples ([`Arc`]s) drive length queries, the coarse phase of the
//! closest-point search and the bounds of B-spline segments.

use crv_core::Tolerance;
use crv_math::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::basis::Sample;
use crate::curve::SegmentEvaluator;

/// Hard recursion limit; parameter convergence normally stops far earlier.
const MAX_DEPTH: u32 = 48;

/// One sample of an arc-length table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    /// Segment-local parameter.
    pub t: f64,
    pub point: Point2,
    /// Chord length from the previous sample (0 for the first).
    pub length: f64,
    /// Cumulative length from the start of the curve.
    pub total_length: f64,
    /// Cumulative parameter `segment + t`.
    pub total_param: f64,
}

impl Arc {
    fn new(t: f64, point: Point2, length: f64) -> Self {
        Self {
            t,
            point,
            length,
            total_length: 0.0,
            total_param: t,
        }
    }
}

/// Subdivision criteria.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcLengthOptions {
    /// Normal-angle change (radians) above which a span is split while budget remains.
    pub adaptive_angle: f64,
    /// Normal-angle change (radians) above which a span is always split.
    pub adaptive_angle_max: f64,
    /// Chords longer than this are always split; 0 disables the limit.
    pub max_length: f64,
    /// Chords shorter than this are never split for angle alone.
    pub adaptive_min_length: f64,
    /// Relative midpoint deviation that triggers a split; 0 disables the test.
    pub adaptive_length_factor: f64,
    /// Subdivision budget (maximum voluntary bisection depth).
    pub subdivisions: u32,
}

impl ArcLengthOptions {
    pub fn coarse() -> Self {
        Self {
            adaptive_angle: 15f64.to_radians(),
            adaptive_angle_max: 60f64.to_radians(),
            max_length: 0.0,
            adaptive_min_length: 1e-2,
            adaptive_length_factor: 0.1,
            subdivisions: 5,
        }
    }

    pub fn fine() -> Self {
        Self {
            adaptive_angle: 2f64.to_radians(),
            adaptive_angle_max: 30f64.to_radians(),
            max_length: 0.0,
            adaptive_min_length: 1e-4,
            adaptive_length_factor: 0.01,
            subdivisions: 10,
        }
    }
}

impl Default for ArcLengthOptions {
    fn default() -> Self {
        Self {
            adaptive_angle: 5f64.to_radians(),
            adaptive_angle_max: 45f64.to_radians(),
            max_length: 0.0,
            adaptive_min_length: 1e-3,
            adaptive_length_factor: 0.05,
            subdivisions: 8,
        }
    }
}

/// Unsigned angle between two normals; 0 if either is degenerate.
fn turn_angle(a: Vector2, b: Vector2) -> f64 {
    if a == Vector2::ZERO || b == Vector2::ZERO {
        return 0.0;
    }
    a.perp_dot(b).atan2(a.dot(b)).abs()
}

/// Build the arc-length table of one segment from a sampling callback.
///
/// `eval` must return the point and unit normal at a segment-local `t`. The
/// table starts with the `t = 0` sample and ends with `t = 1`; cumulative
/// lengths are relative to the segment start.
pub fn subdivide<F>(eval: F, options: &ArcLengthOptions) -> Vec<Arc>
where
    F: Fn(f64) -> Sample,
{
    let start = eval(0.0);
    let end = eval(1.0);
    let mut arcs = vec![Arc::new(0.0, start.point, 0.0)];
    subdivide_span(&eval, options, (0.0, start), (1.0, end), options.subdivisions, 0, &mut arcs);

    let mut total = 0.0;
    for arc in &mut arcs {
        total += arc.length;
        arc.total_length = total;
    }
    arcs
}

/// Arc-length table of segment `segment` of any evaluator.
pub fn build_lut<E>(evaluator: &E, segment: usize, options: &ArcLengthOptions) -> Vec<Arc>
where
    E: SegmentEvaluator + ?Sized,
{
    subdivide(|t| evaluator.evaluate(segment, t, true), options)
}

/// Total length of a table.
pub fn table_length(arcs: &[Arc]) -> f64 {
    arcs.iter().map(|a| a.length).sum()
}

fn subdivide_span<F>(
    eval: &F,
    options: &ArcLengthOptions,
    (t1, s1): (f64, Sample),
    (t2, s2): (f64, Sample),
    budget: u32,
    depth: u32,
    arcs: &mut Vec<Arc>,
) where
    F: Fn(f64) -> Sample,
{
    let tolerance = Tolerance::default();
    let chord = (s2.point - s1.point).length();
    if depth >= MAX_DEPTH || tolerance.parametric_eq(t1, t2) {
        arcs.push(Arc::new(t2, s2.point, chord));
        return;
    }

    let angle = turn_angle(s1.normal, s2.normal);
    let forced = angle > options.adaptive_angle_max
        || (options.max_length > 0.0 && chord > options.max_length);
    let mut split = forced
        || (budget > 0 && angle > options.adaptive_angle && chord > options.adaptive_min_length);

    let t_mid = 0.5 * (t1 + t2);
    let mut mid = None;
    if !split && budget > 0 && options.adaptive_length_factor > 0.0 {
        let m = eval(t_mid);
        let half = 0.5 * chord;
        let reach = (m.point - s1.point).length();
        let error = if half > tolerance.linear {
            (reach - half).abs() / half
        } else if reach > tolerance.linear {
            f64::INFINITY
        } else {
            0.0
        };
        split = error > options.adaptive_length_factor;
        mid = Some(m);
    }

    if split {
        let m = mid.unwrap_or_else(|| eval(t_mid));
        let next = budget.saturating_sub(1);
        subdivide_span(eval, options, (t1, s1), (t_mid, m), next, depth + 1, arcs);
        subdivide_span(eval, options, (t_mid, m), (t2, s2), next, depth + 1, arcs);
    } else {
        arcs.push(Arc::new(t2, s2.point, chord));
    }
}
