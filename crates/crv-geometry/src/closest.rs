//! Closest point on a curve.
//!
//! The search runs in two phases. A linear scan projects the target onto every
//! chord of the arc-length tables. The winning chord then brackets a parameter
//! interval that is narrowed with two trial evaluations per iteration.

use crv_core::Tolerance;
use crv_math::{Aabb2, Chord, Point2};
use serde::{Deserialize, Serialize};

use crate::arclength::Arc;
use crate::curve::SegmentEvaluator;

/// Search settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestPointOptions {
    /// Refinement stops once the bracket endpoints are closer than this.
    pub threshold: f64,
    /// Results farther than this are discarded; 0 disables the limit.
    pub max_distance: f64,
    /// Re-evaluate the curve inside the winning chord and project it onto the
    /// chord perpendicular through the target's foot point.
    pub arc_length_interpolation: bool,
    /// Bias the first bisection toward the coarse estimate.
    pub adaptive_bisection: bool,
    /// Finish with a chord interpolation between the bracket endpoints.
    pub linear_interpolation: bool,
    pub max_iterations: usize,
}

impl Default for ClosestPointOptions {
    fn default() -> Self {
        Self {
            threshold: 1e-7,
            max_distance: 0.0,
            arc_length_interpolation: true,
            adaptive_bisection: true,
            linear_interpolation: true,
            max_iterations: 100,
        }
    }
}

/// Result of a closest-point query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestPoint {
    pub segment: usize,
    pub t: f64,
    pub point: Point2,
    pub distance: f64,
}

/// Arc-length table and bounds of one segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentLut<'a> {
    pub arcs: &'a [Arc],
    pub bounds: Aabb2,
}

/// Best chord found by the coarse scan.
#[derive(Debug, Clone, Copy)]
struct Coarse {
    segment: usize,
    /// Index of the chord's end sample in the segment table.
    arc: usize,
    /// Position of the foot point along the chord.
    f: f64,
    t: f64,
    distance_sq: f64,
    /// Heuristic candidate and the true curve point it came from.
    estimate: Option<(Point2, Point2)>,
}

/// Running minimum over evaluated curve points.
#[derive(Debug, Clone, Copy)]
struct Best {
    t: f64,
    point: Point2,
    distance_sq: f64,
}

impl Best {
    fn offer(&mut self, t: f64, point: Point2, target: Point2) -> f64 {
        let d = (point - target).length_squared();
        if d < self.distance_sq {
            *self = Best {
                t,
                point,
                distance_sq: d,
            };
        }
        d
    }
}

/// Closest point on the segments of `evaluator` to `target`.
///
/// `luts[s]` must hold the table of segment `s`. Returns `None` when no
/// segment has samples or the result lies beyond `options.max_distance`.
pub fn closest_point<E>(
    evaluator: &E,
    luts: &[SegmentLut<'_>],
    target: Point2,
    options: &ClosestPointOptions,
) -> Option<ClosestPoint>
where
    E: SegmentEvaluator + ?Sized,
{
    let coarse = coarse_search(evaluator, luts, target, options)?;
    let best = refine(evaluator, luts[coarse.segment].arcs, &coarse, target, options);
    let distance = best.distance_sq.sqrt();
    if options.max_distance > 0.0 && distance > options.max_distance {
        return None;
    }
    Some(ClosestPoint {
        segment: coarse.segment,
        t: best.t,
        point: best.point,
        distance,
    })
}

fn coarse_search<E>(
    evaluator: &E,
    luts: &[SegmentLut<'_>],
    target: Point2,
    options: &ClosestPointOptions,
) -> Option<Coarse>
where
    E: SegmentEvaluator + ?Sized,
{
    let max_sq = options.max_distance * options.max_distance;
    let mut best: Option<Coarse> = None;

    for (segment, lut) in luts.iter().enumerate() {
        if options.max_distance > 0.0 && lut.bounds.distance_sq_to_point(target) > max_sq {
            continue;
        }
        if let [only] = lut.arcs {
            let d = (only.point - target).length_squared();
            if best.map_or(true, |b| d < b.distance_sq) {
                best = Some(Coarse {
                    segment,
                    arc: 0,
                    f: 0.0,
                    t: only.t,
                    distance_sq: d,
                    estimate: None,
                });
            }
            continue;
        }

        for (i, pair) in lut.arcs.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            let chord = Chord::new(a.point, b.point);
            let f = chord.project(target);
            let foot = chord.at(f);
            let t = a.t + f * (b.t - a.t);
            let chord_sq = (foot - target).length_squared();

            // Heuristic skip: assumes the curve between two samples strays no
            // further than one chord length from the chord. Not guaranteed
            // for coarse tables; raise the subdivision budget if it misses.
            if let Some(current) = best {
                let reach = current.distance_sq.sqrt() + chord.length();
                if chord_sq > reach * reach {
                    continue;
                }
            }

            let (distance_sq, estimate) = if options.arc_length_interpolation && f > 0.0 && f < 1.0 {
                let on_curve = evaluator.evaluate(segment, t, false).point;
                let candidate = chord.onto_perpendicular(foot, on_curve);
                ((candidate - target).length_squared(), Some((candidate, on_curve)))
            } else {
                (chord_sq, None)
            };

            if best.map_or(true, |b| distance_sq < b.distance_sq) {
                best = Some(Coarse {
                    segment,
                    arc: i + 1,
                    f,
                    t,
                    distance_sq,
                    estimate,
                });
            }
        }
    }
    best
}

fn refine<E>(
    evaluator: &E,
    arcs: &[Arc],
    coarse: &Coarse,
    target: Point2,
    options: &ClosestPointOptions,
) -> Best
where
    E: SegmentEvaluator + ?Sized,
{
    let segment = coarse.segment;
    let eval = |t: f64| evaluator.evaluate(segment, t, false).point;

    if arcs.len() < 2 {
        let point = eval(coarse.t);
        return Best {
            t: coarse.t,
            point,
            distance_sq: (point - target).length_squared(),
        };
    }

    let i = coarse.arc;
    let mut lo = arcs[i - 1].t;
    let mut hi = arcs[i].t;
    // A foot point clamped to a chord end may belong to the neighbouring chord.
    if coarse.f <= 0.0 && i >= 2 {
        lo = arcs[i - 2].t;
    }
    if coarse.f >= 1.0 && i + 1 < arcs.len() {
        hi = arcs[i + 1].t;
    }

    let mut p_lo = eval(lo);
    let mut p_hi = eval(hi);
    let mut best = Best {
        t: lo,
        point: p_lo,
        distance_sq: (p_lo - target).length_squared(),
    };
    best.offer(hi, p_hi, target);
    if let Some((_, on_curve)) = coarse.estimate {
        best.offer(coarse.t, on_curve, target);
    }

    let mut k = 0.5;
    if options.adaptive_bisection {
        if let Some((candidate, on_curve)) = coarse.estimate {
            let arc_length = (arcs[i].point - arcs[i - 1].point).length();
            if arc_length > 0.0 && hi > lo {
                let confidence = 1.0 - ((on_curve - candidate).length() / arc_length).min(1.0);
                let guess = ((coarse.t - lo) / (hi - lo)).clamp(0.0, 1.0);
                k = (0.5 + (guess - 0.5) * confidence).clamp(0.1, 0.9);
            }
        }
    }

    let tolerance = Tolerance::default();
    let threshold_sq = options.threshold * options.threshold;
    for _ in 0..options.max_iterations {
        if (p_hi - p_lo).length_squared() < threshold_sq || tolerance.parametric_eq(lo, hi) {
            break;
        }
        let m = lo + k * (hi - lo);
        let ta = 0.5 * (lo + m);
        let tb = 0.5 * (m + hi);
        let pa = eval(ta);
        let pb = eval(tb);
        let da = best.offer(ta, pa, target);
        let db = best.offer(tb, pb, target);
        if da <= db {
            hi = tb;
            p_hi = pb;
        } else {
            lo = ta;
            p_lo = pa;
        }
        k = 0.5;
    }

    if options.linear_interpolation && hi > lo {
        let f = Chord::new(p_lo, p_hi).project(target);
        let t = lo + f * (hi - lo);
        best.offer(t, eval(t), target);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arclength::{subdivide, ArcLengthOptions};
    use crate::basis::{CubicBezier, Sample, SegmentCurve};
    use crv_math::dvec2;

    struct Single(CubicBezier);

    impl SegmentEvaluator for Single {
        fn segment_count(&self) -> usize {
            1
        }

        fn evaluate(&self, _segment: usize, t: f64, want_normal: bool) -> Sample {
            self.0.eval(t, want_normal)
        }
    }

    fn arch() -> Single {
        Single(CubicBezier::new(
            dvec2(0.0, 0.0),
            dvec2(0.0, 10.0),
            dvec2(10.0, 10.0),
            dvec2(10.0, 0.0),
        ))
    }

    fn query(curve: &Single, target: Point2, options: &ClosestPointOptions) -> Option<ClosestPoint> {
        let arcs = subdivide(|t| curve.evaluate(0, t, true), &ArcLengthOptions::default());
        let luts = [SegmentLut {
            arcs: &arcs,
            bounds: curve.0.bounding_box(0.0),
        }];
        closest_point(curve, &luts, target, options)
    }

    #[test]
    fn test_point_on_curve() {
        let curve = arch();
        for &t in &[0.05, 0.3, 0.5, 0.77, 0.95] {
            let target = curve.0.point_at(t);
            let hit = query(&curve, target, &ClosestPointOptions::default()).unwrap();
            assert!(hit.distance < 1e-6, "t={} distance={}", t, hit.distance);
            assert!((hit.t - t).abs() < 1e-4, "t={} found {}", t, hit.t);
        }
    }

    #[test]
    fn test_point_off_curve_hits_normal() {
        let curve = arch();
        let target = dvec2(5.0, 20.0);
        let hit = query(&curve, target, &ClosestPointOptions::default()).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-4);
        assert!((hit.point - dvec2(5.0, 7.5)).length() < 1e-5);
        assert!((hit.distance - 12.5).abs() < 1e-5);
    }

    #[test]
    fn test_max_distance_rejects() {
        let curve = arch();
        let options = ClosestPointOptions {
            max_distance: 1.0,
            ..ClosestPointOptions::default()
        };
        assert!(query(&curve, dvec2(5.0, 20.0), &options).is_none());
        assert!(query(&curve, dvec2(5.0, 8.0), &options).is_some());
    }

    #[test]
    fn test_plain_bisection_still_converges() {
        let curve = arch();
        let options = ClosestPointOptions {
            arc_length_interpolation: false,
            adaptive_bisection: false,
            linear_interpolation: false,
            ..ClosestPointOptions::default()
        };
        let target = curve.0.point_at(0.42) + dvec2(0.0, 0.5);
        let hit = query(&curve, target, &options).unwrap();
        let brute = (0..=100_000)
            .map(|i| (curve.0.point_at(i as f64 / 100_000.0) - target).length())
            .fold(f64::INFINITY, f64::min);
        assert!((hit.distance - brute).abs() < 1e-5);
    }

    #[test]
    fn test_empty_tables() {
        let curve = arch();
        assert!(closest_point(&curve, &[], dvec2(0.0, 0.0), &ClosestPointOptions::default()).is_none());
    }
}
