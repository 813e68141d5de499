use approx::assert_abs_diff_eq;
use crv_core::CrvError;
use crv_geometry::{
    BoundingBox, ClosestPointOptions, Curve, CurveType, Side, Validate, VertexType,
};
use crv_math::{dvec2, Point2};

const ALL_KINDS: [CurveType; 5] = [
    CurveType::Linear,
    CurveType::QuadraticBezier,
    CurveType::CubicBezier,
    CurveType::CatmullRom,
    CurveType::BSpline,
];

fn square() -> Vec<Point2> {
    vec![
        dvec2(0.0, 0.0),
        dvec2(100.0, 0.0),
        dvec2(100.0, 100.0),
        dvec2(0.0, 100.0),
    ]
}

fn zigzag() -> Vec<Point2> {
    vec![
        dvec2(0.0, 0.0),
        dvec2(30.0, 80.0),
        dvec2(70.0, -20.0),
        dvec2(120.0, 60.0),
        dvec2(160.0, 10.0),
        dvec2(190.0, 90.0),
    ]
}

fn validated(kind: CurveType, points: &[Point2], closed: bool) -> Curve {
    let mut curve = Curve::from_points(kind, points, closed);
    curve.validate();
    curve
}

/// Non-unit vertex and handle weights so the rational paths are exercised.
fn weighted(kind: CurveType, closed: bool) -> Curve {
    let mut curve = validated(kind, &zigzag(), closed);
    curve.set_vertex_weight(1, 2.0).unwrap();
    curve.set_vertex_weight(3, 0.5).unwrap();
    curve.set_control_point_weight(2, Side::Right, 3.0).unwrap();
    curve.set_control_point_weight(4, Side::Left, 0.25).unwrap();
    curve.validate();
    curve
}

fn samples(curve: &Curve, per_segment: usize) -> Vec<Point2> {
    let mut points = Vec::new();
    for s in 0..curve.segment_count() {
        for i in 0..=per_segment {
            points.push(curve.eval_point(s, i as f64 / per_segment as f64));
        }
    }
    points
}

#[test]
fn test_catmull_rom_closed_square() {
    let curve = validated(CurveType::CatmullRom, &square(), true);
    assert_eq!(curve.segment_count(), 4);
    let start = curve.eval(0, 0.0);
    assert!(start.point.length() < 1e-12);
    assert_abs_diff_eq!(start.normal.length(), 1.0, epsilon = 1e-12);
    let length = curve.length();
    assert!(length > 400.0 && length < 450.0, "length {}", length);
}

#[test]
fn test_segments_interpolate_vertices() {
    for kind in [
        CurveType::Linear,
        CurveType::QuadraticBezier,
        CurveType::CubicBezier,
        CurveType::CatmullRom,
    ] {
        let curve = validated(kind, &zigzag(), false);
        for (s, v) in curve.vertices().iter().enumerate().take(curve.segment_count()) {
            let p = curve.eval_point(s, 0.0);
            assert!((p - v.position).length() < 1e-9, "{:?} segment {}", kind, s);
        }
    }
}

#[test]
fn test_closed_curves_are_continuous() {
    for kind in ALL_KINDS {
        let curve = weighted(kind, true);
        let count = curve.segment_count();
        assert_eq!(count, zigzag().len(), "{:?}", kind);
        for s in 0..count {
            let end = curve.eval_point(s, 1.0);
            let next = curve.eval_point((s + 1) % count, 0.0);
            assert!((end - next).length() < 1e-9, "{:?} joint after segment {}", kind, s);
        }
    }
}

#[test]
fn test_smooth_closed_curves_have_continuous_normals() {
    for kind in [CurveType::CubicBezier, CurveType::CatmullRom, CurveType::BSpline] {
        let curve = weighted(kind, true);
        let count = curve.segment_count();
        for s in 0..count {
            let end = curve.eval(s, 1.0).normal;
            let next = curve.eval((s + 1) % count, 0.0).normal;
            assert!(end.dot(next) > 1.0 - 1e-9, "{:?} kink after segment {}", kind, s);
        }
    }
}

#[test]
fn test_open_curves_are_continuous() {
    for kind in ALL_KINDS {
        let curve = weighted(kind, false);
        for s in 1..curve.segment_count() {
            let end = curve.eval_point(s - 1, 1.0);
            let start = curve.eval_point(s, 0.0);
            assert!((end - start).length() < 1e-9, "{:?} joint before segment {}", kind, s);
        }
    }
}

#[test]
fn test_bounds_contain_curve() {
    for kind in ALL_KINDS {
        for closed in [false, true] {
            let curve = weighted(kind, closed);
            let bounds = curve.bounding_box().expand(1e-9);
            for p in samples(&curve, 200) {
                assert!(bounds.contains_point(p), "{:?} closed={} misses {:?}", kind, closed, p);
            }
            for s in 0..curve.segment_count() {
                let segment_bounds = curve.vertices()[s].bounds().expand(1e-9);
                for i in 0..=50 {
                    let p = curve.eval_point(s, i as f64 / 50.0);
                    assert!(segment_bounds.contains_point(p), "{:?} segment {}", kind, s);
                }
            }
        }
    }
}

#[test]
fn test_bezier_bounds_are_tight() {
    let curve = validated(CurveType::CubicBezier, &zigzag(), false);
    let sampled = samples(&curve, 2000);
    let max_y = sampled.iter().map(|p| p.y).fold(f64::MIN, f64::max);
    let min_y = sampled.iter().map(|p| p.y).fold(f64::MAX, f64::min);
    let bounds = curve.bounds();
    assert!(bounds.y2() - max_y < 1e-3, "{} vs {}", bounds.y2(), max_y);
    assert!(min_y - bounds.y1() < 1e-3, "{} vs {}", bounds.y1(), min_y);
}

#[test]
fn test_arc_lengths_are_monotone() {
    for kind in ALL_KINDS {
        let curve = weighted(kind, false);
        let mut last_length = 0.0;
        let mut last_param = 0.0;
        for s in 0..curve.segment_count() {
            for arc in curve.segment_arcs(s).unwrap() {
                assert!(arc.total_length >= last_length, "{:?}", kind);
                assert!(arc.total_param >= last_param, "{:?}", kind);
                last_length = arc.total_length;
                last_param = arc.total_param;
            }
        }
        assert_abs_diff_eq!(last_length, curve.length(), epsilon = 1e-9);
        assert_abs_diff_eq!(last_param, curve.segment_count() as f64, epsilon = 1e-12);
    }
}

#[test]
fn test_length_approximates_chord_sum() {
    let curve = validated(CurveType::Linear, &zigzag(), false);
    let expected: f64 = zigzag().windows(2).map(|w| (w[1] - w[0]).length()).sum();
    assert_abs_diff_eq!(curve.length(), expected, epsilon = 1e-9);
}

#[test]
fn test_closest_point_on_curve() {
    let options = ClosestPointOptions::default();
    for kind in ALL_KINDS {
        let curve = weighted(kind, false);
        for (s, t) in [(0, 0.3), (1, 0.5), (2, 0.85)] {
            let target = curve.eval_point(s, t);
            let hit = curve.closest_point(target.x, target.y, &options).unwrap();
            assert!(hit.distance < 1e-4, "{:?} ({}, {}): {}", kind, s, t, hit.distance);
            assert_eq!(hit.segment, s, "{:?}", kind);
            assert_abs_diff_eq!(hit.t, t, epsilon = 1e-5);
            let on_curve = curve.eval_point(hit.segment, hit.t);
            assert!((on_curve - hit.point).length() < 1e-9);
        }
    }
}

#[test]
fn test_closest_point_matches_dense_sampling() {
    let options = ClosestPointOptions::default();
    let targets = [dvec2(50.0, 50.0), dvec2(140.0, -30.0), dvec2(10.0, 90.0)];
    for kind in ALL_KINDS {
        let curve = weighted(kind, false);
        let dense = samples(&curve, 2000);
        for target in targets {
            let brute = dense
                .iter()
                .map(|p| (*p - target).length())
                .fold(f64::MAX, f64::min);
            let hit = curve.closest_point(target.x, target.y, &options).unwrap();
            assert!(hit.distance <= brute + 1e-3, "{:?} {:?}: {} > {}", kind, target, hit.distance, brute);
        }
    }
}

#[test]
fn test_closest_point_max_distance() {
    let curve = validated(CurveType::CubicBezier, &zigzag(), false);
    let options = ClosestPointOptions {
        max_distance: 5.0,
        ..Default::default()
    };
    assert!(curve.closest_point(100.0, 500.0, &options).is_none());
    assert!(curve.closest_point(0.0, 1.0, &options).is_some());
}

#[test]
fn test_bspline_degree_two_with_three_vertices() {
    let mut curve = Curve::from_points(
        CurveType::BSpline,
        &[dvec2(0.0, 0.0), dvec2(50.0, 100.0), dvec2(100.0, 0.0)],
        false,
    );
    curve.validate();
    assert_eq!(curve.effective_degree(), 2);
    assert_eq!(curve.segment_count(), 1);
    let mid = curve.eval_point(0, 0.5);
    assert!((mid - dvec2(50.0, 50.0)).length() < 1e-9);
}

#[test]
fn test_unclamped_bspline_does_not_reach_ends() {
    let mut curve = validated(CurveType::BSpline, &zigzag(), false);
    curve.set_b_spline_clamped(false);
    curve.validate();
    let start = curve.eval_point(0, 0.0);
    assert!((start - zigzag()[0]).length() > 1.0);
}

#[test]
fn test_vertex_lookup_errors() {
    let curve = validated(CurveType::Linear, &square(), false);
    assert!(curve.vertex(3).is_ok());
    assert_eq!(
        curve.vertex(4).unwrap_err(),
        CrvError::VertexOutOfRange { index: 4, count: 4 }
    );
}

#[test]
fn test_kind_change_rebuilds_everything() {
    let mut curve = validated(CurveType::Linear, &zigzag(), false);
    let linear_length = curve.length();
    curve.set_kind(CurveType::CatmullRom);
    assert!(!curve.is_validated());
    assert!(curve.vertices().iter().all(|v| v.is_invalidated()));
    curve.validate();
    assert!((curve.length() - linear_length).abs() > 1e-3);
}

#[test]
fn test_square_vertex_gives_corner() {
    let mut curve = validated(CurveType::CubicBezier, &zigzag(), false);
    curve.set_vertex_kind(2, VertexType::Square).unwrap();
    curve.validate();
    let incoming = curve.eval(1, 1.0 - 1e-6).normal;
    let outgoing = curve.eval(2, 1e-6).normal;
    assert!(incoming.dot(outgoing) < 0.99);
}

#[test]
fn test_serde_round_trip() {
    let curve = weighted(CurveType::CubicBezier, true);
    let json = serde_json::to_string(&curve).unwrap();
    let mut back: Curve = serde_json::from_str(&json).unwrap();
    back.validate();
    assert_eq!(back.vertex_count(), curve.vertex_count());
    assert_abs_diff_eq!(back.length(), curve.length(), epsilon = 1e-9);
    for s in 0..curve.segment_count() {
        let a = curve.eval_point(s, 0.4);
        let b = back.eval_point(s, 0.4);
        assert!((a - b).length() < 1e-12);
    }
}
