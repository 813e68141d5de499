use crv_core::CrvError;
use crv_geometry::{ClosestPointOptions, Curve, CurveType, Side, Validate, VertexType};
use crv_math::{dvec2, Point2};

fn arch() -> Vec<Point2> {
    vec![
        dvec2(0.0, 0.0),
        dvec2(20.0, 60.0),
        dvec2(80.0, 90.0),
        dvec2(140.0, 40.0),
        dvec2(170.0, -10.0),
    ]
}

fn rational(kind: CurveType, closed: bool) -> Curve {
    let mut curve = Curve::from_points(kind, &arch(), closed);
    curve.validate();
    curve.set_vertex_weight(1, 1.5).unwrap();
    curve.set_vertex_weight(2, 0.75).unwrap();
    curve.set_control_point_weight(1, Side::Right, 2.0).unwrap();
    curve.set_control_point_weight(2, Side::Left, 0.5).unwrap();
    curve.validate();
    curve
}

/// Point at `t` on `segment` of the curve before a split at `at`, read from
/// the two halves after the split.
fn split_point(curve: &Curve, segment: usize, at: f64, t: f64) -> Point2 {
    if t <= at {
        curve.eval_point(segment, t / at)
    } else {
        curve.eval_point(segment + 1, (t - at) / (1.0 - at))
    }
}

#[test]
fn test_bezier_split_preserves_shape() {
    for kind in [CurveType::QuadraticBezier, CurveType::CubicBezier] {
        for closed in [false, true] {
            for at in [0.1, 0.3, 0.5, 0.7, 0.9] {
                let mut curve = rational(kind, closed);
                let before: Vec<Point2> = (0..=40).map(|i| curve.eval_point(1, i as f64 / 40.0)).collect();
                let untouched = curve.eval_point(3, 0.5);

                let index = curve.insert_vertex(1, at).unwrap();
                curve.validate();
                assert_eq!(index, 2);
                assert_eq!(curve.vertex_count(), 6);

                for (i, p) in before.iter().enumerate() {
                    let t = i as f64 / 40.0;
                    let q = split_point(&curve, 1, at, t);
                    assert!((*p - q).length() < 1e-9, "{:?} closed={} at={} t={}", kind, closed, at, t);
                }
                let moved = curve.eval_point(4, 0.5);
                assert!((untouched - moved).length() < 1e-9, "{:?} neighbour segment changed", kind);
            }
        }
    }
}

#[test]
fn test_split_freezes_neighbours() {
    let mut curve = rational(CurveType::CubicBezier, false);
    curve.insert_vertex(0, 0.5).unwrap();
    assert_eq!(curve.vertices()[0].kind, VertexType::Smooth);
    assert_eq!(curve.vertices()[1].kind, VertexType::Smooth);
    assert_eq!(curve.vertices()[2].kind, VertexType::Smooth);
    assert_eq!(curve.vertices()[3].kind, VertexType::None);
}

#[test]
fn test_split_last_segment_of_closed_curve() {
    let mut curve = rational(CurveType::CubicBezier, true);
    let before = curve.eval_point(4, 0.25);
    let index = curve.insert_vertex(4, 0.5).unwrap();
    curve.validate();
    assert_eq!(index, 5);
    assert_eq!(curve.segment_count(), 6);
    let after = curve.eval_point(4, 0.5);
    assert!((before - after).length() < 1e-9);
    assert!((curve.eval_point(5, 1.0) - curve.eval_point(0, 0.0)).length() < 1e-9);
}

#[test]
fn test_knot_insertion_keeps_shape() {
    let mut curve = rational(CurveType::BSpline, false);
    let (lo, hi) = curve.engine().domain();
    let params: Vec<f64> = (0..50).map(|i| lo + (hi - lo) * i as f64 / 49.0).collect();
    let before: Vec<Point2> = params.iter().map(|&u| curve.engine().eval(u, false).point).collect();

    for (segment, t) in [(0, 0.5), (1, 0.25), (2, 0.8)] {
        curve.insert_vertex(segment, t).unwrap();
        curve.validate();
    }
    assert_eq!(curve.vertex_count(), 8);
    assert_eq!(curve.engine().domain(), (lo, hi));

    for (u, p) in params.iter().zip(&before) {
        let q = curve.engine().eval(*u, false).point;
        assert!((*p - q).length() < 1e-9, "u = {}: {:?} vs {:?}", u, p, q);
    }
}

#[test]
fn test_knot_insertion_keeps_clamped_degree() {
    let mut curve = Curve::from_points(
        CurveType::BSpline,
        &[dvec2(0.0, 0.0), dvec2(50.0, 100.0), dvec2(100.0, 0.0)],
        false,
    );
    curve.validate();
    assert_eq!(curve.effective_degree(), 2);
    let before: Vec<Point2> = (0..=40).map(|i| curve.engine().eval(i as f64 / 40.0, false).point).collect();

    curve.insert_vertex(0, 0.5).unwrap();
    curve.validate();
    assert_eq!(curve.vertex_count(), 4);
    assert_eq!(curve.effective_degree(), 2);
    assert_eq!(curve.engine().degree(), 2);
    assert_eq!(curve.segment_count(), 2);
    assert!(curve.engine().has_custom_knots());
    for (i, p) in before.iter().enumerate() {
        let q = curve.engine().eval(i as f64 / 40.0, false).point;
        assert!((*p - q).length() < 1e-9, "u = {}: {:?} vs {:?}", i as f64 / 40.0, p, q);
    }
}

#[test]
fn test_knot_insertion_survives_vertex_move() {
    let mut curve = rational(CurveType::BSpline, false);
    curve.insert_vertex(0, 0.5).unwrap();
    curve.validate();
    let knots = curve.engine().knots().to_vec();

    curve.set_vertex_position(3, dvec2(90.0, 120.0)).unwrap();
    curve.validate();
    assert_eq!(curve.engine().knots(), knots.as_slice());

    curve.add_vertex(dvec2(200.0, 0.0));
    curve.validate();
    assert!(!curve.engine().has_custom_knots());
}

#[test]
fn test_inexact_bspline_insertion() {
    let mut curve = rational(CurveType::BSpline, false);
    curve.set_exact_knot_insertion(false);
    let index = curve.insert_vertex(1, 0.5).unwrap();
    curve.validate();
    assert_eq!(curve.vertex_count(), 6);
    assert!((1..=5).contains(&index));
    assert!(!curve.engine().has_custom_knots());
}

#[test]
fn test_closed_bspline_insertion() {
    let mut curve = rational(CurveType::BSpline, true);
    let index = curve.insert_vertex(2, 0.5).unwrap();
    curve.validate();
    assert_eq!(curve.vertex_count(), 6);
    assert_eq!(curve.segment_count(), 6);
    assert!((1..=5).contains(&index));
}

#[test]
fn test_catmull_rom_insertion_passes_through_point() {
    let mut curve = rational(CurveType::CatmullRom, false);
    let target = curve.eval_point(2, 0.6);
    let index = curve.insert_vertex(2, 0.6).unwrap();
    curve.validate();
    assert_eq!(index, 3);
    assert!((curve.eval_point(3, 0.0) - target).length() < 1e-12);
}

#[test]
fn test_insert_rejects_out_of_range() {
    let mut curve = rational(CurveType::CubicBezier, false);
    assert_eq!(
        curve.insert_vertex(4, 0.5),
        Err(CrvError::SegmentOutOfRange { index: 4, count: 4 })
    );
    assert!(matches!(curve.insert_vertex(0, 1.5), Err(CrvError::InvalidOperation(_))));
}

#[test]
fn test_insert_at_point() {
    let mut curve = rational(CurveType::CubicBezier, false);
    let options = ClosestPointOptions::default();
    let target = curve.eval_point(2, 0.4);
    let normal = curve.eval_normal(2, 0.4);
    let nearby = target + normal * 3.0;

    let index = curve.insert_vertex_at(nearby.x, nearby.y, &options).unwrap();
    assert_eq!(index, Some(3));
    curve.validate();
    assert!((curve.vertices()[3].position - target).length() < 1e-4);

    let start = curve.vertices()[0].position;
    let beyond = curve.insert_vertex_at(start.x - 50.0, start.y - 50.0, &options).unwrap();
    assert_eq!(beyond, None);
}
