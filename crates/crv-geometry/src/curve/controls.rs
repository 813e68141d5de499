//! Automatic handles and handle constraints.

use crv_math::{Point2, Vector2};

use super::vertex::{Side, Vertex, VertexType};

/// Automatic cubic handles `(left, right)` for `p` between optional neighbours.
///
/// Handles follow the direction `next - prev` with a third of the distance to
/// the neighbour on each side; open ends aim at their single neighbour.
pub(crate) fn auto_cubic(prev: Option<Point2>, p: Point2, next: Option<Point2>) -> (Vector2, Vector2) {
    match (prev, next) {
        (Some(a), Some(b)) => {
            let dir = (b - a).normalize_or_zero();
            (-dir * (p - a).length() / 3.0, dir * (b - p).length() / 3.0)
        }
        (None, Some(b)) => {
            let right = (b - p) / 3.0;
            (-right, right)
        }
        (Some(a), None) => {
            let left = (a - p) / 3.0;
            (left, -left)
        }
        (None, None) => (Vector2::ZERO, Vector2::ZERO),
    }
}

/// Automatic quadratic handle (right side) for `p`.
pub(crate) fn auto_quadratic(prev: Option<Point2>, p: Point2, next: Option<Point2>) -> Vector2 {
    let a = prev.unwrap_or(p);
    let b = next.unwrap_or(p);
    (b - a) / 4.0
}

/// Re-establish the handle opposite to `side` after `side` changed.
pub(crate) fn enforce(vertex: &mut Vertex, side: Side) {
    let other = side.opposite();
    if vertex.is_square(other) {
        return;
    }
    let moved = vertex.control(side).offset_or_zero();
    match vertex.control_kind(side) {
        VertexType::Mirror => vertex.control_mut(other).offset = Some(-moved),
        VertexType::Smooth => {
            let dir = moved.normalize_or_zero();
            if dir == Vector2::ZERO {
                return;
            }
            let length = vertex
                .control(other)
                .offset
                .map_or(moved.length(), |o| o.length());
            vertex.control_mut(other).offset = Some(-dir * length);
        }
        _ => {}
    }
}

/// Bring existing handles in line with the vertex type.
pub(crate) fn apply_kind(vertex: &mut Vertex) {
    for side in [Side::Left, Side::Right] {
        match vertex.control_kind(side) {
            VertexType::Square => vertex.control_mut(side).offset = Some(Vector2::ZERO),
            VertexType::None => vertex.control_mut(side).offset = None,
            _ => {}
        }
    }
    if vertex.right.is_set() {
        enforce(vertex, Side::Right);
    } else if vertex.left.is_set() {
        enforce(vertex, Side::Left);
    }
}

/// Fill automatic and unset handles of `vertex` from its neighbours.
pub(crate) fn derive(vertex: &mut Vertex, prev: Option<Point2>, next: Option<Point2>, quadratic: bool) {
    let p = vertex.position;
    let (left, right) = if quadratic {
        let right = auto_quadratic(prev, p, next);
        (-right, right)
    } else {
        auto_cubic(prev, p, next)
    };

    let mut derived = false;
    for (side, auto) in [(Side::Left, left), (Side::Right, right)] {
        let kind = vertex.control_kind(side);
        let control = vertex.control_mut(side);
        match kind {
            VertexType::Square => control.offset = Some(Vector2::ZERO),
            VertexType::None => {
                control.offset = Some(auto);
                derived = true;
            }
            _ if control.offset.is_none() => {
                control.offset = Some(auto);
                derived = true;
            }
            _ => {}
        }
    }
    if derived {
        enforce(vertex, Side::Right);
    }
}
