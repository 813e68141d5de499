use crv_math::{Aabb2, Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::arclength::Arc;

/// How a vertex (or one of its control points) constrains its handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexType {
    /// Automatic: control points are derived from the neighbouring vertices.
    /// On a control point it means "inherit from the vertex".
    #[default]
    None,
    /// Sharp corner with zero-length handles.
    Square,
    /// Handles are independent.
    Manual,
    /// Handles stay collinear; each keeps its own length.
    Smooth,
    /// Handles are exact opposites.
    Mirror,
}

/// Which handle of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A Bezier handle, stored relative to its vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Offset from the owning vertex; `None` until derived or set.
    pub offset: Option<Vector2>,
    pub weight: f64,
    pub kind: VertexType,
    /// Index of the owning vertex.
    pub vertex: usize,
}

impl ControlPoint {
    pub fn unset(vertex: usize) -> Self {
        Self {
            offset: None,
            weight: 1.0,
            kind: VertexType::None,
            vertex,
        }
    }

    pub fn is_set(&self) -> bool {
        self.offset.is_some()
    }

    pub fn offset_or_zero(&self) -> Vector2 {
        self.offset.unwrap_or(Vector2::ZERO)
    }
}

/// A curve vertex with its handles and the caches of the segment it starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point2,
    pub weight: f64,
    /// Catmull-Rom tension multiplier.
    pub tension: f64,
    pub kind: VertexType,
    pub left: ControlPoint,
    pub right: ControlPoint,
    #[serde(skip, default = "invalidated")]
    pub(crate) invalidated: bool,
    #[serde(skip)]
    pub(crate) arcs: Vec<Arc>,
    #[serde(skip)]
    pub(crate) length: f64,
    #[serde(skip)]
    pub(crate) bounds: Aabb2,
}

fn invalidated() -> bool {
    true
}

impl Vertex {
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            weight: 1.0,
            tension: 1.0,
            kind: VertexType::None,
            left: ControlPoint::unset(0),
            right: ControlPoint::unset(0),
            invalidated: true,
            arcs: Vec::new(),
            length: 0.0,
            bounds: Aabb2::EMPTY,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_kind(mut self, kind: VertexType) -> Self {
        self.kind = kind;
        self
    }

    pub fn control(&self, side: Side) -> &ControlPoint {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub(crate) fn control_mut(&mut self, side: Side) -> &mut ControlPoint {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Effective type of a handle: its own type, or the vertex type when unset.
    pub fn control_kind(&self, side: Side) -> VertexType {
        match self.control(side).kind {
            VertexType::None => self.kind,
            kind => kind,
        }
    }

    pub fn is_square(&self, side: Side) -> bool {
        self.control_kind(side) == VertexType::Square
    }

    /// Absolute handle position; a square or unset handle sits on the vertex.
    pub fn control_position(&self, side: Side) -> Point2 {
        if self.is_square(side) {
            self.position
        } else {
            self.position + self.control(side).offset_or_zero()
        }
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Arc-length table of the segment starting at this vertex.
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    /// Length of the segment starting at this vertex.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Bounds of the segment starting at this vertex.
    pub fn bounds(&self) -> Aabb2 {
        self.bounds
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.left.vertex = index;
        self.right.vertex = index;
    }

    pub(crate) fn clear_caches(&mut self) {
        self.arcs.clear();
        self.length = 0.0;
        self.bounds = Aabb2::EMPTY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crv_math::dvec2;

    #[test]
    fn test_control_kind_inherits() {
        let mut v = Vertex::new(dvec2(1.0, 1.0)).with_kind(VertexType::Smooth);
        assert_eq!(v.control_kind(Side::Left), VertexType::Smooth);
        v.right.kind = VertexType::Square;
        assert_eq!(v.control_kind(Side::Right), VertexType::Square);
        assert!(v.is_square(Side::Right));
        assert!(!v.is_square(Side::Left));
    }

    #[test]
    fn test_control_position() {
        let mut v = Vertex::new(dvec2(1.0, 2.0));
        assert_eq!(v.control_position(Side::Left), dvec2(1.0, 2.0));
        v.left.offset = Some(dvec2(-1.0, 0.0));
        assert_eq!(v.control_position(Side::Left), dvec2(0.0, 2.0));
        v.left.kind = VertexType::Square;
        assert_eq!(v.control_position(Side::Left), dvec2(1.0, 2.0));
    }

    #[test]
    fn test_serde_skips_caches() {
        let mut v = Vertex::new(dvec2(3.0, 4.0)).with_weight(2.0);
        v.invalidated = false;
        v.length = 12.0;
        let json = serde_json::to_string(&v).unwrap();
        assert!(!json.contains("arcs"));
        let back: Vertex = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position, v.position);
        assert_eq!(back.weight, 2.0);
        assert!(back.is_invalidated());
        assert_eq!(back.length(), 0.0);
    }
}
