pub mod aabb;
pub mod chord;
pub mod poly;

use glam::{DVec2, DVec3};

pub use aabb::Aabb2;
pub use chord::Chord;
pub use glam::dvec2;

pub type Point2 = DVec2;
pub type Vector2 = DVec2;

/// Homogeneous 2D point `(x·w, y·w, w)`.
pub type Homogeneous = DVec3;

/// Rotate a tangent by +90° and normalize it.
///
/// A zero-length tangent yields `(0, 0)`.
pub fn normal_from_tangent(tangent: Vector2) -> Vector2 {
    tangent.perp().normalize_or_zero()
}

/// Lift a weighted point into homogeneous space.
pub fn to_homogeneous(p: Point2, w: f64) -> Homogeneous {
    DVec3::new(p.x * w, p.y * w, w)
}

/// Project a homogeneous point back to the plane.
///
/// A zero weight leaves the coordinates untouched rather than dividing by zero.
pub fn from_homogeneous(h: Homogeneous) -> (Point2, f64) {
    if h.z == 0.0 {
        (DVec2::new(h.x, h.y), h.z)
    } else {
        (DVec2::new(h.x / h.z, h.y / h.z), h.z)
    }
}
