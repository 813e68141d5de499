/// Lazily rebuilt caches guarded by a dirty flag.
///
/// Mutations only mark state as invalidated; `validate` brings every cache up
/// to date and must be a no-op when nothing is dirty.
pub trait Validate {
    fn validate(&mut self);

    fn is_validated(&self) -> bool;
}

/// Compute an axis-aligned bounding box.
pub trait BoundingBox {
    type Bounds;
    fn bounding_box(&self) -> Self::Bounds;
}
