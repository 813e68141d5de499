//! crv geometry: 2D parametric curves.
//!
//! A [`Curve`] is an ordered list of vertices evaluated as linear, rational
//! quadratic or cubic Bezier, Catmull-Rom or rational B-spline segments.
//! Mutations mark vertices dirty; [`Validate::validate`] rebuilds handles,
//! arc-length tables and bounds before queries.

pub mod arclength;
pub mod basis;
pub mod closest;
pub mod curve;
pub mod nurbs;

pub use arclength::{Arc, ArcLengthOptions};
pub use basis::{Sample, SegmentCurve};
pub use closest::{ClosestPoint, ClosestPointOptions};
pub use curve::{
    ControlPoint, Curve, CurveType, EndControl, Segment, SegmentEvaluator, Side, Vertex, VertexType,
};
pub use crv_core::traits::{BoundingBox, Validate};
pub use nurbs::NurbsEngine;
