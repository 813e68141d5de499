//! NURBS core: knot vectors, Cox-de Boor basis, rational derivatives, knot
//! insertion and the stateful engine used by B-spline curves.

pub mod deboor;
pub mod engine;
pub mod insert;
pub mod knot;

pub use engine::{influence_range, LinearInsertion, NurbsEngine};
pub use insert::KnotInsertion;
pub use knot::{basis_functions, basis_functions_derivs, clamp_degree, find_span, BasisScratch};
