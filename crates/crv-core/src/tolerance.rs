/// Tolerances shared by the evaluators and spatial queries.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Distance tolerance (in model units)
    pub linear: f64,
    /// Tolerance on curve parameters and knot values
    pub parametric: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-9;
    pub const DEFAULT_PARAMETRIC: f64 = 1e-12;

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            parametric: Self::DEFAULT_PARAMETRIC,
        }
    }

    /// Check if two parameters are indistinguishable.
    ///
    /// The comparison is relative for large magnitudes so that knot values far
    /// from zero still compare sensibly.
    pub fn parametric_eq(self, a: f64, b: f64) -> bool {
        let scale = a.abs().max(b.abs()).max(1.0);
        (a - b).abs() <= self.parametric * scale
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
