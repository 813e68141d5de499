//! Knot vector utilities for B-spline/NURBS evaluation.

/// Lowest degree the engine evaluates.
pub const MIN_DEGREE: usize = 2;

/// Clamp a requested degree into `[2, vertex_count - 1]`.
pub fn clamp_degree(degree: usize, vertex_count: usize) -> usize {
    let max = vertex_count.saturating_sub(1).max(MIN_DEGREE);
    degree.clamp(MIN_DEGREE, max)
}

/// Fill `knots` with a vector of length `control_count + degree + 1`.
///
/// Clamped vectors repeat the end knots `degree + 1` times with integer
/// interior knots; unclamped vectors are uniform integers.
pub fn generate_knots(knots: &mut Vec<f64>, control_count: usize, degree: usize, clamped: bool) {
    knots.clear();
    let len = control_count + degree + 1;
    if clamped {
        let last = control_count.saturating_sub(degree);
        knots.extend((0..len).map(|i| {
            if i <= degree {
                0.0
            } else if i >= control_count {
                last as f64
            } else {
                (i - degree) as f64
            }
        }));
    } else {
        knots.extend((0..len).map(|i| i as f64));
    }
}

/// Find the knot span index for parameter `t` in the knot vector.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`,
/// with special handling for the upper boundary.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `n` - Number of control points minus 1
/// * `t` - Parameter value
pub fn find_span(degree: usize, knots: &[f64], n: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Number of knots equal to `u` within `tolerance`.
pub fn multiplicity(knots: &[f64], u: f64, tolerance: f64) -> usize {
    knots.iter().filter(|k| (*k - u).abs() <= tolerance).count()
}

fn safe_div(num: f64, denom: f64) -> f64 {
    if denom == 0.0 {
        0.0
    } else {
        num / denom
    }
}

/// Reusable buffers for the Cox-de Boor recursion.
///
/// Buffers only grow. They are sized to the largest degree seen so far and
/// double when a higher degree shows up.
#[derive(Debug, Clone, Default)]
pub struct BasisScratch {
    stride: usize,
    left: Vec<f64>,
    right: Vec<f64>,
    basis: Vec<f64>,
    ndu: Vec<f64>,
    a: Vec<f64>,
    ders: Vec<f64>,
}

impl BasisScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest `degree + 1` the buffers currently fit.
    pub fn capacity(&self) -> usize {
        self.stride
    }

    fn reserve(&mut self, degree: usize, order: usize) {
        let needed = degree + 1;
        if needed > self.stride {
            let stride = needed.max(self.stride * 2);
            self.left.resize(stride, 0.0);
            self.right.resize(stride, 0.0);
            self.basis.resize(stride, 0.0);
            self.ndu.resize(stride * stride, 0.0);
            self.a.resize(2 * stride, 0.0);
            self.stride = stride;
        }
        let rows = (order + 1) * self.stride;
        if self.ders.len() < rows {
            let grown = rows.max(self.ders.len() * 2);
            self.ders.resize(grown, 0.0);
        }
    }

    /// Non-vanishing basis functions `N_{span-degree..=span, degree}(t)`.
    pub fn basis(&mut self, degree: usize, knots: &[f64], span: usize, t: f64) -> &[f64] {
        self.reserve(degree, 0);
        let n = &mut self.basis;
        let (left, right) = (&mut self.left, &mut self.right);

        n[0] = 1.0;
        for j in 1..=degree {
            left[j] = t - knots[span + 1 - j];
            right[j] = knots[span + j] - t;
            let mut saved = 0.0;

            for r in 0..j {
                let temp = safe_div(n[r], right[r + 1] + left[j - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }

            n[j] = saved;
        }

        &self.basis[..=degree]
    }

    /// Basis functions and their derivatives up to `order`.
    ///
    /// Row `k` of the result holds the `k`-th derivatives; rows above the
    /// degree are zero.
    pub fn derivatives(
        &mut self,
        degree: usize,
        knots: &[f64],
        span: usize,
        t: f64,
        order: usize,
    ) -> BasisDerivatives<'_> {
        let p = degree;
        self.reserve(p, order);
        let w = self.stride;
        let (ndu, a, ders) = (&mut self.ndu, &mut self.a, &mut self.ders);
        let (left, right) = (&mut self.left, &mut self.right);

        ndu[0] = 1.0;
        for j in 1..=p {
            left[j] = t - knots[span + 1 - j];
            right[j] = knots[span + j] - t;
            let mut saved = 0.0;

            for r in 0..j {
                // Lower triangle
                ndu[j * w + r] = right[r + 1] + left[j - r];
                let temp = safe_div(ndu[r * w + j - 1], ndu[j * w + r]);

                // Upper triangle
                ndu[r * w + j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j * w + j] = saved;
        }

        for row in ders[..(order + 1) * w].chunks_mut(w) {
            row.fill(0.0);
        }
        for j in 0..=p {
            ders[j] = ndu[j * w + p];
        }

        let top = order.min(p);
        for r in 0..=p {
            let (mut s1, mut s2) = (0usize, 1usize);
            a[0] = 1.0;

            for k in 1..=top {
                let mut d = 0.0;
                let rk = r as isize - k as isize;
                let pk = p - k;

                if r >= k {
                    let v = safe_div(a[s1 * w], ndu[(pk + 1) * w + r - k]);
                    a[s2 * w] = v;
                    d = v * ndu[(r - k) * w + pk];
                }

                let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
                let j2 = if r <= pk + 1 { k - 1 } else { p - r };

                for j in j1..=j2 {
                    let col = (rk + j as isize) as usize;
                    let v = safe_div(a[s1 * w + j] - a[s1 * w + j - 1], ndu[(pk + 1) * w + col]);
                    a[s2 * w + j] = v;
                    d += v * ndu[col * w + pk];
                }

                if r <= pk {
                    let v = safe_div(-a[s1 * w + k - 1], ndu[(pk + 1) * w + r]);
                    a[s2 * w + k] = v;
                    d += v * ndu[r * w + pk];
                }

                ders[k * w + r] = d;
                std::mem::swap(&mut s1, &mut s2);
            }
        }

        // Multiply through by p! / (p - k)!
        let mut factor = p as f64;
        for k in 1..=top {
            for j in 0..=p {
                ders[k * w + j] *= factor;
            }
            factor *= (p - k) as f64;
        }

        BasisDerivatives {
            values: &self.ders[..(order + 1) * w],
            stride: w,
            len: p + 1,
        }
    }
}

/// Borrowed view of basis derivatives, one row per derivative order.
#[derive(Debug, Clone, Copy)]
pub struct BasisDerivatives<'a> {
    values: &'a [f64],
    stride: usize,
    len: usize,
}

impl<'a> BasisDerivatives<'a> {
    pub fn row(&self, k: usize) -> &'a [f64] {
        &self.values[k * self.stride..k * self.stride + self.len]
    }

    pub fn order(&self) -> usize {
        self.values.len() / self.stride - 1
    }
}

/// Compute the non-vanishing basis functions at parameter `t`.
///
/// Allocating convenience over [`BasisScratch::basis`].
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    BasisScratch::new().basis(degree, knots, span, t).to_vec()
}

/// Compute basis functions and their first derivatives at parameter `t`.
pub fn basis_functions_derivs(
    degree: usize,
    knots: &[f64],
    span: usize,
    t: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut scratch = BasisScratch::new();
    let ders = scratch.derivatives(degree, knots, span, t, 1);
    (ders.row(0).to_vec(), ders.row(1).to_vec())
}
