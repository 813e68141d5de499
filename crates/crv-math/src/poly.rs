//! Power-basis polynomials and root finding on the unit interval.
//!
//! Coefficients are stored lowest degree first: `c[0] + c[1]·t + c[2]·t² …`.

/// Evaluate a polynomial with Horner's scheme.
pub fn eval(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

/// Coefficients of the derivative.
pub fn derivative(coeffs: &[f64]) -> Vec<f64> {
    coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &c)| c * i as f64)
        .collect()
}

/// Product of two polynomials.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Difference `a - b`, padded to the longer operand.
pub fn subtract(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().max(b.len());
    (0..n)
        .map(|i| a.get(i).copied().unwrap_or(0.0) - b.get(i).copied().unwrap_or(0.0))
        .collect()
}

/// Real roots of `c0 + c1·x + c2·x²`, in ascending order.
///
/// Falls back to the linear equation when the quadratic coefficient is
/// negligible. A fully degenerate equation has no isolated roots.
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> Vec<f64> {
    let sc0 = c0 / c2;
    let sc1 = c1 / c2;
    if !sc0.is_finite() || !sc1.is_finite() {
        let root = -c0 / c1;
        return if root.is_finite() { vec![root] } else { Vec::new() };
    }
    let arg = sc1 * sc1 - 4.0 * sc0;
    let root1 = if !arg.is_finite() {
        -sc1
    } else {
        if arg < 0.0 {
            return Vec::new();
        } else if arg == 0.0 {
            return vec![-0.5 * sc1];
        }
        -0.5 * (sc1 + arg.sqrt().copysign(sc1))
    };
    let root2 = sc0 / root1;
    if !root2.is_finite() {
        return vec![root1];
    }
    if root2 > root1 {
        vec![root1, root2]
    } else {
        vec![root2, root1]
    }
}

/// Roots of `coeffs` strictly inside `(0, 1)` found by sampling.
///
/// The interval is cut into `samples` pieces; every piece with a sign change
/// is refined by Newton-Raphson, falling back to bisection whenever a Newton
/// step leaves the bracket. Double roots without a sign change are not
/// reported, which is fine for extrema search where they are inflections.
pub fn roots_in_unit_interval(coeffs: &[f64], samples: usize, max_iter: usize) -> Vec<f64> {
    let deriv = derivative(coeffs);
    let samples = samples.max(1);
    let mut roots = Vec::new();

    let mut a = 0.0;
    let mut fa = eval(coeffs, a);
    for i in 1..=samples {
        let b = i as f64 / samples as f64;
        let fb = eval(coeffs, b);

        if fa == 0.0 && a > 0.0 {
            roots.push(a);
        } else if fa * fb < 0.0 {
            roots.push(refine_root(coeffs, &deriv, a, b, fa, max_iter));
        }

        a = b;
        fa = fb;
    }

    roots
}

fn refine_root(coeffs: &[f64], deriv: &[f64], mut lo: f64, mut hi: f64, f_lo: f64, max_iter: usize) -> f64 {
    let lo_negative = f_lo < 0.0;
    let mut t = 0.5 * (lo + hi);

    for _ in 0..max_iter {
        let f = eval(coeffs, t);
        if f == 0.0 {
            return t;
        }
        if (f < 0.0) == lo_negative {
            lo = t;
        } else {
            hi = t;
        }

        let df = eval(deriv, t);
        let newton = t - f / df;
        let next = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        if (next - t).abs() < 1e-15 {
            return next;
        }
        t = next;
    }

    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_eval_horner() {
        // 1 + 2t + 3t²
        assert_abs_diff_eq!(eval(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(eval(&[], 2.0), 0.0);
    }

    #[test]
    fn test_multiply_and_derivative() {
        // (1 + t)(1 - t) = 1 - t²
        let p = multiply(&[1.0, 1.0], &[1.0, -1.0]);
        assert_eq!(p, vec![1.0, 0.0, -1.0]);
        assert_eq!(derivative(&p), vec![0.0, -2.0]);
        assert_eq!(subtract(&[1.0], &[0.0, 2.0]), vec![1.0, -2.0]);
    }

    #[test]
    fn test_solve_quadratic() {
        // (x - 1)(x - 3) = x² - 4x + 3
        let roots = solve_quadratic(3.0, -4.0, 1.0);
        assert_eq!(roots.len(), 2);
        assert_abs_diff_eq!(roots[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(roots[1], 3.0, epsilon = 1e-12);

        // Linear fallback: 2x - 1
        let roots = solve_quadratic(-1.0, 2.0, 0.0);
        assert_eq!(roots, vec![0.5]);

        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
        assert!(solve_quadratic(0.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_roots_in_unit_interval_quartic() {
        // (t - 0.2)(t - 0.45)(t - 0.8)(t + 1)
        let p = multiply(
            &multiply(&[-0.2, 1.0], &[-0.45, 1.0]),
            &multiply(&[-0.8, 1.0], &[1.0, 1.0]),
        );
        let roots = roots_in_unit_interval(&p, 16, 50);
        assert_eq!(roots.len(), 3, "roots: {:?}", roots);
        assert_abs_diff_eq!(roots[0], 0.2, epsilon = 1e-10);
        assert_abs_diff_eq!(roots[1], 0.45, epsilon = 1e-10);
        assert_abs_diff_eq!(roots[2], 0.8, epsilon = 1e-10);
    }
}
