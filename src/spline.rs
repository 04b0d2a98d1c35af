//! Interpolating cubic spline with not-a-knot end conditions.
//!
//! The optical/NIR branches of the Fitzpatrick and Gordon laws are defined
//! as the cubic spline through a handful of anchor points. The published
//! curves were produced with an interpolating B-spline whose first and last
//! interior knots are dropped; that is the same piecewise cubic as the
//! not-a-knot spline built here, where the third derivative is continuous at
//! the second and penultimate anchors.

use nalgebra::{DMatrix, DVector};

/// Piecewise cubic interpolant stored as knots, values and second
/// derivatives.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Builds the not-a-knot spline through `(xs[i], ys[i])`.
    ///
    /// Returns `None` when the second-derivative system is singular, which
    /// only happens for non-finite input.
    ///
    /// # Panics
    /// Panics if the lengths differ, fewer than 4 points are given, or `xs`
    /// is not strictly increasing.
    pub fn not_a_knot(xs: Vec<f64>, ys: Vec<f64>) -> Option<Self> {
        assert_eq!(xs.len(), ys.len(), "xs and ys must have equal length");
        assert!(xs.len() >= 4, "not-a-knot spline needs at least 4 points");
        for i in 1..xs.len() {
            assert!(xs[i] > xs[i - 1], "xs must be strictly increasing at index {}", i);
        }

        let n = xs.len();
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let slope: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);

        // third derivative continuous at xs[1]
        a[(0, 0)] = -h[1];
        a[(0, 1)] = h[0] + h[1];
        a[(0, 2)] = -h[0];

        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            rhs[i] = 6.0 * (slope[i] - slope[i - 1]);
        }

        // third derivative continuous at xs[n - 2]
        a[(n - 1, n - 3)] = -h[n - 2];
        a[(n - 1, n - 2)] = h[n - 3] + h[n - 2];
        a[(n - 1, n - 1)] = -h[n - 3];

        let y2 = a.lu().solve(&rhs)?;
        if !y2.iter().all(|v| v.is_finite()) {
            return None;
        }

        Some(Self { xs, ys, y2s: y2.iter().copied().collect() })
    }

    /// Evaluates the spline at `x`.
    ///
    /// Outside the knot range the boundary polynomial is extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();

        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] > x {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_passes_through_knots() {
        let xs = vec![0.0, 0.4, 0.8, 1.7, 1.8, 2.1, 2.4, 3.7, 3.85];
        let ys = vec![0.0, 0.3, 0.8, 3.0, 3.05, 3.4, 4.0, 7.0, 7.3];
        let s = CubicSpline::not_a_knot(xs.clone(), ys.clone()).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert!((s.evaluate(*x) - y).abs() < 1e-10, "s({x}) != {y}");
        }
    }

    #[test]
    fn spline_reproduces_a_cubic() {
        let f = |x: f64| 0.5 * x * x * x - 2.0 * x * x + x - 3.0;
        let xs: Vec<f64> = vec![0.0, 0.7, 1.1, 2.0, 2.6, 3.9];
        let ys: Vec<f64> = xs.iter().map(|x| f(*x)).collect();
        let s = CubicSpline::not_a_knot(xs, ys).unwrap();
        for x in [0.2, 0.9, 1.5, 2.3, 3.1, 3.8] {
            assert!((s.evaluate(x) - f(x)).abs() < 1e-9, "x={x}");
        }
        // boundary cubic is extended to the left
        assert!((s.evaluate(-0.5) - f(-0.5)).abs() < 1e-9);
    }

    #[test]
    #[should_panic]
    fn rejects_unsorted_knots() {
        let _ = CubicSpline::not_a_knot(vec![0.0, 2.0, 1.0, 3.0], vec![0.0; 4]);
    }
}
