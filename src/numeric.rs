// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-vertices project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Compensated summation and a robust real quadratic-root solver.

use crate::geometry::Tolerance;

/// Sum values with Neumaier compensation, keeping the low-order bits that
/// plain sequential addition drops when terms cancel.
#[must_use]
pub fn safer_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Real roots of `a*x^2 + b*x + c = 0`, ascending.
///
/// Returns no roots when `a` and `b` both vanish within the tolerance
/// (degenerate, not linear-solvable under this policy) and a single root
/// `-c/b` when only `a` vanishes. The quadratic branch picks the
/// sign-matching form of the formula to avoid cancellation and derives the
/// second root from the product identity; the discriminant is accumulated
/// with compensation.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64, tol: Tolerance) -> Vec<f64> {
    if tol.eq(a, 0.0) {
        if tol.eq(b, 0.0) {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let discriminant = safer_sum(&[b * b, -(4.0 * a * c)]);
    if tol.eq(discriminant, 0.0) {
        return vec![-b / (2.0 * a)];
    }
    if discriminant < 0.0 {
        return Vec::new();
    }

    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let root1 = q / a;
    let root2 = c / q;
    if tol.eq(root1, root2) {
        vec![root1]
    } else {
        vec![root1.min(root2), root1.max(root2)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sums_cancelling_terms_without_loss() {
        let total = safer_sum(&[1.0, 1e100, 1.0, -1e100]);
        assert_relative_eq!(total, 2.0);
    }

    #[test]
    fn simple_quadratic_roots() {
        let tol = Tolerance::default();
        let roots = solve_quadratic(1.0, -3.0, 2.0, tol);
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(roots[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn double_root_collapses_to_one() {
        let tol = Tolerance::default();
        let roots = solve_quadratic(1.0, -2.0, 1.0, tol);
        assert_eq!(roots, vec![1.0]);
    }

    #[test]
    fn negative_discriminant_has_no_roots() {
        let tol = Tolerance::default();
        assert!(solve_quadratic(1.0, 0.0, 1.0, tol).is_empty());
    }

    #[test]
    fn degenerate_coefficients_have_no_roots() {
        let tol = Tolerance::default();
        assert!(solve_quadratic(0.0, 0.0, 5.0, tol).is_empty());
        assert!(solve_quadratic(0.0, 0.0, 0.0, tol).is_empty());
    }

    #[test]
    fn linear_fallback_when_leading_term_vanishes() {
        let tol = Tolerance::default();
        let roots = solve_quadratic(0.0, 2.0, -4.0, tol);
        assert_eq!(roots, vec![2.0]);
    }

    #[test]
    fn cancellation_prone_coefficients_stay_accurate() {
        let tol = Tolerance::default();
        // x^2 - 1e8 x + 1 = 0: naive formula loses the small root entirely
        let roots = solve_quadratic(1.0, -1e8, 1.0, tol);
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], 1e-8, max_relative = 1e-10);
        assert_relative_eq!(roots[1], 1e8, max_relative = 1e-10);
    }
}
