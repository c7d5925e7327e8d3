// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Newton-Raphson root finding for a single starting point.
//!
//! The step `x - P(x)/P'(x)` is folded into a single quotient,
//!
//! ```text
//!     Σ g^(d-k) · c_k · (d-k-1)
//!     -------------------------
//!     Σ g^(d-k-1) · c_k · (d-k)
//! ```
//!
//! so one table of powers of the current guess serves both sums and no
//! derivative polynomial is ever built.  A denominator at or near zero
//! is not guarded against: the resulting infinities and NaNs never
//! satisfy the convergence test, and the point ends up reported as
//! non-convergent once its budget runs out.

use num::Complex;

use crate::complex::ApproxEq;
use crate::polynomial::Polynomial;

/// The outcome of iterating one starting point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Convergence {
    /// Two successive guesses agreed within the precision, with budget
    /// to spare.
    Converged {
        /// The last guess.
        root: Complex<f64>,
        /// How many iterations were consumed, at least one.
        iterations: usize,
    },
    /// The budget ran out first.  The whole budget counts as consumed.
    Diverged,
}

/// Runs the iteration against one polynomial.  Holds the table of
/// powers so it is allocated once per frame rather than once per pixel.
pub struct RootFinder<'a> {
    polynomial: &'a Polynomial,
    precision: f64,
    powers: Vec<Complex<f64>>,
}

impl<'a> RootFinder<'a> {
    /// `precision` decides when two successive guesses count as equal.
    pub fn new(polynomial: &'a Polynomial, precision: f64) -> Self {
        RootFinder {
            polynomial,
            precision,
            powers: vec![Complex::new(0.0, 0.0); polynomial.len()],
        }
    }

    /// One Newton step from `guess`.
    fn step(&mut self, guess: Complex<f64>) -> Complex<f64> {
        let degree = self.polynomial.degree();
        self.powers[0] = Complex::new(1.0, 0.0);
        for k in 1..=degree {
            self.powers[k] = self.powers[k - 1] * guess;
        }

        let mut numerator = Complex::new(0.0, 0.0);
        let mut denominator = Complex::new(0.0, 0.0);
        for (k, &c) in self.polynomial.coefficients().iter().enumerate() {
            let power = degree - k;
            numerator += self.powers[power] * c * (power as f64 - 1.0);
            // The constant term vanishes from the derivative.
            if power > 0 {
                denominator += self.powers[power - 1] * c * (power as f64);
            }
        }
        numerator / denominator
    }

    /// Iterates from `guess` until two successive values agree or
    /// `budget` iterations have run.  At least one iteration always runs;
    /// convergence on the very last unit of budget still counts as
    /// running out.
    pub fn find(&mut self, guess: Complex<f64>, budget: usize) -> Convergence {
        let mut remaining = budget;
        let mut current = guess;
        loop {
            let next = self.step(current);
            remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                return Convergence::Diverged;
            }
            if next.approx_eq(&current, self.precision) {
                return Convergence::Converged {
                    root: next,
                    iterations: budget - remaining,
                };
            }
            current = next;
        }
    }
}

/// One-shot convenience wrapper around `RootFinder`.
pub fn find_root(
    polynomial: &Polynomial,
    guess: Complex<f64>,
    precision: f64,
    budget: usize,
) -> Convergence {
    RootFinder::new(polynomial, precision).find(guess, budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    fn poly(coefficients: &[Complex<f64>]) -> Polynomial {
        Polynomial::new(coefficients.to_vec()).unwrap()
    }

    fn square_minus_one() -> Polynomial {
        poly(&[c(1.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)])
    }

    fn root_of(outcome: Convergence) -> Complex<f64> {
        match outcome {
            Convergence::Converged { root, .. } => root,
            Convergence::Diverged => panic!("expected convergence"),
        }
    }

    #[test]
    fn positive_half_plane_finds_plus_one() {
        let p = square_minus_one();
        for &guess in &[c(0.5, 0.0), c(2.0, 1.5), c(0.1, -3.0), c(40.0, 0.0)] {
            let root = root_of(find_root(&p, guess, 1e-7, 100));
            assert!(root.approx_eq(&c(1.0, 0.0), 1e-4), "{} -> {}", guess, root);
        }
    }

    #[test]
    fn negative_half_plane_finds_minus_one() {
        let p = square_minus_one();
        for &guess in &[c(-0.5, 0.0), c(-2.0, 1.5), c(-0.1, -3.0)] {
            let root = root_of(find_root(&p, guess, 1e-7, 100));
            assert!(root.approx_eq(&c(-1.0, 0.0), 1e-4), "{} -> {}", guess, root);
        }
    }

    #[test]
    fn cube_roots_of_i() {
        // x³ - i has roots at -i and e^(iπ/6), e^(i5π/6).
        let p = poly(&[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, -1.0)]);
        let root = root_of(find_root(&p, c(0.1, -2.0), 1e-7, 100));
        assert!(root.approx_eq(&c(0.0, -1.0), 1e-4));
        assert!(p.evaluate(root).norm_sqr() < 1e-8);
    }

    #[test]
    fn linear_polynomials_converge_in_two_steps() {
        // 2x - 4: the first step lands exactly on 2, the second confirms it.
        let p = poly(&[c(2.0, 0.0), c(-4.0, 0.0)]);
        match find_root(&p, c(17.0, 3.0), 1e-7, 10) {
            Convergence::Converged { root, iterations } => {
                assert_eq!(root, c(2.0, 0.0));
                assert_eq!(iterations, 2);
            }
            Convergence::Diverged => panic!("expected convergence"),
        }
    }

    #[test]
    fn exhausted_budget_is_non_convergent() {
        let p = square_minus_one();
        assert_eq!(find_root(&p, c(3.0, 2.0), 1e-7, 1), Convergence::Diverged);
        assert_eq!(find_root(&p, c(3.0, 2.0), 1e-7, 2), Convergence::Diverged);
    }

    #[test]
    fn critical_point_never_converges() {
        // The derivative of x² - 1 vanishes at the origin; the first step
        // divides by zero and the values never settle.
        let p = square_minus_one();
        assert_eq!(find_root(&p, c(0.0, 0.0), 1e-7, 50), Convergence::Diverged);
    }

    #[test]
    fn imaginary_axis_is_the_basin_boundary() {
        // On the imaginary axis Newton for x² - 1 stays on the axis and
        // wanders chaotically; it cannot reach either real root.
        let p = square_minus_one();
        assert_eq!(find_root(&p, c(0.0, 0.7), 1e-7, 60), Convergence::Diverged);
    }

    #[test]
    fn finder_is_reusable() {
        let p = square_minus_one();
        let mut finder = RootFinder::new(&p, 1e-7);
        let a = root_of(finder.find(c(3.0, 0.0), 100));
        let b = root_of(finder.find(c(-3.0, 0.0), 100));
        let again = root_of(finder.find(c(3.0, 0.0), 100));
        assert!(a.approx_eq(&c(1.0, 0.0), 1e-4));
        assert!(b.approx_eq(&c(-1.0, 0.0), 1e-4));
        assert_eq!(a, again);
    }
}
