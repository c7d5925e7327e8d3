// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arithmetic comes from `num::Complex`.  What it doesn't give us is
//! the box-shaped approximate equality the iteration and the root
//! detector use, so that lives here.

use num::Complex;

/// Approximate equality under a per-component tolerance.
pub trait ApproxEq {
    /// True when both the real and the imaginary parts differ by less
    /// than `precision`.  Identical finite values are always equal, even
    /// at a precision of zero; infinities and NaNs never are.
    fn approx_eq(&self, other: &Self, precision: f64) -> bool;
}

impl ApproxEq for Complex<f64> {
    #[inline]
    fn approx_eq(&self, other: &Complex<f64>, precision: f64) -> bool {
        within((self.re - other.re).abs(), precision) && within((self.im - other.im).abs(), precision)
    }
}

#[inline]
fn within(delta: f64, precision: f64) -> bool {
    delta < precision || delta == 0.0
}

/// Squared Euclidean distance between two points of the complex plane.
#[inline]
pub fn dist(i: Complex<f64>, j: Complex<f64>) -> f64 {
    (i - j).norm_sqr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_is_reflexive_and_symmetric() {
        let points = [
            Complex::new(0.0, 0.0),
            Complex::new(1.0, -1.0),
            Complex::new(1.0000001, -0.9999999),
            Complex::new(-3.5, 2.25),
        ];
        for &precision in &[1e-7, 1e-4, 1.0] {
            for a in &points {
                assert!(a.approx_eq(a, precision));
                for b in &points {
                    assert_eq!(a.approx_eq(b, precision), b.approx_eq(a, precision));
                }
            }
        }
    }

    #[test]
    fn approx_eq_checks_each_component() {
        let a = Complex::new(1.0, 1.0);
        assert!(a.approx_eq(&Complex::new(1.00005, 0.99995), 1e-4));
        assert!(!a.approx_eq(&Complex::new(1.0, 1.001), 1e-4));
        assert!(!a.approx_eq(&Complex::new(1.001, 1.0), 1e-4));
    }

    #[test]
    fn zero_precision_matches_only_identical_values() {
        let a = Complex::new(2.0, 0.5);
        assert!(a.approx_eq(&a, 0.0));
        assert!(!a.approx_eq(&Complex::new(2.0, 0.5000001), 0.0));
    }

    #[test]
    fn non_finite_values_are_never_equal() {
        let inf = Complex::new(std::f64::INFINITY, 0.0);
        let nan = Complex::new(std::f64::NAN, 0.0);
        assert!(!inf.approx_eq(&inf, 1.0));
        assert!(!nan.approx_eq(&nan, 1.0));
    }

    #[test]
    fn dist_is_squared() {
        assert_eq!(dist(Complex::new(0.0, 0.0), Complex::new(3.0, 4.0)), 25.0);
    }
}
