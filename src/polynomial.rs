// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A polynomial over the complex numbers, stored highest-degree
//! coefficient first, which is the order people write them in:
//! `[1, 0, 0, -i]` is `x³ - i`.

use num::Complex;
use std::fmt;

use crate::errors::RenderError;

/// An ordered, non-empty list of complex coefficients.  Index 0 is the
/// coefficient of the highest power.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<Complex<f64>>,
}

impl Polynomial {
    /// Builds a polynomial of degree one or more.  A constant has no
    /// roots to find, so it is rejected along with the empty list.
    pub fn new(coefficients: Vec<Complex<f64>>) -> Result<Self, RenderError> {
        if coefficients.len() < 2 {
            return Err(RenderError::invalid(format!(
                "a polynomial needs at least two coefficients, got {}",
                coefficients.len()
            )));
        }
        Ok(Polynomial { coefficients })
    }

    /// The degree, which is the number of coefficients less one.  Leading
    /// zero coefficients added by padding still count.
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// The number of coefficients.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Never true; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// The coefficients, highest power first.
    pub fn coefficients(&self) -> &[Complex<f64>] {
        &self.coefficients
    }

    /// Raises the nominal degree to `len - 1` by prepending zero
    /// coefficients.  Lower-order terms keep their positions relative to
    /// the constant term, so the function itself is unchanged.
    pub fn padded_to(&self, len: usize) -> Polynomial {
        if len <= self.coefficients.len() {
            return self.clone();
        }
        let mut coefficients = vec![Complex::new(0.0, 0.0); len - self.coefficients.len()];
        coefficients.extend_from_slice(&self.coefficients);
        Polynomial { coefficients }
    }

    /// Builds the polynomial from already-validated coefficients.  Used by
    /// interpolation, which cannot shrink the coefficient list.
    pub(crate) fn from_coefficients(coefficients: Vec<Complex<f64>>) -> Polynomial {
        debug_assert!(coefficients.len() >= 2);
        Polynomial { coefficients }
    }

    /// Horner evaluation at `z`.
    pub fn evaluate(&self, z: Complex<f64>) -> Complex<f64> {
        self.coefficients
            .iter()
            .fold(Complex::new(0.0, 0.0), |acc, &c| acc * z + c)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, c) in self.coefficients.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
