// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Expands a sparse set of keyframes into one polynomial per frame.
//! Coefficients move linearly between consecutive keyframes.

use num::Complex;
use std::collections::BTreeMap;

use crate::errors::RenderError;
use crate::frame::{FrameParams, FrameRequest};
use crate::polynomial::Polynomial;

/// Frame number to polynomial.  The largest key is the last frame.
pub type Keyframes = BTreeMap<usize, Polynomial>;

/// The affine blend of two equal-length polynomials, `progress` frames
/// of the way through an `interval`-frame span from `from` to `to`.
fn interpolate(from: &Polynomial, to: &Polynomial, progress: usize, interval: usize) -> Polynomial {
    let (p, span) = (progress as f64, interval as f64);
    let coefficients: Vec<Complex<f64>> = from
        .coefficients()
        .iter()
        .zip(to.coefficients())
        .map(|(&a, &b)| (b * p + a * (span - p)) / span)
        .collect();
    Polynomial::from_coefficients(coefficients)
}

/// One polynomial for every frame from 0 to the last keyframe,
/// inclusive.  All keyframes are first padded to the longest
/// coefficient list.  Frames before the first keyframe repeat it.
pub fn expand(keyframes: &Keyframes) -> Result<Vec<Polynomial>, RenderError> {
    let last = match keyframes.keys().next_back() {
        Some(&last) => last,
        None => return Err(RenderError::invalid("at least one keyframe is required")),
    };
    let width = keyframes.values().map(Polynomial::len).max().unwrap_or(0);
    let padded: Vec<(usize, Polynomial)> = keyframes
        .iter()
        .map(|(&frame, poly)| (frame, poly.padded_to(width)))
        .collect();

    let count = last
        .checked_add(1)
        .ok_or_else(|| RenderError::invalid(format!("keyframe {} is past the last representable frame", last)))?;
    let mut frames = Vec::with_capacity(count);
    let first = &padded[0];
    for _ in 0..first.0 {
        frames.push(first.1.clone());
    }
    for pair in padded.windows(2) {
        let (a, from) = (pair[0].0, &pair[0].1);
        let (b, to) = (pair[1].0, &pair[1].1);
        frames.push(from.clone());
        for frame in (a + 1)..b {
            frames.push(interpolate(from, to, frame - a, b - a));
        }
    }
    frames.push(padded[padded.len() - 1].1.clone());
    Ok(frames)
}

/// Wraps the expanded sequence into work orders sharing `params`.
pub fn requests(keyframes: &Keyframes, params: FrameParams) -> Result<Vec<FrameRequest>, RenderError> {
    params.validate()?;
    Ok(expand(keyframes)?
        .into_iter()
        .enumerate()
        .map(|(index, polynomial)| FrameRequest {
            index,
            polynomial,
            params,
        })
        .collect())
}
