// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Keeps root colours stable across an animation.
//!
//! Each frame numbers its roots in the order the raster scan happens to
//! meet them, so the same physical root can change index, and therefore
//! colour, from one frame to the next.  Roots move continuously between
//! adjacent frames, so matching every root to its nearest predecessor
//! recovers its identity.  The matching is greedy: the closest pair
//! overall is matched first, then the closest pair among what is left,
//! and so on.

use itertools::iproduct;
use num::Complex;

use crate::complex::dist;
use crate::frame::FrameResult;

/// For each root in `current`, the index it should take so that it lines
/// up with the nearest root of `previous`.  The result is a permutation
/// of `0..current.len()`.  Roots with no counterpart in `previous` take
/// the lowest indices left over.
pub fn alignment(previous: &[Complex<f64>], current: &[Complex<f64>]) -> Vec<usize> {
    let mut pairs: Vec<(f64, usize, usize)> = iproduct!(
        previous.iter().enumerate(),
        current.iter().enumerate()
    )
    .map(|((p, &prev), (c, &cur))| (dist(prev, cur), p, c))
    .collect();
    // Stable, so ties keep previous-major order.
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut unused = vec![true; current.len()];
    let mut mapping: Vec<Option<usize>> = vec![None; current.len()];
    for (_, p, c) in pairs {
        if mapping[c].is_none() && p < unused.len() && unused[p] {
            mapping[c] = Some(p);
            unused[p] = false;
        }
    }

    let mut free = unused
        .iter()
        .enumerate()
        .filter(|&(_, &is_free)| is_free)
        .map(|(index, _)| index);
    mapping
        .into_iter()
        .map(|target| match target {
            Some(target) => target,
            None => free
                .next()
                .expect("there are exactly as many free targets as unmatched roots"),
        })
        .collect()
}

/// Renumbers `current`'s roots so that each keeps the index of its
/// nearest root in `previous`, rewriting both the root list and every
/// converged pixel.
pub fn align(current: FrameResult, previous: &[Complex<f64>]) -> FrameResult {
    let mapping = alignment(previous, &current.roots);
    if mapping.iter().enumerate().all(|(from, &to)| from == to) {
        return current;
    }

    let FrameResult {
        index,
        roots,
        mut raster,
    } = current;

    let mut aligned = roots.clone();
    for (from, &to) in mapping.iter().enumerate() {
        aligned[to] = roots[from];
    }
    for pixel in raster.pixels_mut().iter_mut().filter(|p| p.converged) {
        pixel.root = mapping[pixel.root];
    }

    FrameResult {
        index,
        roots: aligned,
        raster,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{PixelResult, Raster};

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    fn is_permutation(mapping: &[usize]) -> bool {
        let mut sorted = mapping.to_vec();
        sorted.sort();
        sorted == (0..mapping.len()).collect::<Vec<_>>()
    }

    #[test]
    fn swapped_roots_are_restored() {
        let previous = [c(1.0, 0.0), c(-0.5, 0.87)];
        let current = [c(-0.5, 0.86), c(1.0, 0.01)];
        assert_eq!(alignment(&previous, &current), vec![1, 0]);
    }

    #[test]
    fn identical_roots_are_left_alone() {
        let roots = [c(0.0, -1.0), c(0.866, 0.5), c(-0.866, 0.5)];
        assert_eq!(alignment(&roots, &roots), vec![0, 1, 2]);
    }

    #[test]
    fn no_previous_roots_is_the_identity() {
        let current = [c(2.0, 0.0), c(-2.0, 0.0)];
        assert_eq!(alignment(&[], &current), vec![0, 1]);
    }

    #[test]
    fn new_roots_take_the_free_indices() {
        // A third root appears between the other two.
        let previous = [c(1.0, 0.0), c(-1.0, 0.0)];
        let current = [c(0.0, 1.0), c(-1.01, 0.0), c(1.01, 0.0)];
        let mapping = alignment(&previous, &current);
        assert_eq!(mapping, vec![2, 1, 0]);
        assert!(is_permutation(&mapping));
    }

    #[test]
    fn vanished_roots_free_their_indices() {
        let previous = [c(5.0, 5.0), c(1.0, 0.0), c(-1.0, 0.0)];
        let current = [c(-1.0, 0.1), c(1.0, 0.1)];
        let mapping = alignment(&previous, &current);
        // Previous index 2 is out of range for two roots, so -1 cannot
        // keep it and takes the one slot left.
        assert_eq!(mapping, vec![0, 1]);
        assert!(is_permutation(&mapping));
    }

    #[test]
    fn every_size_combination_is_a_permutation() {
        let ring = |n: usize, turn: f64| -> Vec<Complex<f64>> {
            (0..n)
                .map(|k| Complex::from_polar(&1.0, &(turn + k as f64 * 2.0 * std::f64::consts::PI / n as f64)))
                .collect()
        };
        for previous in 0..6 {
            for current in 0..6 {
                let mapping = alignment(&ring(previous, 0.0), &ring(current, 0.3));
                assert_eq!(mapping.len(), current);
                assert!(is_permutation(&mapping), "{} -> {}: {:?}", previous, current, mapping);
            }
        }
    }

    #[test]
    fn greedy_takes_the_closest_pair_first() {
        let previous = [c(0.0, 0.0), c(1.0, 0.0)];
        // Both current roots are nearest previous 0; the closer one wins.
        let current = [c(0.3, 0.0), c(0.1, 0.0)];
        assert_eq!(alignment(&previous, &current), vec![1, 0]);
    }

    #[test]
    fn align_rewrites_roots_and_pixels() {
        let mut raster = Raster::new(3, 1);
        raster.set(0, 0, PixelResult { depth: 4, root: 0, converged: true });
        raster.set(1, 0, PixelResult { depth: 7, root: 1, converged: true });
        raster.set(2, 0, PixelResult { depth: 100, root: 0, converged: false });
        let current = FrameResult {
            index: 9,
            roots: vec![c(-0.5, 0.86), c(1.0, 0.01)],
            raster,
        };

        let aligned = align(current, &[c(1.0, 0.0), c(-0.5, 0.87)]);
        assert_eq!(aligned.index, 9);
        assert_eq!(aligned.roots, vec![c(1.0, 0.01), c(-0.5, 0.86)]);
        assert_eq!(aligned.raster.get(0, 0).root, 1);
        assert_eq!(aligned.raster.get(1, 0).root, 0);
        assert_eq!(aligned.raster.get(1, 0).depth, 7);
        assert_eq!(aligned.raster.get(2, 0), PixelResult { depth: 100, root: 0, converged: false });
    }

    #[test]
    fn align_is_a_no_op_for_matching_frames() {
        let mut raster = Raster::new(2, 1);
        raster.set(0, 0, PixelResult { depth: 3, root: 1, converged: true });
        raster.set(1, 0, PixelResult { depth: 5, root: 0, converged: true });
        let roots = vec![c(1.0, 0.0), c(-1.0, 0.0)];
        let current = FrameResult {
            index: 1,
            roots: roots.clone(),
            raster: raster.clone(),
        };
        let aligned = align(current.clone(), &roots);
        assert_eq!(aligned, current);
    }
}
