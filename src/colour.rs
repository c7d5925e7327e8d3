// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns a classified raster into RGB.  The root a pixel converged to
//! picks its hue from a palette; the number of iterations it took
//! scales that hue from black (fastest) to full brightness (slowest).
//! Pixels that never converged are white.

use crate::frame::Raster;

/// An RGB triple.
pub type Rgb = [u8; 3];

const WHITE: Rgb = [0xFF, 0xFF, 0xFF];

/// The colours assigned to roots, by root index.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colours: Vec<Rgb>,
}

impl Palette {
    /// A palette of the given colours.  Root indices past the end wrap
    /// around.  An empty list falls back to the default palette.
    pub fn new(colours: Vec<Rgb>) -> Palette {
        if colours.is_empty() {
            return Palette::default();
        }
        Palette { colours }
    }

    /// The colour for root `index`.
    pub fn colour(&self, index: usize) -> Rgb {
        self.colours[index % self.colours.len()]
    }

    /// Number of distinct colours.
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Never true.
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }
}

impl Default for Palette {
    /// Seven bright hues, then the same seven lightened, then darkened.
    fn default() -> Self {
        Palette {
            colours: vec![
                [0xFF, 0x00, 0x00],
                [0xFF, 0x80, 0x00],
                [0xFF, 0xFF, 0x00],
                [0x00, 0xFF, 0x00],
                [0x00, 0xFF, 0xFF],
                [0x00, 0x00, 0xFF],
                [0xFF, 0x00, 0xFF],
                [0xFF, 0x80, 0x80],
                [0xFF, 0xC0, 0x80],
                [0xFF, 0xFF, 0x80],
                [0x80, 0xFF, 0x80],
                [0x80, 0xFF, 0xFF],
                [0x80, 0x80, 0xFF],
                [0xFF, 0x80, 0xFF],
                [0x80, 0x00, 0x00],
                [0x80, 0x40, 0x00],
                [0x80, 0x80, 0x00],
                [0x00, 0x80, 0x00],
                [0x00, 0x80, 0x80],
                [0x00, 0x00, 0x80],
                [0x80, 0x00, 0x80],
            ],
        }
    }
}

/// Depth bounds for intensity scaling.  A bound left open is taken
/// from the image being coloured; fixing both keeps brightness
/// consistent across every frame of an animation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DepthRange {
    /// Depths at or below this are black.
    pub min: Option<u32>,
    /// Depths at or above this are full colour.
    pub max: Option<u32>,
}

impl DepthRange {
    /// Fills in open bounds from the converged pixels of `raster`.
    pub fn resolve(&self, raster: &Raster) -> (u32, u32) {
        let converged = raster.pixels().iter().filter(|p| p.converged).map(|p| p.depth);
        let (lo, hi) = converged.fold((None, None), |(lo, hi): (Option<u32>, Option<u32>), d| {
            (
                Some(lo.map_or(d, |l| l.min(d))),
                Some(hi.map_or(d, |h| h.max(d))),
            )
        });
        let min = self.min.or(lo).or(self.max).unwrap_or(0);
        let max = self.max.or(hi).unwrap_or(min).max(min);
        (min, max)
    }
}

/// Scales one channel by where `depth` sits in `min..=max`.
#[inline]
fn scale(channel: u8, depth: u32, min: u32, max: u32) -> u8 {
    if max == min {
        return if depth >= max { channel } else { 0 };
    }
    let depth = depth.max(min).min(max);
    ((u64::from(depth - min) * u64::from(channel)) / u64::from(max - min)) as u8
}

/// Colours `raster` into a packed RGB buffer, row by row.
pub fn colour_raster(raster: &Raster, palette: &Palette, range: &DepthRange) -> Vec<u8> {
    let (min, max) = range.resolve(raster);
    let mut rgb = Vec::with_capacity(raster.pixels().len() * 3);
    for pixel in raster.pixels() {
        let colour = if pixel.converged {
            let hue = palette.colour(pixel.root);
            [
                scale(hue[0], pixel.depth, min, max),
                scale(hue[1], pixel.depth, min, max),
                scale(hue[2], pixel.depth, min, max),
            ]
        } else {
            WHITE
        };
        rgb.extend_from_slice(&colour);
    }
    rgb
}
