// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Computes one frame: every pixel of the raster is handed to the root
//! finder, and the roots it converges to are collected, in the order
//! they are first seen, into the frame's root list.

use log::debug;
use num::Complex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::complex::ApproxEq;
use crate::errors::RenderError;
use crate::newton::{Convergence, RootFinder};
use crate::planes::{Pixel, PlaneMapper, Viewport};
use crate::polynomial::Polynomial;

/// Everything about a frame except its polynomial.  Shared by every
/// frame of an animation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameParams {
    /// The window on the complex plane.
    pub viewport: Viewport,
    /// Raster width in pixels.
    pub width: usize,
    /// Raster height in pixels.
    pub height: usize,
    /// Two successive guesses closer than this have converged.
    pub precision: f64,
    /// Two converged values closer than this are the same root.  Must be
    /// coarser than `precision`.
    pub detect_precision: f64,
    /// Iteration budget per pixel.
    pub max_iterations: usize,
    /// Width in bits of the stored depth; deeper values saturate.
    pub depth_bits: u32,
}

impl Default for FrameParams {
    fn default() -> Self {
        FrameParams {
            viewport: Viewport::default(),
            width: 2048,
            height: 1536,
            precision: 0.000_000_1,
            detect_precision: 0.000_1,
            max_iterations: 100,
            depth_bits: 32,
        }
    }
}

impl FrameParams {
    /// Rejects parameters no frame could be rendered with.
    pub fn validate(&self) -> Result<(), RenderError> {
        PlaneMapper::new(self.width, self.height, self.viewport)?;
        if self.max_iterations == 0 {
            return Err(RenderError::invalid("the iteration budget must be at least 1"));
        }
        if !(self.precision > 0.0) || !(self.detect_precision > 0.0) {
            return Err(RenderError::invalid("precisions must be positive"));
        }
        if self.detect_precision < self.precision {
            return Err(RenderError::invalid(
                "the detection precision must not be finer than the iteration precision",
            ));
        }
        if self.depth_bits == 0 || self.depth_bits > 32 {
            return Err(RenderError::invalid(format!(
                "depth bit width must be between 1 and 32, got {}",
                self.depth_bits
            )));
        }
        Ok(())
    }

    /// The largest depth the raster can hold.
    pub fn max_depth(&self) -> u32 {
        ((1u64 << self.depth_bits) - 1) as u32
    }
}

/// One frame's work order.  Consumed by exactly one worker.
#[derive(Clone, Debug)]
pub struct FrameRequest {
    /// Position of the frame in the output sequence.
    pub index: usize,
    /// The polynomial whose roots are sought.
    pub polynomial: Polynomial,
    /// Raster, viewport and precisions.
    pub params: FrameParams,
}

/// What happened at one pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PixelResult {
    /// Iterations consumed, saturated to the depth bit width.
    pub depth: u32,
    /// Index into the frame's root list.  Meaningless unless
    /// `converged`.
    pub root: usize,
    /// False when the iteration budget ran out.
    pub converged: bool,
}

/// A row-major grid of pixel results.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<PixelResult>,
}

impl Raster {
    /// A raster of non-convergent pixels.
    pub fn new(width: usize, height: usize) -> Raster {
        Raster {
            width,
            height,
            pixels: vec![PixelResult::default(); width * height],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The pixel at column `x` of row `y`.
    pub fn get(&self, x: usize, y: usize) -> PixelResult {
        self.pixels[y * self.width + x]
    }

    /// Overwrites the pixel at column `x` of row `y`.
    pub fn set(&mut self, x: usize, y: usize, pixel: PixelResult) {
        self.pixels[y * self.width + x] = pixel;
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> &[PixelResult] {
        &self.pixels
    }

    /// All pixels, row by row, mutably.
    pub fn pixels_mut(&mut self) -> &mut [PixelResult] {
        &mut self.pixels
    }
}

/// A finished frame: the roots found and the classified raster.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    /// Position of the frame in the output sequence.
    pub index: usize,
    /// Distinct roots, in discovery order unless realigned.
    pub roots: Vec<Complex<f64>>,
    /// Per-pixel results.
    pub raster: Raster,
}

/// Looks `root` up among `roots` under the detection precision, adding
/// it if it is new.  Fails once the list would outgrow the degree.
fn root_index(
    roots: &mut Vec<Complex<f64>>,
    root: Complex<f64>,
    detect_precision: f64,
    degree: usize,
    frame: usize,
) -> Result<usize, RenderError> {
    if let Some(index) = roots.iter().position(|r| r.approx_eq(&root, detect_precision)) {
        return Ok(index);
    }
    if roots.len() >= degree {
        return Err(RenderError::TooManyRoots { frame, degree });
    }
    roots.push(root);
    Ok(roots.len() - 1)
}

/// Renders one frame on the calling thread.  After each row, `progress`
/// is set to the number of rows finished (the row index plus one), so
/// it reads 0 before the first row is done and `height` at the end.
///
/// A pixel whose iteration settles exactly on the origin is an error
/// pixel, just like one that never settles.
pub fn compute_frame(request: &FrameRequest, progress: &AtomicUsize) -> Result<FrameResult, RenderError> {
    let params = &request.params;
    params.validate()?;
    let plane = PlaneMapper::new(params.width, params.height, params.viewport)?;
    let degree = request.polynomial.degree();
    let max_depth = params.max_depth();

    debug!(
        "frame {}: {}x{} pixels, polynomial {}",
        request.index, params.width, params.height, request.polynomial
    );

    let mut finder = RootFinder::new(&request.polynomial, params.precision);
    let mut roots: Vec<Complex<f64>> = Vec::with_capacity(degree);
    let mut raster = Raster::new(params.width, params.height);
    let origin = Complex::new(0.0, 0.0);

    for row in 0..params.height {
        for column in 0..params.width {
            let guess = plane.pixel_to_point(Pixel(column, row));
            let pixel = match finder.find(guess, params.max_iterations) {
                Convergence::Diverged => PixelResult {
                    depth: clamp_depth(params.max_iterations, max_depth),
                    root: 0,
                    converged: false,
                },
                Convergence::Converged { root, iterations } if root == origin => PixelResult {
                    depth: clamp_depth(iterations, max_depth),
                    root: 0,
                    converged: false,
                },
                Convergence::Converged { root, iterations } => PixelResult {
                    depth: clamp_depth(iterations, max_depth),
                    root: root_index(&mut roots, root, params.detect_precision, degree, request.index)?,
                    converged: true,
                },
            };
            raster.set(column, row, pixel);
        }
        progress.store(row + 1, Ordering::Relaxed);
    }

    debug!("frame {}: found {} roots", request.index, roots.len());
    Ok(FrameResult {
        index: request.index,
        roots,
        raster,
    })
}

#[inline]
fn clamp_depth(iterations: usize, max_depth: u32) -> u32 {
    if iterations as u64 > u64::from(max_depth) {
        max_depth
    } else {
        iterations as u32
    }
}
