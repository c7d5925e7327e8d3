#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Newton fractal renderer
//!
//! Newton's method finds a root of a polynomial by starting from a
//! guess and repeatedly sliding down the tangent.  Which root it lands
//! on depends on where it started, and the boundaries between the
//! basins of attraction of the different roots are fractal.  Taking
//! every pixel of an image as a starting guess, colouring it by the
//! root it reaches, and shading it by how long that took, draws those
//! basins.
//!
//! Animations come from keyframes: a handful of polynomials pinned to
//! frame numbers, with the coefficients in between interpolated
//! linearly.  Frames are rendered in parallel, delivered strictly in
//! order, and have their roots renumbered to follow the previous frame
//! so that a basin keeps its colour as it moves.

extern crate crossbeam;
extern crate failure;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod align;
pub mod animation;
pub mod colour;
pub mod complex;
pub mod errors;
pub mod frame;
pub mod keyframes;
pub mod newton;
pub mod parse;
pub mod pipeline;
pub mod planes;
pub mod polynomial;
pub mod status;

pub use animation::{render_animation, render_image};
pub use colour::{colour_raster, DepthRange, Palette};
pub use errors::RenderError;
pub use frame::{FrameParams, FrameRequest, FrameResult, PixelResult, Raster};
pub use keyframes::Keyframes;
pub use pipeline::{OrderedResults, PipelineSettings, RenderPipeline};
pub use planes::Viewport;
pub use polynomial::Polynomial;
