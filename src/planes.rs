// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a raster of pixels with an origin at 0,0 and a window on
//! the complex plane.  Every pixel is mapped to the complex number the
//! Newton iteration starts from.
use num::Complex;

use crate::errors::RenderError;

/// The window on the complex plane that the raster covers.  The real
/// axis runs along the raster's rows, the imaginary axis down its
/// columns.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Real part at the left edge.
    pub xmin: f64,
    /// Real part at the right edge.
    pub xmax: f64,
    /// Imaginary part of the first row.
    pub ymin: f64,
    /// Imaginary part just past the last row.
    pub ymax: f64,
}

impl Viewport {
    /// A window of the given size centred on the origin.
    pub fn centred(width: f64, height: f64) -> Viewport {
        Viewport {
            xmin: -width / 2.0,
            xmax: width / 2.0,
            ymin: -height / 2.0,
            ymax: height / 2.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::centred(8.0, 6.0)
    }
}

/// Describes the x, y of a pixel in the raster.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of a width x height raster onto a viewport.
#[derive(Debug)]
pub struct PlaneMapper {
    /// Raster width and height, in pixels.
    pub bounds: (usize, usize),
    /// The window on the complex plane.
    pub viewport: Viewport,
    // The width and height, respectively, of one pixel on the complex
    // plane.
    steps: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Rejects empty rasters and viewports whose edges
    /// are inverted or not finite.
    pub fn new(width: usize, height: usize, viewport: Viewport) -> Result<PlaneMapper, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::invalid(format!(
                "the raster must not be empty, got {}x{}",
                width, height
            )));
        }

        let edges = [viewport.xmin, viewport.xmax, viewport.ymin, viewport.ymax];
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(RenderError::invalid("viewport edges must be finite"));
        }

        if viewport.xmax <= viewport.xmin {
            return Err(RenderError::invalid(
                "the left edge of the viewport is not to the left of the right edge",
            ));
        }

        if viewport.ymax <= viewport.ymin {
            return Err(RenderError::invalid(
                "the bottom edge of the viewport is not below the top edge",
            ));
        }

        Ok(PlaneMapper {
            bounds: (width, height),
            viewport,
            steps: (
                (viewport.xmax - viewport.xmin) / (width as f64),
                (viewport.ymax - viewport.ymin) / (height as f64),
            ),
        })
    }

    /// The total number of pixels in the raster.
    pub fn len(&self) -> usize {
        self.bounds.0 * self.bounds.1
    }

    /// Always false, since `new` refuses empty rasters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Given a pixel, return the complex number at its top-left corner.
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<f64> {
        Complex::new(
            self.viewport.xmin + (pixel.0 as f64) * self.steps.0,
            self.viewport.ymin + (pixel.1 as f64) * self.steps.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Viewport {
        Viewport {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    #[test]
    fn planemapper_fails_on_bad_shape() {
        assert!(PlaneMapper::new(4, 4, window(1.0, -1.0, -1.0, 1.0)).is_err());
        assert!(PlaneMapper::new(4, 4, window(-1.0, 1.0, 1.0, -1.0)).is_err());
        assert!(PlaneMapper::new(4, 4, window(-1.0, -1.0, -1.0, 1.0)).is_err());
        assert!(PlaneMapper::new(4, 4, window(-1.0, std::f64::INFINITY, -1.0, 1.0)).is_err());
    }

    #[test]
    fn planemapper_fails_on_empty_raster() {
        assert!(PlaneMapper::new(0, 4, Viewport::default()).is_err());
        assert!(PlaneMapper::new(4, 0, Viewport::default()).is_err());
    }

    #[test]
    fn planemapper_passes_on_good_shape() {
        let pm = PlaneMapper::new(4, 3, Viewport::default()).unwrap();
        assert_eq!(pm.len(), 12);
        assert!(!pm.is_empty());
    }

    #[test]
    fn default_viewport_matches_eight_by_six() {
        assert_eq!(Viewport::default(), window(-4.0, 4.0, -3.0, 3.0));
    }

    #[test]
    fn pixel_to_point_on_positive_planes() {
        let pm = PlaneMapper::new(5, 5, window(0.0, 5.0, 0.0, 5.0)).unwrap();
        assert_eq!(pm.pixel_to_point(Pixel(0, 0)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(Pixel(2, 2)), Complex::new(2.0, 2.0));
        assert_eq!(pm.pixel_to_point(Pixel(4, 1)), Complex::new(4.0, 1.0));
    }

    #[test]
    fn pixel_to_points_on_mixed_planes() {
        let pm = PlaneMapper::new(4, 4, window(-2.0, 2.0, -2.0, 2.0)).unwrap();
        assert_eq!(pm.pixel_to_point(Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(pm.pixel_to_point(Pixel(4, 4)), Complex::new(2.0, 2.0));
    }
}
