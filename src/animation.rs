// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Keyframes in, aligned frames out, in order.

use log::{debug, info};
use std::sync::atomic::AtomicUsize;

use crate::align::align;
use crate::errors::RenderError;
use crate::frame::{compute_frame, FrameParams, FrameRequest, FrameResult};
use crate::keyframes::{self, Keyframes};
use crate::pipeline::{PipelineSettings, RenderPipeline};
use crate::polynomial::Polynomial;

/// Renders a single image on the calling thread.
pub fn render_image(polynomial: Polynomial, params: FrameParams) -> Result<FrameResult, RenderError> {
    let request = FrameRequest {
        index: 0,
        polynomial,
        params,
    };
    compute_frame(&request, &AtomicUsize::new(0))
}

/// Renders every frame described by `keyframes` on a worker pool and
/// passes them to `sink` in frame order.  From the second frame on,
/// each frame's roots are renumbered to match the frame before, so a
/// root keeps its colour for the whole animation.  Returns the number
/// of frames rendered.
pub fn render_animation<F>(
    keyframes: &Keyframes,
    params: FrameParams,
    settings: PipelineSettings,
    mut sink: F,
) -> Result<usize, RenderError>
where
    F: FnMut(&FrameResult) -> Result<(), RenderError>,
{
    let requests = keyframes::requests(keyframes, params)?;
    let pipeline = RenderPipeline::new(settings)?;
    info!(
        "rendering {} frames on {} threads",
        requests.len(),
        settings.threads
    );

    pipeline.run(requests, |results| {
        let mut previous: Option<FrameResult> = None;
        let mut delivered = 0;
        while let Some(result) = results.get_result()? {
            let result = match previous {
                Some(ref prev) => align(result, &prev.roots),
                None => result,
            };
            debug!(
                "frame {}: {} roots, {} frames waiting",
                result.index,
                result.roots.len(),
                results.backlog()
            );
            sink(&result)?;
            delivered += 1;
            previous = Some(result);
        }
        Ok(delivered)
    })
}
