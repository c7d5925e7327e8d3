// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Renders the frames of an animation on a pool of worker threads and
//! hands them back strictly in frame order.
//!
//! Work orders sit in a channel, in frame order, and each worker takes
//! the next one whenever it is free.  Finished frames come back on a
//! second channel in whatever order the workers finish them; the
//! consumer parks early arrivals until the frame it is waiting for shows
//! up.  To keep an animation of any length in bounded memory, a worker
//! will not pick up new work while `ready_limit` or more finished
//! frames are waiting to be collected.

use crossbeam::channel::{self, Receiver, Sender};
use log::debug;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::errors::RenderError;
use crate::frame::{compute_frame, FrameRequest, FrameResult};
use crate::status::{self, WorkerProgress};

/// A finished frame, or the reason it could not be finished, tagged
/// with its index.
type Delivery = (usize, Result<FrameResult, RenderError>);

/// How the pool is sized and throttled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PipelineSettings {
    /// Number of worker threads.
    pub threads: usize,
    /// Workers stop taking new frames while this many finished frames
    /// are waiting to be collected.
    pub ready_limit: usize,
    /// If set, a status line is logged this often.
    pub status_interval: Option<Duration>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            threads: num_cpus::get(),
            ready_limit: 4,
            status_interval: None,
        }
    }
}

/// Counts finished frames that have not yet been collected, and makes
/// workers wait while there are too many of them.
pub(crate) struct ReadyGate {
    limit: usize,
    state: Mutex<GateState>,
    freed: Condvar,
}

struct GateState {
    ready: usize,
    peak: usize,
    closed: bool,
}

impl ReadyGate {
    fn new(limit: usize) -> Self {
        ReadyGate {
            limit,
            state: Mutex::new(GateState {
                ready: 0,
                peak: 0,
                closed: false,
            }),
            freed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks while the backlog is at the limit.  False once the gate
    /// has been closed, meaning no more work should be taken.
    fn wait_for_slot(&self) -> bool {
        let mut state = self.lock();
        while !state.closed && state.ready >= self.limit {
            state = self.freed.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        !state.closed
    }

    /// A worker is handing over a finished frame.
    fn add(&self) {
        let mut state = self.lock();
        state.ready += 1;
        state.peak = state.peak.max(state.ready);
    }

    /// The consumer collected a frame.
    fn release(&self) {
        let mut state = self.lock();
        state.ready = state.ready.saturating_sub(1);
        self.freed.notify_one();
    }

    /// Wakes every waiting worker and turns all future waits into
    /// refusals.
    fn close(&self) {
        self.lock().closed = true;
        self.freed.notify_all();
    }

    /// Frames finished but not yet collected.
    pub(crate) fn ready(&self) -> usize {
        self.lock().ready
    }

    fn peak(&self) -> usize {
        self.lock().peak
    }
}

/// Closes the gate if its worker unwinds, so that nobody waits on a
/// frame that will never be produced.
struct PanicGuard<'a>(&'a ReadyGate);

impl<'a> Drop for PanicGuard<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.close();
        }
    }
}

/// The consumer's end of the pipeline.  Yields frames in index order,
/// whatever order the workers finish them in.
pub struct OrderedResults<'a> {
    total: usize,
    next: usize,
    parked: BTreeMap<usize, FrameResult>,
    done: Receiver<Delivery>,
    gate: &'a ReadyGate,
}

impl<'a> OrderedResults<'a> {
    /// Blocks until the next frame in sequence is available and returns
    /// it.  `Ok(None)` once every frame has been delivered.  A frame that
    /// failed to render ends the run with its error.
    pub fn get_result(&mut self) -> Result<Option<FrameResult>, RenderError> {
        if self.next >= self.total {
            return Ok(None);
        }
        loop {
            if let Some(result) = self.parked.remove(&self.next) {
                self.gate.release();
                self.next += 1;
                return Ok(Some(result));
            }
            match self.done.recv() {
                Ok((index, Ok(result))) => {
                    self.parked.insert(index, result);
                }
                Ok((index, Err(err))) => {
                    debug!("frame {} failed: {}", index, err);
                    self.gate.close();
                    return Err(err);
                }
                Err(_) => {
                    self.gate.close();
                    return Err(RenderError::WorkerLost { frame: self.next });
                }
            }
        }
    }

    /// Frames not yet delivered.
    pub fn remaining(&self) -> usize {
        self.total - self.next
    }

    /// Frames finished by the workers but not yet delivered.
    pub fn backlog(&self) -> usize {
        self.gate.ready()
    }

    /// The largest backlog seen so far.
    pub fn peak_backlog(&self) -> usize {
        self.gate.peak()
    }
}

impl<'a> Iterator for OrderedResults<'a> {
    type Item = Result<FrameResult, RenderError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_result().transpose()
    }
}

impl<'a> Drop for OrderedResults<'a> {
    fn drop(&mut self) {
        self.gate.close();
    }
}

/// One worker: take a frame, render it, hand it over, repeat until the
/// queue is empty or the gate is closed.
fn work<C>(
    worker: usize,
    pending: &Receiver<FrameRequest>,
    done: &Sender<Delivery>,
    gate: &ReadyGate,
    progress: &WorkerProgress,
    compute: &C,
) where
    C: Fn(&FrameRequest, &AtomicUsize) -> Result<FrameResult, RenderError>,
{
    let _guard = PanicGuard(gate);
    while gate.wait_for_slot() {
        let request = match pending.recv() {
            Ok(request) => request,
            Err(_) => break,
        };
        debug!("worker {}: starting frame {}", worker, request.index);
        progress.start(request.index);
        let outcome = compute(&request, progress.rows());
        progress.finish();

        let failed = outcome.is_err();
        gate.add();
        if done.send((request.index, outcome)).is_err() || failed {
            gate.close();
            break;
        }
    }
    debug!("worker {}: exiting", worker);
}

/// A pool of workers rendering a batch of frames.
#[derive(Debug)]
pub struct RenderPipeline {
    settings: PipelineSettings,
}

impl RenderPipeline {
    /// Rejects a pool without workers or a zero ready limit, which would
    /// never make progress.
    pub fn new(settings: PipelineSettings) -> Result<Self, RenderError> {
        if settings.threads == 0 {
            return Err(RenderError::invalid("at least one worker thread is required"));
        }
        if settings.ready_limit == 0 {
            return Err(RenderError::invalid("the ready limit must be at least 1"));
        }
        Ok(RenderPipeline { settings })
    }

    /// The settings the pipeline was built with.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Renders `requests` with `compute_frame`.  See `run_with`.
    pub fn run<B, T>(&self, requests: Vec<FrameRequest>, body: B) -> Result<T, RenderError>
    where
        B: FnOnce(&mut OrderedResults) -> Result<T, RenderError>,
    {
        self.run_with(requests, compute_frame, body)
    }

    /// Starts the workers on `requests`, which must be numbered 0, 1, 2,
    /// ... in order, and calls `body` on the calling thread to collect
    /// the results.  Returns once `body` has returned and every worker
    /// has exited.  If `body` stops early, workers finish the frame they
    /// are on and take no more.
    pub fn run_with<C, B, T>(&self, requests: Vec<FrameRequest>, compute: C, body: B) -> Result<T, RenderError>
    where
        C: Fn(&FrameRequest, &AtomicUsize) -> Result<FrameResult, RenderError> + Sync,
        B: FnOnce(&mut OrderedResults) -> Result<T, RenderError>,
    {
        if let Some((position, request)) = requests
            .iter()
            .enumerate()
            .find(|&(position, request)| position != request.index)
        {
            return Err(RenderError::invalid(format!(
                "frame requests must be numbered in order: found frame {} at position {}",
                request.index, position
            )));
        }

        let total = requests.len();
        let (pending_tx, pending) = channel::unbounded();
        for request in requests {
            // The receiver is still held here, so sending cannot fail.
            let _ = pending_tx.send(request);
        }
        drop(pending_tx);

        let gate = ReadyGate::new(self.settings.ready_limit);
        let workers: Vec<WorkerProgress> = (0..self.settings.threads)
            .map(|_| WorkerProgress::default())
            .collect();
        let (done_tx, done) = channel::unbounded::<Delivery>();

        let (gate, workers, compute) = (&gate, &workers[..], &compute);
        let outcome = crossbeam::scope(|spawner| {
            for (worker, progress) in workers.iter().enumerate() {
                let pending = pending.clone();
                let done_tx = done_tx.clone();
                spawner.spawn(move |_| work(worker, &pending, &done_tx, gate, progress, compute));
            }
            drop(done_tx);

            let reporter = self.settings.status_interval.map(|interval| {
                let (stop, stopped) = channel::bounded::<()>(0);
                spawner.spawn(move |_| status::report(&stopped, interval, workers, gate));
                stop
            });

            let mut results = OrderedResults {
                total,
                next: 0,
                parked: BTreeMap::new(),
                done,
                gate,
            };
            let out = body(&mut results);
            drop(results);
            drop(reporter);
            out
        });

        match outcome {
            Ok(out) => out,
            Err(_) => Err(RenderError::WorkerPanicked),
        }
    }
}
