// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progress counters for the render workers, and the thread that
//! periodically logs them.  Each counter has exactly one writer; the
//! reporter reads them without synchronisation and may see stale
//! values, which is fine for a status line.

use crossbeam::channel::{Receiver, RecvTimeoutError};
use log::info;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::pipeline::ReadyGate;

/// What one worker is doing.
#[derive(Debug, Default)]
pub struct WorkerProgress {
    busy: AtomicBool,
    frame: AtomicUsize,
    rows: AtomicUsize,
}

impl WorkerProgress {
    /// The worker picked up `frame`.
    pub fn start(&self, frame: usize) {
        self.rows.store(0, Ordering::Relaxed);
        self.frame.store(frame, Ordering::Relaxed);
        self.busy.store(true, Ordering::Relaxed);
    }

    /// The worker handed its frame over.
    pub fn finish(&self) {
        self.busy.store(false, Ordering::Relaxed);
    }

    /// The counter the frame computer publishes finished rows to.
    pub fn rows(&self) -> &AtomicUsize {
        &self.rows
    }

    /// `Some((frame, rows finished))` while the worker is rendering.
    pub fn snapshot(&self) -> Option<(usize, usize)> {
        if self.busy.load(Ordering::Relaxed) {
            Some((self.frame.load(Ordering::Relaxed), self.rows.load(Ordering::Relaxed)))
        } else {
            None
        }
    }
}

/// One line describing every worker and the backlog of finished frames.
pub fn summary(workers: &[WorkerProgress], ready: usize) -> String {
    let states: Vec<String> = workers
        .iter()
        .map(|worker| match worker.snapshot() {
            Some((frame, rows)) => format!("frame {} row {}", frame, rows),
            None => "idle".to_string(),
        })
        .collect();
    format!("{} | {} ready", states.join(", "), ready)
}

/// Logs a summary every `interval` until `stop` is dropped.
pub(crate) fn report(stop: &Receiver<()>, interval: Duration, workers: &[WorkerProgress], gate: &ReadyGate) {
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => info!("{}", summary(workers, gate.ready())),
            _ => break,
        }
    }
}
