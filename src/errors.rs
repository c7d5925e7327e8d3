// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type shared by every stage of the renderer.
//! Per-pixel non-convergence is not an error; it is recorded in the
//! raster.  Everything here aborts the run.

use failure::Fail;
use std::io;

/// Everything that can stop a render.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// Rejected before any rendering started.
    #[fail(display = "invalid input: {}", _0)]
    InvalidInput(String),

    /// A frame discovered more distinct roots than its polynomial's
    /// degree allows.  The detection precision is too fine for the
    /// iteration precision, or something is badly wrong.
    #[fail(
        display = "too many roots in frame {}: polynomial of degree {} cannot have more than {} distinct roots",
        frame, degree, degree
    )]
    TooManyRoots {
        /// The frame being computed.
        frame: usize,
        /// The degree of that frame's polynomial.
        degree: usize,
    },

    /// Every worker exited without delivering the frame the consumer
    /// was waiting for.
    #[fail(display = "workers exited before delivering frame {}", frame)]
    WorkerLost {
        /// The frame that never arrived.
        frame: usize,
    },

    /// A worker thread panicked.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,

    /// A literal on the command line could not be understood.
    #[fail(display = "could not parse {:?}: {}", input, reason)]
    Parse {
        /// The offending text.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Writing an image failed.
    #[fail(display = "i/o error: {}", _0)]
    Io(#[cause] io::Error),
}

impl RenderError {
    /// Shorthand for `InvalidInput`.
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        RenderError::InvalidInput(msg.into())
    }

    /// Shorthand for `Parse`.
    pub fn parse<S: Into<String>, R: Into<String>>(input: S, reason: R) -> Self {
        RenderError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        RenderError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = RenderError::TooManyRoots { frame: 3, degree: 2 };
        assert!(err.to_string().contains("frame 3"));
        assert!(err.to_string().contains("degree 2"));

        let err = RenderError::parse("1,,2", "empty coefficient");
        assert!(err.to_string().contains("\"1,,2\""));
        assert!(err.to_string().contains("empty coefficient"));
    }

    #[test]
    fn io_errors_keep_their_cause() {
        let err: RenderError = io::Error::new(io::ErrorKind::Other, "disk full").into();
        assert!(err.cause().is_some());
        assert!(err.to_string().contains("disk full"));
    }
}
