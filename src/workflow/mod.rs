//! Submission workflow controller.
//!
//! Shared by the `submit` command and the TUI so both run the same sequence:
//! locate -> build payload -> POST -> update status board.
//!
//! A geolocation failure with a position code (denied, unavailable, timeout)
//! falls back to a rating-only POST and raises a geo-error warning. A host with
//! no geolocation at all is treated as a generic failure and nothing is sent.

use std::time::Instant;

use log::{info, warn};

use crate::domain::{Rating, SubmissionPayload};
use crate::geo::{GeoError, Locator, PositionOptions};
use crate::remote::{Endpoint, SubmitError};

pub mod status;

pub use status::{
    AttemptId, Clock, ErrorKind, Notice, NoticeKind, NoticeSlot, StatusBoard, SubmissionStatus,
    SystemClock,
};

pub const SUCCESS_NOTICE: &str = "✓ Submitted successfully!";
pub const GEO_BLOCKED_NOTICE: &str =
    "Location sharing was blocked — submitted rating without location";

/// How one attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Submitted(SubmissionPayload),
    Failed(SubmitError),
}

pub struct Workflow<L, E, C = SystemClock> {
    locator: L,
    endpoint: E,
    options: PositionOptions,
    clock: C,
}

impl<L: Locator, E: Endpoint> Workflow<L, E> {
    pub fn new(locator: L, endpoint: E, options: PositionOptions) -> Self {
        Self::with_clock(locator, endpoint, options, SystemClock)
    }
}

impl<L: Locator, E: Endpoint, C: Clock> Workflow<L, E, C> {
    pub fn with_clock(locator: L, endpoint: E, options: PositionOptions, clock: C) -> Self {
        Self {
            locator,
            endpoint,
            options,
            clock,
        }
    }

    /// Open a new attempt on `board` and run it to completion.
    pub fn submit(&self, rating: Rating, board: &mut StatusBoard) -> Outcome {
        let attempt = board.begin();
        self.run(attempt, rating, board)
    }

    /// Run an attempt already opened with [`StatusBoard::begin`].
    ///
    /// `submitting` is cleared on every path before this returns.
    pub fn run(&self, attempt: AttemptId, rating: Rating, board: &mut StatusBoard) -> Outcome {
        info!("attempt {attempt}: rating {rating}");
        let outcome = self.run_inner(attempt, rating, board);
        board.finish(attempt);
        outcome
    }

    fn run_inner(&self, attempt: AttemptId, rating: Rating, board: &mut StatusBoard) -> Outcome {
        let payload = match self.locator.current_position(&self.options) {
            Ok(position) => {
                info!(
                    "attempt {attempt}: located at {:.4},{:.4}",
                    position.latitude, position.longitude
                );
                SubmissionPayload::with_position(rating, position)
            }
            Err(GeoError::Position { code, reason }) => {
                warn!("attempt {attempt}: geolocation failed ({code:?}): {reason}; sending rating only");
                SubmissionPayload::rating_only(rating)
            }
            Err(GeoError::Unsupported) => {
                warn!("attempt {attempt}: geolocation unsupported; not submitting");
                return Self::fail(attempt, SubmitError::Unexpected, board, self.clock.now());
            }
        };

        let result = self.endpoint.submit(&payload);

        // Every notice of this attempt starts its countdown once the POST is
        // back, so none can expire while the UI is blocked on the request.
        let now = self.clock.now();
        if !payload.has_position() {
            board.raise(attempt, NoticeKind::GeoError, GEO_BLOCKED_NOTICE, now);
        }
        match result {
            Ok(reply) if reply.success => {
                info!("attempt {attempt}: submitted (with location: {})", payload.has_position());
                board.raise(attempt, NoticeKind::Success, SUCCESS_NOTICE, now);
                Outcome::Submitted(payload)
            }
            Ok(reply) => Self::fail(attempt, SubmitError::rejected(reply.message), board, now),
            Err(err) => Self::fail(attempt, err, board, now),
        }
    }

    fn fail(attempt: AttemptId, err: SubmitError, board: &mut StatusBoard, now: Instant) -> Outcome {
        warn!("attempt {attempt}: {err}");
        let kind = NoticeKind::Error(ErrorKind::from(&err));
        board.raise(attempt, kind, err.to_string(), now);
        Outcome::Failed(err)
    }
}
