//! User-facing status flags and their auto-clearing notices.
//!
//! Every notice remembers the attempt that raised it and its own deadline.
//! Starting a new attempt drops all earlier notices, so an old deadline can
//! never clear a newer message.

use std::fmt;
use std::time::{Duration, Instant};

use crate::remote::SubmitError;

/// Source of "now" for notice deadlines.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Monotonic id of one submit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Rejected,
    Unexpected,
}

impl From<&SubmitError> for ErrorKind {
    fn from(err: &SubmitError) -> Self {
        match err {
            SubmitError::Transport { .. } => ErrorKind::Transport,
            SubmitError::Rejected { .. } => ErrorKind::Rejected,
            SubmitError::Unexpected => ErrorKind::Unexpected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error(ErrorKind),
    GeoError,
}

/// One of the three independently dismissible notice positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSlot {
    Success,
    Error,
    GeoError,
}

impl NoticeKind {
    pub fn slot(self) -> NoticeSlot {
        match self {
            NoticeKind::Success => NoticeSlot::Success,
            NoticeKind::Error(_) => NoticeSlot::Error,
            NoticeKind::GeoError => NoticeSlot::GeoError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub attempt: AttemptId,
    pub message: String,
    pub expires_at: Instant,
}

/// What the form should currently convey, most important first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Success,
    Error { kind: ErrorKind, message: String },
    GeoError { message: String },
}

/// The flags the rendering surface reads. Only the workflow writes them.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    notice_duration: Duration,
    current: Option<AttemptId>,
    next_attempt: u64,
    submitting: bool,
    success: Option<Notice>,
    error: Option<Notice>,
    geo_error: Option<Notice>,
}

impl StatusBoard {
    pub fn new(notice_duration: Duration) -> Self {
        Self {
            notice_duration,
            current: None,
            next_attempt: 1,
            submitting: false,
            success: None,
            error: None,
            geo_error: None,
        }
    }

    /// `idle → submitting`: open a new attempt and drop every earlier notice.
    pub fn begin(&mut self) -> AttemptId {
        let id = AttemptId(self.next_attempt);
        self.next_attempt += 1;
        self.current = Some(id);
        self.submitting = true;
        self.success = None;
        self.error = None;
        self.geo_error = None;
        id
    }

    /// Clear `submitting` for `attempt`. A superseded attempt changes nothing.
    pub fn finish(&mut self, attempt: AttemptId) {
        if self.current == Some(attempt) {
            self.submitting = false;
        }
    }

    /// Show a notice for `attempt`, expiring `notice_duration` after `now`.
    ///
    /// Returns `false` (and shows nothing) when `attempt` is not the current one.
    pub fn raise(
        &mut self,
        attempt: AttemptId,
        kind: NoticeKind,
        message: impl Into<String>,
        now: Instant,
    ) -> bool {
        if self.current != Some(attempt) {
            return false;
        }
        *self.slot_mut(kind.slot()) = Some(Notice {
            kind,
            attempt,
            message: message.into(),
            expires_at: now + self.notice_duration,
        });
        true
    }

    pub fn dismiss(&mut self, slot: NoticeSlot) {
        *self.slot_mut(slot) = None;
    }

    pub fn dismiss_all(&mut self) {
        self.success = None;
        self.error = None;
        self.geo_error = None;
    }

    /// Drop every notice whose deadline has passed. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for slot in [&mut self.success, &mut self.error, &mut self.geo_error] {
            if slot.as_ref().is_some_and(|n| n.expires_at <= now) {
                *slot = None;
                changed = true;
            }
        }
        changed
    }

    pub fn notice(&self, slot: NoticeSlot) -> Option<&Notice> {
        match slot {
            NoticeSlot::Success => self.success.as_ref(),
            NoticeSlot::Error => self.error.as_ref(),
            NoticeSlot::GeoError => self.geo_error.as_ref(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.current
    }

    /// Earliest pending deadline, if any notice is up.
    pub fn next_deadline(&self) -> Option<Instant> {
        [&self.success, &self.error, &self.geo_error]
            .into_iter()
            .filter_map(|n| n.as_ref().map(|n| n.expires_at))
            .min()
    }

    pub fn status(&self) -> SubmissionStatus {
        if self.submitting {
            return SubmissionStatus::Submitting;
        }
        if let Some(n) = &self.error {
            let kind = match n.kind {
                NoticeKind::Error(kind) => kind,
                _ => ErrorKind::Unexpected,
            };
            return SubmissionStatus::Error {
                kind,
                message: n.message.clone(),
            };
        }
        if self.success.is_some() {
            return SubmissionStatus::Success;
        }
        if let Some(n) = &self.geo_error {
            return SubmissionStatus::GeoError {
                message: n.message.clone(),
            };
        }
        SubmissionStatus::Idle
    }

    fn slot_mut(&mut self, slot: NoticeSlot) -> &mut Option<Notice> {
        match slot {
            NoticeSlot::Success => &mut self.success,
            NoticeSlot::Error => &mut self.error,
            NoticeSlot::GeoError => &mut self.geo_error,
        }
    }
}
