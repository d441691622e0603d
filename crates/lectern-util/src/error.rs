//! Error types for lectern core operations

use thiserror::Error;

use crate::{CourseCode, LectureId, QuestionId, UserId};

/// Core error type for lectern operations
///
/// Expected precondition failures are part of the normal contract of each
/// operation and are returned as values, never panicked. Every variant maps
/// onto one of the coarse [`ErrorKind`]s that callers use to pick a
/// user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LecternError {
    #[error("Course not found: {0}")]
    CourseNotFound(CourseCode),

    #[error("Lecture not found: {0}")]
    LectureNotFound(LectureId),

    #[error("Question not found: {0}")]
    QuestionNotFound(QuestionId),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Student {0} is already enrolled")]
    AlreadyEnrolled(UserId),

    #[error("Student {0} already has a pending request")]
    AlreadyPending(UserId),

    #[error("No pending request for student {0}")]
    NoSuchRequest(UserId),

    #[error("Student {0} is not enrolled")]
    NotEnrolled(UserId),

    #[error("Lecture is not open for this action")]
    LectureNotOpen,

    #[error("Lecture is not live")]
    NotLive,

    #[error("Course {0} is past its validity window")]
    CourseExpired(CourseCode),

    #[error("Course code already taken: {0}")]
    CourseCodeTaken(CourseCode),

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Coarse error classification
///
/// The UI action differs by kind (re-authenticate vs. refresh vs. retry),
/// so kinds are never collapsed into a single generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Role or ownership check failed
    NotAuthorized,
    /// Referenced entity does not exist
    NotFound,
    /// Operation attempted outside its valid phase or membership precondition
    InvalidState,
    /// Course past its validity window
    Expired,
    /// Infrastructure failure (persistence unreachable)
    Internal,
}

impl LecternError {
    pub fn not_authorized(msg: impl Into<String>) -> Self {
        Self::NotAuthorized(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CourseNotFound(_)
            | Self::LectureNotFound(_)
            | Self::QuestionNotFound(_)
            | Self::NoSuchRequest(_) => ErrorKind::NotFound,
            Self::NotAuthorized(_) => ErrorKind::NotAuthorized,
            Self::AlreadyEnrolled(_)
            | Self::AlreadyPending(_)
            | Self::NotEnrolled(_)
            | Self::LectureNotOpen
            | Self::NotLive
            | Self::CourseCodeTaken(_)
            | Self::InvalidTimeRange(_)
            | Self::InvalidInput(_) => ErrorKind::InvalidState,
            Self::CourseExpired(_) => ErrorKind::Expired,
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, LecternError>;
