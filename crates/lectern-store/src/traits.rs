//! Store trait definitions

use chrono::{DateTime, Utc};
use lectern_types::{Answer, Course, Lecture, MemberState, Question, Roster};
use lectern_util::{CourseCode, LectureId, QuestionId, UserId};

use crate::{AuditEvent, StoreResult};

/// Main store trait
///
/// Membership, lecture-termination and numbering primitives are atomic
/// match-then-modify operations: the `bool` result reports whether the
/// guarded transition matched. Callers translate `false` into the
/// appropriate precondition error; they never pre-check and then blindly
/// write.
pub trait Store: Send + Sync {
    // Courses

    /// Insert a course with its teacher list.
    /// Returns false if the course code is already taken.
    fn insert_course(&self, course: &Course) -> StoreResult<bool>;

    /// Get a course by code
    fn get_course(&self, code: &CourseCode) -> StoreResult<Option<Course>>;

    /// Append an additional teacher (idempotent).
    /// Returns false if the user already teaches the course.
    fn add_teacher(&self, code: &CourseCode, user: &UserId) -> StoreResult<bool>;

    /// Assemble the course's membership sets
    fn roster(&self, code: &CourseCode) -> StoreResult<Roster>;

    // Membership workflow

    /// Get a student's membership state on a course
    fn membership(&self, code: &CourseCode, student: &UserId)
    -> StoreResult<Option<MemberState>>;

    /// Add a pending enrollment request.
    /// Returns false if the student already has any membership row.
    fn insert_pending(
        &self,
        code: &CourseCode,
        student: &UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Move a pending request to enrolled.
    /// Returns false if no pending request exists at decision time.
    fn accept_pending(
        &self,
        code: &CourseCode,
        student: &UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Remove a pending request (deny). No record is retained.
    /// Returns false if no pending request exists.
    fn remove_pending(&self, code: &CourseCode, student: &UserId) -> StoreResult<bool>;

    /// Promote or demote an enrolled student's assistant flag.
    /// Idempotent; returns false only if the student is not enrolled.
    fn set_assistant(
        &self,
        code: &CourseCode,
        student: &UserId,
        assistant: bool,
    ) -> StoreResult<bool>;

    /// Remove an enrolled (or assistant) student from the course in one
    /// step. Returns false if the student is not enrolled.
    fn remove_member(&self, code: &CourseCode, student: &UserId) -> StoreResult<bool>;

    // Lectures

    /// Insert a lecture, assigning the next sequential number for the
    /// course atomically. Returns the stored lecture.
    fn insert_lecture(
        &self,
        id: &LectureId,
        code: &CourseCode,
        title: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        created_by: &UserId,
    ) -> StoreResult<Lecture>;

    /// Get a lecture by id
    fn get_lecture(&self, id: &LectureId) -> StoreResult<Option<Lecture>>;

    /// All lectures of a course, by number
    fn lectures_for_course(&self, code: &CourseCode) -> StoreResult<Vec<Lecture>>;

    /// All lectures of courses the student is enrolled in, by start time
    fn lectures_for_student(&self, student: &UserId) -> StoreResult<Vec<Lecture>>;

    /// Set the one-way teacher-ended flag, guarded on the lecture still
    /// being inside its scheduled window and not already ended.
    /// Returns false if the guard did not match.
    fn mark_teacher_ended(&self, id: &LectureId, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Record that a student joined a lecture (idempotent).
    /// Returns false if the join was already recorded.
    fn record_join(
        &self,
        id: &LectureId,
        student: &UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Derived joined-student count
    fn joined_count(&self, id: &LectureId) -> StoreResult<u64>;

    // Doubt threads

    /// Insert a new question (empty answer list)
    fn insert_question(&self, question: &Question) -> StoreResult<()>;

    /// Get a question with its answers, in append order
    fn get_question(&self, id: &QuestionId) -> StoreResult<Option<Question>>;

    /// Append an answer to a question.
    /// Returns false if the question does not exist.
    fn append_answer(&self, id: &QuestionId, answer: &Answer) -> StoreResult<bool>;

    /// All questions of a lecture with their answers, in ask order
    fn questions_for_lecture(&self, id: &LectureId) -> StoreResult<Vec<Question>>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
