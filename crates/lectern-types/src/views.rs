//! View types for listings

use chrono::{DateTime, Utc};
use lectern_util::{CourseCode, LectureId, QuestionId, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Lecture, LecturePhase, Question, QuestionStatus};

/// Structured reason codes for why a lecture is not joinable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ReasonCode {
    /// Lecture has not started and is outside the join grace margin
    NotStarted { starts_at: DateTime<Utc> },
    /// Scheduled window has passed
    Ended { ended_at: DateTime<Utc> },
    /// Teacher ended the session early
    EndedByTeacher { ended_at: DateTime<Utc> },
}

/// View of a lecture for listings, with derived phase and joinability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureView {
    pub lecture_id: LectureId,
    pub course_code: CourseCode,
    pub number: u32,
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub phase: LecturePhase,
    pub joinable: bool,
    pub reasons: Vec<ReasonCode>,
    /// Derived from join records, never stored on the lecture
    pub joined_count: u64,
}

impl LectureView {
    /// Build a view at the given instant, applying the join grace margins.
    pub fn derive(
        lecture: &Lecture,
        now: DateTime<Utc>,
        grace_before: Duration,
        grace_after: Duration,
        joined_count: u64,
    ) -> Self {
        let phase = lecture.phase(now);
        let joinable = lecture.in_join_window(now, grace_before, grace_after);

        let mut reasons = Vec::new();
        if !joinable {
            match phase {
                LecturePhase::Scheduled => reasons.push(ReasonCode::NotStarted {
                    starts_at: lecture.start_at,
                }),
                LecturePhase::EndedNaturally => reasons.push(ReasonCode::Ended {
                    ended_at: lecture.end_at,
                }),
                LecturePhase::EndedByTeacher => {
                    // Flag implies the timestamp is present.
                    if let Some(ended_at) = lecture.teacher_ended_at {
                        reasons.push(ReasonCode::EndedByTeacher { ended_at });
                    }
                }
                LecturePhase::Live => {}
            }
        }

        Self {
            lecture_id: lecture.id.clone(),
            course_code: lecture.course_code.clone(),
            number: lecture.number,
            title: lecture.title.clone(),
            start_at: lecture.start_at,
            end_at: lecture.end_at,
            phase,
            joinable,
            reasons,
            joined_count,
        }
    }
}

/// View of a question with its derived status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub question_id: QuestionId,
    pub lecture_id: LectureId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub status: QuestionStatus,
    pub answers: Vec<crate::Answer>,
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        let status = question.status();
        Self {
            question_id: question.id,
            lecture_id: question.lecture_id,
            author_id: question.author_id,
            text: question.text,
            created_at: question.created_at,
            status,
            answers: question.answers,
        }
    }
}
