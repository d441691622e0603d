//! Question document and the append-only answer list

use chrono::{DateTime, Utc};
use lectern_util::{LectureId, QuestionId, UserId};
use serde::{Deserialize, Serialize};

use crate::StaffRole;

/// A single answer appended by course staff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub author_id: UserId,
    pub role: StaffRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Derived question status: non-empty answer list means answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Unanswered,
    Answered,
}

/// A question asked in a lecture's doubt thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub lecture_id: LectureId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Append-only; answers are never edited or removed
    pub answers: Vec<Answer>,
}

impl Question {
    pub fn status(&self) -> QuestionStatus {
        if self.answers.is_empty() {
            QuestionStatus::Unanswered
        } else {
            QuestionStatus::Answered
        }
    }
}

/// Filter for doubt-board listings
///
/// Partitions by answered/unanswered only; never by author. The doubt board
/// is open: every enrolled student sees all questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionFilter {
    #[default]
    All,
    Answered,
    Pending,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            QuestionFilter::All => true,
            QuestionFilter::Answered => question.status() == QuestionStatus::Answered,
            QuestionFilter::Pending => question.status() == QuestionStatus::Unanswered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_question(answers: usize) -> Question {
        let created = Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap();
        Question {
            id: QuestionId::new(),
            lecture_id: LectureId::new(),
            author_id: UserId::new("s1"),
            text: "Why does the borrow fail here?".into(),
            created_at: created,
            answers: (0..answers)
                .map(|i| Answer {
                    author_id: UserId::new("t1"),
                    role: StaffRole::Teacher,
                    text: format!("answer {}", i),
                    created_at: created + chrono::Duration::minutes(i as i64 + 1),
                })
                .collect(),
        }
    }

    #[test]
    fn status_is_derived_from_answers() {
        assert_eq!(make_question(0).status(), QuestionStatus::Unanswered);
        assert_eq!(make_question(1).status(), QuestionStatus::Answered);
        assert_eq!(make_question(3).status(), QuestionStatus::Answered);
    }

    #[test]
    fn filter_partitions_by_status_only() {
        let unanswered = make_question(0);
        let answered = make_question(2);

        assert!(QuestionFilter::All.matches(&unanswered));
        assert!(QuestionFilter::All.matches(&answered));
        assert!(QuestionFilter::Pending.matches(&unanswered));
        assert!(!QuestionFilter::Pending.matches(&answered));
        assert!(QuestionFilter::Answered.matches(&answered));
        assert!(!QuestionFilter::Answered.matches(&unanswered));
    }

    #[test]
    fn question_serialization() {
        let question = make_question(1);
        let json = serde_json::to_string(&question).unwrap();
        let parsed: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(question, parsed);
    }
}
