//! Strongly-typed identifiers for lectern

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique human-chosen code identifying a course (e.g. "CS101")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseCode(String);

impl CourseCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CourseCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CourseCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a user (student, assistant or teacher), as supplied by
/// the identity layer after authentication
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a lecture
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LectureId(Uuid);

impl LectureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LectureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LectureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a question in a doubt thread
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(Uuid);

impl QuestionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_code_equality() {
        let c1 = CourseCode::new("CS101");
        let c2 = CourseCode::new("CS101");
        let c3 = CourseCode::new("CS102");

        assert_eq!(c1, c2);
        assert_ne!(c1, c3);
    }

    #[test]
    fn lecture_id_uniqueness() {
        let l1 = LectureId::new();
        let l2 = LectureId::new();
        assert_ne!(l1, l2);
    }

    #[test]
    fn ids_serialize_deserialize() {
        let code = CourseCode::new("CS101");
        let json = serde_json::to_string(&code).unwrap();
        let parsed: CourseCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, parsed);

        let question_id = QuestionId::new();
        let json = serde_json::to_string(&question_id).unwrap();
        let parsed: QuestionId = serde_json::from_str(&json).unwrap();
        assert_eq!(question_id, parsed);
    }
}
