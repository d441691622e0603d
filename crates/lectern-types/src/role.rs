//! Roles and the action catalogue for authorization
//!
//! Every role check in the system goes through [`Role::can_perform`]; no
//! other component duplicates authorization logic. Phase gating is separate
//! and applied by the engine through `Lecture::phase`.

use serde::{Deserialize, Serialize};

/// A user's role on a specific course, highest privilege first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Primary or additional teacher of the course
    Teacher,
    /// Teaching assistant: a promoted enrolled student
    Assistant,
    /// Enrolled student
    Student,
    /// Not a member of the course (includes pending requesters)
    Outsider,
}

/// Actions subject to role-based authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    RequestJoin,
    DecideEnrollment,
    ManageAssistants,
    AddTeacher,
    LeaveCourse,
    CreateLecture,
    EndLecture,
    JoinLecture,
    AskQuestion,
    AnswerQuestion,
    ViewQuestions,
    ViewLectures,
    ViewRoster,
}

impl Role {
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Teacher | Role::Assistant)
    }

    /// Single authorization decision function.
    ///
    /// Enrollment decisions and roster management are teacher-only;
    /// assistants keep all student rights plus answering and lecture
    /// creation/termination.
    pub fn can_perform(&self, action: Action) -> bool {
        match action {
            Action::RequestJoin => matches!(self, Role::Outsider),
            Action::DecideEnrollment | Action::ManageAssistants | Action::AddTeacher => {
                matches!(self, Role::Teacher)
            }
            Action::LeaveCourse => matches!(self, Role::Student | Role::Assistant),
            Action::CreateLecture | Action::EndLecture | Action::AnswerQuestion => {
                self.is_staff()
            }
            Action::JoinLecture | Action::AskQuestion => {
                matches!(self, Role::Student | Role::Assistant)
            }
            Action::ViewQuestions | Action::ViewLectures | Action::ViewRoster => {
                !matches!(self, Role::Outsider)
            }
        }
    }
}

/// Staff role recorded on an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Teacher,
    Assistant,
}

impl TryFrom<Role> for StaffRole {
    type Error = Role;

    fn try_from(role: Role) -> Result<Self, Role> {
        match role {
            Role::Teacher => Ok(StaffRole::Teacher),
            Role::Assistant => Ok(StaffRole::Assistant),
            other => Err(other),
        }
    }
}
