//! Access gate
//!
//! The single choke point between role resolution and every guarded
//! operation. Callers resolve the actor's role on the course, then pass it
//! through [`require`] with the action they are about to perform.

use lectern_types::{Action, Role};
use lectern_util::{LecternError, Result};

/// Check that a role may perform an action, or return the denial.
pub fn require(role: Role, action: Action) -> Result<()> {
    if role.can_perform(action) {
        Ok(())
    } else {
        Err(LecternError::not_authorized(format!(
            "{:?} may not perform {:?}",
            role, action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_util::ErrorKind;

    #[test]
    fn denial_carries_authorization_kind() {
        let err = require(Role::Student, Action::DecideEnrollment).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    }

    #[test]
    fn permitted_actions_pass() {
        assert!(require(Role::Teacher, Action::CreateLecture).is_ok());
        assert!(require(Role::Assistant, Action::AnswerQuestion).is_ok());
        assert!(require(Role::Student, Action::AskQuestion).is_ok());
        assert!(require(Role::Outsider, Action::RequestJoin).is_ok());
    }
}
