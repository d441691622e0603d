//! Core engine implementation

use chrono::{DateTime, Utc};
use lectern_config::Policy;
use lectern_store::{AuditEvent, AuditEventType, Store};
use lectern_types::{
    Action, Answer, Course, Decision, Lecture, LecturePhase, LectureView, MemberState, Question,
    QuestionFilter, QuestionView, Role, Roster, StaffRole,
};
use lectern_util::{CourseCode, LectureId, LecternError, QuestionId, Result, UserId};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{access::require, store_err};

/// The core engine
///
/// Owns the validated policy and a handle to the store. All state transitions
/// go through the store's guarded primitives; the engine translates a
/// non-matching guard into the precondition error the caller raced against,
/// so concurrent callers agree on a single winner.
pub struct CoreEngine {
    policy: Policy,
    store: Arc<dyn Store>,
}

impl CoreEngine {
    pub fn new(policy: Policy, store: Arc<dyn Store>) -> Self {
        Self { policy, store }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn is_healthy(&self) -> bool {
        self.store.is_healthy()
    }

    // Role resolution

    fn course(&self, code: &CourseCode) -> Result<Course> {
        self.store
            .get_course(code)
            .map_err(store_err)?
            .ok_or_else(|| LecternError::CourseNotFound(code.clone()))
    }

    fn lecture(&self, id: &LectureId) -> Result<Lecture> {
        self.store
            .get_lecture(id)
            .map_err(store_err)?
            .ok_or_else(|| LecternError::LectureNotFound(id.clone()))
    }

    /// Resolve a user's role on a course.
    ///
    /// Teachers are listed on the course document; everyone else is resolved
    /// through the membership relation. A pending requester is still an
    /// outsider.
    fn role_on(&self, course: &Course, user: &UserId) -> Result<Role> {
        if course.is_teacher(user) {
            return Ok(Role::Teacher);
        }

        let role = match self
            .store
            .membership(&course.code, user)
            .map_err(store_err)?
        {
            Some(MemberState::Assistant) => Role::Assistant,
            Some(MemberState::Enrolled) => Role::Student,
            Some(MemberState::Pending) | None => Role::Outsider,
        };

        Ok(role)
    }

    /// Append an audit record. Audit failures are logged, never surfaced:
    /// the transition itself has already committed.
    fn audit(&self, event: AuditEventType) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event)) {
            warn!(error = %e, "Failed to append audit event");
        }
    }

    pub fn recent_audits(&self, limit: usize) -> Result<Vec<AuditEvent>> {
        self.store.get_recent_audits(limit).map_err(store_err)
    }

    // Courses

    #[allow(clippy::too_many_arguments)]
    pub fn create_course(
        &self,
        actor: &UserId,
        code: &CourseCode,
        name: &str,
        batch: &str,
        branch: &str,
        valid_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Course> {
        if name.trim().is_empty() {
            return Err(LecternError::InvalidInput("course name is empty".into()));
        }
        if valid_until <= now {
            return Err(LecternError::InvalidTimeRange(
                "validity window ends in the past".into(),
            ));
        }

        let course = Course {
            code: code.clone(),
            name: name.to_string(),
            batch: batch.to_string(),
            branch: branch.to_string(),
            teachers: vec![actor.clone()],
            valid_until,
            created_at: now,
        };

        if !self.store.insert_course(&course).map_err(store_err)? {
            return Err(LecternError::CourseCodeTaken(code.clone()));
        }

        info!(course_code = %code, teacher = %actor, "Course created");
        self.audit(AuditEventType::CourseCreated {
            course_code: code.clone(),
            created_by: actor.clone(),
        });

        Ok(course)
    }

    /// Add an additional teacher. Idempotent: adding an existing teacher is
    /// a no-op, not an error.
    pub fn add_teacher(&self, actor: &UserId, code: &CourseCode, user: &UserId) -> Result<()> {
        let course = self.course(code)?;
        require(self.role_on(&course, actor)?, Action::AddTeacher)?;

        // A teacher-to-be cannot simultaneously hold a student membership.
        if let Some(state) = self.store.membership(code, user).map_err(store_err)?
            && state.is_enrolled()
        {
            return Err(LecternError::InvalidInput(format!(
                "{} is enrolled as a student",
                user
            )));
        }

        if self.store.add_teacher(code, user).map_err(store_err)? {
            info!(course_code = %code, user = %user, added_by = %actor, "Teacher added");
            self.audit(AuditEventType::TeacherAdded {
                course_code: code.clone(),
                user: user.clone(),
                added_by: actor.clone(),
            });
        }

        Ok(())
    }

    pub fn roster(&self, actor: &UserId, code: &CourseCode) -> Result<Roster> {
        let course = self.course(code)?;
        require(self.role_on(&course, actor)?, Action::ViewRoster)?;
        self.store.roster(code).map_err(store_err)
    }

    // Enrollment workflow

    /// Submit an enrollment request.
    ///
    /// Only outsiders may request; the course must still be inside its
    /// validity window. The guarded insert decides ties between a
    /// double-submitted request.
    pub fn request_join(
        &self,
        actor: &UserId,
        code: &CourseCode,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let course = self.course(code)?;

        if course.is_expired(now) {
            return Err(LecternError::CourseExpired(code.clone()));
        }

        match self.store.membership(code, actor).map_err(store_err)? {
            Some(MemberState::Pending) => return Err(LecternError::AlreadyPending(actor.clone())),
            Some(_) => return Err(LecternError::AlreadyEnrolled(actor.clone())),
            None => {}
        }

        require(self.role_on(&course, actor)?, Action::RequestJoin)?;

        if !self.store.insert_pending(code, actor, now).map_err(store_err)? {
            return Err(LecternError::AlreadyPending(actor.clone()));
        }

        debug!(course_code = %code, student = %actor, "Enrollment requested");
        self.audit(AuditEventType::EnrollmentRequested {
            course_code: code.clone(),
            student: actor.clone(),
        });

        Ok(())
    }

    /// Decide a pending request.
    ///
    /// Accept moves the row to enrolled; deny removes it entirely, so the
    /// student may re-request later. When two staff decide the same request
    /// concurrently, exactly one sees success; the other gets
    /// [`LecternError::NoSuchRequest`].
    pub fn decide(
        &self,
        actor: &UserId,
        code: &CourseCode,
        student: &UserId,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let course = self.course(code)?;
        require(self.role_on(&course, actor)?, Action::DecideEnrollment)?;

        let matched = match decision {
            Decision::Accept => self
                .store
                .accept_pending(code, student, now)
                .map_err(store_err)?,
            Decision::Deny => self.store.remove_pending(code, student).map_err(store_err)?,
        };

        if !matched {
            return Err(LecternError::NoSuchRequest(student.clone()));
        }

        info!(course_code = %code, student = %student, ?decision, decided_by = %actor, "Enrollment decided");
        self.audit(AuditEventType::EnrollmentDecided {
            course_code: code.clone(),
            student: student.clone(),
            decision,
            decided_by: actor.clone(),
        });

        Ok(())
    }

    /// Promote an enrolled student to assistant. Idempotent.
    pub fn promote_assistant(
        &self,
        actor: &UserId,
        code: &CourseCode,
        student: &UserId,
    ) -> Result<()> {
        self.set_assistant(actor, code, student, true)
    }

    /// Demote an assistant back to plain enrollment. Idempotent.
    pub fn demote_assistant(
        &self,
        actor: &UserId,
        code: &CourseCode,
        student: &UserId,
    ) -> Result<()> {
        self.set_assistant(actor, code, student, false)
    }

    fn set_assistant(
        &self,
        actor: &UserId,
        code: &CourseCode,
        student: &UserId,
        assistant: bool,
    ) -> Result<()> {
        let course = self.course(code)?;
        require(self.role_on(&course, actor)?, Action::ManageAssistants)?;

        if !self
            .store
            .set_assistant(code, student, assistant)
            .map_err(store_err)?
        {
            return Err(LecternError::NotEnrolled(student.clone()));
        }

        info!(course_code = %code, student = %student, assistant, by = %actor, "Assistant flag set");
        let event = if assistant {
            AuditEventType::AssistantPromoted {
                course_code: code.clone(),
                student: student.clone(),
                by: actor.clone(),
            }
        } else {
            AuditEventType::AssistantDemoted {
                course_code: code.clone(),
                student: student.clone(),
                by: actor.clone(),
            }
        };
        self.audit(event);

        Ok(())
    }

    /// Leave a course. Removes enrollment and any assistant flag in one
    /// step. Teachers cannot leave their own course.
    pub fn leave(&self, actor: &UserId, code: &CourseCode) -> Result<()> {
        let course = self.course(code)?;
        require(self.role_on(&course, actor)?, Action::LeaveCourse)?;

        if !self.store.remove_member(code, actor).map_err(store_err)? {
            return Err(LecternError::NotEnrolled(actor.clone()));
        }

        info!(course_code = %code, student = %actor, "Student left course");
        self.audit(AuditEventType::StudentLeft {
            course_code: code.clone(),
            student: actor.clone(),
        });

        Ok(())
    }

    // Lecture lifecycle

    pub fn create_lecture(
        &self,
        actor: &UserId,
        code: &CourseCode,
        title: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<Lecture> {
        let course = self.course(code)?;
        require(self.role_on(&course, actor)?, Action::CreateLecture)?;

        if title.trim().is_empty() {
            return Err(LecternError::InvalidInput("lecture title is empty".into()));
        }
        if end_at <= start_at {
            return Err(LecternError::InvalidTimeRange(
                "lecture must end after it starts".into(),
            ));
        }

        let id = LectureId::new();
        let lecture = self
            .store
            .insert_lecture(&id, code, title.trim(), start_at, end_at, actor)
            .map_err(store_err)?;

        info!(lecture_id = %lecture.id, course_code = %code, number = lecture.number, "Lecture created");
        self.audit(AuditEventType::LectureCreated {
            lecture_id: lecture.id.clone(),
            course_code: code.clone(),
            number: lecture.number,
            created_by: actor.clone(),
        });

        Ok(lecture)
    }

    /// End a live lecture early. One-way; only valid while the lecture is
    /// live. The store guard re-checks liveness at write time, so a
    /// concurrent natural end or duplicate click cannot double-fire.
    pub fn end_early(&self, actor: &UserId, id: &LectureId, now: DateTime<Utc>) -> Result<()> {
        let lecture = self.lecture(id)?;
        let course = self.course(&lecture.course_code)?;
        require(self.role_on(&course, actor)?, Action::EndLecture)?;

        if !self.store.mark_teacher_ended(id, now).map_err(store_err)? {
            return Err(LecternError::NotLive);
        }

        info!(lecture_id = %id, ended_by = %actor, "Lecture ended early");
        self.audit(AuditEventType::LectureEndedEarly {
            lecture_id: id.clone(),
            ended_by: actor.clone(),
        });

        Ok(())
    }

    /// Join a lecture. Allowed inside the join window (live, or within the
    /// configured grace margins); a lecture the teacher ended early is never
    /// joinable. Re-joining is a no-op.
    pub fn join_lecture(&self, actor: &UserId, id: &LectureId, now: DateTime<Utc>) -> Result<()> {
        let lecture = self.lecture(id)?;
        let course = self.course(&lecture.course_code)?;
        require(self.role_on(&course, actor)?, Action::JoinLecture)?;

        if !lecture.in_join_window(now, self.policy.join_grace_before, self.policy.join_grace_after)
        {
            return Err(LecternError::LectureNotOpen);
        }

        if self.store.record_join(id, actor, now).map_err(store_err)? {
            debug!(lecture_id = %id, student = %actor, "Student joined lecture");
            self.audit(AuditEventType::LectureJoined {
                lecture_id: id.clone(),
                student: actor.clone(),
            });
        }

        Ok(())
    }

    /// All lectures of a course, with derived phase and joinability.
    pub fn list_lectures(
        &self,
        actor: &UserId,
        code: &CourseCode,
        now: DateTime<Utc>,
    ) -> Result<Vec<LectureView>> {
        let course = self.course(code)?;
        require(self.role_on(&course, actor)?, Action::ViewLectures)?;

        self.store
            .lectures_for_course(code)
            .map_err(store_err)?
            .iter()
            .map(|lecture| self.view_of(lecture, now))
            .collect()
    }

    /// Lectures the student can join right now, across all enrolled courses.
    pub fn list_joinable(&self, actor: &UserId, now: DateTime<Utc>) -> Result<Vec<LectureView>> {
        let views = self
            .store
            .lectures_for_student(actor)
            .map_err(store_err)?
            .iter()
            .filter(|lecture| {
                lecture.in_join_window(
                    now,
                    self.policy.join_grace_before,
                    self.policy.join_grace_after,
                )
            })
            .map(|lecture| self.view_of(lecture, now))
            .collect::<Result<Vec<_>>>()?;

        Ok(views)
    }

    fn view_of(&self, lecture: &Lecture, now: DateTime<Utc>) -> Result<LectureView> {
        let joined = self.store.joined_count(&lecture.id).map_err(store_err)?;
        Ok(LectureView::derive(
            lecture,
            now,
            self.policy.join_grace_before,
            self.policy.join_grace_after,
            joined,
        ))
    }

    // Doubt threads

    /// Ask a question in a lecture's doubt thread.
    ///
    /// Submission is live-only by default; a configured ask grace extends it
    /// past a natural end. A lecture the teacher ended early closes its
    /// thread immediately, grace or not.
    pub fn ask(
        &self,
        actor: &UserId,
        id: &LectureId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Question> {
        let lecture = self.lecture(id)?;
        let course = self.course(&lecture.course_code)?;
        require(self.role_on(&course, actor)?, Action::AskQuestion)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(LecternError::InvalidInput("question text is empty".into()));
        }
        if text.chars().count() > self.policy.max_question_chars {
            return Err(LecternError::InvalidInput(format!(
                "question exceeds {} characters",
                self.policy.max_question_chars
            )));
        }

        let open = match lecture.phase(now) {
            LecturePhase::Live => true,
            LecturePhase::EndedNaturally => {
                now - lecture.end_at
                    <= chrono::Duration::from_std(self.policy.ask_grace_after)
                        .unwrap_or(chrono::Duration::MAX)
            }
            LecturePhase::Scheduled | LecturePhase::EndedByTeacher => false,
        };
        if !open {
            return Err(LecternError::NotLive);
        }

        let question = Question {
            id: QuestionId::new(),
            lecture_id: id.clone(),
            author_id: actor.clone(),
            text: text.to_string(),
            created_at: now,
            answers: Vec::new(),
        };
        self.store.insert_question(&question).map_err(store_err)?;

        debug!(question_id = %question.id, lecture_id = %id, author = %actor, "Question asked");
        self.audit(AuditEventType::QuestionAsked {
            question_id: question.id.clone(),
            lecture_id: id.clone(),
            author: actor.clone(),
        });

        Ok(question)
    }

    /// Append a staff answer to a question. Answers are not phase-gated:
    /// staff may answer after the lecture has ended.
    pub fn answer(
        &self,
        actor: &UserId,
        id: &QuestionId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let question = self
            .store
            .get_question(id)
            .map_err(store_err)?
            .ok_or_else(|| LecternError::QuestionNotFound(id.clone()))?;
        let lecture = self.lecture(&question.lecture_id)?;
        let course = self.course(&lecture.course_code)?;

        let role = self.role_on(&course, actor)?;
        require(role, Action::AnswerQuestion)?;
        let staff_role = StaffRole::try_from(role)
            .map_err(|r| LecternError::not_authorized(format!("{:?} may not answer", r)))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(LecternError::InvalidInput("answer text is empty".into()));
        }

        let answer = Answer {
            author_id: actor.clone(),
            role: staff_role,
            text: text.to_string(),
            created_at: now,
        };
        if !self.store.append_answer(id, &answer).map_err(store_err)? {
            return Err(LecternError::QuestionNotFound(id.clone()));
        }

        debug!(question_id = %id, author = %actor, "Answer posted");
        self.audit(AuditEventType::AnswerPosted {
            question_id: id.clone(),
            author: actor.clone(),
            role: staff_role,
        });

        Ok(())
    }

    /// Questions of a lecture, in ask order, optionally filtered by status.
    pub fn list_questions(
        &self,
        actor: &UserId,
        id: &LectureId,
        filter: QuestionFilter,
    ) -> Result<Vec<QuestionView>> {
        let lecture = self.lecture(id)?;
        let course = self.course(&lecture.course_code)?;
        require(self.role_on(&course, actor)?, Action::ViewQuestions)?;

        let views = self
            .store
            .questions_for_lecture(id)
            .map_err(store_err)?
            .into_iter()
            .filter(|q| filter.matches(q))
            .map(QuestionView::from)
            .collect();

        Ok(views)
    }
}
