//! SQLite-based store implementation
//!
//! Every workflow transition is one guarded SQL statement; the affected-row
//! count is the success signal. The membership relation keeps a single row
//! per (course, student), which makes the pending/enrolled mutual exclusion
//! and assistants-are-enrolled invariants structural.

use chrono::{DateTime, Utc};
use lectern_types::{Answer, Course, Lecture, MemberState, Question, Roster, StaffRole};
use lectern_util::{CourseCode, LectureId, QuestionId, UserId};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{AuditEvent, Store, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS courses (
                code TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                batch TEXT NOT NULL,
                branch TEXT NOT NULL,
                valid_until TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS course_teachers (
                course_code TEXT NOT NULL,
                user_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (course_code, user_id)
            );

            -- One row per (course, student): a student is never both
            -- pending and enrolled, and assistants are enrolled by
            -- construction.
            CREATE TABLE IF NOT EXISTS memberships (
                course_code TEXT NOT NULL,
                student_id TEXT NOT NULL,
                state TEXT NOT NULL
                    CHECK (state IN ('pending', 'enrolled', 'assistant')),
                requested_at TEXT NOT NULL,
                enrolled_at TEXT,
                PRIMARY KEY (course_code, student_id)
            );

            CREATE TABLE IF NOT EXISTS lectures (
                id TEXT PRIMARY KEY,
                course_code TEXT NOT NULL,
                number INTEGER NOT NULL,
                title TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                created_by TEXT NOT NULL,
                teacher_ended_at TEXT,
                UNIQUE (course_code, number)
            );

            CREATE TABLE IF NOT EXISTS lecture_joins (
                lecture_id TEXT NOT NULL,
                student_id TEXT NOT NULL,
                joined_at TEXT NOT NULL,
                PRIMARY KEY (lecture_id, student_id)
            );

            CREATE TABLE IF NOT EXISTS questions (
                id TEXT PRIMARY KEY,
                lecture_id TEXT NOT NULL,
                author_id TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Append-only
            CREATE TABLE IF NOT EXISTS answers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question_id TEXT NOT NULL,
                author_id TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('teacher', 'assistant')),
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_memberships_student ON memberships(student_id);
            CREATE INDEX IF NOT EXISTS idx_lectures_course ON lectures(course_code);
            CREATE INDEX IF NOT EXISTS idx_questions_lecture ON questions(lecture_id);
            CREATE INDEX IF NOT EXISTS idx_answers_question ON answers(question_id);
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn parse_ts(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{}': {}", s, e)))
}

fn parse_opt_ts(s: Option<String>) -> StoreResult<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_ts).transpose()
}

fn parse_uuid(s: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::Corrupt(format!("bad uuid '{}': {}", s, e)))
}

fn role_to_str(role: StaffRole) -> &'static str {
    match role {
        StaffRole::Teacher => "teacher",
        StaffRole::Assistant => "assistant",
    }
}

fn role_from_str(s: &str) -> StoreResult<StaffRole> {
    match s {
        "teacher" => Ok(StaffRole::Teacher),
        "assistant" => Ok(StaffRole::Assistant),
        other => Err(StoreError::Corrupt(format!("bad staff role '{}'", other))),
    }
}

fn state_from_str(s: &str) -> StoreResult<MemberState> {
    match s {
        "pending" => Ok(MemberState::Pending),
        "enrolled" => Ok(MemberState::Enrolled),
        "assistant" => Ok(MemberState::Assistant),
        other => Err(StoreError::Corrupt(format!("bad member state '{}'", other))),
    }
}

fn lecture_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLecture> {
    Ok(RawLecture {
        id: row.get(0)?,
        course_code: row.get(1)?,
        number: row.get(2)?,
        title: row.get(3)?,
        start_at: row.get(4)?,
        end_at: row.get(5)?,
        created_by: row.get(6)?,
        teacher_ended_at: row.get(7)?,
    })
}

struct RawLecture {
    id: String,
    course_code: String,
    number: u32,
    title: String,
    start_at: String,
    end_at: String,
    created_by: String,
    teacher_ended_at: Option<String>,
}

impl RawLecture {
    fn into_lecture(self) -> StoreResult<Lecture> {
        Ok(Lecture {
            id: LectureId::from_uuid(parse_uuid(&self.id)?),
            course_code: CourseCode::new(self.course_code),
            number: self.number,
            title: self.title,
            start_at: parse_ts(&self.start_at)?,
            end_at: parse_ts(&self.end_at)?,
            created_by: UserId::new(self.created_by),
            teacher_ended_at: parse_opt_ts(self.teacher_ended_at)?,
        })
    }
}

const LECTURE_COLUMNS: &str =
    "id, course_code, number, title, start_at, end_at, created_by, teacher_ended_at";

impl SqliteStore {
    fn answers_for(conn: &Connection, id: &QuestionId) -> StoreResult<Vec<Answer>> {
        let mut stmt = conn.prepare(
            "SELECT author_id, role, text, created_at FROM answers
             WHERE question_id = ? ORDER BY id",
        )?;

        let rows = stmt.query_map([id.to_string()], |row| {
            let author: String = row.get(0)?;
            let role: String = row.get(1)?;
            let text: String = row.get(2)?;
            let created_at: String = row.get(3)?;
            Ok((author, role, text, created_at))
        })?;

        let mut answers = Vec::new();
        for row in rows {
            let (author, role, text, created_at) = row?;
            answers.push(Answer {
                author_id: UserId::new(author),
                role: role_from_str(&role)?,
                text,
                created_at: parse_ts(&created_at)?,
            });
        }

        Ok(answers)
    }
}

impl Store for SqliteStore {
    fn insert_course(&self, course: &Course) -> StoreResult<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO courses (code, name, batch, branch, valid_until, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                course.code.as_str(),
                course.name,
                course.batch,
                course.branch,
                course.valid_until.to_rfc3339(),
                course.created_at.to_rfc3339(),
            ],
        )?;

        if inserted == 0 {
            return Ok(false);
        }

        for (position, teacher) in course.teachers.iter().enumerate() {
            tx.execute(
                "INSERT INTO course_teachers (course_code, user_id, position) VALUES (?, ?, ?)",
                params![course.code.as_str(), teacher.as_str(), position as i64],
            )?;
        }

        tx.commit()?;
        debug!(course_code = %course.code, "Course inserted");
        Ok(true)
    }

    fn get_course(&self, code: &CourseCode) -> StoreResult<Option<Course>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String, String, String, String)> = conn
            .query_row(
                "SELECT name, batch, branch, valid_until, created_at FROM courses WHERE code = ?",
                [code.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, batch, branch, valid_until, created_at)) = row else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT user_id FROM course_teachers WHERE course_code = ? ORDER BY position",
        )?;
        let teachers = stmt
            .query_map([code.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(UserId::new)
            .collect();

        Ok(Some(Course {
            code: code.clone(),
            name,
            batch,
            branch,
            teachers,
            valid_until: parse_ts(&valid_until)?,
            created_at: parse_ts(&created_at)?,
        }))
    }

    fn add_teacher(&self, code: &CourseCode, user: &UserId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "INSERT OR IGNORE INTO course_teachers (course_code, user_id, position)
             SELECT ?1, ?2, COALESCE(MAX(position), -1) + 1
             FROM course_teachers WHERE course_code = ?1",
            params![code.as_str(), user.as_str()],
        )?;

        Ok(changed > 0)
    }

    fn roster(&self, code: &CourseCode) -> StoreResult<Roster> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT user_id FROM course_teachers WHERE course_code = ? ORDER BY position",
        )?;
        let teachers = stmt
            .query_map([code.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(UserId::new)
            .collect();

        let mut roster = Roster {
            teachers,
            ..Default::default()
        };

        let mut stmt =
            conn.prepare("SELECT student_id, state FROM memberships WHERE course_code = ?")?;
        let rows = stmt.query_map([code.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (student, state) = row?;
            let student = UserId::new(student);
            match state_from_str(&state)? {
                MemberState::Pending => {
                    roster.pending.insert(student);
                }
                MemberState::Enrolled => {
                    roster.enrolled.insert(student);
                }
                MemberState::Assistant => {
                    // Assistants are enrolled too.
                    roster.enrolled.insert(student.clone());
                    roster.assistants.insert(student);
                }
            }
        }

        Ok(roster)
    }

    fn membership(
        &self,
        code: &CourseCode,
        student: &UserId,
    ) -> StoreResult<Option<MemberState>> {
        let conn = self.conn.lock().unwrap();

        let state: Option<String> = conn
            .query_row(
                "SELECT state FROM memberships WHERE course_code = ? AND student_id = ?",
                params![code.as_str(), student.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        state.as_deref().map(state_from_str).transpose()
    }

    fn insert_pending(
        &self,
        code: &CourseCode,
        student: &UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "INSERT OR IGNORE INTO memberships (course_code, student_id, state, requested_at)
             VALUES (?, ?, 'pending', ?)",
            params![code.as_str(), student.as_str(), at.to_rfc3339()],
        )?;

        Ok(changed > 0)
    }

    fn accept_pending(
        &self,
        code: &CourseCode,
        student: &UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        // The state guard re-checks pending membership at decision time;
        // a concurrent decide on the same request matches zero rows.
        let changed = conn.execute(
            "UPDATE memberships SET state = 'enrolled', enrolled_at = ?
             WHERE course_code = ? AND student_id = ? AND state = 'pending'",
            params![at.to_rfc3339(), code.as_str(), student.as_str()],
        )?;

        Ok(changed > 0)
    }

    fn remove_pending(&self, code: &CourseCode, student: &UserId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "DELETE FROM memberships
             WHERE course_code = ? AND student_id = ? AND state = 'pending'",
            params![code.as_str(), student.as_str()],
        )?;

        Ok(changed > 0)
    }

    fn set_assistant(
        &self,
        code: &CourseCode,
        student: &UserId,
        assistant: bool,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let target = if assistant { "assistant" } else { "enrolled" };
        let changed = conn.execute(
            "UPDATE memberships SET state = ?
             WHERE course_code = ? AND student_id = ?
               AND state IN ('enrolled', 'assistant')",
            params![target, code.as_str(), student.as_str()],
        )?;

        Ok(changed > 0)
    }

    fn remove_member(&self, code: &CourseCode, student: &UserId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "DELETE FROM memberships
             WHERE course_code = ? AND student_id = ?
               AND state IN ('enrolled', 'assistant')",
            params![code.as_str(), student.as_str()],
        )?;

        Ok(changed > 0)
    }

    fn insert_lecture(
        &self,
        id: &LectureId,
        code: &CourseCode,
        title: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        created_by: &UserId,
    ) -> StoreResult<Lecture> {
        let conn = self.conn.lock().unwrap();

        // Number assignment and insert are one statement, so two racing
        // creators cannot claim the same number (the UNIQUE constraint
        // backstops the window between MAX and INSERT).
        conn.execute(
            "INSERT INTO lectures
                 (id, course_code, number, title, start_at, end_at, created_by)
             SELECT ?1, ?2, COALESCE(MAX(number), 0) + 1, ?3, ?4, ?5, ?6
             FROM lectures WHERE course_code = ?2",
            params![
                id.to_string(),
                code.as_str(),
                title,
                start_at.to_rfc3339(),
                end_at.to_rfc3339(),
                created_by.as_str(),
            ],
        )?;

        let raw = conn.query_row(
            &format!("SELECT {} FROM lectures WHERE id = ?", LECTURE_COLUMNS),
            [id.to_string()],
            lecture_from_row,
        )?;

        let lecture = raw.into_lecture()?;
        debug!(lecture_id = %lecture.id, course_code = %code, number = lecture.number, "Lecture inserted");
        Ok(lecture)
    }

    fn get_lecture(&self, id: &LectureId) -> StoreResult<Option<Lecture>> {
        let conn = self.conn.lock().unwrap();

        let raw = conn
            .query_row(
                &format!("SELECT {} FROM lectures WHERE id = ?", LECTURE_COLUMNS),
                [id.to_string()],
                lecture_from_row,
            )
            .optional()?;

        raw.map(RawLecture::into_lecture).transpose()
    }

    fn lectures_for_course(&self, code: &CourseCode) -> StoreResult<Vec<Lecture>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM lectures WHERE course_code = ? ORDER BY number",
            LECTURE_COLUMNS
        ))?;

        let rows = stmt.query_map([code.as_str()], lecture_from_row)?;

        let mut lectures = Vec::new();
        for row in rows {
            lectures.push(row?.into_lecture()?);
        }
        Ok(lectures)
    }

    fn lectures_for_student(&self, student: &UserId) -> StoreResult<Vec<Lecture>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM lectures
             WHERE course_code IN (
                 SELECT course_code FROM memberships
                 WHERE student_id = ? AND state IN ('enrolled', 'assistant')
             )
             ORDER BY start_at",
            LECTURE_COLUMNS
        ))?;

        let rows = stmt.query_map([student.as_str()], lecture_from_row)?;

        let mut lectures = Vec::new();
        for row in rows {
            lectures.push(row?.into_lecture()?);
        }
        Ok(lectures)
    }

    fn mark_teacher_ended(&self, id: &LectureId, at: DateTime<Utc>) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        // Guarded on the lecture being live right now; the flag is one-way.
        let at_str = at.to_rfc3339();
        let changed = conn.execute(
            "UPDATE lectures SET teacher_ended_at = ?1
             WHERE id = ?2 AND teacher_ended_at IS NULL
               AND start_at <= ?1 AND ?1 <= end_at",
            params![at_str, id.to_string()],
        )?;

        Ok(changed > 0)
    }

    fn record_join(
        &self,
        id: &LectureId,
        student: &UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "INSERT OR IGNORE INTO lecture_joins (lecture_id, student_id, joined_at)
             VALUES (?, ?, ?)",
            params![id.to_string(), student.as_str(), at.to_rfc3339()],
        )?;

        Ok(changed > 0)
    }

    fn joined_count(&self, id: &LectureId) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM lecture_joins WHERE lecture_id = ?",
            [id.to_string()],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    fn insert_question(&self, question: &Question) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO questions (id, lecture_id, author_id, text, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                question.id.to_string(),
                question.lecture_id.to_string(),
                question.author_id.as_str(),
                question.text,
                question.created_at.to_rfc3339(),
            ],
        )?;

        debug!(question_id = %question.id, lecture_id = %question.lecture_id, "Question inserted");
        Ok(())
    }

    fn get_question(&self, id: &QuestionId) -> StoreResult<Option<Question>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT lecture_id, author_id, text, created_at FROM questions WHERE id = ?",
                [id.to_string()],
                |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                },
            )
            .optional()?;

        let Some((lecture_id, author_id, text, created_at)) = row else {
            return Ok(None);
        };

        let answers = Self::answers_for(&conn, id)?;

        Ok(Some(Question {
            id: id.clone(),
            lecture_id: LectureId::from_uuid(parse_uuid(&lecture_id)?),
            author_id: UserId::new(author_id),
            text,
            created_at: parse_ts(&created_at)?,
            answers,
        }))
    }

    fn append_answer(&self, id: &QuestionId, answer: &Answer) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        // Existence guard folded into the append itself.
        let changed = conn.execute(
            "INSERT INTO answers (question_id, author_id, role, text, created_at)
             SELECT id, ?2, ?3, ?4, ?5 FROM questions WHERE id = ?1",
            params![
                id.to_string(),
                answer.author_id.as_str(),
                role_to_str(answer.role),
                answer.text,
                answer.created_at.to_rfc3339(),
            ],
        )?;

        Ok(changed > 0)
    }

    fn questions_for_lecture(&self, id: &LectureId) -> StoreResult<Vec<Question>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, author_id, text, created_at FROM questions
             WHERE lecture_id = ? ORDER BY rowid",
        )?;

        let rows = stmt.query_map([id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let raw: Vec<_> = rows.collect::<Result<_, _>>()?;

        let mut questions = Vec::new();
        for (qid, author_id, text, created_at) in raw {
            let question_id = QuestionId::from_uuid(parse_uuid(&qid)?);
            let answers = Self::answers_for(&conn, &question_id)?;
            questions.push(Question {
                id: question_id,
                lecture_id: id.clone(),
                author_id: UserId::new(author_id),
                text,
                created_at: parse_ts(&created_at)?,
                answers,
            });
        }

        Ok(questions)
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = parse_ts(&timestamp_str)?;
            let event: crate::AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditEventType;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn make_course(code: &str) -> Course {
        Course {
            code: CourseCode::new(code),
            name: "Operating Systems".into(),
            batch: "2026".into(),
            branch: "CSE".into(),
            teachers: vec![UserId::new("t1")],
            valid_until: Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
            created_at: ts(8, 0),
        }
    }

    fn store_with_course(code: &str) -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.insert_course(&make_course(code)).unwrap());
        store
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lectern.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_course(&make_course("CS101")).unwrap();
        }

        // Reopen and read back.
        let store = SqliteStore::open(&path).unwrap();
        let course = store.get_course(&CourseCode::new("CS101")).unwrap().unwrap();
        assert_eq!(course.name, "Operating Systems");
    }

    #[test]
    fn test_duplicate_course_code() {
        let store = store_with_course("CS101");
        assert!(!store.insert_course(&make_course("CS101")).unwrap());
    }

    #[test]
    fn test_course_roundtrip_preserves_teacher_order() {
        let store = SqliteStore::in_memory().unwrap();
        let mut course = make_course("CS101");
        course.teachers = vec![UserId::new("t1"), UserId::new("t2"), UserId::new("t3")];
        store.insert_course(&course).unwrap();

        let loaded = store.get_course(&course.code).unwrap().unwrap();
        assert_eq!(loaded, course);
        assert_eq!(loaded.primary_teacher(), Some(&UserId::new("t1")));
    }

    #[test]
    fn test_add_teacher_idempotent() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");

        assert!(store.add_teacher(&code, &UserId::new("t2")).unwrap());
        assert!(!store.add_teacher(&code, &UserId::new("t2")).unwrap());

        let course = store.get_course(&code).unwrap().unwrap();
        assert_eq!(course.teachers, vec![UserId::new("t1"), UserId::new("t2")]);
    }

    #[test]
    fn test_membership_lifecycle() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let student = UserId::new("s1");

        assert!(store.membership(&code, &student).unwrap().is_none());

        // Request
        assert!(store.insert_pending(&code, &student, ts(9, 0)).unwrap());
        assert_eq!(
            store.membership(&code, &student).unwrap(),
            Some(MemberState::Pending)
        );

        // A second request hits the existing row.
        assert!(!store.insert_pending(&code, &student, ts(9, 5)).unwrap());

        // Accept
        assert!(store.accept_pending(&code, &student, ts(9, 10)).unwrap());
        assert_eq!(
            store.membership(&code, &student).unwrap(),
            Some(MemberState::Enrolled)
        );

        // Accepting again finds nothing pending.
        assert!(!store.accept_pending(&code, &student, ts(9, 11)).unwrap());
    }

    #[test]
    fn test_deny_removes_request_and_allows_resubmission() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let student = UserId::new("s1");

        store.insert_pending(&code, &student, ts(9, 0)).unwrap();
        assert!(store.remove_pending(&code, &student).unwrap());
        assert!(store.membership(&code, &student).unwrap().is_none());

        // Resubmission allowed after deny.
        assert!(store.insert_pending(&code, &student, ts(9, 30)).unwrap());
    }

    #[test]
    fn test_assistant_promotion_is_idempotent() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let student = UserId::new("s1");

        store.insert_pending(&code, &student, ts(9, 0)).unwrap();
        store.accept_pending(&code, &student, ts(9, 10)).unwrap();

        assert!(store.set_assistant(&code, &student, true).unwrap());
        assert!(store.set_assistant(&code, &student, true).unwrap());
        assert_eq!(
            store.membership(&code, &student).unwrap(),
            Some(MemberState::Assistant)
        );

        assert!(store.set_assistant(&code, &student, false).unwrap());
        assert_eq!(
            store.membership(&code, &student).unwrap(),
            Some(MemberState::Enrolled)
        );
    }

    #[test]
    fn test_set_assistant_requires_enrollment() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let student = UserId::new("s1");

        // Not a member at all.
        assert!(!store.set_assistant(&code, &student, true).unwrap());

        // Pending is not enrolled.
        store.insert_pending(&code, &student, ts(9, 0)).unwrap();
        assert!(!store.set_assistant(&code, &student, true).unwrap());
    }

    #[test]
    fn test_leave_removes_enrollment_and_assistant_flag() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let student = UserId::new("s1");

        store.insert_pending(&code, &student, ts(9, 0)).unwrap();
        store.accept_pending(&code, &student, ts(9, 10)).unwrap();
        store.set_assistant(&code, &student, true).unwrap();

        assert!(store.remove_member(&code, &student).unwrap());
        assert!(store.membership(&code, &student).unwrap().is_none());

        // Leaving twice is not a transition.
        assert!(!store.remove_member(&code, &student).unwrap());
    }

    #[test]
    fn test_roster_assembly() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");

        store.insert_pending(&code, &UserId::new("s1"), ts(9, 0)).unwrap();
        store.insert_pending(&code, &UserId::new("s2"), ts(9, 0)).unwrap();
        store.accept_pending(&code, &UserId::new("s2"), ts(9, 10)).unwrap();
        store.insert_pending(&code, &UserId::new("s3"), ts(9, 0)).unwrap();
        store.accept_pending(&code, &UserId::new("s3"), ts(9, 10)).unwrap();
        store.set_assistant(&code, &UserId::new("s3"), true).unwrap();

        let roster = store.roster(&code).unwrap();
        assert_eq!(roster.teachers, vec![UserId::new("t1")]);
        assert!(roster.pending.contains(&UserId::new("s1")));
        assert!(roster.enrolled.contains(&UserId::new("s2")));
        assert!(roster.enrolled.contains(&UserId::new("s3")));
        assert!(roster.assistants.contains(&UserId::new("s3")));
        assert!(!roster.enrolled.contains(&UserId::new("s1")));
    }

    #[test]
    fn test_lecture_numbering_is_sequential_per_course() {
        let store = store_with_course("CS101");
        store.insert_course(&make_course("CS102")).unwrap();
        let code = CourseCode::new("CS101");
        let other = CourseCode::new("CS102");
        let teacher = UserId::new("t1");

        let l1 = store
            .insert_lecture(&LectureId::new(), &code, "One", ts(10, 0), ts(11, 0), &teacher)
            .unwrap();
        let l2 = store
            .insert_lecture(&LectureId::new(), &code, "Two", ts(12, 0), ts(13, 0), &teacher)
            .unwrap();
        let other_l1 = store
            .insert_lecture(&LectureId::new(), &other, "Other", ts(10, 0), ts(11, 0), &teacher)
            .unwrap();

        assert_eq!(l1.number, 1);
        assert_eq!(l2.number, 2);
        assert_eq!(other_l1.number, 1);

        let listed = store.lectures_for_course(&code).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].number, 1);
        assert_eq!(listed[1].number, 2);
    }

    #[test]
    fn test_mark_teacher_ended_requires_live_window() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let teacher = UserId::new("t1");

        let lecture = store
            .insert_lecture(&LectureId::new(), &code, "One", ts(10, 0), ts(11, 0), &teacher)
            .unwrap();

        // Before start: guard does not match.
        assert!(!store.mark_teacher_ended(&lecture.id, ts(9, 0)).unwrap());
        // After end: guard does not match.
        assert!(!store.mark_teacher_ended(&lecture.id, ts(12, 0)).unwrap());

        // Mid-window succeeds exactly once.
        assert!(store.mark_teacher_ended(&lecture.id, ts(10, 15)).unwrap());
        assert!(!store.mark_teacher_ended(&lecture.id, ts(10, 20)).unwrap());

        let stored = store.get_lecture(&lecture.id).unwrap().unwrap();
        assert_eq!(stored.teacher_ended_at, Some(ts(10, 15)));
    }

    #[test]
    fn test_join_records_are_idempotent() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let teacher = UserId::new("t1");

        let lecture = store
            .insert_lecture(&LectureId::new(), &code, "One", ts(10, 0), ts(11, 0), &teacher)
            .unwrap();

        assert!(store.record_join(&lecture.id, &UserId::new("s1"), ts(10, 5)).unwrap());
        assert!(!store.record_join(&lecture.id, &UserId::new("s1"), ts(10, 6)).unwrap());
        assert!(store.record_join(&lecture.id, &UserId::new("s2"), ts(10, 7)).unwrap());

        assert_eq!(store.joined_count(&lecture.id).unwrap(), 2);
    }

    #[test]
    fn test_lectures_for_student_follow_enrollment() {
        let store = store_with_course("CS101");
        store.insert_course(&make_course("CS102")).unwrap();
        let cs101 = CourseCode::new("CS101");
        let cs102 = CourseCode::new("CS102");
        let teacher = UserId::new("t1");
        let student = UserId::new("s1");

        store
            .insert_lecture(&LectureId::new(), &cs101, "A", ts(10, 0), ts(11, 0), &teacher)
            .unwrap();
        store
            .insert_lecture(&LectureId::new(), &cs102, "B", ts(12, 0), ts(13, 0), &teacher)
            .unwrap();

        store.insert_pending(&cs101, &student, ts(9, 0)).unwrap();
        store.accept_pending(&cs101, &student, ts(9, 10)).unwrap();

        // Pending elsewhere does not count.
        store.insert_pending(&cs102, &student, ts(9, 0)).unwrap();

        let lectures = store.lectures_for_student(&student).unwrap();
        assert_eq!(lectures.len(), 1);
        assert_eq!(lectures[0].course_code, cs101);
    }

    #[test]
    fn test_question_and_answer_roundtrip() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let teacher = UserId::new("t1");

        let lecture = store
            .insert_lecture(&LectureId::new(), &code, "One", ts(10, 0), ts(11, 0), &teacher)
            .unwrap();

        let question = Question {
            id: QuestionId::new(),
            lecture_id: lecture.id.clone(),
            author_id: UserId::new("s1"),
            text: "What is a page fault?".into(),
            created_at: ts(10, 20),
            answers: vec![],
        };
        store.insert_question(&question).unwrap();

        let loaded = store.get_question(&question.id).unwrap().unwrap();
        assert_eq!(loaded, question);

        // Append two answers; order is preserved.
        let first = Answer {
            author_id: teacher.clone(),
            role: StaffRole::Teacher,
            text: "A trap on unmapped access.".into(),
            created_at: ts(10, 25),
        };
        let second = Answer {
            author_id: UserId::new("ta1"),
            role: StaffRole::Assistant,
            text: "See lecture 3 notes.".into(),
            created_at: ts(10, 30),
        };
        assert!(store.append_answer(&question.id, &first).unwrap());
        assert!(store.append_answer(&question.id, &second).unwrap());

        let loaded = store.get_question(&question.id).unwrap().unwrap();
        assert_eq!(loaded.answers, vec![first, second]);
    }

    #[test]
    fn test_append_answer_to_missing_question() {
        let store = SqliteStore::in_memory().unwrap();

        let answer = Answer {
            author_id: UserId::new("t1"),
            role: StaffRole::Teacher,
            text: "lost".into(),
            created_at: ts(10, 0),
        };
        assert!(!store.append_answer(&QuestionId::new(), &answer).unwrap());
    }

    #[test]
    fn test_questions_for_lecture_in_ask_order() {
        let store = store_with_course("CS101");
        let code = CourseCode::new("CS101");
        let teacher = UserId::new("t1");

        let lecture = store
            .insert_lecture(&LectureId::new(), &code, "One", ts(10, 0), ts(11, 0), &teacher)
            .unwrap();

        for i in 0..3 {
            store
                .insert_question(&Question {
                    id: QuestionId::new(),
                    lecture_id: lecture.id.clone(),
                    author_id: UserId::new("s1"),
                    text: format!("question {}", i),
                    created_at: ts(10, 20 + i),
                    answers: vec![],
                })
                .unwrap();
        }

        let questions = store.questions_for_lecture(&lecture.id).unwrap();
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].text, "question 0");
        assert_eq!(questions[2].text, "question 2");
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();

        let event = AuditEvent::new(AuditEventType::EnrollmentRequested {
            course_code: CourseCode::new("CS101"),
            student: UserId::new("s1"),
        });
        store.append_audit(event).unwrap();

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].event,
            AuditEventType::EnrollmentRequested { .. }
        ));
    }
}
