use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use gradus_core::{ActivityKind, ActivityRecord, Chapter, Comment, Milestone, Role, Thesis, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Store {
    fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;

    fn insert_thesis(&self, thesis: &Thesis) -> Result<(), StoreError>;
    fn get_thesis(&self, id: &str) -> Result<Option<Thesis>, StoreError>;
    fn get_thesis_by_student(&self, student_id: &str) -> Result<Option<Thesis>, StoreError>;
    fn list_theses_for_advisor(&self, advisor_id: &str) -> Result<Vec<Thesis>, StoreError>;
    fn list_public_theses(&self) -> Result<Vec<(Thesis, User)>, StoreError>;
    fn set_overall_percentage(
        &self,
        thesis_id: &str,
        percentage: u8,
        updated_at: i64,
    ) -> Result<(), StoreError>;

    fn insert_chapter(&self, chapter: &Chapter) -> Result<(), StoreError>;
    fn get_chapter(&self, id: &str) -> Result<Option<Chapter>, StoreError>;
    fn list_chapters(&self, thesis_id: &str) -> Result<Vec<Chapter>, StoreError>;
    fn first_chapter(&self, thesis_id: &str) -> Result<Option<Chapter>, StoreError>;
    fn update_chapter_meta(&self, id: &str, title: &str, number: u32) -> Result<(), StoreError>;
    fn set_chapter_percentage(&self, id: &str, percentage: u8) -> Result<(), StoreError>;
    fn set_chapter_approval(
        &self,
        id: &str,
        approved: bool,
        approved_at: Option<i64>,
    ) -> Result<(), StoreError>;
    fn delete_chapter(&self, id: &str) -> Result<(), StoreError>;

    fn insert_milestone(&self, milestone: &Milestone) -> Result<(), StoreError>;
    fn get_milestone(&self, id: &str) -> Result<Option<Milestone>, StoreError>;
    fn list_milestones(&self, thesis_id: &str) -> Result<Vec<Milestone>, StoreError>;
    fn update_milestone_meta(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
        due_at: i64,
        chapter_id: Option<&str>,
    ) -> Result<(), StoreError>;
    fn set_milestone_completion(
        &self,
        id: &str,
        completed: bool,
        completed_at: Option<i64>,
    ) -> Result<(), StoreError>;
    fn delete_milestone(&self, id: &str) -> Result<(), StoreError>;

    fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError>;
    fn list_comments_for_chapter(&self, chapter_id: &str) -> Result<Vec<Comment>, StoreError>;

    fn append_activity(&self, record: &ActivityRecord) -> Result<(), StoreError>;
    fn all_activities(&self, thesis_id: &str) -> Result<Vec<ActivityRecord>, StoreError>;
    fn list_activities(
        &self,
        thesis_id: &str,
        kind: Option<ActivityKind>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActivityRecord>, StoreError>;
    fn count_activities(
        &self,
        thesis_id: &str,
        kind: Option<ActivityKind>,
    ) -> Result<u64, StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
    gradus_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(data_root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let gradus_dir = gradus_config::gradus_dir(data_root);
        let sqlite_path = gradus_dir.join(gradus_config::DB_FILE_NAME);

        fs::create_dir_all(&gradus_dir)?;

        let conn = Connection::open(sqlite_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        run_migrations(&conn)?;

        Ok(Self { conn, gradus_dir })
    }

    pub fn gradus_dir(&self) -> &Path {
        &self.gradus_dir
    }
}

impl Store for SqliteStore {
    fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO users (
                id, name, email, role, program, cohort, avatar, hidden_from_ranking, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                user.id,
                user.name,
                user.email,
                user.role.as_str(),
                user.program,
                user.cohort,
                user.avatar,
                user.hidden_from_ranking,
                user.created_at,
            ],
        )?;

        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, email, role, program, cohort, avatar, hidden_from_ranking, created_at
            FROM users
            WHERE id = ?1
            "#,
        )?;

        let user = stmt
            .query_row(params![id], |row| user_from_row(row, 0))
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, email, role, program, cohort, avatar, hidden_from_ranking, created_at
            FROM users
            WHERE LOWER(email) = LOWER(?1)
            "#,
        )?;

        let user = stmt
            .query_row(params![email], |row| user_from_row(row, 0))
            .optional()?;
        Ok(user)
    }

    fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, email, role, program, cohort, avatar, hidden_from_ranking, created_at
            FROM users
            WHERE role = ?1
            ORDER BY name ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![role.as_str()], |row| user_from_row(row, 0))?;
        let users = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn insert_thesis(&self, thesis: &Thesis) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO theses (
                id, student_id, advisor_id, title, overall_percentage, state,
                public_visibility, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                thesis.id,
                thesis.student_id,
                thesis.advisor_id,
                thesis.title,
                thesis.overall_percentage,
                thesis.state.as_str(),
                thesis.public_visibility,
                thesis.created_at,
                thesis.updated_at,
            ],
        )?;

        Ok(())
    }

    fn get_thesis(&self, id: &str) -> Result<Option<Thesis>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {THESIS_COLUMNS} FROM theses WHERE id = ?1"
        ))?;

        let thesis = stmt
            .query_row(params![id], |row| thesis_from_row(row, 0))
            .optional()?;
        Ok(thesis)
    }

    fn get_thesis_by_student(&self, student_id: &str) -> Result<Option<Thesis>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {THESIS_COLUMNS} FROM theses WHERE student_id = ?1"
        ))?;

        let thesis = stmt
            .query_row(params![student_id], |row| thesis_from_row(row, 0))
            .optional()?;
        Ok(thesis)
    }

    fn list_theses_for_advisor(&self, advisor_id: &str) -> Result<Vec<Thesis>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {THESIS_COLUMNS} FROM theses WHERE advisor_id = ?1 ORDER BY created_at ASC, id ASC"
        ))?;

        let rows = stmt.query_map(params![advisor_id], |row| thesis_from_row(row, 0))?;
        let theses = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(theses)
    }

    fn list_public_theses(&self) -> Result<Vec<(Thesis, User)>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.id, t.student_id, t.advisor_id, t.title, t.overall_percentage, t.state,
                   t.public_visibility, t.created_at, t.updated_at,
                   u.id, u.name, u.email, u.role, u.program, u.cohort, u.avatar,
                   u.hidden_from_ranking, u.created_at
            FROM theses t
            JOIN users u ON u.id = t.student_id
            WHERE t.public_visibility = 1 AND u.hidden_from_ranking = 0
            ORDER BY t.overall_percentage DESC, u.name ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((thesis_from_row(row, 0)?, user_from_row(row, 9)?))
        })?;
        let pairs = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(pairs)
    }

    fn set_overall_percentage(
        &self,
        thesis_id: &str,
        percentage: u8,
        updated_at: i64,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE theses SET overall_percentage = ?2, updated_at = ?3 WHERE id = ?1",
            params![thesis_id, percentage, updated_at],
        )?;
        Ok(())
    }

    fn insert_chapter(&self, chapter: &Chapter) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO chapters (
                id, thesis_id, number, title, completion_percentage, approved, approved_at, position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                chapter.id,
                chapter.thesis_id,
                chapter.number,
                chapter.title,
                chapter.completion_percentage,
                chapter.approved,
                chapter.approved_at,
                chapter.position,
            ],
        )?;

        Ok(())
    }

    fn get_chapter(&self, id: &str) -> Result<Option<Chapter>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = ?1"
        ))?;

        let chapter = stmt
            .query_row(params![id], |row| chapter_from_row(row, 0))
            .optional()?;
        Ok(chapter)
    }

    fn list_chapters(&self, thesis_id: &str) -> Result<Vec<Chapter>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE thesis_id = ?1 ORDER BY position ASC, number ASC"
        ))?;

        let rows = stmt.query_map(params![thesis_id], |row| chapter_from_row(row, 0))?;
        let chapters = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(chapters)
    }

    fn first_chapter(&self, thesis_id: &str) -> Result<Option<Chapter>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE thesis_id = ?1 ORDER BY position ASC, number ASC LIMIT 1"
        ))?;

        let chapter = stmt
            .query_row(params![thesis_id], |row| chapter_from_row(row, 0))
            .optional()?;
        Ok(chapter)
    }

    fn update_chapter_meta(&self, id: &str, title: &str, number: u32) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE chapters SET title = ?2, number = ?3 WHERE id = ?1",
            params![id, title, number],
        )?;
        Ok(())
    }

    fn set_chapter_percentage(&self, id: &str, percentage: u8) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE chapters SET completion_percentage = ?2 WHERE id = ?1",
            params![id, percentage],
        )?;
        Ok(())
    }

    fn set_chapter_approval(
        &self,
        id: &str,
        approved: bool,
        approved_at: Option<i64>,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE chapters SET approved = ?2, approved_at = ?3 WHERE id = ?1",
            params![id, approved, approved_at],
        )?;
        Ok(())
    }

    fn delete_chapter(&self, id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM chapters WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn insert_milestone(&self, milestone: &Milestone) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO milestones (
                id, thesis_id, chapter_id, title, description, due_at, completed, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                milestone.id,
                milestone.thesis_id,
                milestone.chapter_id,
                milestone.title,
                milestone.description,
                milestone.due_at,
                milestone.completed,
                milestone.completed_at,
            ],
        )?;

        Ok(())
    }

    fn get_milestone(&self, id: &str) -> Result<Option<Milestone>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MILESTONE_COLUMNS} FROM milestones WHERE id = ?1"
        ))?;

        let milestone = stmt
            .query_row(params![id], |row| milestone_from_row(row, 0))
            .optional()?;
        Ok(milestone)
    }

    fn list_milestones(&self, thesis_id: &str) -> Result<Vec<Milestone>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MILESTONE_COLUMNS} FROM milestones WHERE thesis_id = ?1 ORDER BY due_at ASC, id ASC"
        ))?;

        let rows = stmt.query_map(params![thesis_id], |row| milestone_from_row(row, 0))?;
        let milestones = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(milestones)
    }

    fn update_milestone_meta(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
        due_at: i64,
        chapter_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            UPDATE milestones
            SET title = ?2, description = ?3, due_at = ?4, chapter_id = ?5
            WHERE id = ?1
            "#,
            params![id, title, description, due_at, chapter_id],
        )?;
        Ok(())
    }

    fn set_milestone_completion(
        &self,
        id: &str,
        completed: bool,
        completed_at: Option<i64>,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE milestones SET completed = ?2, completed_at = ?3 WHERE id = ?1",
            params![id, completed, completed_at],
        )?;
        Ok(())
    }

    fn delete_milestone(&self, id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM milestones WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO comments (id, chapter_id, author_id, body, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                comment.id,
                comment.chapter_id,
                comment.author_id,
                comment.body,
                comment.created_at,
            ],
        )?;

        Ok(())
    }

    fn list_comments_for_chapter(&self, chapter_id: &str) -> Result<Vec<Comment>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, chapter_id, author_id, body, created_at
            FROM comments
            WHERE chapter_id = ?1
            ORDER BY created_at DESC, id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![chapter_id], |row| {
            Ok(Comment {
                id: row.get(0)?,
                chapter_id: row.get(1)?,
                author_id: row.get(2)?,
                body: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        let comments = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    fn append_activity(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        let previous = json_to_text(record.previous_value.as_ref())?;
        let new = json_to_text(record.new_value.as_ref())?;

        self.conn.execute(
            r#"
            INSERT INTO activities (
                id, thesis_id, kind, description, previous_value, new_value, recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id,
                record.thesis_id,
                record.kind.as_str(),
                record.description,
                previous,
                new,
                record.recorded_at,
            ],
        )?;

        Ok(())
    }

    fn all_activities(&self, thesis_id: &str) -> Result<Vec<ActivityRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities
             WHERE thesis_id = ?1
             ORDER BY recorded_at DESC, id ASC"
        ))?;

        let rows = stmt.query_map(params![thesis_id], |row| activity_from_row(row, 0))?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn list_activities(
        &self,
        thesis_id: &str,
        kind: Option<ActivityKind>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActivityRecord>, StoreError> {
        let capped_limit = limit.clamp(1, 200) as i64;
        let offset = offset as i64;

        let rows = match kind {
            Some(kind) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {ACTIVITY_COLUMNS} FROM activities
                     WHERE thesis_id = ?1 AND kind = ?2
                     ORDER BY recorded_at DESC, id ASC
                     LIMIT ?3 OFFSET ?4"
                ))?;
                let rows = stmt.query_map(
                    params![thesis_id, kind.as_str(), capped_limit, offset],
                    |row| activity_from_row(row, 0),
                )?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {ACTIVITY_COLUMNS} FROM activities
                     WHERE thesis_id = ?1
                     ORDER BY recorded_at DESC, id ASC
                     LIMIT ?2 OFFSET ?3"
                ))?;
                let rows = stmt.query_map(params![thesis_id, capped_limit, offset], |row| {
                    activity_from_row(row, 0)
                })?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(rows)
    }

    fn count_activities(
        &self,
        thesis_id: &str,
        kind: Option<ActivityKind>,
    ) -> Result<u64, StoreError> {
        let count: i64 = match kind {
            Some(kind) => self.conn.query_row(
                "SELECT COUNT(*) FROM activities WHERE thesis_id = ?1 AND kind = ?2",
                params![thesis_id, kind.as_str()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM activities WHERE thesis_id = ?1",
                params![thesis_id],
                |row| row.get(0),
            )?,
        };

        Ok(count as u64)
    }
}

const THESIS_COLUMNS: &str = "id, student_id, advisor_id, title, overall_percentage, state, \
                              public_visibility, created_at, updated_at";
const CHAPTER_COLUMNS: &str =
    "id, thesis_id, number, title, completion_percentage, approved, approved_at, position";
const MILESTONE_COLUMNS: &str =
    "id, thesis_id, chapter_id, title, description, due_at, completed, completed_at";
const ACTIVITY_COLUMNS: &str =
    "id, thesis_id, kind, description, previous_value, new_value, recorded_at";

fn user_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        email: row.get(base + 2)?,
        role: parse_text_column(base + 3, row.get(base + 3)?)?,
        program: row.get(base + 4)?,
        cohort: row.get(base + 5)?,
        avatar: row.get(base + 6)?,
        hidden_from_ranking: row.get(base + 7)?,
        created_at: row.get(base + 8)?,
    })
}

fn thesis_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<Thesis> {
    Ok(Thesis {
        id: row.get(base)?,
        student_id: row.get(base + 1)?,
        advisor_id: row.get(base + 2)?,
        title: row.get(base + 3)?,
        overall_percentage: row.get(base + 4)?,
        state: parse_text_column(base + 5, row.get(base + 5)?)?,
        public_visibility: row.get(base + 6)?,
        created_at: row.get(base + 7)?,
        updated_at: row.get(base + 8)?,
    })
}

fn chapter_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<Chapter> {
    Ok(Chapter {
        id: row.get(base)?,
        thesis_id: row.get(base + 1)?,
        number: row.get(base + 2)?,
        title: row.get(base + 3)?,
        completion_percentage: row.get(base + 4)?,
        approved: row.get(base + 5)?,
        approved_at: row.get(base + 6)?,
        position: row.get(base + 7)?,
    })
}

fn milestone_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<Milestone> {
    Ok(Milestone {
        id: row.get(base)?,
        thesis_id: row.get(base + 1)?,
        chapter_id: row.get(base + 2)?,
        title: row.get(base + 3)?,
        description: row.get(base + 4)?,
        due_at: row.get(base + 5)?,
        completed: row.get(base + 6)?,
        completed_at: row.get(base + 7)?,
    })
}

fn activity_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<ActivityRecord> {
    Ok(ActivityRecord {
        id: row.get(base)?,
        thesis_id: row.get(base + 1)?,
        kind: parse_text_column(base + 2, row.get(base + 2)?)?,
        description: row.get(base + 3)?,
        previous_value: parse_json_column(base + 4, row.get(base + 4)?)?,
        new_value: parse_json_column(base + 5, row.get(base + 5)?)?,
        recorded_at: row.get(base + 6)?,
    })
}

fn parse_text_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse::<T>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err.into())
    })
}

fn parse_json_column(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<serde_json::Value>> {
    match value {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        }),
    }
}

fn json_to_text(value: Option<&serde_json::Value>) -> Result<Option<String>, StoreError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(StoreError::from)
}

fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL,
            program TEXT NOT NULL,
            cohort TEXT NOT NULL,
            avatar TEXT,
            hidden_from_ranking INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS theses (
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL UNIQUE REFERENCES users(id),
            advisor_id TEXT NOT NULL REFERENCES users(id),
            title TEXT NOT NULL,
            overall_percentage INTEGER NOT NULL DEFAULT 0,
            state TEXT NOT NULL,
            public_visibility INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chapters (
            id TEXT PRIMARY KEY,
            thesis_id TEXT NOT NULL REFERENCES theses(id) ON DELETE CASCADE,
            number INTEGER NOT NULL,
            title TEXT NOT NULL,
            completion_percentage INTEGER NOT NULL DEFAULT 0,
            approved INTEGER NOT NULL DEFAULT 0,
            approved_at INTEGER,
            position INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS milestones (
            id TEXT PRIMARY KEY,
            thesis_id TEXT NOT NULL REFERENCES theses(id) ON DELETE CASCADE,
            chapter_id TEXT REFERENCES chapters(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            description TEXT,
            due_at INTEGER NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            completed_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            chapter_id TEXT NOT NULL REFERENCES chapters(id) ON DELETE CASCADE,
            author_id TEXT NOT NULL REFERENCES users(id),
            body TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS activities (
            id TEXT PRIMARY KEY,
            thesis_id TEXT NOT NULL REFERENCES theses(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            description TEXT NOT NULL,
            previous_value TEXT,
            new_value TEXT,
            recorded_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chapters_thesis_position
            ON chapters(thesis_id, position);
        CREATE INDEX IF NOT EXISTS idx_milestones_thesis_due
            ON milestones(thesis_id, due_at);
        CREATE INDEX IF NOT EXISTS idx_comments_chapter
            ON comments(chapter_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_activities_thesis_time
            ON activities(thesis_id, recorded_at);
        "#,
    )?;

    Ok(())
}
