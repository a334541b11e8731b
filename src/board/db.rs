use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use super::models::*;
use crate::errors::BoardError;

/// Async-safe handle to the board database.
///
/// Wraps `BoardDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O never
/// ties up async worker threads. Holding the mutex for the whole closure is
/// what serialises read-modify-write cycles on a project document.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BoardDb>>,
}

impl DbHandle {
    pub fn new(db: BoardDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&BoardDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|_| BoardError::LockPoisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| BoardError::Database(anyhow::Error::new(e).context("DB task panicked")))?
    }
}

/// The embedded part of a project: everything except the indexed columns.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectDocument {
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    counter: u32,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
    #[serde(default)]
    repository: Option<RepoRef>,
}

struct ProjectRow {
    id: i64,
    key: String,
    name: String,
    document: String,
    version: i64,
    created_at: String,
}

impl ProjectRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: row.get(1)?,
            name: row.get(2)?,
            document: row.get(3)?,
            version: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_project(self) -> Result<Project> {
        let doc: ProjectDocument = serde_json::from_str(&self.document)
            .with_context(|| format!("Corrupt document for project {}", self.id))?;
        Ok(Project {
            id: self.id,
            key: self.key,
            name: self.name,
            members: doc.members,
            counter: doc.counter,
            tasks: doc.tasks,
            history: doc.history,
            repository: doc.repository,
            version: self.version,
            created_at: self.created_at,
        })
    }
}

fn document_json(project: &Project) -> Result<String> {
    let doc = ProjectDocument {
        members: project.members.clone(),
        counter: project.counter,
        tasks: project.tasks.clone(),
        history: project.history.clone(),
        repository: project.repository.clone(),
    };
    serde_json::to_string(&doc).context("Failed to serialize project document")
}

/// Upper-case and validate a project key: 2-10 ASCII letters or digits.
pub fn normalize_project_key(key: &str) -> Result<String, BoardError> {
    let key = key.trim().to_ascii_uppercase();
    let valid = (2..=10).contains(&key.len()) && key.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(key)
    } else {
        Err(BoardError::InvalidProjectKey(key))
    }
}

const PROJECT_COLUMNS: &str = "id, project_key, name, document, version, created_at";

pub struct BoardDb {
    conn: Connection,
}

impl BoardDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS projects (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    project_key TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    document TEXT NOT NULL DEFAULT '{}',
                    version INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                );
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    // ── Project CRUD ──────────────────────────────────────────────────

    pub fn create_project(
        &self,
        key: &str,
        name: &str,
        members: Vec<Member>,
        repository: Option<RepoRef>,
    ) -> Result<Project> {
        let key = normalize_project_key(key)?;
        if name.trim().is_empty() {
            return Err(BoardError::BadRequest("Project name must not be empty".into()).into());
        }
        if self.find_project_by_key(&key)?.is_some() {
            return Err(BoardError::DuplicateProjectKey { key }.into());
        }

        let doc = ProjectDocument {
            members,
            repository,
            ..Default::default()
        };
        let doc = serde_json::to_string(&doc).context("Failed to serialize project document")?;
        self.conn
            .execute(
                "INSERT INTO projects (project_key, name, document) VALUES (?1, ?2, ?3)",
                params![key, name.trim(), doc],
            )
            .context("Failed to insert project")?;
        let id = self.conn.last_insert_rowid();
        self.get_project(id)?
            .context("Project not found after insert")
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM projects ORDER BY id", PROJECT_COLUMNS))
            .context("Failed to prepare list_projects")?;
        let rows = stmt
            .query_map([], ProjectRow::from_row)
            .context("Failed to query projects")?;
        let mut projects = Vec::new();
        for row in rows {
            let r = row.context("Failed to read project row")?;
            projects.push(r.into_project()?);
        }
        Ok(projects)
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
                params![id],
                ProjectRow::from_row,
            )
            .optional()
            .context("Failed to query project")?;
        row.map(ProjectRow::into_project).transpose()
    }

    /// Like `get_project`, but absence is a `BoardError::ProjectNotFound`.
    pub fn require_project(&self, id: i64) -> Result<Project> {
        self.get_project(id)?
            .ok_or_else(|| BoardError::ProjectNotFound { id }.into())
    }

    pub fn find_project_by_key(&self, key: &str) -> Result<Option<Project>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM projects WHERE project_key = ?1", PROJECT_COLUMNS),
                params![key.to_ascii_uppercase()],
                ProjectRow::from_row,
            )
            .optional()
            .context("Failed to query project by key")?;
        row.map(ProjectRow::into_project).transpose()
    }

    /// Write the whole document back if nobody else wrote since it was read.
    ///
    /// On success `project.version` is bumped to the stored value. A stale
    /// version yields `BoardError::VersionConflict` and writes nothing.
    pub fn save_project(&self, project: &mut Project) -> Result<()> {
        let doc = document_json(project)?;
        let updated = self
            .conn
            .execute(
                "UPDATE projects SET name = ?1, document = ?2, version = version + 1
                 WHERE id = ?3 AND version = ?4",
                params![project.name, doc, project.id, project.version],
            )
            .context("Failed to update project")?;

        if updated == 0 {
            let found: Option<i64> = self
                .conn
                .query_row(
                    "SELECT version FROM projects WHERE id = ?1",
                    params![project.id],
                    |row| row.get(0),
                )
                .optional()
                .context("Failed to read project version")?;
            return Err(match found {
                Some(found) => BoardError::VersionConflict {
                    id: project.id,
                    expected: project.version,
                    found,
                },
                None => BoardError::ProjectNotFound { id: project.id },
            }
            .into());
        }

        project.version += 1;
        Ok(())
    }

    /// Load, mutate and persist a project in one transaction.
    ///
    /// If `f` fails nothing is written and the error is returned unchanged.
    pub fn update_project<T, F>(&self, id: i64, f: F) -> Result<T>
    where
        F: FnOnce(&mut Project) -> Result<T, BoardError>,
    {
        // unchecked_transaction: DbHandle's Mutex already guarantees
        // single-threaded access to the connection.
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        let mut project = self.require_project(id)?;
        let out = f(&mut project)?;
        self.save_project(&mut project)?;
        tx.commit().context("Failed to commit project update")?;
        Ok(out)
    }

    pub fn set_repository(&self, id: i64, repository: Option<RepoRef>) -> Result<Project> {
        self.update_project(id, move |project| {
            project.repository = repository;
            Ok(project.clone())
        })
    }

    pub fn add_member(&self, id: i64, member: Member) -> Result<Project> {
        self.update_project(id, move |project| {
            if !project.is_member(&member.user_id) {
                project.members.push(member);
            }
            Ok(project.clone())
        })
    }
}
