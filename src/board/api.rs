use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::aggregate::display_date;
use super::db::DbHandle;
use super::github::{CommitLookup, CommitSource};
use super::models::*;
use crate::errors::BoardError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub commits: Arc<dyn CommitSource>,
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────
//
// Form field names are the ones the board's HTML forms post.

#[derive(Deserialize)]
pub struct CreateTaskForm {
    pub taskname: String,
    #[serde(default)]
    pub taskdescription: String,
    #[serde(default)]
    pub assignedto: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub issuetype: Option<String>,
}

#[derive(Deserialize)]
pub struct EditTaskForm {
    pub taskname: String,
    #[serde(default)]
    pub taskdescription: String,
    pub status: String,
    #[serde(default)]
    pub assignedto: String,
    pub priority: Option<String>,
}

#[derive(Deserialize)]
pub struct MoveTaskForm {
    pub taskid: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct CommentForm {
    pub comment: String,
    pub githubcommit: Option<String>,
}

#[derive(Deserialize)]
pub struct GithubProjectForm {
    pub repo_owner: String,
    pub repo_name: String,
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        let msg = err.to_string();
        if err.is_not_found() {
            ApiError::NotFound(msg)
        } else if err.is_invalid_input() {
            ApiError::BadRequest(msg)
        } else {
            match err {
                BoardError::VersionConflict { .. } | BoardError::DuplicateProjectKey { .. } => {
                    ApiError::Conflict(msg)
                }
                _ => {
                    tracing::error!(error = %msg, "Request failed");
                    ApiError::Internal(msg)
                }
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<BoardError>() {
            Ok(board_err) => board_err.into(),
            Err(other) => {
                let msg = format!("{:#}", other);
                tracing::error!(error = %msg, "Request failed");
                ApiError::Internal(msg)
            }
        }
    }
}

// ── Acting user ───────────────────────────────────────────────────────

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The acting user is asserted by the auth proxy in front of the board.
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_str(parts, USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", USER_ID_HEADER)))?;
        let name = header_str(parts, USER_NAME_HEADER).unwrap_or(user_id);
        Ok(Actor {
            user_id: user_id.to_string(),
            name: name.to_string(),
        })
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/p/{project_id}/", get(get_board))
        .route(
            "/p/{project_id}/createtask/",
            get(create_task_form).post(create_task),
        )
        .route("/p/{project_id}/createtask", post(create_task))
        .route("/p/{project_id}/movetask/", post(move_task))
        .route("/p/{project_id}/t/{task_id}/", get(get_task))
        .route(
            "/p/{project_id}/t/{task_id}/edit/",
            get(edit_task_form).post(edit_task),
        )
        .route("/p/{project_id}/t/{task_id}/archive/", post(archive_task))
        .route("/p/{project_id}/t/{task_id}/unarchive/", post(unarchive_task))
        .route("/p/{project_id}/t/{task_id}/delete/", post(delete_task))
        .route("/p/{project_id}/t/{task_id}/comment/", post(add_comment))
        .route("/github_project", post(github_project))
        .route("/health", get(health_check))
}

// ── Helpers ───────────────────────────────────────────────────────────

fn board_url(project_id: i64) -> String {
    format!("/p/{}/", project_id)
}

fn task_url(project_id: i64, task_id: &str) -> String {
    format!("/p/{}/t/{}/", project_id, task_id)
}

fn today() -> String {
    display_date(Utc::now())
}

/// Blank and missing fields both read as `None`.
fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, BoardError>
where
    T: FromStr<Err = BoardError>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::parse)
        .transpose()
}

fn parse_or_default<T>(value: Option<&str>) -> Result<T, BoardError>
where
    T: FromStr<Err = BoardError> + Default,
{
    Ok(parse_optional(value)?.unwrap_or_default())
}

fn require_task_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Task name must not be empty".into()));
    }
    Ok(())
}

async fn load_project(state: &SharedState, project_id: i64) -> Result<Project, ApiError> {
    let project = state
        .db
        .call(move |db| db.require_project(project_id))
        .await?;
    Ok(project)
}

/// Run one aggregate mutation as a single load-mutate-save transaction.
async fn mutate_project<T, F>(state: &SharedState, project_id: i64, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Project) -> Result<T, BoardError> + Send + 'static,
    T: Send + 'static,
{
    let out = state
        .db
        .call(move |db| db.update_project(project_id, f))
        .await?;
    Ok(out)
}

async fn project_commits(state: &SharedState, project: &Project) -> CommitLookup {
    let lookup = match &project.repository {
        Some(repo) => state.commits.recent_commits(repo).await,
        None => CommitLookup::unavailable("No GitHub repository linked to this project"),
    };
    tracing::debug!(
        project_id = project.id,
        available = lookup.is_available(),
        commits = lookup.commits().len(),
        "Commit lookup"
    );
    lookup
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_board(
    State(state): State<SharedState>,
    Path(project_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let project = load_project(&state, project_id).await?;
    let commits = project_commits(&state, &project).await;
    Ok(Json(BoardView {
        project: ProjectSummary::from(&project),
        columns: project.columns(),
        history: project.history,
        commits,
    }))
}

async fn create_task_form(
    State(state): State<SharedState>,
    Path(project_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let project = load_project(&state, project_id).await?;
    Ok(Json(TaskForm::new(&project, None)))
}

async fn create_task(
    State(state): State<SharedState>,
    Path(project_id): Path<i64>,
    actor: Actor,
    Form(form): Form<CreateTaskForm>,
) -> Result<impl IntoResponse, ApiError> {
    require_task_name(&form.taskname)?;
    let new = NewTask {
        name: form.taskname,
        description: form.taskdescription,
        assignee: form.assignedto,
        status: parse_or_default(form.status.as_deref())?,
        priority: parse_or_default(form.priority.as_deref())?,
        issue_type: parse_or_default(form.issuetype.as_deref())?,
    };
    let date = today();
    let actor_id = actor.user_id.clone();
    let task_id = mutate_project(&state, project_id, move |project| {
        Ok(project.create_task(&actor, new, &date).id.clone())
    })
    .await?;
    info!(project_id, task_id = %task_id, actor = %actor_id, "Task created");
    Ok(Redirect::to(&board_url(project_id)))
}

async fn get_task(
    State(state): State<SharedState>,
    Path((project_id, task_id)): Path<(i64, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let project = load_project(&state, project_id).await?;
    let task = project.task(&task_id)?.clone();
    let commits = project_commits(&state, &project).await;
    Ok(Json(TaskDetail {
        project: ProjectSummary::from(&project),
        completed: task.status == TaskStatus::Completed,
        archived: task.status == TaskStatus::Archived,
        task,
        members: project.members,
        commits,
    }))
}

async fn edit_task_form(
    State(state): State<SharedState>,
    Path((project_id, task_id)): Path<(i64, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let project = load_project(&state, project_id).await?;
    let task = project.task(&task_id)?.clone();
    Ok(Json(TaskForm::new(&project, Some(task))))
}

async fn edit_task(
    State(state): State<SharedState>,
    Path((project_id, task_id)): Path<(i64, String)>,
    actor: Actor,
    Form(form): Form<EditTaskForm>,
) -> Result<impl IntoResponse, ApiError> {
    require_task_name(&form.taskname)?;
    let edit = TaskEdit {
        name: form.taskname,
        description: form.taskdescription,
        status: form.status.parse()?,
        assignee: form.assignedto,
        priority: parse_optional(form.priority.as_deref())?,
    };
    let date = today();
    let actor_id = actor.user_id.clone();
    let id = task_id.clone();
    mutate_project(&state, project_id, move |project| {
        project.edit_task(&actor, &id, edit, &date).map(|_| ())
    })
    .await?;
    info!(project_id, task_id = %task_id, actor = %actor_id, "Task edited");
    Ok(Redirect::to(&board_url(project_id)))
}

async fn move_task(
    State(state): State<SharedState>,
    Path(project_id): Path<i64>,
    actor: Actor,
    Form(form): Form<MoveTaskForm>,
) -> Result<impl IntoResponse, ApiError> {
    let status: TaskStatus = form.status.parse()?;
    let date = today();
    let actor_id = actor.user_id.clone();
    let id = form.taskid.clone();
    let changed = mutate_project(&state, project_id, move |project| {
        project.move_task(&actor, &id, status, &date)
    })
    .await?;
    info!(project_id, task_id = %form.taskid, actor = %actor_id, status = %status, changed, "Task moved");
    Ok(Redirect::to(&board_url(project_id)))
}

async fn archive_task(
    State(state): State<SharedState>,
    Path((project_id, task_id)): Path<(i64, String)>,
    actor: Actor,
) -> Result<impl IntoResponse, ApiError> {
    let date = today();
    let actor_id = actor.user_id.clone();
    let id = task_id.clone();
    mutate_project(&state, project_id, move |project| {
        project.archive_task(&actor, &id, &date).map(|_| ())
    })
    .await?;
    info!(project_id, task_id = %task_id, actor = %actor_id, "Task archived");
    Ok(Redirect::to(&board_url(project_id)))
}

async fn unarchive_task(
    State(state): State<SharedState>,
    Path((project_id, task_id)): Path<(i64, String)>,
    actor: Actor,
) -> Result<impl IntoResponse, ApiError> {
    let date = today();
    let actor_id = actor.user_id.clone();
    let id = task_id.clone();
    mutate_project(&state, project_id, move |project| {
        project.unarchive_task(&actor, &id, &date).map(|_| ())
    })
    .await?;
    info!(project_id, task_id = %task_id, actor = %actor_id, "Task unarchived");
    Ok(Redirect::to(&board_url(project_id)))
}

async fn delete_task(
    State(state): State<SharedState>,
    Path((project_id, task_id)): Path<(i64, String)>,
    actor: Actor,
) -> Result<impl IntoResponse, ApiError> {
    let date = today();
    let actor_id = actor.user_id.clone();
    let id = task_id.clone();
    mutate_project(&state, project_id, move |project| {
        project.delete_task(&actor, &id, &date).map(|_| ())
    })
    .await?;
    info!(project_id, task_id = %task_id, actor = %actor_id, "Task deleted");
    Ok(Redirect::to(&board_url(project_id)))
}

async fn add_comment(
    State(state): State<SharedState>,
    Path((project_id, task_id)): Path<(i64, String)>,
    actor: Actor,
    Form(form): Form<CommentForm>,
) -> Result<impl IntoResponse, ApiError> {
    if form.comment.trim().is_empty() {
        return Err(ApiError::BadRequest("Comment must not be empty".into()));
    }
    let comment = NewComment {
        body: form.comment,
        commit: form.githubcommit,
    };
    let date = today();
    let actor_id = actor.user_id.clone();
    let id = task_id.clone();
    mutate_project(&state, project_id, move |project| {
        project.add_comment(&actor, &id, comment, &date).map(|_| ())
    })
    .await?;
    info!(project_id, task_id = %task_id, actor = %actor_id, "Comment added");
    Ok(Redirect::to(&task_url(project_id, &task_id)))
}

async fn github_project(
    State(state): State<SharedState>,
    Form(form): Form<GithubProjectForm>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = form.repo_owner.trim();
    let repo = form.repo_name.trim();
    if owner.is_empty() || repo.is_empty() {
        return Err(ApiError::BadRequest(
            "repo_owner and repo_name are required".into(),
        ));
    }
    let repo = RepoRef::new(owner, repo).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid GitHub repository '{}/{}'", owner, repo))
    })?;
    Ok(Json(state.commits.recent_commits(&repo).await))
}
