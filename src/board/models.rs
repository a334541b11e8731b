use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::github::CommitLookup;
use crate::errors::BoardError;

/// Status column of a task. Board order is declaration order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Archived,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Open,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Human label, as shown on the board and written into history entries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Archived => "Archived",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = BoardError;

    /// Accepts both the wire form (`in_progress`) and the board label
    /// (`In Progress`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(BoardError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(BoardError::InvalidPriority(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    #[default]
    Task,
    Bug,
    Feature,
    Improvement,
}

impl IssueType {
    pub const ALL: [IssueType; 4] = [
        IssueType::Task,
        IssueType::Bug,
        IssueType::Feature,
        IssueType::Improvement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Improvement => "improvement",
        }
    }
}

impl FromStr for IssueType {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "bug" => Ok(Self::Bug),
            "feature" => Ok(Self::Feature),
            "improvement" => Ok(Self::Improvement),
            _ => Err(BoardError::InvalidIssueType(s.to_string())),
        }
    }
}

/// The user performing a request, as asserted by the fronting auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub name: String,
}

impl FromStr for Member {
    type Err = BoardError;

    /// Parses `id:Display Name`; a bare id doubles as the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, name) = match s.split_once(':') {
            Some((id, name)) => (id.trim(), name.trim()),
            None => (s.trim(), s.trim()),
        };
        if id.is_empty() || name.is_empty() {
            return Err(BoardError::BadRequest(format!(
                "Invalid member '{}': expected id:Name",
                s
            )));
        }
        Ok(Self {
            user_id: id.to_string(),
            name: name.to_string(),
        })
    }
}

/// GitHub repository a project's commit activity comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Builds a reference only from names GitHub itself allows, so both
    /// parts stay single path segments in API URLs.
    pub fn new(owner: &str, repo: &str) -> Option<Self> {
        let candidate = Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        };
        candidate.is_valid().then_some(candidate)
    }

    pub fn is_valid(&self) -> bool {
        is_repo_name(&self.owner) && is_repo_name(&self.repo)
    }
}

/// ASCII letters, digits, `-`, `_` and `.`; never `.` or `..`.
fn is_repo_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub members: Vec<Member>,
    /// Number of tasks ever created; never decreases.
    pub counter: u32,
    pub tasks: Vec<Task>,
    pub history: Vec<HistoryEntry>,
    pub repository: Option<RepoRef>,
    /// Optimistic concurrency token, bumped on every successful write.
    pub version: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub creator: String,
    pub assignee: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub issue_type: IssueType,
    pub created: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub date: String,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub date: String,
    pub link: Option<String>,
    pub action: String,
    pub description: Option<String>,
}

// Request-side inputs, already validated

#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub assignee: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub issue_type: IssueType,
}

#[derive(Debug, Clone)]
pub struct TaskEdit {
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee: String,
    /// `None` keeps the task's current priority.
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    pub commit: Option<String>,
}

// API view types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub repository: Option<RepoRef>,
    pub task_count: usize,
}

impl From<&Project> for ProjectSummary {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            key: p.key.clone(),
            name: p.name.clone(),
            repository: p.repository.clone(),
            task_count: p.tasks.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardView {
    pub project: ProjectSummary,
    pub columns: Vec<ColumnView>,
    pub history: Vec<HistoryEntry>,
    pub commits: CommitLookup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnView {
    pub status: TaskStatus,
    pub label: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetail {
    pub project: ProjectSummary,
    pub task: Task,
    pub members: Vec<Member>,
    pub completed: bool,
    pub archived: bool,
    pub commits: CommitLookup,
}

/// Choices offered by the create and edit forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskForm {
    pub members: Vec<Member>,
    pub statuses: Vec<TaskStatus>,
    pub priorities: Vec<Priority>,
    pub issue_types: Vec<IssueType>,
    pub current: Option<Task>,
}

impl TaskForm {
    pub fn new(project: &Project, current: Option<Task>) -> Self {
        Self {
            members: project.members.clone(),
            statuses: TaskStatus::ALL.to_vec(),
            priorities: Priority::ALL.to_vec(),
            issue_types: IssueType::ALL.to_vec(),
            current,
        }
    }
}
