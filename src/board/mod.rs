//! Task board: projects, their tasks and the activity history around them.
//!
//! ## Overview
//!
//! A project owns an ordered list of tasks, an append-only history and a
//! monotonically increasing task counter. Every mutation is one
//! load → mutate → save cycle on the whole project document, run under the
//! `DbHandle` mutex inside a SQLite transaction and guarded by a version
//! column.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, ServerConfig)          │
//! │          │ <─────── │    └─ api.rs  (route handlers, AppState, Actor)  │
//! └──────────┘  JSON /  │         │                     │                  │
//!               303     │         │ update_project()    │ recent_commits() │
//!                       │         v                     v                  │
//!                       │  db.rs (BoardDb)        github.rs (CommitSource) │
//!                       │         │                                        │
//!                       │         │ Project::create_task() ...             │
//!                       │         v                                        │
//!                       │  aggregate.rs  (history rules, id generation)    │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module      | Responsibility                                           |
//! |-------------|----------------------------------------------------------|
//! | `models`    | `Project`, `Task`, `TaskStatus`, view models             |
//! | `aggregate` | Task operations on an in-memory `Project`                |
//! | `db`        | SQLite store; versioned project documents                |
//! | `github`    | Commit lookups that degrade to `CommitLookup::Unavailable` |
//!
//! ## Typical Request Flow (move task)
//!
//! 1. `POST /p/{project_id}/movetask/` → `api::move_task()`
//! 2. `Actor` is read from `x-user-id` / `x-user-name`; the status label is
//!    parsed into `TaskStatus` (unknown → 400).
//! 3. `BoardDb::update_project()` loads the project, `Project::move_task()`
//!    records `"{actor} moved"` if the status changed, and the document is
//!    written back with `version + 1`.
//! 4. The handler answers `303 See Other` to the board.

pub mod aggregate;
pub mod api;
pub mod db;
pub mod github;
pub mod models;
pub mod server;
