//! Mutations on the project aggregate.
//!
//! Every operation works on an in-memory `Project`: locate the task by its
//! human id, mutate it in place, append history where required. Persisting
//! the result is the store's job (`BoardDb::update_project`).
//!
//! History rules:
//! - create, archive, unarchive and delete always append one entry
//! - edit and move append one entry only when the status value changes
//! - comments never append

use chrono::{DateTime, Utc};

use super::models::*;
use crate::errors::BoardError;

/// Date format used for task, comment and history dates (`Mon Oct 19 2026`).
pub const DISPLAY_DATE_FORMAT: &str = "%a %b %d %Y";

pub fn display_date(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Task id for the given counter value: key plus the counter zero-padded to
/// three digits (`JIRA-007`, `JIRA-1234`).
pub fn task_id(project_key: &str, counter: u32) -> String {
    format!("{}-{:03}", project_key, counter)
}

impl Project {
    /// Linear scan in creation order; first match wins.
    pub fn find_task(&self, task_id: &str) -> Option<(usize, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .find(|(_, t)| t.id == task_id)
    }

    pub fn task(&self, task_id: &str) -> Result<&Task, BoardError> {
        self.find_task(task_id)
            .map(|(_, t)| t)
            .ok_or_else(|| self.task_not_found(task_id))
    }

    fn task_index(&self, task_id: &str) -> Result<usize, BoardError> {
        self.find_task(task_id)
            .map(|(i, _)| i)
            .ok_or_else(|| self.task_not_found(task_id))
    }

    fn task_not_found(&self, task_id: &str) -> BoardError {
        BoardError::TaskNotFound {
            project_id: self.id,
            task_id: task_id.to_string(),
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Bump the counter, append the task at the tail and record its creation.
    pub fn create_task(&mut self, actor: &Actor, new: NewTask, date: &str) -> &Task {
        self.counter += 1;
        let id = task_id(&self.key, self.counter);

        self.history.push(HistoryEntry {
            date: date.to_string(),
            link: Some(id.clone()),
            action: format!("{} created new task", actor.name),
            description: Some(format!("and assigned to {}", new.assignee)),
        });

        self.tasks.push(Task {
            id,
            name: new.name,
            description: new.description,
            creator: actor.name.clone(),
            assignee: new.assignee,
            status: new.status,
            priority: new.priority,
            issue_type: new.issue_type,
            created: date.to_string(),
            comments: Vec::new(),
        });
        let last = self.tasks.len() - 1;
        &self.tasks[last]
    }

    /// Overwrite the editable fields. Issue type and creator stay as created.
    pub fn edit_task(
        &mut self,
        actor: &Actor,
        task_id: &str,
        edit: TaskEdit,
        date: &str,
    ) -> Result<&Task, BoardError> {
        let index = self.task_index(task_id)?;
        self.apply_status(index, actor, edit.status, date);

        let task = &mut self.tasks[index];
        task.name = edit.name;
        task.description = edit.description;
        task.assignee = edit.assignee;
        if let Some(priority) = edit.priority {
            task.priority = priority;
        }
        Ok(&self.tasks[index])
    }

    /// Status-only change, as issued by dragging a card between columns.
    /// Returns whether the status actually changed.
    pub fn move_task(
        &mut self,
        actor: &Actor,
        task_id: &str,
        status: TaskStatus,
        date: &str,
    ) -> Result<bool, BoardError> {
        let index = self.task_index(task_id)?;
        Ok(self.apply_status(index, actor, status, date))
    }

    /// Sets `Archived` and always records it, even when already archived.
    pub fn archive_task(
        &mut self,
        actor: &Actor,
        task_id: &str,
        date: &str,
    ) -> Result<&Task, BoardError> {
        self.force_status(actor, task_id, TaskStatus::Archived, "archived", date)
    }

    /// Sets `Completed`; the status held before archiving is not restored.
    pub fn unarchive_task(
        &mut self,
        actor: &Actor,
        task_id: &str,
        date: &str,
    ) -> Result<&Task, BoardError> {
        self.force_status(actor, task_id, TaskStatus::Completed, "unarchived", date)
    }

    /// Record the deletion, then splice the task out. Not recoverable.
    pub fn delete_task(
        &mut self,
        actor: &Actor,
        task_id: &str,
        date: &str,
    ) -> Result<Task, BoardError> {
        let index = self.task_index(task_id)?;
        let task = &self.tasks[index];
        // No link: the target no longer exists once this entry is written.
        self.history.push(HistoryEntry {
            date: date.to_string(),
            link: None,
            action: format!("{} deleted {}", actor.name, task.id),
            description: Some(format!("{}: {}", task.name, task.description)),
        });
        Ok(self.tasks.remove(index))
    }

    pub fn add_comment(
        &mut self,
        actor: &Actor,
        task_id: &str,
        comment: NewComment,
        date: &str,
    ) -> Result<&Comment, BoardError> {
        let index = self.task_index(task_id)?;
        let comments = &mut self.tasks[index].comments;
        comments.push(Comment {
            date: date.to_string(),
            author_id: actor.user_id.clone(),
            author_name: actor.name.clone(),
            body: comment.body,
            commit: comment.commit.filter(|c| !c.trim().is_empty()),
        });
        Ok(&comments[comments.len() - 1])
    }

    /// Tasks grouped into board columns; each column keeps creation order.
    pub fn columns(&self) -> Vec<ColumnView> {
        TaskStatus::ALL
            .iter()
            .map(|status| ColumnView {
                status: *status,
                label: status.label().to_string(),
                tasks: self
                    .tasks
                    .iter()
                    .filter(|t| t.status == *status)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    fn apply_status(&mut self, index: usize, actor: &Actor, status: TaskStatus, date: &str) -> bool {
        let task = &mut self.tasks[index];
        if task.status == status {
            return false;
        }
        self.history.push(HistoryEntry {
            date: date.to_string(),
            link: Some(task.id.clone()),
            action: format!("{} moved", actor.name),
            description: Some(format!("from [ {} ] to [ {} ]", task.status, status)),
        });
        task.status = status;
        true
    }

    fn force_status(
        &mut self,
        actor: &Actor,
        task_id: &str,
        status: TaskStatus,
        verb: &str,
        date: &str,
    ) -> Result<&Task, BoardError> {
        let index = self.task_index(task_id)?;
        let task = &mut self.tasks[index];
        task.status = status;
        self.history.push(HistoryEntry {
            date: date.to_string(),
            link: Some(task.id.clone()),
            action: format!("{} {}", actor.name, verb),
            description: None,
        });
        Ok(&self.tasks[index])
    }
}
