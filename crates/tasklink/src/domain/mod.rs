//! Domain types for task tracking.
//!
//! This module contains the core records of the tasklink tracker: tasks,
//! their enumerated priority and status, and the input structs used to create
//! and update them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a task title in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Unique identifier for a task
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new task ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A task in the tracking system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned by the store and never changed
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Task description
    #[serde(default)]
    pub description: String,

    /// Optional due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Priority level
    #[serde(default)]
    pub priority: Priority,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Tasks this task depends on.
    ///
    /// Semantically a set; insertion order is kept so that traversals are
    /// reproducible.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Store revision used for optimistic concurrency
    #[serde(default)]
    pub revision: u64,
}

impl Task {
    /// Returns `true` if this task lists `id` among its dependencies.
    pub fn depends_on(&self, id: &TaskId) -> bool {
        self.dependencies.contains(id)
    }

    /// Validate the user-editable fields of a stored task.
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait
    Low,

    /// Normal priority
    #[default]
    Medium,

    /// Needs attention first
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,

    /// Currently being worked on
    InProgress,

    /// Done
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Data for creating a new task.
///
/// Dependencies are not part of the record fields; they are passed to
/// [`crate::graph::DependencyGraph::create_task`] separately so that they are
/// validated before being attached.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Task title
    pub title: String,

    /// Task description
    pub description: String,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Priority level
    pub priority: Priority,
}

impl NewTask {
    /// Create task fields with just a title and defaults elsewhere.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Validate the fields before a record is created.
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Data for updating an existing task.
///
/// `None` leaves a field unchanged. `dependencies: Some(..)` replaces the
/// whole dependency set after validation.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New due date (`Some(None)` clears it)
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New priority
    pub priority: Option<Priority>,

    /// New status
    pub status: Option<TaskStatus>,

    /// Replacement dependency set
    pub dependencies: Option<Vec<TaskId>>,
}

impl TaskUpdate {
    /// Returns `true` if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.dependencies.is_none()
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {} characters (got {})",
            MAX_TITLE_LENGTH, len
        ));
    }
    Ok(())
}

/// Remove repeated identifiers while keeping first-occurrence order.
pub fn dedup_ids(ids: &[TaskId]) -> Vec<TaskId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}
