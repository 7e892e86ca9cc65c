use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::TaskboardError;

/// Unique identifier for a task (e.g., TASK1, TASK2, TASK100)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    const PREFIX: &'static str = "TASK";

    /// Creates a new TaskId from a counter
    pub fn new(counter: u32) -> Self {
        Self(format!("{}{}", Self::PREFIX, counter))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of the ID
    pub fn number(&self) -> u32 {
        self.0
            .strip_prefix(Self::PREFIX)
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0)
    }
}

impl FromStr for TaskId {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_uppercase();
        let prefix = TaskId::PREFIX;

        match normalized.strip_prefix(prefix) {
            Some(digits) if !digits.is_empty() && digits.parse::<u32>().is_ok() => {
                Ok(Self(normalized))
            }
            _ => Err(TaskboardError::InvalidTaskId(s.to_string())),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Column a task belongs to on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// All statuses in board order
    pub const ALL: [TaskStatus; 5] = [
        Self::Backlog,
        Self::Todo,
        Self::InProgress,
        Self::Review,
        Self::Done,
    ];

    /// Position of the column in board order
    pub fn rank(&self) -> u8 {
        match self {
            Self::Backlog => 0,
            Self::Todo => 1,
            Self::InProgress => 2,
            Self::Review => 3,
            Self::Done => 4,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backlog => write!(f, "Backlog"),
            Self::Todo => write!(f, "Todo"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Review => write!(f, "Review"),
            Self::Done => write!(f, "Done"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(format!(
                "Invalid status '{}'. Valid statuses: backlog, todo, in_progress, review, done",
                s
            )),
        }
    }
}

/// Board bookkeeping stored alongside a task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Sort key within the task's column
    #[serde(default)]
    pub order: f64,
}

impl Default for TaskMetadata {
    fn default() -> Self {
        Self { order: 0.0 }
    }
}

/// A kanban task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub metadata: TaskMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in `status` at the given order
    pub fn new(id: TaskId, title: String, status: TaskStatus, order: f64) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            description: None,
            status,
            metadata: TaskMetadata { order },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn order(&self) -> f64 {
        self.metadata.order
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    pub fn set_description(&mut self, description: String) {
        self.description = Some(description);
        self.updated_at = Utc::now();
    }

    /// Places the task at `order` within `status`
    pub fn move_to(&mut self, status: TaskStatus, order: f64) {
        self.status = status;
        self.metadata.order = order;
        self.updated_at = Utc::now();
    }
}
