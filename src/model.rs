use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default `type` for direct messages.
pub const DEFAULT_MESSAGE_TYPE: &str = "message";
/// Default `type` for broadcast messages.
pub const BROADCAST_MESSAGE_TYPE: &str = "broadcast";
/// `type` of the notification emitted when a task is created pre-assigned.
pub const TASK_ASSIGNMENT_TYPE: &str = "task_assignment";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A message in an agent's inbox. Never mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub msg_type: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with a fresh short id and the current time.
    pub fn new(from: &str, to: &str, msg_type: &str, text: &str) -> Self {
        let token = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: token[..8].to_string(),
            from: from.into(),
            to: to.into(),
            msg_type: msg_type.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub assigned_by: Option<String>,
    pub created: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<String>,
}

impl Task {
    pub fn new(
        id: String,
        subject: String,
        description: String,
        assigned_to: Option<String>,
        assigned_by: Option<String>,
    ) -> Self {
        Self {
            id,
            subject,
            description,
            status: TaskStatus::Pending,
            assigned_to: assigned_to.filter(|s| !s.is_empty()),
            assigned_by: assigned_by.filter(|s| !s.is_empty()),
            created: Utc::now(),
            claimed_at: None,
            completed_at: None,
            result: None,
        }
    }
}

/// Structured payload embedded as text in a `task_assignment` message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    #[serde(rename = "type")]
    pub kind: String,
    pub task_id: String,
    pub subject: String,
    pub description: String,
}

impl TaskAssignment {
    pub fn for_task(task: &Task) -> Self {
        Self {
            kind: TASK_ASSIGNMENT_TYPE.into(),
            task_id: task.id.clone(),
            subject: task.subject.clone(),
            description: task.description.clone(),
        }
    }
}

/// Persisted team record (`<root>/<team>/config.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamConfig {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    pub created: DateTime<Utc>,
}

impl TeamConfig {
    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}
