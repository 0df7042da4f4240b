//! Workflow-engine user tasks

use crate::entity::Entity;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Workflow-engine task identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Wrap a raw id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A pending user task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identity
    pub id: TaskId,
    /// Node display name
    pub name: String,
    /// Owning process instance
    pub process_instance_id: String,
    /// Process definition
    pub process_definition_id: String,
    /// Node key inside the process definition
    pub task_definition_key: String,
    /// Claiming user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<NaiveDateTime>,
    /// Due time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    /// Engine priority
    #[serde(default)]
    pub priority: i32,
    /// Whether the owning process is suspended
    #[serde(default)]
    pub suspended: bool,
}

impl Task {
    /// Whether someone has claimed the task
    #[inline]
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.assignee.is_some()
    }
}

impl Entity for Task {
    type Id = TaskId;

    const KIND: &'static str = "task";

    fn id(&self) -> &TaskId {
        &self.id
    }
}

/// Completion payload for one task: the node's measurement data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletion {
    /// Task being completed
    pub task_id: TaskId,
    /// Field name → entered value
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl TaskCompletion {
    /// Create completion without data
    #[inline]
    #[must_use]
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            data: serde_json::Map::new(),
        }
    }

    /// With one field value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, field: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(field.into(), value);
        self
    }
}
