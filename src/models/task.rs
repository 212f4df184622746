use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::FullName;

/// A task as stored in the database.
///
/// The owner reference and creation timestamp are internal bookkeeping and are
/// not serialized; the owner-facing wire shape is
/// `{_id, title, description, isCompleted, isPublic}`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    /// Unique identifier (UUID v4), exposed on the wire as `_id`.
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    /// The creating user. Set once at creation, never reassigned.
    #[serde(skip_serializing)]
    pub owner: Uuid,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task. Unknown fields are rejected, so a request body
/// cannot smuggle in an owner or completion state.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Must be between 1 and 1000 characters.
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[serde(rename = "isPublic", default)]
    pub is_public: bool,
}

/// Input for updating a task's editable fields. Visibility is changed through
/// the dedicated toggle operation, not here.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
}

/// Reduced view of a task for the public-browsing path: no id, no owner, no
/// visibility flag.
#[derive(Debug, Serialize)]
pub struct PublicTask {
    pub title: String,
    pub description: String,
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
}

impl From<Task> for PublicTask {
    fn from(task: Task) -> Self {
        Self {
            title: task.title,
            description: task.description,
            is_completed: task.is_completed,
        }
    }
}

/// A user who has at least one public task, as listed by the public-browsing
/// index. Name and email are exposed here; the users listed have opted into
/// public sharing.
#[derive(Debug, Serialize, FromRow)]
pub struct PublicOwner {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[sqlx(flatten)]
    pub fullname: FullName,
    pub email: String,
}

impl Task {
    /// Creates a new `Task` from `TaskInput` and the creating user's id.
    /// Tasks start uncompleted; visibility comes from the input.
    pub fn new(input: TaskInput, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            is_completed: false,
            is_public: input.is_public,
            owner,
            created_at: Utc::now(),
        }
    }
}
