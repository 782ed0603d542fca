use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::user::{non_empty, validate_not_blank, UserSummary};

/// Represents a task card as stored in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// `true` once the task is completed. Always `false` on creation.
    pub status: bool,
    /// The owner. Fixed at creation and the only user allowed to mutate the task.
    pub user_id: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task joined with its owner's summary, as returned by `GET /tasks`.
#[derive(Debug, Clone)]
pub struct TaskWithOwner {
    pub task: Task,
    pub owner: UserSummary,
}

/// Fields needed to insert a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub user_id: i64,
    pub category_id: i64,
}

/// Payload of `POST /tasks`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Required, at most 200 characters. Stored trimmed.
    #[validate(
        length(max = 200),
        custom(function = "validate_not_blank", message = "Title is required")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,

    pub category_id: i64,
}

/// Payload of `PUT /tasks/{taskId}`. Blank fields leave the stored value unchanged.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct TaskDetailsUpdate {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

impl TaskDetailsUpdate {
    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn description(&self) -> Option<&str> {
        // Descriptions keep their inner whitespace; only an all-blank value is skipped.
        non_empty(&self.description).map(|_| self.description.as_str())
    }
}

/// Payload of `PATCH /tasks/update-status/{taskId}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    pub status: bool,
}

/// Payload of `PATCH /tasks/update-category/{taskId}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskCategoryUpdate {
    pub category_id: i64,
}

/// Response of `POST /tasks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedTask {
    pub id: i64,
    pub title: String,
    pub status: bool,
    pub description: String,
    pub user_id: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for CreatedTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            status: task.status,
            description: task.description.clone(),
            user_id: task.user_id,
            category_id: task.category_id,
            created_at: task.created_at,
        }
    }
}

/// An entry of `GET /tasks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListedTask {
    pub id: i64,
    pub title: String,
    pub status: bool,
    pub description: String,
    pub user_id: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "User")]
    pub user: UserSummary,
}

impl From<&TaskWithOwner> for ListedTask {
    fn from(row: &TaskWithOwner) -> Self {
        Self {
            id: row.task.id,
            title: row.task.title.clone(),
            status: row.task.status,
            description: row.task.description.clone(),
            user_id: row.task.user_id,
            category_id: row.task.category_id,
            created_at: row.task.created_at,
            user: row.owner.clone(),
        }
    }
}

/// Response of every task mutation (details, status, category).
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedTask {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: bool,
    pub user_id: i64,
    pub category_id: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for UpdatedTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            user_id: task.user_id,
            category_id: task.category_id,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_input_validation() {
        let valid_input = TaskInput {
            title: "Write docs".to_string(),
            description: "Cover the category endpoints".to_string(),
            category_id: 1,
        };
        assert!(valid_input.validate().is_ok());

        let invalid_input = TaskInput {
            title: "".to_string(),
            description: "Missing title".to_string(),
            category_id: 1,
        };
        assert!(
            invalid_input.validate().is_err(),
            "Validation should fail for empty title."
        );

        let invalid_input = TaskInput {
            title: " \t ".to_string(),
            description: String::new(),
            category_id: 1,
        };
        assert!(
            invalid_input.validate().is_err(),
            "Validation should fail for whitespace-only title."
        );

        let invalid_input = TaskInput {
            title: "a".repeat(201),
            description: String::new(),
            category_id: 1,
        };
        assert!(
            invalid_input.validate().is_err(),
            "Validation should fail for overly long title."
        );
    }

    #[test]
    fn test_task_input_description_defaults_to_empty() {
        let input: TaskInput =
            serde_json::from_str(r#"{"title":"No description","category_id":4}"#).unwrap();
        assert_eq!(input.description, "");
        assert_eq!(input.category_id, 4);
    }

    #[test]
    fn test_details_update_skips_blank_fields() {
        let update = TaskDetailsUpdate {
            title: " ".to_string(),
            description: "  new body ".to_string(),
        };
        assert_eq!(update.title(), None);
        assert_eq!(update.description(), Some("  new body "));
        assert_eq!(TaskDetailsUpdate::default().description(), None);
    }

    #[test]
    fn test_listed_task_embeds_user_summary() {
        let now = Utc::now();
        let row = TaskWithOwner {
            task: Task {
                id: 7,
                title: "Ship".into(),
                description: String::new(),
                status: true,
                user_id: 2,
                category_id: 3,
                created_at: now,
                updated_at: now,
            },
            owner: UserSummary {
                id: 2,
                email: "b@x.com".into(),
                full_name: "B".into(),
            },
        };
        let json = serde_json::to_value(ListedTask::from(&row)).unwrap();
        assert_eq!(json["User"]["email"], "b@x.com");
        assert_eq!(json["status"], true);
        assert!(json.get("password_hash").is_none());
    }
}
