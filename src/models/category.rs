use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::task::Task;
use super::user::{non_empty, validate_not_blank};

/// Represents a category column of the board as stored in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    /// Free-text label, exposed as `type` on the wire.
    #[sqlx(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of `POST /categories`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CategoryInput {
    #[serde(rename = "type")]
    #[validate(
        length(max = 100),
        custom(function = "validate_not_blank", message = "Category type is required")
    )]
    pub kind: String,
}

/// Payload of `PATCH /categories/{categoryId}`. A blank or absent `type` leaves
/// the category unchanged.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct CategoryUpdate {
    #[serde(default, rename = "type")]
    #[validate(length(max = 100))]
    pub kind: String,
}

impl CategoryUpdate {
    pub fn kind(&self) -> Option<&str> {
        non_empty(&self.kind)
    }
}

/// Response of `POST /categories`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedCategory {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Category> for CreatedCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            kind: category.kind.clone(),
            created_at: category.created_at,
        }
    }
}

/// Response of `PATCH /categories/{categoryId}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedCategory {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&Category> for UpdatedCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            kind: category.kind.clone(),
            updated_at: category.updated_at,
        }
    }
}

/// A task as listed under its category. Carries no status and no owner details.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryTask {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub user_id: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for CategoryTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            user_id: task.user_id,
            category_id: task.category_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// An entry of `GET /categories`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryWithTasks {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "Tasks")]
    pub tasks: Vec<CategoryTask>,
}

impl CategoryWithTasks {
    /// Groups `tasks` under each category, keeping only the tasks that reference it.
    pub fn group(categories: &[Category], tasks: &[Task]) -> Vec<Self> {
        categories
            .iter()
            .map(|category| Self {
                id: category.id,
                kind: category.kind.clone(),
                updated_at: category.updated_at,
                created_at: category.created_at,
                tasks: tasks
                    .iter()
                    .filter(|task| task.category_id == category.id)
                    .map(CategoryTask::from)
                    .collect(),
            })
            .collect()
    }
}
