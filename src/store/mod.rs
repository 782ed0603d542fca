//! Persistence for users, categories and tasks.
//!
//! Handlers only see the [`Store`] trait. [`PgStore`] is the production
//! implementation; [`InMemoryStore`] backs the test suites.
//!
//! Multi-step sequences such as "delete every task of a category, then the
//! category" are issued as separate calls and are not wrapped in a transaction.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Category, NewTask, NewUser, Task, TaskWithOwner, User};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    // Users

    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Applies the non-`None` fields and refreshes `updated_at`.
    async fn update_user(
        &self,
        id: i64,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AppError>;
    /// Returns `false` if no such user existed.
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;
    async fn count_tasks_for_user(&self, user_id: i64) -> Result<i64, AppError>;

    // Categories

    async fn create_category(&self, kind: &str) -> Result<Category, AppError>;
    /// All categories ordered by id.
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError>;
    /// Returns `None` if the category does not exist.
    async fn update_category(&self, id: i64, kind: &str) -> Result<Option<Category>, AppError>;
    async fn delete_category(&self, id: i64) -> Result<bool, AppError>;

    // Tasks

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError>;
    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError>;
    /// Tasks ordered by id, restricted to one owner when `user_id` is given.
    async fn list_tasks(&self, user_id: Option<i64>) -> Result<Vec<Task>, AppError>;
    /// The tasks of `user_id`, each joined with its owner's summary.
    async fn list_tasks_with_owner(&self, user_id: i64) -> Result<Vec<TaskWithOwner>, AppError>;
    async fn update_task_details(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Task, AppError>;
    async fn set_task_status(&self, id: i64, status: bool) -> Result<Task, AppError>;
    async fn set_task_category(&self, id: i64, category_id: i64) -> Result<Task, AppError>;
    async fn delete_task(&self, id: i64) -> Result<bool, AppError>;
    /// Returns the number of deleted tasks.
    async fn delete_tasks_by_category(&self, category_id: i64) -> Result<u64, AppError>;
}
