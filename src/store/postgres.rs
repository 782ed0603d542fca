use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use super::Store;
use crate::error::AppError;
use crate::models::{Category, NewTask, NewUser, Task, TaskWithOwner, User, UserSummary};

const USER_COLUMNS: &str = "id, full_name, email, password_hash, role, created_at, updated_at";
const CATEGORY_COLUMNS: &str = r#"id, "type", created_at, updated_at"#;
const TASK_COLUMNS: &str =
    "id, title, description, status, user_id, category_id, created_at, updated_at";

/// [`Store`] backed by PostgreSQL through a sqlx connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        debug!("Database pool established");
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Flat row of the task/owner join.
#[derive(FromRow)]
struct TaskOwnerRow {
    id: i64,
    title: String,
    description: String,
    status: bool,
    user_id: i64,
    category_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_email: String,
    owner_full_name: String,
}

impl From<TaskOwnerRow> for TaskWithOwner {
    fn from(row: TaskOwnerRow) -> Self {
        TaskWithOwner {
            owner: UserSummary {
                id: row.user_id,
                email: row.owner_email,
                full_name: row.owner_full_name,
            },
            task: Task {
                id: row.id,
                title: row.title,
                description: row.description,
                status: row.status,
                user_id: row.user_id,
                category_id: row.category_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (full_name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(
        &self,
        id: i64,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET full_name = COALESCE($1, full_name), email = COALESCE($2, email), \
             updated_at = NOW() WHERE id = $3 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(full_name)
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_tasks_for_user(&self, user_id: i64) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_category(&self, kind: &str) -> Result<Category, AppError> {
        let sql =
            format!(r#"INSERT INTO categories ("type") VALUES ($1) RETURNING {CATEGORY_COLUMNS}"#);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(kind)
            .fetch_one(&self.pool)
            .await?;
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn update_category(&self, id: i64, kind: &str) -> Result<Option<Category>, AppError> {
        let sql = format!(
            r#"UPDATE categories SET "type" = $1, updated_at = NOW() WHERE id = $2 RETURNING {CATEGORY_COLUMNS}"#
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(kind)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn delete_category(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, status, user_id, category_id) \
             VALUES ($1, $2, FALSE, $3, $4) RETURNING {TASK_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.user_id)
            .bind(task.category_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_tasks(&self, user_id: Option<i64>) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE ($1::BIGINT IS NULL OR user_id = $1) ORDER BY id"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn list_tasks_with_owner(&self, user_id: i64) -> Result<Vec<TaskWithOwner>, AppError> {
        let rows = sqlx::query_as::<_, TaskOwnerRow>(
            "SELECT t.id, t.title, t.description, t.status, t.user_id, t.category_id, \
                    t.created_at, t.updated_at, u.email AS owner_email, u.full_name AS owner_full_name \
             FROM tasks t JOIN users u ON u.id = t.user_id \
             WHERE t.user_id = $1 ORDER BY t.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TaskWithOwner::from).collect())
    }

    async fn update_task_details(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET title = COALESCE($1, title), description = COALESCE($2, description), \
             updated_at = NOW() WHERE id = $3 RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(title)
            .bind(description)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn set_task_status(&self, id: i64, status: bool) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(status)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn set_task_category(&self, id: i64, category_id: i64) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET category_id = $1, updated_at = NOW() WHERE id = $2 RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(category_id)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_tasks_by_category(&self, category_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
