use async_trait::async_trait;
use chrono::Utc;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::Store;
use crate::error::AppError;
use crate::models::{Category, NewTask, NewUser, Task, TaskWithOwner, User, UserSummary};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Category>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_category_id: i64,
    next_task_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn task_mut(&mut self, id: i64) -> Result<&mut Task, AppError> {
        self.tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))
    }
}

fn unique_violation() -> AppError {
    AppError::DatabaseError(
        "duplicate key value violates unique constraint \"users_email_key\"".into(),
    )
}

/// [`Store`] kept in process memory. Mirrors the PostgreSQL schema constraints
/// (unique emails, foreign keys, owner cascade) so tests exercise the same rules.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(unique_violation());
        }
        let now = Utc::now();
        let created = User {
            id: Tables::next_id(&mut tables.next_user_id),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        debug!("Stored user {} in memory", created.id);
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(
        &self,
        id: i64,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = email {
            if tables.email_taken(email, Some(id)) {
                return Err(unique_violation());
            }
        }
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
        if let Some(full_name) = full_name {
            user.full_name = full_name.to_string();
        }
        if let Some(email) = email {
            user.email = email.to_string();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(&id).is_some();
        if removed {
            // tasks.user_id is ON DELETE CASCADE
            tables.tasks.retain(|_, task| task.user_id != id);
        }
        Ok(removed)
    }

    async fn count_tasks_for_user(&self, user_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .count() as i64)
    }

    async fn create_category(&self, kind: &str) -> Result<Category, AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let category = Category {
            id: Tables::next_id(&mut tables.next_category_id),
            kind: kind.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().cloned().collect())
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.get(&id).cloned())
    }

    async fn update_category(&self, id: i64, kind: &str) -> Result<Option<Category>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.categories.get_mut(&id).map(|category| {
            category.kind = kind.to_string();
            category.updated_at = Utc::now();
            category.clone()
        }))
    }

    async fn delete_category(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.tasks.values().any(|task| task.category_id == id) {
            return Err(AppError::DatabaseError(
                "update or delete on table \"categories\" violates foreign key constraint \
                 \"tasks_category_id_fkey\" on table \"tasks\""
                    .into(),
            ));
        }
        Ok(tables.categories.remove(&id).is_some())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&task.user_id)
            || !tables.categories.contains_key(&task.category_id)
        {
            return Err(AppError::DatabaseError(
                "insert on table \"tasks\" violates a foreign key constraint".into(),
            ));
        }
        let now = Utc::now();
        let created = Task {
            id: Tables::next_id(&mut tables.next_task_id),
            title: task.title,
            description: task.description,
            status: false,
            user_id: task.user_id,
            category_id: task.category_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(created.id, created.clone());
        trace!("Stored task {} in memory", created.id);
        Ok(created)
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, user_id: Option<i64>) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|task| user_id.map_or(true, |owner| task.user_id == owner))
            .cloned()
            .collect())
    }

    async fn list_tasks_with_owner(&self, user_id: i64) -> Result<Vec<TaskWithOwner>, AppError> {
        let tables = self.tables.read().await;
        let Some(owner) = tables.users.get(&user_id) else {
            return Ok(Vec::new());
        };
        let owner = UserSummary::from(owner);
        Ok(tables
            .tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .map(|task| TaskWithOwner {
                task: task.clone(),
                owner: owner.clone(),
            })
            .collect())
    }

    async fn update_task_details(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        let task = tables.task_mut(id)?;
        if let Some(title) = title {
            task.title = title.to_string();
        }
        if let Some(description) = description {
            task.description = description.to_string();
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn set_task_status(&self, id: i64, status: bool) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        let task = tables.task_mut(id)?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn set_task_category(&self, id: i64, category_id: i64) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&category_id) {
            return Err(AppError::DatabaseError(
                "update on table \"tasks\" violates foreign key constraint \"tasks_category_id_fkey\""
                    .into(),
            ));
        }
        let task = tables.task_mut(id)?;
        task.category_id = category_id;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.remove(&id).is_some())
    }

    async fn delete_tasks_by_category(&self, category_id: i64) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|_, task| task.category_id != category_id);
        Ok((before - tables.tasks.len()) as u64)
    }
}
