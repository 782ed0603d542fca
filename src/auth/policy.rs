//! Role and ownership rules, kept in one place so every handler applies them the same way.

use log::warn;

use crate::error::AppError;
use crate::models::{Task, User};

pub const ADMIN_ONLY_MESSAGE: &str = "Only admin can access this resource";
pub const NOT_TASK_OWNER_MESSAGE: &str = "Unauthorized to modify this task";

/// Category mutations are reserved to admins.
pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        warn!("User {} denied admin-only access", user.id);
        Err(AppError::Unauthorized(ADMIN_ONLY_MESSAGE.into()))
    }
}

/// Only the user recorded on the task may change or delete it. Admins get no override.
pub fn require_task_owner(task: &Task, caller: &User) -> Result<(), AppError> {
    if task.user_id == caller.id {
        Ok(())
    } else {
        warn!("User {} denied access to task {}", caller.id, task.id);
        Err(AppError::Unauthorized(NOT_TASK_OWNER_MESSAGE.into()))
    }
}

/// Owner filter for listings: admins see every task, members only their own.
pub fn visible_task_owner(caller: &User) -> Option<i64> {
    (!caller.is_admin()).then_some(caller.id)
}
