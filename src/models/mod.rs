pub mod category;
pub mod task;
pub mod user;

use serde::{Deserialize, Serialize};

pub use category::{
    Category, CategoryInput, CategoryTask, CategoryUpdate, CategoryWithTasks, CreatedCategory,
    UpdatedCategory,
};
pub use task::{
    CreatedTask, ListedTask, NewTask, Task, TaskCategoryUpdate, TaskDetailsUpdate, TaskInput,
    TaskStatusUpdate, TaskWithOwner, UpdatedTask,
};
pub use user::{
    LoginRequest, NewUser, RegisterRequest, RegisteredUser, Role, UpdateAccountRequest,
    UpdatedUser, User, UserSummary,
};

/// `{"message": ...}` body returned by the delete endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
