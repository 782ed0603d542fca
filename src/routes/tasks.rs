use crate::{
    auth::{policy::require_task_owner, AuthenticatedUser},
    error::AppError,
    models::{
        CreatedTask, ListedTask, MessageResponse, NewTask, Task, TaskCategoryUpdate,
        TaskDetailsUpdate, TaskInput, TaskStatusUpdate, UpdatedTask, User,
    },
    state::AppState,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use log::{debug, info};
use validator::Validate;

/// Loads a task and checks that `caller` owns it.
///
/// A missing task is `404`; somebody else's task is `401`.
async fn load_owned_task(state: &AppState, task_id: i64, caller: &User) -> Result<Task, AppError> {
    let task = state
        .store
        .find_task(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    require_task_owner(&task, caller)?;
    Ok(task)
}

/// Retrieves the caller's tasks, each with a summary of its owner.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks with an embedded `User` object.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let rows = state.store.list_tasks_with_owner(caller.0.id).await?;
    let tasks: Vec<ListedTask> = rows.iter().map(ListedTask::from).collect();

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// The owner is always the caller and the status always starts as `false`,
/// whatever the payload says.
///
/// ## Responses:
/// - `201 Created`: the created task.
/// - `400 Bad Request`: invalid payload or unknown `category_id`.
/// - `401 Unauthorized`: missing or invalid token.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let input = task_data.into_inner();

    if state.store.find_category(input.category_id).await?.is_none() {
        return Err(AppError::BadRequest("Category not found".into()));
    }

    let task = state
        .store
        .create_task(NewTask {
            title: input.title.trim().to_string(),
            description: input.description,
            user_id: caller.0.id,
            category_id: input.category_id,
        })
        .await?;

    info!("User {} created task {}", task.user_id, task.id);
    Ok(HttpResponse::Created().json(CreatedTask::from(&task)))
}

/// Updates the title and/or description of a task the caller owns.
///
/// ## Responses:
/// - `200 OK`: the reloaded task.
/// - `400 Bad Request`: invalid id or payload.
/// - `401 Unauthorized`: the caller does not own the task.
/// - `404 Not Found`: no such task.
#[put("/{task_id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    task_id: web::Path<i64>,
    update: web::Json<TaskDetailsUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    let task = load_owned_task(&state, task_id.into_inner(), &caller.0).await?;

    let updated = state
        .store
        .update_task_details(task.id, update.title(), update.description())
        .await?;

    debug!("Task {} details updated", updated.id);
    Ok(HttpResponse::Ok().json(UpdatedTask::from(&updated)))
}

/// Marks a task the caller owns as completed or not.
#[patch("/update-status/{task_id}")]
pub async fn update_task_status(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    task_id: web::Path<i64>,
    update: web::Json<TaskStatusUpdate>,
) -> Result<impl Responder, AppError> {
    let task = load_owned_task(&state, task_id.into_inner(), &caller.0).await?;
    let updated = state.store.set_task_status(task.id, update.status).await?;

    debug!("Task {} status set to {}", updated.id, updated.status);
    Ok(HttpResponse::Ok().json(UpdatedTask::from(&updated)))
}

/// Moves a task the caller owns to another existing category.
///
/// ## Responses:
/// - `404 Not Found`: the target category or the task does not exist.
#[patch("/update-category/{task_id}")]
pub async fn update_task_category(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    task_id: web::Path<i64>,
    update: web::Json<TaskCategoryUpdate>,
) -> Result<impl Responder, AppError> {
    if state.store.find_category(update.category_id).await?.is_none() {
        return Err(AppError::NotFound("Category not found".into()));
    }

    let task = load_owned_task(&state, task_id.into_inner(), &caller.0).await?;
    let updated = state
        .store
        .set_task_category(task.id, update.category_id)
        .await?;

    debug!("Task {} moved to category {}", updated.id, updated.category_id);
    Ok(HttpResponse::Ok().json(UpdatedTask::from(&updated)))
}

/// Deletes a task the caller owns.
#[delete("/{task_id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = load_owned_task(&state, task_id.into_inner(), &caller.0).await?;

    if !state.store.delete_task(task.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    info!("User {} deleted task {}", caller.0.id, task.id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("Task has been successfully deleted")))
}
