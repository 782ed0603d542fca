use crate::{
    auth::{policy::visible_task_owner, AdminUser, AuthenticatedUser},
    error::AppError,
    models::{
        CategoryInput, CategoryUpdate, CategoryWithTasks, CreatedCategory, MessageResponse,
        UpdatedCategory,
    },
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use log::info;
use validator::Validate;

/// Creates a category. Admin only.
#[post("")]
pub async fn create_category(
    state: web::Data<AppState>,
    _admin: AdminUser,
    input: web::Json<CategoryInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let category = state.store.create_category(input.kind.trim()).await?;

    info!("Created category {} ({})", category.id, category.kind);
    Ok(HttpResponse::Created().json(CreatedCategory::from(&category)))
}

/// Lists every category with its tasks.
///
/// Admins see all tasks under each category; members only see their own.
#[get("")]
pub async fn get_categories(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let categories = state.store.list_categories().await?;
    let tasks = state.store.list_tasks(visible_task_owner(&caller.0)).await?;

    Ok(HttpResponse::Ok().json(CategoryWithTasks::group(&categories, &tasks)))
}

/// Renames a category. Admin only. A blank or absent `type` returns it unchanged.
#[patch("/{category_id}")]
pub async fn update_category(
    state: web::Data<AppState>,
    _admin: AdminUser,
    category_id: web::Path<i64>,
    input: web::Json<CategoryUpdate>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let category_id = category_id.into_inner();
    let category = match input.kind() {
        Some(kind) => state.store.update_category(category_id, kind).await?,
        None => state.store.find_category(category_id).await?,
    }
    .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    Ok(HttpResponse::Ok().json(UpdatedCategory::from(&category)))
}

/// Deletes a category after deleting every task filed under it. Admin only.
///
/// The two deletions run as separate statements without a surrounding transaction.
#[delete("/{category_id}")]
pub async fn delete_category(
    state: web::Data<AppState>,
    _admin: AdminUser,
    category_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let category_id = category_id.into_inner();
    if state.store.find_category(category_id).await?.is_none() {
        return Err(AppError::NotFound("Category not found".into()));
    }

    let removed_tasks = state.store.delete_tasks_by_category(category_id).await?;
    if !state.store.delete_category(category_id).await? {
        return Err(AppError::NotFound("Category not found".into()));
    }

    info!(
        "Deleted category {} and {} associated task(s)",
        category_id, removed_tasks
    );
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Category and associated tasks have been successfully deleted",
    )))
}
