use crate::{
    auth::{hash_password, verify_password, AuthenticatedUser, TokenResponse},
    error::AppError,
    models::{
        LoginRequest, MessageResponse, NewUser, RegisterRequest, RegisteredUser, Role,
        UpdateAccountRequest, UpdatedUser,
    },
    state::AppState,
};
use actix_web::{delete, post, put, web, HttpResponse, Responder};
use log::{info, warn};
use validator::Validate;

/// Register a new member account.
///
/// ## Responses:
/// - `201 Created`: `{id, full_name, email, created_at}`.
/// - `400 Bad Request`: undecodable body, failed validation, or email already registered.
/// - `500 Internal Server Error`: store or hashing failure.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let input = register_data.into_inner();

    if state.store.find_user_by_email(&input.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&input.password, state.bcrypt_cost)?;
    let user = state
        .store
        .create_user(NewUser {
            full_name: input.full_name.trim().to_string(),
            email: input.email,
            password_hash,
            role: Role::Member,
        })
        .await?;

    info!("Registered user {} ({})", user.id, user.email);
    Ok(HttpResponse::Created().json(RegisteredUser::from(&user)))
}

/// Exchange credentials for a bearer token valid for one hour.
///
/// ## Responses:
/// - `200 OK`: `{token}`.
/// - `401 Unauthorized`: unknown email or wrong password.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let user = match state.store.find_user_by_email(&login_data.email).await? {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown email {}", login_data.email);
            return Err(AppError::Unauthorized("User not found".into()));
        }
    };

    if !verify_password(&login_data.password, &user.password_hash)? {
        warn!("Invalid password for user {}", user.id);
        return Err(AppError::Unauthorized("Invalid password".into()));
    }

    let token = state.tokens.issue(&user)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Update the caller's full name and/or email. Blank fields are left unchanged.
///
/// Changing the email invalidates the caller's current token, since tokens are
/// bound to the email they were issued for.
#[put("/update-account")]
pub async fn update_account(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    update: web::Json<UpdateAccountRequest>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    let AuthenticatedUser(user) = caller;

    if let Some(email) = update.email() {
        if email != user.email {
            if let Some(existing) = state.store.find_user_by_email(email).await? {
                if existing.id != user.id {
                    return Err(AppError::BadRequest("Email already registered".into()));
                }
            }
        }
    }

    let updated = state
        .store
        .update_user(user.id, update.full_name(), update.email())
        .await?;

    info!("Updated account {}", updated.id);
    Ok(HttpResponse::Ok().json(UpdatedUser::from(&updated)))
}

/// Delete the caller's account. Refused with `409 Conflict` while they still own tasks.
#[delete("/delete-account")]
pub async fn delete_account(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let AuthenticatedUser(user) = caller;

    let owned = state.store.count_tasks_for_user(user.id).await?;
    if owned > 0 {
        return Err(AppError::Conflict(
            "Cannot delete user with associated tasks".into(),
        ));
    }

    if !state.store.delete_user(user.id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    info!("Deleted account {}", user.id);
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Your account has been successfully deleted",
    )))
}
