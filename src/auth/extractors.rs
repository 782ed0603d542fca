use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::warn;

use super::policy::require_admin;
use super::token::Claims;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

fn claims_from(req: &HttpRequest) -> Result<Claims, AppError> {
    req.extensions().get::<Claims>().cloned().ok_or_else(|| {
        AppError::Unauthorized(
            "Claims not found in request. Ensure AuthMiddleware is active.".to_string(),
        )
    })
}

fn state_from(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("Application state is not configured".into()))
}

/// The verified token claims of the caller.
///
/// Intended for routes behind `AuthMiddleware`, which validates the JWT and
/// inserts the claims into the request extensions.
impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from(req).map_err(Into::into))
    }
}

/// The full user row of the caller, resolved by the email in the token.
///
/// A token whose email no longer resolves, or resolves to a different id, is
/// stale and yields `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    async fn resolve(state: web::Data<AppState>, claims: Claims) -> Result<User, AppError> {
        match state.store.find_user_by_email(&claims.email).await? {
            Some(user) if user.id == claims.sub => Ok(user),
            _ => {
                warn!("Token for {} no longer matches a user", claims.email);
                Err(AppError::Unauthorized("User not found".into()))
            }
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let lookup = claims_from(req).and_then(|claims| Ok((state_from(req)?, claims)));
        Box::pin(async move {
            let (state, claims) = lookup?;
            let user = Self::resolve(state, claims).await?;
            Ok::<_, ActixError>(AuthenticatedUser(user))
        })
    }
}

/// Like [`AuthenticatedUser`], but the caller must also hold the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let authenticated = AuthenticatedUser::from_request(req, payload);
        Box::pin(async move {
            let AuthenticatedUser(user) = authenticated.await?;
            require_admin(&user)?;
            Ok::<_, ActixError>(AdminUser(user))
        })
    }
}
