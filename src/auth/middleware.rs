use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::warn;

use crate::error::AppError;
use crate::state::AppState;

pub const BEARER_FORMAT_MESSAGE: &str =
    "Authorization header must be in the format 'Bearer {token}'";

/// Verifies the bearer token of every non-public request and stores its
/// [`Claims`](super::Claims) in the request extensions.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Routes reachable without a token.
fn is_public(method: &Method, path: &str) -> bool {
    match path {
        "/" | "/health" => true,
        "/users/register" | "/users/login" => *method == Method::POST,
        _ => false,
    }
}

/// Extracts the token from an `Authorization: Bearer {token}` header value.
pub fn parse_bearer(value: Option<&str>) -> Result<&str, AppError> {
    let mut parts = value.unwrap_or_default().split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthorized(BEARER_FORMAT_MESSAGE.into())),
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(req.method(), req.path()) {
            return Box::pin(self.service.call(req));
        }

        let verified = match req.app_data::<web::Data<AppState>>() {
            Some(state) => {
                let header_value = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok());
                parse_bearer(header_value).and_then(|token| state.tokens.verify(token))
            }
            None => Err(AppError::InternalServerError(
                "Application state is not configured".into(),
            )),
        };

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                warn!("Rejected {} {}: {}", req.method(), req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");

        for bad in [
            None,
            Some(""),
            Some("Bearer"),
            Some("Bearer "),
            Some("bearer abc"),
            Some("Token abc"),
            Some("Bearer abc extra"),
        ] {
            match parse_bearer(bad) {
                Err(AppError::Unauthorized(msg)) => assert_eq!(msg, BEARER_FORMAT_MESSAGE),
                other => panic!("{:?} should be rejected, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_public_routes() {
        assert!(is_public(&Method::GET, "/"));
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/users/register"));
        assert!(is_public(&Method::POST, "/users/login"));
        assert!(!is_public(&Method::PUT, "/users/update-account"));
        assert!(!is_public(&Method::GET, "/tasks"));
        assert!(!is_public(&Method::GET, "/users/login"));
    }
}
