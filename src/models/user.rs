use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// The two roles a user can hold.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages categories and sees every task on the board.
    Admin,
    /// Default role for self-registered accounts.
    Member,
}

/// A user row as stored in the database. Never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields needed to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Payload of `POST /users/register`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(max = 100),
        custom(function = "validate_not_blank", message = "Full name is required")
    )]
    pub full_name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Payload of `POST /users/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload of `PUT /users/update-account`. Empty fields are left unchanged.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub full_name: String,
    #[serde(default)]
    #[validate(custom = "validate_optional_email")]
    pub email: String,
}

fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    match non_empty(email) {
        Some(email) if !validator::validate_email(email) => {
            let mut err = ValidationError::new("email");
            err.message = Some("Email must be a valid address".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl UpdateAccountRequest {
    pub fn full_name(&self) -> Option<&str> {
        non_empty(&self.full_name)
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }
}

/// Rejects values that are empty once surrounding whitespace is trimmed.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    match non_empty(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("blank")),
    }
}

pub(crate) fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Response of a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for RegisteredUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Response of a successful account update.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedUser {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UpdatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            updated_at: user.updated_at,
        }
    }
}

/// Owner summary embedded in task listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub full_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_register_request_validation() {
        let input = RegisterRequest {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(input.validate().is_ok());

        for blank in ["", "   "] {
            let input = RegisterRequest {
                full_name: blank.to_string(),
                email: "ada@example.com".to_string(),
                password: "secret1".to_string(),
            };
            assert!(input.validate().is_err(), "{:?} should be rejected", blank);
        }

        let input = RegisterRequest {
            full_name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        };
        assert!(input.validate().is_err());

        // Five characters is one short.
        let input = RegisterRequest {
            full_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_account_treats_blank_fields_as_absent() {
        let input = UpdateAccountRequest {
            full_name: "  ".to_string(),
            email: "new@example.com".to_string(),
        };
        assert_eq!(input.full_name(), None);
        assert_eq!(input.email(), Some("new@example.com"));
        assert!(input.validate().is_ok());

        let input = UpdateAccountRequest::default();
        assert!(input.validate().is_ok());

        let input = UpdateAccountRequest {
            full_name: String::new(),
            email: "nope".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Member).unwrap(), "\"member\"");
    }
}
