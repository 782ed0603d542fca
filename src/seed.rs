use log::{debug, info};

use crate::auth::hash_password;
use crate::config::AdminSeed;
use crate::error::AppError;
use crate::models::{NewUser, Role};
use crate::store::Store;

/// Creates the reserved admin account unless a user with its email already exists.
///
/// Safe to run on every startup. Returns `true` if the account was created.
pub async fn ensure_admin(store: &dyn Store, seed: &AdminSeed, cost: u32) -> Result<bool, AppError> {
    if store.find_user_by_email(&seed.email).await?.is_some() {
        debug!("Admin account {} already present", seed.email);
        return Ok(false);
    }

    let admin = store
        .create_user(NewUser {
            full_name: seed.full_name.clone(),
            email: seed.email.clone(),
            password_hash: hash_password(&seed.password, cost)?,
            role: Role::Admin,
        })
        .await?;
    info!("Created admin account {} (id {})", admin.email, admin.id);
    Ok(true)
}
