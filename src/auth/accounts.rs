use tracing::{info, warn};

use crate::{
    auth::password::hash_password,
    config::BootstrapAccount,
    error::{AppError, AppResult},
    model::{
        role::Role,
        user::{NewUser, USERNAME_MAX_LEN, User},
    },
    repository::BillingStore,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub async fn create_account(
    store: &dyn BillingStore,
    username: &str,
    password: &str,
    role: Role,
) -> AppResult<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(AppError::Validation(format!(
            "Username must be at most {USERNAME_MAX_LEN} characters"
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(password)?;
    store
        .add_user(NewUser {
            username: username.to_string(),
            password_hash,
            role,
        })
        .await
}

/// Seeds a configured account on startup; an existing username is left as is.
pub async fn ensure_account(
    store: &dyn BillingStore,
    account: &BootstrapAccount,
    role: Role,
) -> AppResult<()> {
    if let Some(existing) = store.find_user(&account.username).await? {
        if existing.role != role {
            warn!(
                username = %existing.username,
                existing_role = %existing.role,
                wanted_role = %role,
                "Bootstrap account exists with a different role"
            );
        }
        return Ok(());
    }

    let user = create_account(store, &account.username, &account.password, role).await?;
    info!(user_id = user.id, username = %user.username, role = %role, "Bootstrap account created");
    Ok(())
}
