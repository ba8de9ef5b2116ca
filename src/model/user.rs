use serde::Serialize;
use sqlx::FromRow;

use super::role::Role;

/// Row as stored in `users`; `role` is kept as its display name.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_name(&row.role)
            .ok_or_else(|| format!("unknown role '{}' for user {}", row.role, row.id))?;
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
        })
    }
}

pub const USERNAME_MAX_LEN: usize = 64;

pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}
