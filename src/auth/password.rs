use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use once_cell::sync::Lazy;

use crate::error::{AppError, AppResult};

/// Hash checked when a login has no usable account, so unknown usernames
/// cost the same argon2 work as a wrong password.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("no-such-account-placeholder").ok());

pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Password(e.to_string()))
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(password.as_bytes(), &parsed)
}

/// Runs a verification that always fails.
pub fn verify_dummy(password: &str) -> Result<(), argon2::password_hash::Error> {
    match DUMMY_HASH.as_deref() {
        Some(hash) => verify_password(password, hash).and(Err(argon2::password_hash::Error::Password)),
        None => Err(argon2::password_hash::Error::Password),
    }
}
