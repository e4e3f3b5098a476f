//! Mailbox password hashing

use argon2::{PasswordHasher, PasswordVerifier};

use crate::errors::MailboxError;

pub fn hash_password(password: &str) -> Result<String, MailboxError> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};

    let argon2 = argon2::Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MailboxError::Password(e.to_string()))?;

    Ok(password_hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, MailboxError> {
    let parsed = argon2::password_hash::PasswordHash::new(password_hash)
        .map_err(|e| MailboxError::Password(e.to_string()))?;

    let argon2 = argon2::Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
