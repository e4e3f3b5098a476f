use mailforge_core::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailboxError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Mailbox not found: {0}")]
    NotFound(String),

    #[error("Mailbox already exists: {0}")]
    AlreadyExists(String),

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Password hashing failed: {0}")]
    Password(String),

    #[error("Storage provisioning failed for {mailbox}: {message}")]
    Storage { mailbox: String, message: String },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
