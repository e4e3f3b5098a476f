use mailforge_core::validation::ValidationError;
use mailforge_dkim::DkimError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Domain not found: {0}")]
    NotFound(String),

    #[error("Domain already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("DKIM provisioning failed: {0}")]
    Dkim(#[from] DkimError),

    #[error("Domain {domain} still has {mailboxes} mailbox(es)")]
    HasMailboxes { domain: String, mailboxes: u64 },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
