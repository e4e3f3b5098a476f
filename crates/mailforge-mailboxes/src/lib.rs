//! Mailbox provisioning
//!
//! [`MailboxService`] owns mailbox lifecycle on provisioned domains:
//! credential hashing, the database row, maildir storage and the audit
//! trail. Storage sits behind [`MailboxStorage`] so tests and alternative
//! backends can slot in.

mod errors;
mod maildir;
mod password;
mod service;

pub use errors::MailboxError;
pub use maildir::{FsMaildir, MailboxStorage};
pub use password::{hash_password, verify_password};
pub use service::MailboxService;
