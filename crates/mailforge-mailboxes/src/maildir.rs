//! Maildir storage backend
//!
//! A mailbox's messages live at `<root>/<domain>/<local_part>/` with the
//! standard `new`, `cur` and `tmp` subdirectories. Directories are created
//! group-accessible so the delivery agent and IMAP server can share them.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Subdirectories every maildir needs
const MAILDIR_SUBDIRS: &[&str] = &["new", "cur", "tmp"];

/// Filesystem side of mailbox provisioning
#[async_trait]
pub trait MailboxStorage: Send + Sync {
    /// Create the maildir for a mailbox and return its path; idempotent
    async fn create_maildir(&self, domain: &str, local_part: &str) -> std::io::Result<PathBuf>;

    /// Remove a mailbox's maildir; succeeds if it is already gone
    async fn remove_maildir(&self, domain: &str, local_part: &str) -> std::io::Result<()>;
}

pub struct FsMaildir {
    root: PathBuf,
    /// Mail system user that must own the directories (e.g. "vmail");
    /// None skips the chown for unprivileged setups
    owner: Option<String>,
}

impl FsMaildir {
    pub fn new(root: impl Into<PathBuf>, owner: Option<String>) -> Self {
        Self {
            root: root.into(),
            owner,
        }
    }

    pub fn from_settings(settings: &mailforge_core::settings::StorageSettings) -> Self {
        Self::new(&settings.vmail_root, settings.vmail_owner.clone())
    }

    pub fn maildir_path(&self, domain: &str, local_part: &str) -> PathBuf {
        self.root.join(domain).join(local_part)
    }

    #[cfg(unix)]
    async fn set_group_mode(path: &Path) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o770);
        tokio::fs::set_permissions(path, perms).await
    }
}

#[async_trait]
impl MailboxStorage for FsMaildir {
    async fn create_maildir(&self, domain: &str, local_part: &str) -> std::io::Result<PathBuf> {
        let base = self.maildir_path(domain, local_part);

        for sub in MAILDIR_SUBDIRS {
            tokio::fs::create_dir_all(base.join(sub)).await?;
        }

        #[cfg(unix)]
        {
            Self::set_group_mode(&base).await?;
            for sub in MAILDIR_SUBDIRS {
                Self::set_group_mode(&base.join(sub)).await?;
            }
        }

        if let Some(owner) = &self.owner {
            let status = tokio::process::Command::new("chown")
                .arg("-R")
                .arg(format!("{}:{}", owner, owner))
                .arg(&base)
                .status()
                .await?;
            if !status.success() {
                return Err(std::io::Error::other(format!(
                    "chown to {} exited with {}",
                    owner, status
                )));
            }
        }

        info!("Maildir ready at {}", base.display());
        Ok(base)
    }

    async fn remove_maildir(&self, domain: &str, local_part: &str) -> std::io::Result<()> {
        let base = self.maildir_path(domain, local_part);

        match tokio::fs::remove_dir_all(&base).await {
            Ok(()) => {
                debug!("Removed maildir {}", base.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
