//! OpenDKIM signing table maintenance
//!
//! Two plain-text tables map mail through the signing daemon:
//!
//! - KeyTable: `<selector>._domainkey.<domain>  <domain>:<selector>:<key path>`
//! - SigningTable: `*@<domain>  <selector>._domainkey.<domain>`
//!
//! Both are process-external shared state, so every update is a whole-file
//! read-modify-write under an internal mutex: prior entries for the domain
//! are dropped and the new entry appended, keeping at most one active
//! selector per domain.

use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::DkimError;

pub struct SigningTableManager {
    key_table: PathBuf,
    signing_table: PathBuf,
    reload_command: Vec<String>,
    lock: Mutex<()>,
}

impl SigningTableManager {
    pub fn new(
        key_table: impl Into<PathBuf>,
        signing_table: impl Into<PathBuf>,
        reload_command: Vec<String>,
    ) -> Self {
        Self {
            key_table: key_table.into(),
            signing_table: signing_table.into(),
            reload_command,
            lock: Mutex::new(()),
        }
    }

    /// Make `selector` the active signing selector for `domain`
    ///
    /// Replaces any prior entries for the domain in both tables, then asks
    /// the daemon to reload. A reload failure is reported in the logs but
    /// does not roll back the table write; the new mapping takes effect on
    /// the daemon's next reload.
    pub async fn apply_selector(
        &self,
        domain: &str,
        selector: &str,
        private_key_path: &Path,
    ) -> Result<(), DkimError> {
        let _guard = self.lock.lock().await;

        let key_suffix = format!("._domainkey.{}", domain);
        let key_entry = format!(
            "{}._domainkey.{} {}:{}:{}",
            selector,
            domain,
            domain,
            selector,
            private_key_path.display()
        );

        let signing_key = format!("*@{}", domain);
        let signing_entry = format!("*@{} {}._domainkey.{}", domain, selector, domain);

        Self::rewrite_table(&self.key_table, &key_entry, |name| {
            name.ends_with(&key_suffix)
        })
        .await?;
        Self::rewrite_table(&self.signing_table, &signing_entry, |name| {
            name == signing_key
        })
        .await?;

        info!("Updated signing tables for {} (selector {})", domain, selector);

        self.reload_daemon().await;

        Ok(())
    }

    /// Rewrite one table wholesale: keep lines whose first field does not
    /// match `replaces`, then append `entry`
    async fn rewrite_table<F>(path: &Path, entry: &str, replaces: F) -> Result<(), DkimError>
    where
        F: Fn(&str) -> bool,
    {
        let existing = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut lines: Vec<&str> = existing
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return false;
                }
                match trimmed.split_whitespace().next() {
                    Some(name) => !replaces(name),
                    None => true,
                }
            })
            .collect();
        lines.push(entry);

        let mut content = lines.join("\n");
        content.push('\n');

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;

        Ok(())
    }

    async fn reload_daemon(&self) {
        let Some((program, args)) = self.reload_command.split_first() else {
            return;
        };

        match tokio::process::Command::new(program)
            .args(args)
            .status()
            .await
        {
            Ok(status) if status.success() => {
                info!("Signing daemon reloaded");
            }
            Ok(status) => {
                warn!(
                    "Signing daemon reload exited with {}; new config takes effect on next reload",
                    status
                );
            }
            Err(e) => {
                warn!(
                    "Signing daemon reload could not run: {}; new config takes effect on next reload",
                    e
                );
            }
        }
    }
}
