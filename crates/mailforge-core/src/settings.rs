//! Application settings loaded from the environment
//!
//! Every field has a sensible default so a development instance can start
//! with nothing but `DATABASE_URL` set. DNS automation is optional: it is
//! active only when both the Cloudflare API token and zone id are present.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_DKIM_KEYS_DIR: &str = "/etc/opendkim/keys";
const DEFAULT_KEY_TABLE: &str = "/etc/opendkim/KeyTable";
const DEFAULT_SIGNING_TABLE: &str = "/etc/opendkim/SigningTable";
const DEFAULT_VMAIL_ROOT: &str = "/var/vmail";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub database_url: String,

    /// Mail server hostname used when a domain is created without one
    /// (e.g. "mail.example.com")
    pub hostname: Option<String>,

    pub dkim: DkimSettings,
    pub dns: Option<CloudflareSettings>,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DkimSettings {
    /// Directory holding per-domain key subdirectories
    pub keys_dir: PathBuf,
    /// OpenDKIM KeyTable path
    pub key_table: PathBuf,
    /// OpenDKIM SigningTable path
    pub signing_table: PathBuf,
    /// Service identity that must own private key files, e.g. "opendkim".
    /// None skips the chown, which is what tests and unprivileged
    /// development setups need.
    pub key_owner: Option<String>,
    /// Command run to reload the signing daemon after a table update
    pub reload_command: Vec<String>,
}

impl Default for DkimSettings {
    fn default() -> Self {
        Self {
            keys_dir: PathBuf::from(DEFAULT_DKIM_KEYS_DIR),
            key_table: PathBuf::from(DEFAULT_KEY_TABLE),
            signing_table: PathBuf::from(DEFAULT_SIGNING_TABLE),
            key_owner: Some("opendkim".to_string()),
            reload_command: vec![
                "systemctl".to_string(),
                "reload".to_string(),
                "opendkim".to_string(),
            ],
        }
    }
}

/// Cloudflare credentials for automatic DNS management
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareSettings {
    pub api_token: String,
    pub zone_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Root of the Maildir tree, one subdirectory per domain
    pub vmail_root: PathBuf,
    /// Service identity that must own mailbox directories, e.g. "vmail".
    /// None skips the chown.
    pub vmail_owner: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            vmail_root: PathBuf::from(DEFAULT_VMAIL_ROOT),
            vmail_owner: Some("vmail".to_string()),
        }
    }
}

impl AppSettings {
    /// Build settings from environment variables
    ///
    /// `DATABASE_URL` is required. `CF_API_TOKEN` and `CF_ZONE_ID` must both
    /// be present for DNS automation to activate; a single one is treated as
    /// absent.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let dns = match (std::env::var("CF_API_TOKEN"), std::env::var("CF_ZONE_ID")) {
            (Ok(api_token), Ok(zone_id)) if !api_token.is_empty() && !zone_id.is_empty() => {
                Some(CloudflareSettings { api_token, zone_id })
            }
            _ => None,
        };

        let mut dkim = DkimSettings::default();
        if let Ok(dir) = std::env::var("DKIM_KEYS_PATH") {
            dkim.keys_dir = PathBuf::from(dir);
        }

        let mut storage = StorageSettings::default();
        if let Ok(root) = std::env::var("VMAIL_PATH") {
            storage.vmail_root = PathBuf::from(root);
        }

        Ok(Self {
            database_url,
            hostname: std::env::var("MAIL_HOSTNAME").ok(),
            dkim,
            dns,
            storage,
        })
    }

    /// Whether automatic DNS record management is configured
    pub fn dns_configured(&self) -> bool {
        self.dns.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dkim_defaults() {
        let settings = DkimSettings::default();
        assert_eq!(settings.keys_dir, PathBuf::from("/etc/opendkim/keys"));
        assert_eq!(settings.key_owner.as_deref(), Some("opendkim"));
        assert_eq!(settings.reload_command[0], "systemctl");
    }

    #[test]
    fn test_storage_defaults() {
        let settings = StorageSettings::default();
        assert_eq!(settings.vmail_root, PathBuf::from("/var/vmail"));
        assert_eq!(settings.vmail_owner.as_deref(), Some("vmail"));
    }
}
