//! Filesystem keystore for DKIM signing keys
//!
//! Keys live at a deterministic location derived from (domain, selector), so
//! repeated provisioning calls reuse the existing key instead of silently
//! regenerating it. Rotation uses a new selector and therefore a new path;
//! old key material is never deleted here.

use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::DkimError;

const KEY_BITS: usize = 2048;

/// A provisioned key pair: where the private half lives and the base64
/// SubjectPublicKeyInfo payload for the DKIM TXT record `p=` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DkimKeyPair {
    pub private_key_path: PathBuf,
    pub public_key: String,
}

pub struct DkimKeystore {
    keys_dir: PathBuf,
    /// Service identity that must own private keys (e.g. "opendkim");
    /// None skips the chown for unprivileged setups
    key_owner: Option<String>,
}

impl DkimKeystore {
    pub fn new(keys_dir: impl Into<PathBuf>, key_owner: Option<String>) -> Self {
        Self {
            keys_dir: keys_dir.into(),
            key_owner,
        }
    }

    /// Deterministic private key location for a (domain, selector) pair
    pub fn private_key_path(&self, domain: &str, selector: &str) -> PathBuf {
        self.keys_dir.join(domain).join(format!("{}.private", selector))
    }

    /// Ensure a key pair exists for (domain, selector) and return it
    ///
    /// Idempotent: an existing key at the deterministic location is loaded
    /// and its public half re-derived; generation only happens for missing
    /// keys.
    pub async fn ensure_key(
        &self,
        domain: &str,
        selector: &str,
    ) -> Result<DkimKeyPair, DkimError> {
        let private_key_path = self.private_key_path(domain, selector);

        if private_key_path.exists() {
            debug!(
                "Reusing existing DKIM key for {}/{} at {}",
                domain,
                selector,
                private_key_path.display()
            );
            let public_key = self.extract_public_key(domain, selector, &private_key_path)?;
            return Ok(DkimKeyPair {
                private_key_path,
                public_key,
            });
        }

        info!("Generating DKIM key for {} with selector {}", domain, selector);
        self.generate_key(domain, selector, &private_key_path)
            .await?;

        // The write must have produced the expected artifact
        if !private_key_path.exists() {
            return Err(DkimError::KeyGeneration {
                domain: domain.to_string(),
                selector: selector.to_string(),
                message: format!(
                    "expected key file missing after generation: {}",
                    private_key_path.display()
                ),
            });
        }

        let public_key = self.extract_public_key(domain, selector, &private_key_path)?;

        info!(
            "DKIM key generated at {}",
            private_key_path.display()
        );

        Ok(DkimKeyPair {
            private_key_path,
            public_key,
        })
    }

    async fn generate_key(
        &self,
        domain: &str,
        selector: &str,
        private_key_path: &Path,
    ) -> Result<(), DkimError> {
        let keygen_err = |message: String| DkimError::KeyGeneration {
            domain: domain.to_string(),
            selector: selector.to_string(),
            message,
        };

        let domain_dir = private_key_path
            .parent()
            .ok_or_else(|| keygen_err("key path has no parent directory".to_string()))?;
        tokio::fs::create_dir_all(domain_dir).await?;

        // 2048-bit generation takes long enough to matter on the runtime
        let private_key = tokio::task::spawn_blocking(|| {
            let mut rng = rand::rngs::OsRng;
            RsaPrivateKey::new(&mut rng, KEY_BITS)
        })
        .await
        .map_err(|e| keygen_err(format!("keygen task failed: {}", e)))?
        .map_err(|e| keygen_err(e.to_string()))?;

        let pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| keygen_err(e.to_string()))?;

        tokio::fs::write(private_key_path, pem.as_bytes()).await?;

        // Private key must be unreadable by anyone but the signing daemon
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(private_key_path, perms).await?;
        }

        if let Some(owner) = &self.key_owner {
            let status = tokio::process::Command::new("chown")
                .arg(format!("{}:{}", owner, owner))
                .arg(private_key_path)
                .status()
                .await
                .map_err(|e| keygen_err(format!("chown failed to start: {}", e)))?;
            if !status.success() {
                return Err(keygen_err(format!(
                    "chown to {} exited with {}",
                    owner, status
                )));
            }
        }

        Ok(())
    }

    /// Derive the DKIM `p=` payload from the stored private key
    fn extract_public_key(
        &self,
        domain: &str,
        selector: &str,
        private_key_path: &Path,
    ) -> Result<String, DkimError> {
        let extract_err = |message: String| DkimError::KeyExtraction {
            domain: domain.to_string(),
            selector: selector.to_string(),
            message,
        };

        let pem = std::fs::read_to_string(private_key_path)?;
        let private_key =
            RsaPrivateKey::from_pkcs8_pem(&pem).map_err(|e| extract_err(e.to_string()))?;

        let public_key = RsaPublicKey::from(&private_key);
        let der = public_key
            .to_public_key_der()
            .map_err(|e| extract_err(e.to_string()))?;

        use base64::Engine;
        Ok(base64::engine::general_purpose::STANDARD.encode(der.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn keystore() -> (TempDir, DkimKeystore) {
        let dir = TempDir::new().unwrap();
        let keystore = DkimKeystore::new(dir.path(), None);
        (dir, keystore)
    }

    #[tokio::test]
    async fn test_ensure_key_creates_key_pair() {
        let (_dir, keystore) = keystore();

        let pair = keystore.ensure_key("example.com", "mail").await.unwrap();

        assert!(pair.private_key_path.exists());
        assert!(pair
            .private_key_path
            .ends_with("example.com/mail.private"));
        assert!(!pair.public_key.is_empty());
        // base64 payload, no PEM armor
        assert!(!pair.public_key.contains("BEGIN"));
        assert!(pair
            .public_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_private_key_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, keystore) = keystore();
        let pair = keystore.ensure_key("example.com", "mail").await.unwrap();

        let mode = std::fs::metadata(&pair.private_key_path)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_ensure_key_is_idempotent() {
        let (_dir, keystore) = keystore();

        let first = keystore.ensure_key("example.com", "mail").await.unwrap();
        let key_bytes = std::fs::read(&first.private_key_path).unwrap();

        let second = keystore.ensure_key("example.com", "mail").await.unwrap();

        assert_eq!(first.public_key, second.public_key);
        // No regeneration: the private key file is byte-identical
        assert_eq!(key_bytes, std::fs::read(&second.private_key_path).unwrap());
    }

    #[tokio::test]
    async fn test_different_selectors_get_different_keys() {
        let (_dir, keystore) = keystore();

        let mail = keystore.ensure_key("example.com", "mail").await.unwrap();
        let mail2 = keystore.ensure_key("example.com", "mail2").await.unwrap();

        assert_ne!(mail.private_key_path, mail2.private_key_path);
        assert_ne!(mail.public_key, mail2.public_key);
        // Rotation leaves the old key material in place
        assert!(mail.private_key_path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_key_reports_extraction_error() {
        let (_dir, keystore) = keystore();

        let path = keystore.private_key_path("example.com", "mail");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not a pem file").unwrap();

        let err = keystore.ensure_key("example.com", "mail").await.unwrap_err();
        assert!(matches!(err, DkimError::KeyExtraction { .. }));
    }
}
