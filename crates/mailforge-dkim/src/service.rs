use async_trait::async_trait;
use mailforge_core::settings::DkimSettings;
use std::path::Path;

use crate::keystore::{DkimKeyPair, DkimKeystore};
use crate::tables::SigningTableManager;
use crate::DkimError;

/// Signing-side DKIM operations the domain orchestrator depends on
#[async_trait]
pub trait DkimProvisioner: Send + Sync {
    /// Ensure a key pair exists for (domain, selector); idempotent
    async fn ensure_key(&self, domain: &str, selector: &str) -> Result<DkimKeyPair, DkimError>;

    /// Make `selector` the active signing selector for `domain`
    async fn apply_selector(
        &self,
        domain: &str,
        selector: &str,
        private_key_path: &Path,
    ) -> Result<(), DkimError>;
}

/// Production implementation backed by the filesystem keystore and the
/// OpenDKIM signing tables
pub struct DkimService {
    keystore: DkimKeystore,
    tables: SigningTableManager,
}

impl DkimService {
    pub fn new(keystore: DkimKeystore, tables: SigningTableManager) -> Self {
        Self { keystore, tables }
    }

    pub fn from_settings(settings: &DkimSettings) -> Self {
        Self::new(
            DkimKeystore::new(&settings.keys_dir, settings.key_owner.clone()),
            SigningTableManager::new(
                &settings.key_table,
                &settings.signing_table,
                settings.reload_command.clone(),
            ),
        )
    }
}

#[async_trait]
impl DkimProvisioner for DkimService {
    async fn ensure_key(&self, domain: &str, selector: &str) -> Result<DkimKeyPair, DkimError> {
        self.keystore.ensure_key(domain, selector).await
    }

    async fn apply_selector(
        &self,
        domain: &str,
        selector: &str,
        private_key_path: &Path,
    ) -> Result<(), DkimError> {
        self.tables
            .apply_selector(domain, selector, private_key_path)
            .await
    }
}
