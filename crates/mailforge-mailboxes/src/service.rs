use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use mailforge_audit::{AuditEvent, AuditService};
use mailforge_core::validation::{normalize_domain, validate_local_part, validate_quota_mb};
use mailforge_database::DbConnection;
use mailforge_entities::{domains, mailboxes};

use crate::errors::MailboxError;
use crate::maildir::MailboxStorage;
use crate::password;

pub const STATUS_ACTIVE: &str = "active";

/// Mailbox provisioning orchestrator
///
/// The database row is the source of truth: it is inserted first, and if the
/// maildir cannot be created the row is removed again so no half-provisioned
/// mailbox survives. Deletion is the mirror image, with storage removal
/// downgraded to best-effort.
pub struct MailboxService {
    db: Arc<DbConnection>,
    storage: Arc<dyn MailboxStorage>,
    audit: Arc<AuditService>,
}

impl MailboxService {
    pub fn new(
        db: Arc<DbConnection>,
        storage: Arc<dyn MailboxStorage>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self { db, storage, audit }
    }

    /// Provision a mailbox on an existing domain
    pub async fn provision_mailbox(
        &self,
        domain: &str,
        local_part: &str,
        password: &str,
        quota_mb: i32,
    ) -> Result<mailboxes::Model, MailboxError> {
        let domain_name = normalize_domain(domain);
        let local_part = local_part.to_ascii_lowercase();
        validate_local_part(&local_part)?;
        validate_quota_mb(quota_mb)?;

        let email = format!("{}@{}", local_part, domain_name);

        let domain_row = domains::Entity::find()
            .filter(domains::Column::Domain.eq(&domain_name))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| MailboxError::DomainNotFound(domain_name.clone()))?;

        if mailboxes::Entity::find()
            .filter(mailboxes::Column::DomainId.eq(domain_row.id))
            .filter(mailboxes::Column::LocalPart.eq(&local_part))
            .one(self.db.as_ref())
            .await?
            .is_some()
        {
            return Err(MailboxError::AlreadyExists(email));
        }

        info!("Provisioning mailbox {}", email);

        let password_hash = password::hash_password(password)?;

        let row = mailboxes::ActiveModel {
            workspace_id: Set(domain_row.workspace_id),
            domain_id: Set(domain_row.id),
            local_part: Set(local_part.clone()),
            password_hash: Set(password_hash),
            quota_mb: Set(quota_mb),
            status: Set(STATUS_ACTIVE.to_string()),
            ..Default::default()
        };
        let mailbox = row.insert(self.db.as_ref()).await?;

        // Storage failure rolls the row back; a mailbox that cannot receive
        // mail must not exist in the directory
        if let Err(e) = self
            .storage
            .create_maildir(&domain_name, &local_part)
            .await
        {
            error!("Maildir creation for {} failed, rolling back: {}", email, e);
            if let Err(delete_err) = mailboxes::Entity::delete_by_id(mailbox.id)
                .exec(self.db.as_ref())
                .await
            {
                error!(
                    "Rollback of mailbox row {} also failed: {}",
                    mailbox.id, delete_err
                );
            }
            return Err(MailboxError::Storage {
                mailbox: email,
                message: e.to_string(),
            });
        }

        self.audit
            .record(
                mailbox.workspace_id,
                &AuditEvent::MailboxCreated {
                    mailbox_id: mailbox.id,
                    email: email.clone(),
                    quota_mb,
                },
            )
            .await?;

        info!("Mailbox {} provisioned", email);

        Ok(mailbox)
    }

    /// Replace a mailbox's password
    pub async fn update_password(
        &self,
        domain: &str,
        local_part: &str,
        new_password: &str,
    ) -> Result<mailboxes::Model, MailboxError> {
        let (domain_name, local_part) = normalize_address(domain, local_part);
        let email = format!("{}@{}", local_part, domain_name);

        let existing = self.find_mailbox(&domain_name, &local_part).await?;

        let password_hash = password::hash_password(new_password)?;

        let mut active: mailboxes::ActiveModel = existing.into();
        active.password_hash = Set(password_hash);
        let mailbox = active.update(self.db.as_ref()).await?;

        self.audit
            .record(
                mailbox.workspace_id,
                &AuditEvent::MailboxPasswordChanged {
                    mailbox_id: mailbox.id,
                    email,
                },
            )
            .await?;

        Ok(mailbox)
    }

    /// Verify a mailbox password, e.g. for an SMTP/IMAP auth backend
    pub async fn verify_password(
        &self,
        domain: &str,
        local_part: &str,
        password: &str,
    ) -> Result<bool, MailboxError> {
        let (domain_name, local_part) = normalize_address(domain, local_part);
        let mailbox = self.find_mailbox(&domain_name, &local_part).await?;
        password::verify_password(password, &mailbox.password_hash)
    }

    /// Delete a mailbox
    ///
    /// The row goes first; the maildir removal is best-effort so stray files
    /// on disk never block deprovisioning.
    pub async fn delete_mailbox(&self, domain: &str, local_part: &str) -> Result<(), MailboxError> {
        let (domain_name, local_part) = normalize_address(domain, local_part);
        let email = format!("{}@{}", local_part, domain_name);

        let existing = self.find_mailbox(&domain_name, &local_part).await?;
        let workspace_id = existing.workspace_id;
        existing.delete(self.db.as_ref()).await?;

        if let Err(e) = self.storage.remove_maildir(&domain_name, &local_part).await {
            warn!(
                "Maildir for {} could not be removed, leaving it behind: {}",
                email, e
            );
        }

        self.audit
            .record(
                workspace_id,
                &AuditEvent::MailboxDeleted {
                    email: email.clone(),
                },
            )
            .await?;

        info!("Mailbox {} deleted", email);

        Ok(())
    }

    pub async fn get_mailbox(
        &self,
        domain: &str,
        local_part: &str,
    ) -> Result<mailboxes::Model, MailboxError> {
        let (domain_name, local_part) = normalize_address(domain, local_part);
        self.find_mailbox(&domain_name, &local_part).await
    }

    /// All mailboxes on a domain, ordered by local part
    pub async fn list_mailboxes(&self, domain: &str) -> Result<Vec<mailboxes::Model>, MailboxError> {
        let domain_name = normalize_domain(domain);
        let domain_row = domains::Entity::find()
            .filter(domains::Column::Domain.eq(&domain_name))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| MailboxError::DomainNotFound(domain_name.clone()))?;

        let results = mailboxes::Entity::find()
            .filter(mailboxes::Column::DomainId.eq(domain_row.id))
            .order_by_asc(mailboxes::Column::LocalPart)
            .all(self.db.as_ref())
            .await?;
        Ok(results)
    }

    async fn find_mailbox(
        &self,
        domain_name: &str,
        local_part: &str,
    ) -> Result<mailboxes::Model, MailboxError> {
        let email = format!("{}@{}", local_part, domain_name);

        let domain_row = domains::Entity::find()
            .filter(domains::Column::Domain.eq(domain_name))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| MailboxError::DomainNotFound(domain_name.to_string()))?;

        mailboxes::Entity::find()
            .filter(mailboxes::Column::DomainId.eq(domain_row.id))
            .filter(mailboxes::Column::LocalPart.eq(local_part))
            .one(self.db.as_ref())
            .await?
            .ok_or(MailboxError::NotFound(email))
    }
}

fn normalize_address(domain: &str, local_part: &str) -> (String, String) {
    (normalize_domain(domain), local_part.to_ascii_lowercase())
}
