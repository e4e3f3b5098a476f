use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use mailforge_audit::{AuditEvent, AuditService};
use mailforge_core::validation::{normalize_domain, validate_domain, validate_selector};
use mailforge_database::DbConnection;
use mailforge_dkim::DkimProvisioner;
use mailforge_dns::records::{self, DnsRecordSpec};
use mailforge_dns::{DnsAutomation, PublicIpSource};
use mailforge_entities::{domains, mailboxes};

use crate::errors::DomainError;
use crate::locks::DomainLocks;

/// Selector used when provisioning does not name one
pub const DEFAULT_SELECTOR: &str = "mail";

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PENDING: &str = "pending";

/// Domain provisioning orchestrator
///
/// Owns the end-to-end flow: validation, DKIM key material, signing-daemon
/// configuration, DNS convergence and the audit trail. DKIM failures abort
/// provisioning; DNS and public-IP failures degrade the domain to `pending`
/// instead of failing it.
pub struct DomainService {
    db: Arc<DbConnection>,
    dkim: Arc<dyn DkimProvisioner>,
    dns: Option<Arc<dyn DnsAutomation>>,
    ip_source: Arc<dyn PublicIpSource>,
    audit: Arc<AuditService>,
    /// Default mail server hostname for MX targets and SPF `a:` mechanisms,
    /// used when provisioning does not name one
    hostname: String,
    locks: DomainLocks,
}

impl DomainService {
    pub fn new(
        db: Arc<DbConnection>,
        dkim: Arc<dyn DkimProvisioner>,
        dns: Option<Arc<dyn DnsAutomation>>,
        ip_source: Arc<dyn PublicIpSource>,
        audit: Arc<AuditService>,
        hostname: String,
    ) -> Self {
        Self {
            db,
            dkim,
            dns,
            ip_source,
            audit,
            hostname,
            locks: DomainLocks::new(),
        }
    }

    /// Provision a new mail domain
    ///
    /// Generates DKIM key material, activates it in the signing tables and
    /// converges DNS when a provider is configured. The row is persisted as
    /// `active` only when all DNS records were pushed; otherwise it lands as
    /// `pending` and the operator publishes the records from
    /// [`Self::expected_dns_records`].
    pub async fn provision_domain(
        &self,
        workspace_id: i32,
        domain: &str,
        hostname: Option<&str>,
        selector: Option<&str>,
    ) -> Result<domains::Model, DomainError> {
        let domain_name = normalize_domain(domain);
        validate_domain(&domain_name)?;

        let hostname = hostname.unwrap_or(&self.hostname).to_string();
        let selector = selector.unwrap_or(DEFAULT_SELECTOR).to_lowercase();
        validate_selector(&selector)?;

        let lock = self.locks.lock_for(&domain_name);
        let _guard = lock.lock().await;

        info!("Provisioning domain {} (selector {})", domain_name, selector);

        if domains::Entity::find()
            .filter(domains::Column::Domain.eq(&domain_name))
            .one(self.db.as_ref())
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyExists(domain_name));
        }

        // DKIM is mandatory; a signing key we cannot create or activate
        // aborts provisioning before anything is persisted
        let key_pair = self.dkim.ensure_key(&domain_name, &selector).await?;
        self.dkim
            .apply_selector(&domain_name, &selector, &key_pair.private_key_path)
            .await?;

        let (spf_policy, dns_automated) = self
            .converge_dns(&domain_name, &hostname, &selector, &key_pair.public_key)
            .await;

        let status = if dns_automated {
            STATUS_ACTIVE
        } else {
            STATUS_PENDING
        };

        let row = domains::ActiveModel {
            workspace_id: Set(workspace_id),
            domain: Set(domain_name.clone()),
            hostname: Set(hostname),
            dkim_selector: Set(selector.clone()),
            dkim_private_path: Set(Some(key_pair.private_key_path.display().to_string())),
            dkim_public_key: Set(Some(key_pair.public_key.clone())),
            spf_policy: Set(spf_policy),
            dmarc_policy: Set(Some(records::dmarc_policy(&domain_name))),
            status: Set(status.to_string()),
            ..Default::default()
        };

        // Key material and possibly DNS records already exist at this point;
        // a failed insert leaves them for the operator to reconcile
        let domain = row.insert(self.db.as_ref()).await.map_err(|e| {
            error!(
                "Persisting domain {} failed after key material was created: {}",
                domain_name, e
            );
            DomainError::Database(e)
        })?;

        self.audit
            .record(
                workspace_id,
                &AuditEvent::DomainCreated {
                    domain_id: domain.id,
                    domain: domain.domain.clone(),
                    hostname: domain.hostname.clone(),
                    dkim_selector: domain.dkim_selector.clone(),
                    dns_automated,
                },
            )
            .await?;

        info!(
            "Domain {} provisioned with status {}",
            domain.domain, domain.status
        );

        Ok(domain)
    }

    /// Rotate the DKIM key for a domain
    ///
    /// Generates a fresh key under `new_selector` (or a timestamp-derived one
    /// when none is given) and switches signing over to it. The previous key
    /// file stays on disk so in-flight mail keeps verifying until its DNS
    /// record is retired. Only the selector and key fields change; the
    /// domain's status is whatever it was before the rotation.
    pub async fn rotate_dkim(
        &self,
        domain_id: i32,
        new_selector: Option<&str>,
    ) -> Result<domains::Model, DomainError> {
        let domain_name = self.get_domain_by_id(domain_id).await?.domain;

        let lock = self.locks.lock_for(&domain_name);
        let _guard = lock.lock().await;

        let existing = self.get_domain_by_id(domain_id).await?;
        let old_selector = existing.dkim_selector.clone();
        let new_selector = match new_selector {
            Some(selector) => {
                let selector = selector.to_lowercase();
                validate_selector(&selector)?;
                selector
            }
            None => next_selector(&old_selector),
        };

        info!(
            "Rotating DKIM for {}: {} -> {}",
            domain_name, old_selector, new_selector
        );

        let key_pair = self.dkim.ensure_key(&domain_name, &new_selector).await?;
        self.dkim
            .apply_selector(&domain_name, &new_selector, &key_pair.private_key_path)
            .await?;

        if let Some(dns) = &self.dns {
            let spec = DnsRecordSpec::txt(
                records::dkim_record_name(&domain_name, &new_selector),
                records::dkim_txt_value(&key_pair.public_key),
            );
            if let Err(e) = dns.upsert_record(&spec).await {
                warn!(
                    "DKIM record for {} not published, publish it manually: {}",
                    domain_name, e
                );
            }
        }

        let mut active: domains::ActiveModel = existing.into();
        active.dkim_selector = Set(new_selector.clone());
        active.dkim_private_path = Set(Some(key_pair.private_key_path.display().to_string()));
        active.dkim_public_key = Set(Some(key_pair.public_key.clone()));

        let domain = active.update(self.db.as_ref()).await?;

        self.audit
            .record(
                domain.workspace_id,
                &AuditEvent::DkimRotated {
                    domain_id: domain.id,
                    domain: domain.domain.clone(),
                    old_selector,
                    new_selector,
                },
            )
            .await?;

        Ok(domain)
    }

    /// Delete a domain
    ///
    /// Refused while mailboxes still reference it. DNS records and key
    /// material are left behind; removing them is an operator decision.
    pub async fn delete_domain(&self, domain_id: i32) -> Result<(), DomainError> {
        let domain_name = self.get_domain_by_id(domain_id).await?.domain;

        let lock = self.locks.lock_for(&domain_name);
        let _guard = lock.lock().await;

        let existing = self.get_domain_by_id(domain_id).await?;

        let mailbox_count = mailboxes::Entity::find()
            .filter(mailboxes::Column::DomainId.eq(existing.id))
            .count(self.db.as_ref())
            .await?;
        if mailbox_count > 0 {
            return Err(DomainError::HasMailboxes {
                domain: domain_name,
                mailboxes: mailbox_count,
            });
        }

        let workspace_id = existing.workspace_id;
        existing.delete(self.db.as_ref()).await?;

        self.audit
            .record(
                workspace_id,
                &AuditEvent::DomainDeleted {
                    domain_id,
                    domain: domain_name.clone(),
                },
            )
            .await?;

        info!("Domain {} deleted", domain_name);

        Ok(())
    }

    pub async fn get_domain(&self, domain: &str) -> Result<domains::Model, DomainError> {
        let domain_name = normalize_domain(domain);
        domains::Entity::find()
            .filter(domains::Column::Domain.eq(&domain_name))
            .one(self.db.as_ref())
            .await?
            .ok_or(DomainError::NotFound(domain_name))
    }

    pub async fn get_domain_by_id(&self, id: i32) -> Result<domains::Model, DomainError> {
        domains::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("domain id {}", id)))
    }

    pub async fn list_domains(&self, workspace_id: i32) -> Result<Vec<domains::Model>, DomainError> {
        let results = domains::Entity::find()
            .filter(domains::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(domains::Column::Domain)
            .all(self.db.as_ref())
            .await?;
        Ok(results)
    }

    /// The DNS records a domain needs, derived from its stored state
    ///
    /// This is what operators publish manually for `pending` domains.
    /// Records whose inputs were never resolved (e.g. SPF without a known
    /// public IP) are omitted.
    pub async fn expected_dns_records(
        &self,
        domain: &str,
    ) -> Result<Vec<DnsRecordSpec>, DomainError> {
        let model = self.get_domain(domain).await?;

        let mut specs = vec![DnsRecordSpec::mx(model.domain.clone(), model.hostname.clone())];
        if let Some(spf) = &model.spf_policy {
            specs.push(DnsRecordSpec::txt(model.domain.clone(), spf.clone()));
        }
        if let Some(public_key) = &model.dkim_public_key {
            specs.push(DnsRecordSpec::txt(
                records::dkim_record_name(&model.domain, &model.dkim_selector),
                records::dkim_txt_value(public_key),
            ));
        }
        if let Some(dmarc) = &model.dmarc_policy {
            specs.push(DnsRecordSpec::txt(format!("_dmarc.{}", model.domain), dmarc.clone()));
        }

        Ok(specs)
    }

    /// Best-effort DNS convergence for a new domain
    ///
    /// Returns the SPF policy (when the public IP could be resolved) and
    /// whether the full record set landed at the provider.
    async fn converge_dns(
        &self,
        domain_name: &str,
        hostname: &str,
        selector: &str,
        public_key: &str,
    ) -> (Option<String>, bool) {
        let public_ip = match self.ip_source.public_ip().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!(
                    "Public IP for {} could not be resolved, DNS left to the operator: {}",
                    domain_name, e
                );
                return (None, false);
            }
        };

        let spf = records::spf_policy(&public_ip, hostname);

        let Some(dns) = &self.dns else {
            return (Some(spf), false);
        };

        let set =
            records::domain_record_set(domain_name, hostname, &public_ip, selector, public_key);

        match dns.ensure_records(&set).await {
            Ok(handles) => {
                info!(
                    "Converged {} DNS record(s) for {}",
                    handles.len(),
                    domain_name
                );
                (Some(spf), true)
            }
            Err(e) => {
                warn!(
                    "DNS convergence for {} failed, domain degraded to pending: {}",
                    domain_name, e
                );
                (Some(spf), false)
            }
        }
    }
}

/// Next rotation selector, derived from the current UTC timestamp
fn next_selector(old: &str) -> String {
    let mut candidate = format!("m{}", Utc::now().format("%Y%m%d%H%M%S"));
    if candidate == old {
        candidate.push('r');
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mailforge_database::test_utils::{seed_workspace, TestDatabase};
    use mailforge_dkim::{DkimError, DkimKeyPair};
    use mailforge_dns::{DnsError, DnsRecordHandle};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct MockDkim {
        fail_keygen: bool,
        applied: Mutex<Vec<(String, String)>>,
    }

    impl MockDkim {
        fn new() -> Self {
            Self {
                fail_keygen: false,
                applied: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail_keygen: true,
                applied: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DkimProvisioner for MockDkim {
        async fn ensure_key(
            &self,
            domain: &str,
            selector: &str,
        ) -> Result<DkimKeyPair, DkimError> {
            if self.fail_keygen {
                return Err(DkimError::KeyGeneration {
                    domain: domain.to_string(),
                    selector: selector.to_string(),
                    message: "keygen unavailable".to_string(),
                });
            }
            Ok(DkimKeyPair {
                private_key_path: PathBuf::from(format!(
                    "/keys/{}/{}.private",
                    domain, selector
                )),
                public_key: format!("PK-{}-{}", domain, selector),
            })
        }

        async fn apply_selector(
            &self,
            domain: &str,
            selector: &str,
            _private_key_path: &Path,
        ) -> Result<(), DkimError> {
            self.applied
                .lock()
                .unwrap()
                .push((domain.to_string(), selector.to_string()));
            Ok(())
        }
    }

    struct MockDns {
        fail: bool,
        upserted: Mutex<Vec<DnsRecordSpec>>,
    }

    impl MockDns {
        fn new() -> Self {
            Self {
                fail: false,
                upserted: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                upserted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DnsAutomation for MockDns {
        async fn upsert_record(
            &self,
            spec: &DnsRecordSpec,
        ) -> Result<DnsRecordHandle, DnsError> {
            if self.fail {
                return Err(DnsError::ApiError("zone unavailable".to_string()));
            }
            self.upserted.lock().unwrap().push(spec.clone());
            Ok(DnsRecordHandle {
                id: format!("rec{}", self.upserted.lock().unwrap().len()),
                created: true,
            })
        }
    }

    struct MockIp {
        ip: Option<String>,
    }

    #[async_trait]
    impl PublicIpSource for MockIp {
        async fn public_ip(&self) -> Result<String, DnsError> {
            self.ip
                .clone()
                .ok_or_else(|| DnsError::IpResolution("no route".to_string()))
        }
    }

    struct Fixture {
        test_db: TestDatabase,
        workspace_id: i32,
        service: DomainService,
        dns: Arc<MockDns>,
    }

    async fn fixture(dkim: MockDkim, dns: Option<MockDns>, ip: Option<&str>) -> Fixture {
        let test_db = TestDatabase::with_migrations().await.unwrap();
        let workspace_id = seed_workspace(test_db.connection()).await.unwrap();
        let audit = Arc::new(AuditService::new(test_db.connection_arc()));

        let dns = Arc::new(dns.unwrap_or_else(MockDns::new));
        let service = DomainService::new(
            test_db.connection_arc(),
            Arc::new(dkim),
            Some(dns.clone() as Arc<dyn DnsAutomation>),
            Arc::new(MockIp {
                ip: ip.map(|s| s.to_string()),
            }),
            audit,
            "mail.example.com".to_string(),
        );

        Fixture {
            test_db,
            workspace_id,
            service,
            dns,
        }
    }

    async fn events_of_type(fx: &Fixture, event_type: &str) -> Vec<serde_json::Value> {
        use mailforge_entities::events;
        events::Entity::find()
            .filter(events::Column::EventType.eq(event_type))
            .all(fx.test_db.connection())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.payload)
            .collect()
    }

    #[tokio::test]
    async fn test_provision_happy_path() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let domain = fx
            .service
            .provision_domain(fx.workspace_id, "Example.COM", None, None)
            .await
            .unwrap();

        assert_eq!(domain.domain, "example.com");
        assert_eq!(domain.status, "active");
        assert_eq!(domain.dkim_selector, "mail");
        assert_eq!(
            domain.spf_policy.as_deref(),
            Some("v=spf1 ip4:203.0.113.9 a:mail.example.com ~all")
        );
        assert!(domain
            .dmarc_policy
            .as_deref()
            .unwrap()
            .starts_with("v=DMARC1; p=quarantine"));
        assert_eq!(
            domain.dkim_public_key.as_deref(),
            Some("PK-example.com-mail")
        );

        // All four records converged, MX first
        let upserted = fx.dns.upserted.lock().unwrap().clone();
        assert_eq!(upserted.len(), 4);
        assert_eq!(upserted[0].kind, mailforge_dns::DnsRecordKind::Mx);
        assert_eq!(upserted[2].name, "mail._domainkey.example.com");

        let payloads = events_of_type(&fx, "domain.created").await;
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["dns_automated"], true);
    }

    #[tokio::test]
    async fn test_hostname_override_flows_into_records() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let domain = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", Some("mx1.example.net"), None)
            .await
            .unwrap();

        assert_eq!(domain.hostname, "mx1.example.net");
        assert_eq!(
            domain.spf_policy.as_deref(),
            Some("v=spf1 ip4:203.0.113.9 a:mx1.example.net ~all")
        );

        let upserted = fx.dns.upserted.lock().unwrap().clone();
        assert_eq!(upserted[0].content, "mx1.example.net");
    }

    #[tokio::test]
    async fn test_duplicate_domain_rejected() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let first = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        let err = fx
            .service
            .provision_domain(fx.workspace_id, "EXAMPLE.com", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));

        // The first row is untouched
        let still = fx.service.get_domain("example.com").await.unwrap();
        assert_eq!(still.id, first.id);
        assert_eq!(still.dkim_public_key, first.dkim_public_key);

        let payloads = events_of_type(&fx, "domain.created").await;
        assert_eq!(payloads.len(), 1);
    }

    #[tokio::test]
    async fn test_dkim_failure_aborts_without_persisting() {
        let fx = fixture(MockDkim::failing(), None, Some("203.0.113.9")).await;

        let err = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Dkim(_)));

        assert!(matches!(
            fx.service.get_domain("example.com").await.unwrap_err(),
            DomainError::NotFound(_)
        ));
        assert!(events_of_type(&fx, "domain.created").await.is_empty());
    }

    #[tokio::test]
    async fn test_dns_failure_degrades_to_pending() {
        let fx = fixture(MockDkim::new(), Some(MockDns::failing()), Some("203.0.113.9")).await;

        let domain = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        assert_eq!(domain.status, "pending");
        // SPF was still computed for manual publication
        assert!(domain.spf_policy.is_some());

        let payloads = events_of_type(&fx, "domain.created").await;
        assert_eq!(payloads[0]["dns_automated"], false);
    }

    #[tokio::test]
    async fn test_unresolvable_ip_degrades_to_pending_without_spf() {
        let fx = fixture(MockDkim::new(), None, None).await;

        let domain = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        assert_eq!(domain.status, "pending");
        assert!(domain.spf_policy.is_none());
        assert!(fx.dns.upserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_dns_provider_means_pending_with_policies() {
        let test_db = TestDatabase::with_migrations().await.unwrap();
        let workspace_id = seed_workspace(test_db.connection()).await.unwrap();
        let service = DomainService::new(
            test_db.connection_arc(),
            Arc::new(MockDkim::new()),
            None,
            Arc::new(MockIp {
                ip: Some("203.0.113.9".to_string()),
            }),
            Arc::new(AuditService::new(test_db.connection_arc())),
            "mail.example.com".to_string(),
        );

        let domain = service
            .provision_domain(workspace_id, "example.com", None, None)
            .await
            .unwrap();

        assert_eq!(domain.status, "pending");
        assert!(domain.spf_policy.is_some());
        assert!(domain.dmarc_policy.is_some());
    }

    #[tokio::test]
    async fn test_invalid_domain_rejected() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let err = fx
            .service
            .provision_domain(fx.workspace_id, "not a domain", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rotate_dkim_switches_selector_and_key() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let before = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        let after = fx
            .service
            .rotate_dkim(before.id, Some("mail2"))
            .await
            .unwrap();

        assert_eq!(after.dkim_selector, "mail2");
        assert_ne!(after.dkim_public_key, before.dkim_public_key);
        assert_ne!(after.dkim_private_path, before.dkim_private_path);
        assert_eq!(after.status, "active");

        let payloads = events_of_type(&fx, "domain.dkim_rotated").await;
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["old_selector"], "mail");
        assert_eq!(payloads[0]["new_selector"], "mail2");

        // The new selector's TXT record was pushed
        let upserted = fx.dns.upserted.lock().unwrap().clone();
        let last = upserted.last().unwrap();
        assert_eq!(
            last.name,
            format!("{}._domainkey.example.com", after.dkim_selector)
        );
    }

    #[tokio::test]
    async fn test_rotate_unknown_domain_is_not_found() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let err = fx
            .service
            .rotate_dkim(424242, Some("mail2"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rotate_without_selector_derives_one() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let domain = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        let after = fx.service.rotate_dkim(domain.id, None).await.unwrap();
        assert_ne!(after.dkim_selector, "mail");
        assert!(after.dkim_selector.starts_with('m'));
    }

    #[tokio::test]
    async fn test_rotation_leaves_domain_status_alone() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let domain = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        let mut suspended: domains::ActiveModel = domain.clone().into();
        suspended.status = Set("suspended".to_string());
        suspended.update(fx.test_db.connection()).await.unwrap();

        let after = fx
            .service
            .rotate_dkim(domain.id, Some("mail2"))
            .await
            .unwrap();

        assert_eq!(after.dkim_selector, "mail2");
        assert_eq!(after.status, "suspended");
    }

    #[tokio::test]
    async fn test_delete_refused_while_mailboxes_exist() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let domain = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        mailboxes::ActiveModel {
            workspace_id: Set(fx.workspace_id),
            domain_id: Set(domain.id),
            local_part: Set("alice".to_string()),
            password_hash: Set("hash".to_string()),
            quota_mb: Set(1024),
            status: Set("active".to_string()),
            ..Default::default()
        }
        .insert(fx.test_db.connection())
        .await
        .unwrap();

        let err = fx.service.delete_domain(domain.id).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::HasMailboxes { mailboxes: 1, .. }
        ));
        assert!(fx.service.get_domain("example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_removes_domain_and_records_event() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        let domain = fx
            .service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        fx.service.delete_domain(domain.id).await.unwrap();

        assert!(matches!(
            fx.service.get_domain("example.com").await.unwrap_err(),
            DomainError::NotFound(_)
        ));
        assert_eq!(events_of_type(&fx, "domain.deleted").await.len(), 1);
    }

    #[tokio::test]
    async fn test_expected_dns_records_for_provisioned_domain() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        fx.service
            .provision_domain(fx.workspace_id, "example.com", None, None)
            .await
            .unwrap();

        let specs = fx
            .service
            .expected_dns_records("example.com")
            .await
            .unwrap();

        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].content, "mail.example.com");
        assert!(specs[1].content.starts_with("v=spf1 "));
        assert!(specs[2].content.starts_with("v=DKIM1; "));
        assert_eq!(specs[3].name, "_dmarc.example.com");
    }

    #[tokio::test]
    async fn test_list_domains_scoped_to_workspace() {
        let fx = fixture(MockDkim::new(), None, Some("203.0.113.9")).await;

        fx.service
            .provision_domain(fx.workspace_id, "b.example.com", None, None)
            .await
            .unwrap();
        fx.service
            .provision_domain(fx.workspace_id, "a.example.com", None, None)
            .await
            .unwrap();

        let listed = fx.service.list_domains(fx.workspace_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].domain, "a.example.com");

        let other = fx.service.list_domains(fx.workspace_id + 1).await.unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_next_selector_never_repeats_current() {
        let candidate = next_selector("mail");
        assert_ne!(candidate, "mail");
        assert_ne!(next_selector(&candidate), candidate);
    }
}
