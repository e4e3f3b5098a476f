//! Typed audit events emitted by the provisioning orchestrators

use serde::Serialize;
use serde_json::json;

/// One provisioning action worth recording
///
/// The variant determines the event type tag; the fields become the
/// structured payload.
#[derive(Debug, Clone, Serialize)]
pub enum AuditEvent {
    DomainCreated {
        domain_id: i32,
        domain: String,
        hostname: String,
        dkim_selector: String,
        dns_automated: bool,
    },
    DkimRotated {
        domain_id: i32,
        domain: String,
        old_selector: String,
        new_selector: String,
    },
    DomainDeleted {
        domain_id: i32,
        domain: String,
    },
    MailboxCreated {
        mailbox_id: i32,
        email: String,
        quota_mb: i32,
    },
    MailboxPasswordChanged {
        mailbox_id: i32,
        email: String,
    },
    MailboxDeleted {
        email: String,
    },
}

impl AuditEvent {
    /// Dotted event type tag stored in the events table
    pub fn event_type(&self) -> &'static str {
        match self {
            AuditEvent::DomainCreated { .. } => "domain.created",
            AuditEvent::DkimRotated { .. } => "domain.dkim_rotated",
            AuditEvent::DomainDeleted { .. } => "domain.deleted",
            AuditEvent::MailboxCreated { .. } => "mailbox.created",
            AuditEvent::MailboxPasswordChanged { .. } => "mailbox.password_changed",
            AuditEvent::MailboxDeleted { .. } => "mailbox.deleted",
        }
    }

    /// Structured payload stored alongside the type tag
    pub fn payload(&self) -> serde_json::Value {
        match self {
            AuditEvent::DomainCreated {
                domain_id,
                domain,
                hostname,
                dkim_selector,
                dns_automated,
            } => json!({
                "domain_id": domain_id,
                "domain": domain,
                "hostname": hostname,
                "dkim_selector": dkim_selector,
                "dns_automated": dns_automated,
            }),
            AuditEvent::DkimRotated {
                domain_id,
                domain,
                old_selector,
                new_selector,
            } => json!({
                "domain_id": domain_id,
                "domain": domain,
                "old_selector": old_selector,
                "new_selector": new_selector,
            }),
            AuditEvent::DomainDeleted { domain_id, domain } => json!({
                "domain_id": domain_id,
                "domain": domain,
            }),
            AuditEvent::MailboxCreated {
                mailbox_id,
                email,
                quota_mb,
            } => json!({
                "mailbox_id": mailbox_id,
                "email": email,
                "quota_mb": quota_mb,
            }),
            AuditEvent::MailboxPasswordChanged { mailbox_id, email } => json!({
                "mailbox_id": mailbox_id,
                "email": email,
            }),
            AuditEvent::MailboxDeleted { email } => json!({
                "email": email,
            }),
        }
    }
}
