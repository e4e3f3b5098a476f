//! Mail record set derivation
//!
//! Pure functions that compute the DNS records a mail domain needs from its
//! provisioning inputs. No network access here; providers consume the specs.

use serde::Serialize;

/// TTL applied to every provisioned mail record, in seconds
pub const RECORD_TTL: u32 = 300;

/// Priority of the provisioned MX record
pub const MX_PRIORITY: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DnsRecordKind {
    Mx,
    Txt,
}

impl DnsRecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DnsRecordKind::Mx => "MX",
            DnsRecordKind::Txt => "TXT",
        }
    }
}

/// One record to be upserted at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecordSpec {
    pub kind: DnsRecordKind,
    /// Fully qualified record name
    pub name: String,
    pub content: String,
    pub ttl: u32,
    /// MX only
    pub priority: Option<u16>,
}

impl DnsRecordSpec {
    pub fn mx(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: DnsRecordKind::Mx,
            name: name.into(),
            content: target.into(),
            ttl: RECORD_TTL,
            priority: Some(MX_PRIORITY),
        }
    }

    pub fn txt(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: DnsRecordKind::Txt,
            name: name.into(),
            content: content.into(),
            ttl: RECORD_TTL,
            priority: None,
        }
    }
}

/// SPF policy authorizing the server IP and hostname to send for the domain
pub fn spf_policy(public_ip: &str, hostname: &str) -> String {
    format!("v=spf1 ip4:{} a:{} ~all", public_ip, hostname)
}

/// DMARC quarantine policy with aggregate and forensic reports delivered to
/// a dmarc@ mailbox on the domain itself
pub fn dmarc_policy(domain: &str) -> String {
    format!(
        "v=DMARC1; p=quarantine; rua=mailto:dmarc@{}; ruf=mailto:dmarc@{}; fo=1; pct=100; aspf=r; adkim=r",
        domain, domain
    )
}

/// TXT value publishing a DKIM public key
pub fn dkim_txt_value(public_key: &str) -> String {
    format!("v=DKIM1; k=rsa; p={}", public_key)
}

/// Record name the DKIM TXT lives at
pub fn dkim_record_name(domain: &str, selector: &str) -> String {
    format!("{}._domainkey.{}", selector, domain)
}

/// The full record set for a mail domain, in provisioning order:
/// MX, then SPF, then DKIM, then DMARC
pub fn domain_record_set(
    domain: &str,
    hostname: &str,
    public_ip: &str,
    selector: &str,
    dkim_public_key: &str,
) -> Vec<DnsRecordSpec> {
    vec![
        DnsRecordSpec::mx(domain, hostname),
        DnsRecordSpec::txt(domain, spf_policy(public_ip, hostname)),
        DnsRecordSpec::txt(
            dkim_record_name(domain, selector),
            dkim_txt_value(dkim_public_key),
        ),
        DnsRecordSpec::txt(format!("_dmarc.{}", domain), dmarc_policy(domain)),
    ]
}
