//! Input validation for provisioning requests
//!
//! All checks run before any side effect; a rejected input leaves no trace.

use thiserror::Error;

/// Local parts that must never become user mailboxes. RFC 2142 role
/// addresses plus the aliases every mail stack reserves for itself.
const RESERVED_LOCAL_PARTS: &[&str] = &[
    "postmaster",
    "abuse",
    "mailer-daemon",
    "hostmaster",
    "webmaster",
    "admin",
    "administrator",
    "root",
    "noreply",
    "no-reply",
];

pub const MAX_LOCAL_PART_LEN: usize = 64;
pub const MAX_DOMAIN_LEN: usize = 253;
pub const MAX_LABEL_LEN: usize = 63;
pub const MIN_QUOTA_MB: i32 = 1;
pub const MAX_QUOTA_MB: i32 = 100_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("Invalid DKIM selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid local part: {0}")]
    InvalidLocalPart(String),

    #[error("Local part '{0}' is reserved")]
    ReservedLocalPart(String),

    #[error("Quota must be between {MIN_QUOTA_MB} and {MAX_QUOTA_MB} MB, got {0}")]
    InvalidQuota(i32),
}

/// Normalize a domain name for storage and comparison
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Validate an RFC-1035 domain name (at least two labels, no wildcards)
pub fn validate_domain(domain: &str) -> Result<(), ValidationError> {
    let err = || ValidationError::InvalidDomain(domain.to_string());

    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN {
        return Err(err());
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(err());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(err());
    }

    for label in labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(err());
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(err());
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(err());
        }
    }

    Ok(())
}

/// Validate a DKIM selector: lowercase alphanumeric/hyphen, at most 63
/// characters, no leading or trailing hyphen
pub fn validate_selector(selector: &str) -> Result<(), ValidationError> {
    let err = || ValidationError::InvalidSelector(selector.to_string());

    if selector.is_empty() || selector.len() > MAX_LABEL_LEN {
        return Err(err());
    }
    if !selector
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(err());
    }
    if selector.starts_with('-') || selector.ends_with('-') {
        return Err(err());
    }

    Ok(())
}

/// Validate a mailbox local part against the RFC-5321 subset we accept
///
/// ASCII letters/digits plus `.`, `_`, `-`, `+`; at most 64 characters; no
/// leading, trailing, or consecutive dots; not a reserved role address.
pub fn validate_local_part(local_part: &str) -> Result<(), ValidationError> {
    let err = || ValidationError::InvalidLocalPart(local_part.to_string());

    if local_part.is_empty() || local_part.len() > MAX_LOCAL_PART_LEN {
        return Err(err());
    }
    if !local_part
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'))
    {
        return Err(err());
    }
    if local_part.starts_with('.') || local_part.ends_with('.') {
        return Err(err());
    }
    if local_part.contains("..") {
        return Err(err());
    }

    let lowered = local_part.to_ascii_lowercase();
    if RESERVED_LOCAL_PARTS.contains(&lowered.as_str()) {
        return Err(ValidationError::ReservedLocalPart(local_part.to_string()));
    }

    Ok(())
}

/// Validate a mailbox quota in megabytes
pub fn validate_quota_mb(quota_mb: i32) -> Result<(), ValidationError> {
    if !(MIN_QUOTA_MB..=MAX_QUOTA_MB).contains(&quota_mb) {
        return Err(ValidationError::InvalidQuota(quota_mb));
    }
    Ok(())
}
