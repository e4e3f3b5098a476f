//! Domain provisioning orchestration
//!
//! [`DomainService`] drives the full lifecycle of a mail domain: DKIM key
//! material, signing-daemon activation, DNS convergence, persistence and the
//! audit trail. It consumes the DKIM and DNS crates through traits so tests
//! and alternative providers can slot in.

mod errors;
mod locks;
mod service;

pub use errors::DomainError;
pub use locks::DomainLocks;
pub use service::{DomainService, DEFAULT_SELECTOR, STATUS_ACTIVE, STATUS_PENDING};
