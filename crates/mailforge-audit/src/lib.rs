//! Append-only audit trail for provisioning operations
//!
//! Events are written after each successful orchestration step that changes
//! durable state. The core never mutates or deletes them.

mod events;
mod service;

pub use events::AuditEvent;
pub use service::AuditService;
