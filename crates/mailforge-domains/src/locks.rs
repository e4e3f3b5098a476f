//! Per-domain provisioning locks
//!
//! Provisioning touches state outside the database transaction (key files,
//! signing tables, DNS), so concurrent operations on the same domain are
//! serialized. Different domains proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;

#[derive(Default, Clone)]
pub struct DomainLocks {
    inner: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl DomainLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for a normalized domain name
    pub fn lock_for(&self, domain: &str) -> Arc<Mutex<()>> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        map.entry(domain.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_domain_shares_a_lock() {
        let locks = DomainLocks::new();
        let a = locks.lock_for("example.com");
        let b = locks.lock_for("example.com");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_domains_get_different_locks() {
        let locks = DomainLocks::new();
        let a = locks.lock_for("example.com");
        let b = locks.lock_for("other.org");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_lock_serializes_access() {
        let locks = DomainLocks::new();
        let lock = locks.lock_for("example.com");

        let guard = lock.lock().await;
        assert!(locks.lock_for("example.com").try_lock().is_err());
        drop(guard);
        assert!(locks.lock_for("example.com").try_lock().is_ok());
    }
}
