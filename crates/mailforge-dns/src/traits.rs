//! Provider-facing traits consumed by the domain orchestrator

use async_trait::async_trait;

use crate::errors::DnsError;
use crate::records::DnsRecordSpec;

/// Outcome of a single upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecordHandle {
    /// Provider-side record id
    pub id: String,
    /// True if the record was created, false if an existing one was updated
    pub created: bool,
}

/// A DNS provider capable of converging records to a desired state
#[async_trait]
pub trait DnsAutomation: Send + Sync {
    /// Create the record if absent, otherwise overwrite the existing one
    async fn upsert_record(&self, spec: &DnsRecordSpec) -> Result<DnsRecordHandle, DnsError>;

    /// Upsert a record set in order, stopping at the first failure
    async fn ensure_records(
        &self,
        records: &[DnsRecordSpec],
    ) -> Result<Vec<DnsRecordHandle>, DnsError> {
        let mut handles = Vec::with_capacity(records.len());
        for spec in records {
            handles.push(self.upsert_record(spec).await?);
        }
        Ok(handles)
    }
}

/// Source of the server's public IPv4 address
#[async_trait]
pub trait PublicIpSource: Send + Sync {
    async fn public_ip(&self) -> Result<String, DnsError>;
}
