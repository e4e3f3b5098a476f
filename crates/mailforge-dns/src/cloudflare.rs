//! Cloudflare DNS automation
//!
//! Talks to the Cloudflare v4 API with a zone-scoped token. Records are
//! converged by name and type: an upsert first lists matching records in the
//! zone and then either updates the match in place or creates a new record.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use async_trait::async_trait;
use mailforge_core::settings::CloudflareSettings;

use crate::errors::DnsError;
use crate::records::DnsRecordSpec;
use crate::traits::{DnsAutomation, DnsRecordHandle};

const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";

pub struct CloudflareDns {
    client: Client,
    api_token: String,
    zone_id: String,
    base_url: String,
}

/// Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct CfEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CfApiError>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CfApiError {
    code: i64,
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CfRecord {
    id: String,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    #[allow(dead_code)]
    content: String,
    #[allow(dead_code)]
    ttl: u32,
}

#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<u16>,
}

impl<'a> RecordPayload<'a> {
    fn from_spec(spec: &'a DnsRecordSpec) -> Self {
        Self {
            record_type: spec.kind.as_str(),
            name: &spec.name,
            content: &spec.content,
            ttl: spec.ttl,
            priority: spec.priority,
        }
    }
}

impl CloudflareDns {
    pub fn new(settings: &CloudflareSettings) -> Result<Self, DnsError> {
        Self::with_base_url(settings, CF_API_BASE.to_string())
    }

    /// Create a client against a custom API endpoint (for testing)
    pub fn with_base_url(
        settings: &CloudflareSettings,
        base_url: String,
    ) -> Result<Self, DnsError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_token: settings.api_token.clone(),
            zone_id: settings.zone_id.clone(),
            base_url,
        })
    }

    async fn api_request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T, DnsError> {
        let url = format!("{}{}", self.base_url, path);

        debug!("Cloudflare API request: {} {}", method, path);

        let mut request = match method {
            "GET" => self.client.get(&url),
            "POST" => self.client.post(&url),
            "PUT" => self.client.put(&url),
            _ => {
                return Err(DnsError::ApiError(format!(
                    "Unsupported method: {}",
                    method
                )))
            }
        };

        request = request
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        let body_text = response.text().await?;

        let envelope: CfEnvelope<T> = serde_json::from_str(&body_text)?;

        if !status.is_success() || !envelope.success {
            let detail = envelope
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DnsError::ApiError(format!(
                "Cloudflare API error (status {}): {}",
                status,
                if detail.is_empty() { body_text } else { detail }
            )));
        }

        envelope
            .result
            .ok_or_else(|| DnsError::ApiError("Response envelope missing result".to_string()))
    }

    /// Find an existing record in the zone by type and fully qualified name
    async fn find_record(
        &self,
        record_type: &str,
        name: &str,
    ) -> Result<Option<CfRecord>, DnsError> {
        let path = format!(
            "/zones/{}/dns_records?type={}&name={}",
            self.zone_id, record_type, name
        );
        let records: Vec<CfRecord> = self.api_request("GET", &path, None::<&()>).await?;
        Ok(records.into_iter().next())
    }

    async fn create_record(&self, spec: &DnsRecordSpec) -> Result<CfRecord, DnsError> {
        let path = format!("/zones/{}/dns_records", self.zone_id);
        self.api_request("POST", &path, Some(&RecordPayload::from_spec(spec)))
            .await
    }

    async fn update_record(&self, record_id: &str, spec: &DnsRecordSpec) -> Result<CfRecord, DnsError> {
        let path = format!("/zones/{}/dns_records/{}", self.zone_id, record_id);
        self.api_request("PUT", &path, Some(&RecordPayload::from_spec(spec)))
            .await
    }
}

#[async_trait]
impl DnsAutomation for CloudflareDns {
    async fn upsert_record(&self, spec: &DnsRecordSpec) -> Result<DnsRecordHandle, DnsError> {
        let existing = self.find_record(spec.kind.as_str(), &spec.name).await?;

        match existing {
            Some(record) => {
                let updated = self.update_record(&record.id, spec).await?;
                info!(
                    "Updated {} record {} in zone {}",
                    updated.record_type, updated.name, self.zone_id
                );
                Ok(DnsRecordHandle {
                    id: updated.id,
                    created: false,
                })
            }
            None => {
                let created = self.create_record(spec).await?;
                info!(
                    "Created {} record {} in zone {}",
                    created.record_type, created.name, self.zone_id
                );
                Ok(DnsRecordHandle {
                    id: created.id,
                    created: true,
                })
            }
        }
    }
}
