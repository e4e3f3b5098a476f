//! DNS automation error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DnsError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not determine public IP: {0}")]
    IpResolution(String),
}
