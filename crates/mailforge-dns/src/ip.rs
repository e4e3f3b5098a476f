//! Public IP resolution
//!
//! Tries a list of plain-text IP echo services in order, then falls back to
//! reading the local address of a UDP socket pointed at a public resolver.
//! The fallback yields the machine's outbound interface address, which on a
//! directly addressed mail host is the public IP.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::DnsError;
use crate::traits::PublicIpSource;

const IP_ENDPOINTS: &[&str] = &[
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://icanhazip.com",
];

const ENDPOINT_TIMEOUT: Duration = Duration::from_secs(5);

/// Address the fallback socket connects to; no traffic is actually sent
const FALLBACK_TARGET: &str = "8.8.8.8:80";

pub struct PublicIpResolver {
    client: reqwest::Client,
    endpoints: Vec<String>,
    use_socket_fallback: bool,
}

impl PublicIpResolver {
    pub fn new() -> Result<Self, DnsError> {
        Self::with_endpoints(
            IP_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            true,
        )
    }

    /// Resolver with custom endpoints; used by tests to avoid the network
    pub fn with_endpoints(
        endpoints: Vec<String>,
        use_socket_fallback: bool,
    ) -> Result<Self, DnsError> {
        let client = reqwest::Client::builder().timeout(ENDPOINT_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoints,
            use_socket_fallback,
        })
    }

    async fn query_endpoint(&self, endpoint: &str) -> Result<String, String> {
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        let candidate = body.trim();

        // Echo services return the bare address; SPF needs the v4 one, so
        // v6-only responses fall through to the next endpoint
        candidate
            .parse::<Ipv4Addr>()
            .map(|ip| ip.to_string())
            .map_err(|e| format!("not an IPv4 address {:?}: {}", candidate, e))
    }

    async fn socket_fallback(&self) -> Result<String, String> {
        let socket = tokio::net::UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| e.to_string())?;
        socket
            .connect(FALLBACK_TARGET)
            .await
            .map_err(|e| e.to_string())?;
        let local = socket.local_addr().map_err(|e| e.to_string())?;
        Ok(local.ip().to_string())
    }
}

#[async_trait]
impl PublicIpSource for PublicIpResolver {
    async fn public_ip(&self) -> Result<String, DnsError> {
        for endpoint in &self.endpoints {
            match self.query_endpoint(endpoint).await {
                Ok(ip) => {
                    debug!("Resolved public IP {} via {}", ip, endpoint);
                    return Ok(ip);
                }
                Err(e) => {
                    warn!("IP endpoint {} failed: {}", endpoint, e);
                }
            }
        }

        if self.use_socket_fallback {
            match self.socket_fallback().await {
                Ok(ip) => {
                    debug!("Resolved outbound IP {} via socket fallback", ip);
                    return Ok(ip);
                }
                Err(e) => {
                    warn!("Socket fallback failed: {}", e);
                }
            }
        }

        Err(DnsError::IpResolution(
            "all IP services and the socket fallback failed".to_string(),
        ))
    }
}
