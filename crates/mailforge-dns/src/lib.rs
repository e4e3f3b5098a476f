//! DNS automation for mail domains
//!
//! - [`records`]: derives the MX/SPF/DKIM/DMARC record set a domain needs.
//! - [`CloudflareDns`]: converges those records in a Cloudflare zone.
//! - [`PublicIpResolver`]: finds the server's public IPv4 for SPF.
//!
//! The domain orchestrator consumes the [`DnsAutomation`] and
//! [`PublicIpSource`] traits so DNS stays an optional, swappable dependency.

mod cloudflare;
mod errors;
mod ip;
pub mod records;
mod traits;

pub use cloudflare::CloudflareDns;
pub use errors::DnsError;
pub use ip::PublicIpResolver;
pub use records::{DnsRecordKind, DnsRecordSpec, MX_PRIORITY, RECORD_TTL};
pub use traits::{DnsAutomation, DnsRecordHandle, PublicIpSource};
