//! DKIM key provisioning and signing-daemon configuration
//!
//! Two concerns live here:
//!
//! - [`DkimKeystore`]: generates and persists per-(domain, selector) RSA key
//!   pairs and exposes the public half in the form a DKIM TXT record needs.
//! - [`SigningTableManager`]: maintains the OpenDKIM KeyTable/SigningTable
//!   mapping and reloads the daemon after updates.
//!
//! [`DkimService`] combines both behind the [`DkimProvisioner`] trait that
//! the domain orchestrator consumes.

mod errors;
mod keystore;
mod service;
mod tables;

pub use errors::DkimError;
pub use keystore::{DkimKeyPair, DkimKeystore};
pub use service::{DkimProvisioner, DkimService};
pub use tables::SigningTableManager;
