//! DKIM provisioning error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DkimError {
    #[error("Key generation failed for {domain}/{selector}: {message}")]
    KeyGeneration {
        domain: String,
        selector: String,
        message: String,
    },

    #[error("Could not extract public key for {domain}/{selector}: {message}")]
    KeyExtraction {
        domain: String,
        selector: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
