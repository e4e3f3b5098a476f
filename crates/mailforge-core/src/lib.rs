//! Core utilities and types shared across all Mailforge crates

pub mod settings;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use settings::*;
pub use types::*;
pub use validation::*;

// Re-export external dependencies
pub use anyhow;
pub use chrono;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;
