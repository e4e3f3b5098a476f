//! Shared type aliases used across Mailforge crates

use chrono::{DateTime as ChronoDateTime, Utc};

/// Standard datetime type for database columns
///
/// All entity timestamp columns use this alias so the backing type can be
/// swapped in one place.
///
/// ```ignore
/// use mailforge_core::DBDateTime;
///
/// pub struct Model {
///     pub created_at: DBDateTime,
/// }
/// ```
pub type DBDateTime = ChronoDateTime<Utc>;

/// Standard datetime type for service-layer values
pub type UtcDateTime = ChronoDateTime<Utc>;
