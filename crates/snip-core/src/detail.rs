use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Metadata recorded for a shortening event.
///
/// Stored as JSON next to the forward mapping and returned by info queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDetail {
    /// The original URL that was shortened.
    pub url: String,
    /// When the short link was minted.
    pub created_at: Timestamp,
    /// The lifetime requested at creation; `0` means the link never expires.
    pub expiration_in_minutes: u64,
}
