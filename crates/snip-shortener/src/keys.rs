//! Persisted key layout.
//!
//! These names are shared with existing deployments and must not change.

use snip_core::{Fingerprint, ShortCode};

/// The global counter every new short code is minted from.
pub const URL_ID_KEY: &str = "next.url.id";

/// Forward mapping: short code -> original URL.
pub fn short_link_key(code: &ShortCode) -> String {
    format!("shortLink:{code}:url")
}

/// Dedup mapping: URL fingerprint -> short code.
pub fn url_hash_key(fingerprint: &Fingerprint) -> String {
    format!("urlHash:{fingerprint}:url")
}

/// Detail record: short code -> JSON [`LinkDetail`](snip_core::LinkDetail).
pub fn short_link_detail_key(code: &ShortCode) -> String {
    format!("shortLink:{code}:detail")
}
