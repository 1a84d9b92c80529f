//! The Snip link store.
//!
//! [`LinkStore`] implements [`Shortener`](snip_core::Shortener) on top of any
//! [`KvBackend`](snip_core::KvBackend). Core types are re-exported from `snip_core`.

pub mod keys;
pub mod service;

pub use service::LinkStore;
pub use snip_core::{
    ExpirationPolicy, LinkDetail, ShortCode, ShortenParams, Shortener, ShortenerError,
};
