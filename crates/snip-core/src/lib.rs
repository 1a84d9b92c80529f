//! Core types and traits for the Snip URL shortener.
//!
//! This crate provides the pure building blocks (token codec, URL
//! fingerprinting, the detail record) and the traits the link store is
//! built on and invoked through.

pub mod backend;
pub mod base62;
pub mod detail;
pub mod error;
pub mod fingerprint;
pub mod shortcode;
pub mod shortener;

pub use backend::KvBackend;
pub use detail::LinkDetail;
pub use error::{CoreError, ShortenerError, StorageError};
pub use fingerprint::Fingerprint;
pub use shortcode::ShortCode;
pub use shortener::{ExpirationPolicy, ShortenParams, Shortener, MAX_EXPIRATION_MINUTES};
