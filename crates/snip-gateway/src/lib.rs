//! HTTP gateway for the Snip URL shortener.
//!
//! A thin adapter: it validates requests, calls a [`Shortener`](snip_core::Shortener)
//! and maps the outcome onto HTTP.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
