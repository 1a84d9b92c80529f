mod health;
mod link;

pub use health::health_handler;
pub use link::{info_handler, redirect_handler, shorten_handler};
