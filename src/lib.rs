pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod handlers;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::ServiceConfig;
pub use crate::core::{email::extract_email, processor::WebhookProcessor};
pub use crate::server::{create_router, start_server, AppState};
pub use crate::utils::error::{BridgeError, Result};
