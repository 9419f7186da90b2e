//! HTTP request handlers.
//!
//! - `webhook` - SurveyMonkey notification intake
//! - `health` - static liveness and health probes

pub mod health;
pub mod webhook;

pub use health::{health_check, root};
pub use webhook::handle_surveymonkey;
