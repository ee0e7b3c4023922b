//! Configuration management module
//!
//! Environment settings for the API connection and optional route overrides
//! loaded from a JSON file

pub mod file;
pub mod settings;

pub use file::GatewayConfig;
pub use settings::{ApiConfig, LoggingConfig, Settings};
