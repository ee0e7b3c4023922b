//! Bakery Gateway Library
//!
//! Client wrapper for the bakery storefront REST API. Every remote call
//! resolves to the unwrapped response data or a normalized error.

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{GatewayConfig, Settings};
pub use models::{Credential, ListQuery, MultipartPayload, Page, Payload, RequestDescriptor};
pub use services::{ApiGateway, HttpTransport, Operation, Resource, ResourceClient, RouteTable, Transport};
pub use utils::error::{ApiError, ApiResult, AppError, AppResult, NormalizedError};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
