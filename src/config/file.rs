//! File-based configuration loading
//!
//! Loads per-resource route overrides from a JSON file

use crate::services::resources::{Operation, Resource, RouteTable};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Route overrides loaded from JSON
///
/// ```json
/// { "routes": { "user": { "create": "/user/sign-up" } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Resource name -> operation name -> path template
    #[serde(default)]
    pub routes: HashMap<String, HashMap<String, String>>,
}

impl GatewayConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading route configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: GatewayConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config JSON")?;

        config.route_table()?;

        debug!("Loaded route overrides for {} resources", config.routes.len());
        Ok(config)
    }

    /// Candidate locations, in search order
    ///
    /// 1. ~/.config/bakery-gateway/routes.json
    /// 2. ./bakery-gateway.json
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("bakery-gateway").join("routes.json"));
        }
        paths.push(PathBuf::from("bakery-gateway.json"));
        paths
    }

    /// Load the first existing default file, or the empty configuration
    pub fn load_default() -> Result<Self> {
        for path in Self::default_paths() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        debug!("No route configuration file found, using default routes");
        Ok(Self::default())
    }

    /// Build and validate the route table
    pub fn route_table(&self) -> Result<RouteTable> {
        let mut table = RouteTable::new();
        for (resource_name, operations) in &self.routes {
            let resource: Resource = resource_name
                .parse()
                .with_context(|| format!("Invalid route configuration for '{}'", resource_name))?;

            for (operation_name, template) in operations {
                let operation: Operation = operation_name.parse().with_context(|| {
                    format!("Invalid route configuration for '{}'", resource_name)
                })?;
                table.set(resource, operation, template.clone())?;
            }
        }
        Ok(table)
    }
}
