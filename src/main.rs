//! Bakery Gateway CLI
//!
//! Issues one operation against the bakery REST API and prints the
//! unwrapped data, or the normalized error on failure

use anyhow::{Context, Result};
use bakery_gateway::config::{GatewayConfig, Settings};
use bakery_gateway::models::SortOrder;
use bakery_gateway::utils::logging::init_logging;
use bakery_gateway::{
    ApiGateway, ApiResult, Credential, ListQuery, MultipartPayload, Payload, Resource,
};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "bakery-gateway", version, about = "Call the bakery storefront REST API")]
struct Cli {
    /// Bearer token attached as `Authorization: Bearer <token>`
    #[arg(long, env = "BAKERY_API_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// JSON file with route overrides
    #[arg(long, global = true)]
    routes: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a record
    Create {
        resource: Resource,
        /// JSON object body
        #[arg(long)]
        data: Option<String>,
        /// Attach a file as FIELD=PATH (switches to a multipart body)
        #[arg(long = "file", value_name = "FIELD=PATH")]
        files: Vec<String>,
    },
    /// List records
    List {
        resource: Resource,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        /// Field to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Fetch one record
    Detail { resource: Resource, id: String },
    /// Update a record
    Update {
        resource: Resource,
        id: String,
        #[arg(long)]
        data: Option<String>,
        #[arg(long = "file", value_name = "FIELD=PATH")]
        files: Vec<String>,
    },
    /// Delete one or more records
    Delete {
        resource: Resource,
        #[arg(required = true)]
        ids: Vec<String>,
        /// Send a single delete-many call instead of one call per id
        #[arg(long)]
        many: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::new().context("Failed to load settings")?;
    init_logging(&settings.logging)?;
    debug!("Settings loaded: {}", settings.api.base_url);

    let routes = match &cli.routes {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::load_default()?,
    }
    .route_table()?;

    let gateway = ApiGateway::from_settings(&settings)
        .context("Failed to create HTTP client")?
        .with_routes(routes);
    let credential = cli.token.map(Credential::new);
    let credential = credential.as_ref();

    let outcome: ApiResult<Value> = match cli.command {
        Command::Create { resource, data, files } => {
            let payload = build_payload(data.as_deref(), &files).await?;
            gateway.resource(resource).create(payload, credential).await
        }
        Command::List { resource, page, limit, search, sort, desc } => {
            let mut query = ListQuery::new();
            query.page = page;
            query.limit = limit;
            query.search = search;
            if let Some(field) = sort {
                let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
                query = query.sort(field, order);
            }
            gateway.resource(resource).list(&query, credential).await
        }
        Command::Detail { resource, id } => gateway.resource(resource).detail(&id, credential).await,
        Command::Update { resource, id, data, files } => {
            let payload = build_payload(data.as_deref(), &files).await?;
            gateway.resource(resource).update(&id, payload, credential).await
        }
        Command::Delete { resource, ids, many } => {
            let client = gateway.resource(resource);
            if many {
                client.delete_many(&ids, credential).await
            } else if ids.len() == 1 {
                client.delete(&ids[0], credential).await
            } else {
                let results = client.delete_each::<Value, _>(&ids, credential).await;
                let failed = results.iter().filter(|(_, r)| r.is_err()).count();
                info!("Deleted {} of {} records", results.len() - failed, results.len());

                let report: Vec<Value> = results
                    .into_iter()
                    .map(|(id, result)| match result {
                        Ok(data) => json!({ "id": id, "data": data }),
                        Err(error) => json!({ "id": id, "error": error.to_normalized() }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&report)?);
                if failed > 0 {
                    std::process::exit(1);
                }
                return Ok(());
            }
        }
    };

    match outcome {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Err(error) => {
            eprintln!("{}", serde_json::to_string_pretty(&error.to_normalized())?);
            std::process::exit(1);
        }
    }
}

/// Build a JSON body, or a multipart body when files are attached
async fn build_payload(data: Option<&str>, files: &[String]) -> Result<Payload> {
    let data: Value = match data {
        Some(raw) => serde_json::from_str(raw).context("--data must be valid JSON")?,
        None => Value::Null,
    };

    if files.is_empty() {
        return Ok(match data {
            Value::Null => Payload::Empty,
            value => Payload::Json(value),
        });
    }

    let mut form = MultipartPayload::from_json_fields(&data);
    for entry in files {
        let (field, path) = entry
            .split_once('=')
            .with_context(|| format!("--file expects FIELD=PATH, got '{}'", entry))?;
        let path = Path::new(path);
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", path))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| field.to_string());
        form = form.file(field, file_name, guess_mime(path), bytes);
    }
    Ok(Payload::Multipart(form))
}

fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}
