//! Logging utilities
//!
//! Subscriber initialisation and payload summaries for debug logs

use crate::config::settings::LoggingConfig;
use crate::models::Payload;
use anyhow::Result;

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len).collect();
        format!("{}... ({} chars truncated)", kept, s.chars().count() - max_len)
    } else {
        s.to_string()
    }
}

/// Short description of a payload, never including file contents
pub fn summarize_payload(payload: &Payload) -> String {
    match payload {
        Payload::Empty => "empty".to_string(),
        Payload::Json(value) => format!("json {}", truncate_content(&value.to_string(), 200)),
        Payload::Multipart(form) => {
            let files: Vec<String> = form
                .files
                .iter()
                .map(|f| format!("{}={} ({} bytes)", f.field, f.file_name, f.bytes.len()))
                .collect();
            format!("multipart {} fields, files [{}]", form.fields.len(), files.join(", "))
        }
    }
}

/// Lossy preview of a response body for warn logs
pub fn body_preview(body: &[u8]) -> String {
    truncate_content(&String::from_utf8_lossy(body), 200)
}

/// Initialize the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(())
}
